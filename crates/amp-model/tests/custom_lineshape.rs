mod common;

use std::sync::Arc;

use num_complex::Complex64;
use serde_json::json;

use amp_core::AmpError;
use amp_dyn::{BuildContext, LineshapeFn, LineshapeRegistry};
use amp_model::{assemble_model, load_model};

fn document_with_custom_type() -> amp_model::ModelDefinition {
    let mut value = common::fixture_value();
    value["chains"][0]["propagators"][0]["type"] = json!("BuggBW");
    value["functions"]["BW_R1690"] = json!({
        "type": "BuggBW", "mass": 1.69, "width": 0.05, "slope": 0.2
    });
    load_model(&serde_json::from_value(value).expect("document")).expect("loads")
}

#[test]
fn missing_custom_builder_fails_naming_the_type() {
    let definition = document_with_custom_type();
    let err = assemble_model(&definition, &LineshapeRegistry::with_builtins()).unwrap_err();
    match &err {
        AmpError::Lineshape(info) => {
            assert_eq!(info.code, "unsupported-lineshape");
            assert_eq!(info.context.get("type").map(String::as_str), Some("BuggBW"));
        }
        other => panic!("expected lineshape error, got {other}"),
    }
}

#[test]
fn registering_the_builder_makes_assembly_succeed() {
    let definition = document_with_custom_type();
    let mut registry = LineshapeRegistry::with_builtins();
    registry.register(
        "BuggBW",
        Arc::new(|ctx: &BuildContext<'_>| -> Result<LineshapeFn, AmpError> {
            #[derive(serde::Deserialize)]
            struct Fields {
                mass: f64,
                width: f64,
                slope: f64,
            }
            let fields: Fields = ctx.decode()?;
            Ok(Arc::new(move |s: f64| {
                let width = fields.width * (-fields.slope * s).exp();
                Complex64::new(1.0, 0.0)
                    / Complex64::new(fields.mass * fields.mass - s, -fields.mass * width)
            }))
        }),
    );

    let model = assemble_model(&definition, &registry).expect("assembles");
    let point = common::interior_point(&definition);
    let intensity = model.unpolarized_intensity(&point).expect("intensity");
    assert!(intensity.is_finite());
    assert!(intensity > 0.0);
}
