mod common;

use serde_json::json;

use amp_dyn::LineshapeRegistry;
use amp_model::{assemble_model, load_model, validate, ValidationConfig};

fn intensity_at_interior() -> f64 {
    let definition = common::fixture_definition();
    let model = assemble_model(&definition, &LineshapeRegistry::with_builtins())
        .expect("assembles");
    model
        .unpolarized_intensity(&common::interior_point(&definition))
        .expect("intensity")
}

#[test]
fn matching_checksum_passes_within_tolerance() {
    let expected = intensity_at_interior();
    let mut value = common::fixture_value();
    value["checksums"] = json!({
        "interior-unpolarized": { "point": "interior", "value": expected }
    });
    let definition =
        load_model(&serde_json::from_value(value).expect("document")).expect("loads");
    let model = assemble_model(&definition, &LineshapeRegistry::with_builtins())
        .expect("assembles");

    let reports = validate(&model, &definition, &ValidationConfig::default());
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.name, "interior-unpolarized");
    assert!(report.passed);
    let computed = report.computed.expect("computed");
    assert!((computed - expected).abs() <= 1e-6 * expected.abs().max(1.0));
}

#[test]
fn perturbed_parameter_point_fails_without_throwing() {
    let expected = intensity_at_interior();
    let mut value = common::fixture_value();
    value["parameter_points"]["interior"]["sigma1"] = json!(8.4);
    value["checksums"] = json!({
        "interior-unpolarized": { "point": "interior", "value": expected }
    });
    let definition =
        load_model(&serde_json::from_value(value).expect("document")).expect("loads");
    let model = assemble_model(&definition, &LineshapeRegistry::with_builtins())
        .expect("assembles");

    let reports = validate(&model, &definition, &ValidationConfig::default());
    assert_eq!(reports.len(), 1);
    assert!(!reports[0].passed);
    assert!(reports[0].computed.is_some());
}

#[test]
fn sweep_reports_every_entry_even_after_faults() {
    let expected = intensity_at_interior();
    let mut value = common::fixture_value();
    value["checksums"] = json!({
        "a-dangling": { "point": "nowhere", "value": 1.0 },
        "b-interior": { "point": "interior", "value": expected }
    });
    let definition =
        load_model(&serde_json::from_value(value).expect("document")).expect("loads");
    let model = assemble_model(&definition, &LineshapeRegistry::with_builtins())
        .expect("assembles");

    let reports = validate(&model, &definition, &ValidationConfig::default());
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].name, "a-dangling");
    assert!(!reports[0].passed);
    assert!(reports[0].computed.is_none());
    assert!(reports[0].note.as_deref().unwrap_or("").contains("nowhere"));
    assert!(reports[1].passed);
}

#[test]
fn subset_configuration_restricts_the_sweep() {
    let expected = intensity_at_interior();
    let mut value = common::fixture_value();
    value["checksums"] = json!({
        "a-dangling": { "point": "nowhere", "value": 1.0 },
        "b-interior": { "point": "interior", "value": expected }
    });
    let definition =
        load_model(&serde_json::from_value(value).expect("document")).expect("loads");
    let model = assemble_model(&definition, &LineshapeRegistry::with_builtins())
        .expect("assembles");

    let config = ValidationConfig {
        subset: Some(vec!["b-interior".to_string()]),
        ..ValidationConfig::default()
    };
    let reports = validate(&model, &definition, &config);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name, "b-interior");
    assert!(reports[0].passed);
}

#[test]
fn incomplete_parameter_point_is_reported_not_thrown() {
    let mut value = common::fixture_value();
    value["parameter_points"]["partial"] = json!({ "sigma1": 8.0 });
    value["checksums"] = json!({
        "partial-check": { "point": "partial", "value": 1.0 }
    });
    let definition =
        load_model(&serde_json::from_value(value).expect("document")).expect("loads");
    let model = assemble_model(&definition, &LineshapeRegistry::with_builtins())
        .expect("assembles");

    let reports = validate(&model, &definition, &ValidationConfig::default());
    assert_eq!(reports.len(), 1);
    assert!(!reports[0].passed);
    assert!(reports[0]
        .note
        .as_deref()
        .unwrap_or("")
        .contains("sigma2"));
}
