//! Checksum validation harness.
//!
//! A diagnostic sweep over the model's named checksum entries: every entry is
//! evaluated and compared, mismatches and per-entry faults are reported in
//! the result list, and the sweep always completes. Tolerance and checkpoint
//! selection are explicit configuration, not ambient state.

use serde::{Deserialize, Serialize};

use amp_core::kin::DalitzPoint;

use crate::doc::ModelDefinition;
use crate::model::AmplitudeModel;

/// Explicit configuration of a validation sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Relative tolerance for the expected-versus-computed comparison.
    pub relative_tolerance: f64,
    /// Restricts the sweep to the named checksums when set.
    pub subset: Option<Vec<String>>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            relative_tolerance: 1e-6,
            subset: None,
        }
    }
}

/// Outcome of one checksum comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub name: String,
    /// Computed intensity, absent when evaluation was impossible.
    pub computed: Option<f64>,
    pub expected: f64,
    pub passed: bool,
    /// Explanation for entries that could not be evaluated or compared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn failed(name: &str, expected: f64, note: impl Into<String>) -> CheckReport {
    CheckReport {
        name: name.to_string(),
        computed: None,
        expected,
        passed: false,
        note: Some(note.into()),
    }
}

/// Builds the Dalitz point named by a parameter-point table.
fn point_from_inputs(
    definition: &ModelDefinition,
    inputs: &std::collections::BTreeMap<String, f64>,
) -> Result<DalitzPoint, String> {
    let sigma1 = *inputs
        .get("sigma1")
        .ok_or_else(|| "parameter point is missing sigma1".to_string())?;
    let sigma2 = *inputs
        .get("sigma2")
        .ok_or_else(|| "parameter point is missing sigma2".to_string())?;
    match inputs.get("sigma3") {
        Some(&sigma3) => {
            DalitzPoint::from_invariants(&definition.kinematics, sigma1, sigma2, sigma3)
                .map_err(|err| err.to_string())
        }
        None => Ok(DalitzPoint::from_two(&definition.kinematics, sigma1, sigma2)),
    }
}

/// Sweeps every checksum entry of the model definition.
///
/// Never fails as a whole: per-entry faults (unknown parameter point,
/// evaluation error) become failed reports carrying a note.
pub fn validate(
    model: &AmplitudeModel,
    definition: &ModelDefinition,
    config: &ValidationConfig,
) -> Vec<CheckReport> {
    let mut reports = Vec::new();
    for (name, checksum) in &definition.checksums {
        if let Some(subset) = &config.subset {
            if !subset.iter().any(|selected| selected == name) {
                continue;
            }
        }
        let Some(inputs) = definition.parameter_points.get(&checksum.point) else {
            reports.push(failed(
                name,
                checksum.value,
                format!("unknown parameter point '{}'", checksum.point),
            ));
            continue;
        };
        let point = match point_from_inputs(definition, inputs) {
            Ok(point) => point,
            Err(note) => {
                reports.push(failed(name, checksum.value, note));
                continue;
            }
        };
        let computed = match model.unpolarized_intensity(&point) {
            Ok(value) => value,
            Err(err) => {
                reports.push(failed(name, checksum.value, err.to_string()));
                continue;
            }
        };
        let scale = checksum.value.abs().max(f64::MIN_POSITIVE);
        let passed = (computed - checksum.value).abs() <= config.relative_tolerance * scale;
        reports.push(CheckReport {
            name: name.clone(),
            computed: Some(computed),
            expected: checksum.value,
            passed,
            note: None,
        });
    }
    reports
}
