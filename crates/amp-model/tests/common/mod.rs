//! Shared test fixture: a 1/2 -> 1/2 0 0 three-body decay with two
//! interfering chains resonating in the (1,2) pair.

use serde_json::{json, Value};

use amp_core::kin::DalitzPoint;
use amp_model::{load_model, ModelDefinition, ModelDocument};

pub fn fixture_value() -> Value {
    json!({
        "kinematics": {
            "names": ["parent", "p1", "p2", "p3"],
            "indices": [0, 1, 2, 3],
            "masses": [5.62, 1.12, 0.49, 0.14],
            "spins": ["1/2", "1/2", "0", "0"]
        },
        "reference_topology": [[1, 2], 3],
        "chains": [
            {
                "topology": [[1, 2], 3],
                "vertices": [
                    { "node": [[1, 2], 3], "type": "RecouplingLS", "l": "0", "s": "1/2" },
                    { "node": [1, 2], "type": "ParityRecoupling",
                      "helicities": ["1/2", "0"], "parity_factor": -1 }
                ],
                "propagators": [
                    { "node": [1, 2], "type": "BreitWigner", "spin": "1/2",
                      "parametrization": "BW_R1690" }
                ],
                "weight": [1.0, 0.0]
            },
            {
                "topology": [[1, 2], 3],
                "vertices": [
                    { "node": [[1, 2], 3], "type": "RecouplingLS", "l": "1", "s": "1/2" },
                    { "node": [1, 2], "type": "NoRecoupling", "helicities": ["1/2", "0"] }
                ],
                "propagators": [
                    { "node": [1, 2], "type": "BreitWigner", "spin": "1/2",
                      "parametrization": "BW_R1820" }
                ],
                "weight": [0.5, 0.2]
            }
        ],
        "functions": {
            "BW_R1690": { "type": "BreitWigner", "mass": 1.69, "width": 0.05,
                          "ma": 1.12, "mb": 0.49, "l": 1, "d": 1.5 },
            "BW_R1820": { "type": "BreitWigner", "mass": 1.82, "width": 0.08,
                          "ma": 1.12, "mb": 0.49, "l": 1, "d": 1.5 }
        },
        "parameter_points": {
            "interior": { "sigma1": 8.0, "sigma2": 21.8985 }
        },
        "checksums": {}
    })
}

pub fn fixture_document() -> ModelDocument {
    serde_json::from_value(fixture_value()).expect("fixture document")
}

pub fn fixture_definition() -> ModelDefinition {
    load_model(&fixture_document()).expect("fixture loads")
}

/// An interior Dalitz point of the fixture kinematics.
pub fn interior_point(definition: &ModelDefinition) -> DalitzPoint {
    DalitzPoint::from_two(&definition.kinematics, 8.0, 21.8985)
}

/// A point sitting exactly on the (1,2) pair threshold, where both fixture
/// resonances carry a p-wave barrier and the amplitude vanishes exactly.
pub fn pair_threshold_point(definition: &ModelDefinition) -> DalitzPoint {
    let sigma3 = (1.12_f64 + 0.49).powi(2);
    let sigma1 = 9.0772;
    let sigma2 = definition.kinematics.closure_sum() - sigma1 - sigma3;
    DalitzPoint::from_invariants(&definition.kinematics, sigma1, sigma2, sigma3)
        .expect("threshold point closes")
}

/// A single-chain document whose chain cascades through the (2,3) pair,
/// so its topology differs from the fixture reference.
pub fn swapped_spectator_value() -> Value {
    json!({
        "kinematics": {
            "names": ["parent", "p1", "p2", "p3"],
            "indices": [0, 1, 2, 3],
            "masses": [5.62, 1.12, 0.49, 0.14],
            "spins": ["1/2", "1/2", "0", "0"]
        },
        "reference_topology": [[1, 2], 3],
        "chains": [
            {
                "topology": [[2, 3], 1],
                "vertices": [
                    { "node": [[2, 3], 1], "type": "RecouplingLS", "l": "0", "s": "1/2" },
                    { "node": [2, 3], "type": "NoRecoupling", "helicities": ["0", "0"] }
                ],
                "propagators": [
                    { "node": [2, 3], "type": "BreitWigner", "spin": "0",
                      "parametrization": "BW_S1000" }
                ],
                "weight": [1.0, 0.0]
            }
        ],
        "functions": {
            "BW_S1000": { "type": "BreitWigner", "mass": 1.0, "width": 0.1,
                          "ma": 0.49, "mb": 0.14, "l": 0, "d": 1.5 }
        },
        "parameter_points": {},
        "checksums": {}
    })
}
