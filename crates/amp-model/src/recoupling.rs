//! Vertex recoupling schemes.
//!
//! A vertex turns the helicities of its two written-order children into a
//! real coupling coefficient. The scheme is a closed tagged enum; unknown
//! `type` strings are rejected at load time, never defaulted.

use serde::{Deserialize, Serialize};

use amp_core::clebsch_gordan;

/// Angular momenta entering a vertex, doubled. `two_j` is the splitting
/// state, `two_ja` and `two_jb` its children in written order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexSpins {
    pub two_j: i32,
    pub two_ja: i32,
    pub two_jb: i32,
}

/// The closed set of vertex coupling schemes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Recoupling {
    /// Identity selection on one declared helicity pair.
    NoRecoupling { two_lambda_a: i32, two_lambda_b: i32 },
    /// Direct term plus the parity-flipped pair scaled by `parity_factor`.
    ParityRecoupling {
        two_lambda_a: i32,
        two_lambda_b: i32,
        parity_factor: f64,
    },
    /// LS coupling with orbital momentum `l` and total child spin `s`.
    RecouplingLS { two_l: i32, two_s: i32 },
}

impl Recoupling {
    /// Coupling coefficient for child helicities `(two_la, two_lb)` in
    /// written order.
    pub fn coefficient(&self, two_la: i32, two_lb: i32, spins: &VertexSpins) -> f64 {
        match self {
            Recoupling::NoRecoupling {
                two_lambda_a,
                two_lambda_b,
            } => {
                if two_la == *two_lambda_a && two_lb == *two_lambda_b {
                    1.0
                } else {
                    0.0
                }
            }
            Recoupling::ParityRecoupling {
                two_lambda_a,
                two_lambda_b,
                parity_factor,
            } => {
                let mut value = 0.0;
                if two_la == *two_lambda_a && two_lb == *two_lambda_b {
                    value += 1.0;
                }
                if two_la == -*two_lambda_a && two_lb == -*two_lambda_b {
                    value += parity_factor;
                }
                value
            }
            Recoupling::RecouplingLS { two_l, two_s } => {
                let two_lambda = two_la - two_lb;
                let normalization =
                    ((f64::from(*two_l) + 1.0) / (f64::from(spins.two_j) + 1.0)).sqrt();
                normalization
                    * clebsch_gordan(*two_l, 0, *two_s, two_lambda, spins.two_j, two_lambda)
                    * clebsch_gordan(spins.two_ja, two_la, spins.two_jb, -two_lb, *two_s, two_lambda)
            }
        }
    }
}
