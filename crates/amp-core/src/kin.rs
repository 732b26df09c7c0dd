//! Particle kinematics registry and three-body invariants.

use serde::{Deserialize, Serialize};

use crate::errors::{AmpError, ErrorInfo};
use crate::spin::Spin;

fn kin_error(info: ErrorInfo) -> AmpError {
    AmpError::Kinematics(info)
}

/// Källén triangle function `λ(x, y, z)`.
///
/// Written in factored form over the square roots of `y` and `z`, so the
/// function evaluates to exactly zero at both two-body thresholds when the
/// arguments are squared masses. Callers pass physical (non-negative) mass
/// squares only.
pub fn kallen(x: f64, y: f64, z: f64) -> f64 {
    let sy = y.max(0.0).sqrt();
    let sz = z.max(0.0).sqrt();
    let sum = sy + sz;
    let diff = sy - sz;
    (x - sum * sum) * (x - diff * diff)
}

/// Squared breakup momentum of a two-body state of invariant mass squared `s`
/// decaying into masses `ma` and `mb`.
///
/// Exactly zero at `s = (ma + mb)^2` and `s = (ma - mb)^2`. Every lineshape
/// builder goes through this single definition.
pub fn breakup_momentum_sq(s: f64, ma: f64, mb: f64) -> f64 {
    let sum = ma + mb;
    let diff = ma - mb;
    (s - sum * sum) * (s - diff * diff) / (4.0 * s)
}

/// One entry of the kinematics registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Position in the decay: 0 is the decaying system, 1..N the final state.
    pub index: u32,
    /// Display name, carried through for diagnostics only.
    pub name: String,
    /// Spin magnitude.
    pub spin: Spin,
    /// Mass in GeV/c^2.
    pub mass: f64,
}

/// Immutable per-particle lookup table built from the four positionally
/// aligned boundary lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    particles: Vec<Particle>,
}

impl Kinematics {
    /// Builds the registry, validating list alignment and index coverage.
    pub fn from_lists(
        names: &[String],
        indices: &[u32],
        masses: &[f64],
        spins: &[String],
    ) -> Result<Self, AmpError> {
        let count = names.len();
        if indices.len() != count || masses.len() != count || spins.len() != count {
            return Err(kin_error(
                ErrorInfo::new(
                    "kinematics-length-mismatch",
                    "kinematics lists are not positionally aligned",
                )
                .with_context("names", names.len().to_string())
                .with_context("indices", indices.len().to_string())
                .with_context("masses", masses.len().to_string())
                .with_context("spins", spins.len().to_string()),
            ));
        }
        if count < 3 {
            return Err(kin_error(ErrorInfo::new(
                "kinematics-too-small",
                "a decay needs the parent and at least two final-state particles",
            )));
        }
        let mut particles = Vec::with_capacity(count);
        for position in 0..count {
            if masses[position] < 0.0 {
                return Err(kin_error(
                    ErrorInfo::new("kinematics-negative-mass", "mass must be non-negative")
                        .with_context("index", indices[position].to_string()),
                ));
            }
            let spin = Spin::parse(&spins[position]).map_err(|err| {
                kin_error(
                    ErrorInfo::new("kinematics-spin", "unparsable spin entry")
                        .with_context("index", indices[position].to_string())
                        .with_hint(err.to_string()),
                )
            })?;
            particles.push(Particle {
                index: indices[position],
                name: names[position].clone(),
                spin,
                mass: masses[position],
            });
        }
        particles.sort_by_key(|particle| particle.index);
        for (expected, particle) in particles.iter().enumerate() {
            if particle.index != expected as u32 {
                return Err(kin_error(
                    ErrorInfo::new(
                        "kinematics-index-coverage",
                        "particle indices must cover 0..N exactly once",
                    )
                    .with_context("index", particle.index.to_string()),
                ));
            }
        }
        Ok(Kinematics { particles })
    }

    /// Looks up a particle by its decay index.
    pub fn particle(&self, index: u32) -> Result<&Particle, AmpError> {
        self.particles.get(index as usize).ok_or_else(|| {
            kin_error(
                ErrorInfo::new("kinematics-unknown-index", "no particle registered at index")
                    .with_context("index", index.to_string()),
            )
        })
    }

    /// The decaying system (index 0).
    pub fn initial(&self) -> &Particle {
        &self.particles[0]
    }

    /// Number of final-state particles.
    pub fn final_count(&self) -> usize {
        self.particles.len() - 1
    }

    /// Mass of the particle at `index`.
    pub fn mass(&self, index: u32) -> Result<f64, AmpError> {
        Ok(self.particle(index)?.mass)
    }

    /// Closure constant of the Dalitz plane,
    /// `M^2 + m1^2 + m2^2 + m3^2 = sigma1 + sigma2 + sigma3`.
    pub fn closure_sum(&self) -> f64 {
        self.particles.iter().map(|p| p.mass * p.mass).sum()
    }

    /// Cosine of the helicity angle of the cyclic daughter `i` in the rest
    /// frame of pair `(i, j)`, for spectator `k` with `(i, j, k)` cyclic.
    ///
    /// The z-axis points along the pair's flight direction in the parent rest
    /// frame. At the pair threshold the angle degenerates (0/0); the cosine is
    /// pinned to 1 there, where barrier factors suppress the amplitude anyway.
    pub fn cos_decay_angle(&self, point: &DalitzPoint, spectator: u32) -> Result<f64, AmpError> {
        let (i, j) = cyclic_pair(spectator)?;
        let m_parent_sq = self.initial().mass.powi(2);
        let mi_sq = self.mass(i)?.powi(2);
        let mj_sq = self.mass(j)?.powi(2);
        let mk_sq = self.mass(spectator)?.powi(2);
        let sigma_k = point.sigma(spectator)?;
        let sigma_j = point.sigma(j)?;
        let numerator = 2.0 * sigma_k * (sigma_j - mi_sq - mk_sq)
            - (sigma_k + mi_sq - mj_sq) * (m_parent_sq - sigma_k - mk_sq);
        let denominator = kallen(sigma_k, mi_sq, mj_sq).max(0.0).sqrt()
            * kallen(m_parent_sq, sigma_k, mk_sq).max(0.0).sqrt();
        if denominator == 0.0 {
            return Ok(1.0);
        }
        Ok(numerator / denominator)
    }

    /// True when the invariants sit inside (or on) the Dalitz boundary.
    pub fn is_physical(&self, point: &DalitzPoint) -> Result<bool, AmpError> {
        let m_parent_sq = self.initial().mass.powi(2);
        for spectator in 1..=3u32 {
            let (i, j) = cyclic_pair(spectator)?;
            let sigma = point.sigma(spectator)?;
            let pair_min = (self.mass(i)? + self.mass(j)?).powi(2);
            let pair_max = (self.initial().mass - self.mass(spectator)?).powi(2);
            if sigma < pair_min || sigma > pair_max {
                return Ok(false);
            }
            if kallen(m_parent_sq, sigma, self.mass(spectator)?.powi(2)) < 0.0 {
                return Ok(false);
            }
            if self.cos_decay_angle(point, spectator)?.abs() > 1.0 + 1e-12 {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Cyclic partners `(i, j)` of a three-body spectator `k`.
pub fn cyclic_pair(spectator: u32) -> Result<(u32, u32), AmpError> {
    if !(1..=3).contains(&spectator) {
        return Err(kin_error(
            ErrorInfo::new(
                "kinematics-spectator-range",
                "three-body spectator index must be 1, 2 or 3",
            )
            .with_context("index", spectator.to_string()),
        ));
    }
    let i = spectator % 3 + 1;
    let j = i % 3 + 1;
    Ok((i, j))
}

/// A point on the Dalitz plane: the three pair invariants `sigma_k`, where
/// `sigma_k` is the squared invariant mass of the pair not containing `k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DalitzPoint {
    pub sigma1: f64,
    pub sigma2: f64,
    pub sigma3: f64,
}

impl DalitzPoint {
    /// Completes the third invariant from the mass-sum closure.
    pub fn from_two(kinematics: &Kinematics, sigma1: f64, sigma2: f64) -> Self {
        DalitzPoint {
            sigma1,
            sigma2,
            sigma3: kinematics.closure_sum() - sigma1 - sigma2,
        }
    }

    /// Builds from all three invariants, enforcing closure within tolerance.
    pub fn from_invariants(
        kinematics: &Kinematics,
        sigma1: f64,
        sigma2: f64,
        sigma3: f64,
    ) -> Result<Self, AmpError> {
        let total = kinematics.closure_sum();
        let residual = sigma1 + sigma2 + sigma3 - total;
        if residual.abs() > 1e-9 * total.abs().max(1.0) {
            return Err(kin_error(
                ErrorInfo::new(
                    "dalitz-closure",
                    "pair invariants do not satisfy the mass-sum closure",
                )
                .with_context("residual", format!("{residual:e}")),
            ));
        }
        Ok(DalitzPoint {
            sigma1,
            sigma2,
            sigma3,
        })
    }

    /// The invariant for spectator `k`.
    pub fn sigma(&self, spectator: u32) -> Result<f64, AmpError> {
        match spectator {
            1 => Ok(self.sigma1),
            2 => Ok(self.sigma2),
            3 => Ok(self.sigma3),
            other => Err(kin_error(
                ErrorInfo::new(
                    "dalitz-spectator-range",
                    "pair invariant index must be 1, 2 or 3",
                )
                .with_context("index", other.to_string()),
            )),
        }
    }
}
