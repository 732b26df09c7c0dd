//! Per-chain amplitude assembly.
//!
//! One [`ChainAmplitude`] walks a chain's splits outward-to-inward: the root
//! vertex couples the resonance and the spectator to the decaying system, the
//! inner vertex couples the resonance daughters, the propagator contributes
//! the lineshape at the pair invariant. Helicities are quantized in the
//! chain's own cascade of frames; [`crate::alignment`] supplies the Wigner-d
//! sums that carry them into the reference basis.

use num_complex::Complex64;

use amp_core::errors::{AmpError, ErrorInfo};
use amp_core::kin::{cyclic_pair, DalitzPoint, Kinematics};
use amp_core::{wigner_small_d, Spin};
use amp_dyn::{BuildContext, LineshapeCache, LineshapeFn, LineshapeRegistry};

use crate::alignment::{self, Alignment};
use crate::doc::{ChainDefinition, ModelDefinition};
use crate::recoupling::{Recoupling, VertexSpins};

/// One point of the external helicity grid, doubled projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelicityConfiguration {
    /// Projection of the decaying system.
    pub two_lambda0: i32,
    /// Projections of final-state particles 1..=3.
    pub two_lambda: [i32; 3],
}

impl HelicityConfiguration {
    /// Projection of the given particle.
    pub fn projection(&self, particle: u32) -> i32 {
        if particle == 0 {
            self.two_lambda0
        } else {
            self.two_lambda[particle as usize - 1]
        }
    }

    fn set_projection(&mut self, particle: u32, value: i32) {
        if particle == 0 {
            self.two_lambda0 = value;
        } else {
            self.two_lambda[particle as usize - 1] = value;
        }
    }
}

/// A fully assembled chain: pure function of the Dalitz point and the
/// external helicities.
pub struct ChainAmplitude {
    spectator: u32,
    /// Written-order children of the pair split.
    pair_a: u32,
    pair_b: u32,
    /// First cyclic partner of the spectator; fixes the decay-angle sign.
    cyclic_first: u32,
    /// True when the root split writes the pair before the spectator.
    root_pair_first: bool,
    two_j0: i32,
    two_jr: i32,
    two_ja: i32,
    two_jb: i32,
    two_jk: i32,
    production: Recoupling,
    decay: Recoupling,
    lineshape: LineshapeFn,
    weight: Complex64,
    alignment: Alignment,
}

impl std::fmt::Debug for ChainAmplitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainAmplitude")
            .field("spectator", &self.spectator)
            .field("two_jr", &self.two_jr)
            .field("weight", &self.weight)
            .field("alignment", &self.alignment)
            .finish_non_exhaustive()
    }
}

fn assembly_error(info: ErrorInfo) -> AmpError {
    AmpError::Document(info)
}

impl ChainAmplitude {
    /// Builds the chain amplitude from its validated definition.
    pub fn build(
        chain: &ChainDefinition,
        definition: &ModelDefinition,
        registry: &LineshapeRegistry,
        cache: &mut LineshapeCache,
    ) -> Result<Self, AmpError> {
        let root = &chain.topology.internal_nodes()[0];
        let inner = &chain.topology.decay_nodes()[0];
        let root_pair_first = root.first.len() == 2;
        let spectator = if root_pair_first {
            root.second.indices()[0]
        } else {
            root.first.indices()[0]
        };
        let pair_a = inner.first.indices()[0];
        let pair_b = inner.second.indices()[0];
        let (cyclic_first, _) = cyclic_pair(spectator)?;

        let production = chain.vertex(&root.key).ok_or_else(|| {
            assembly_error(
                ErrorInfo::new("vertex-missing", "root split has no vertex")
                    .with_context("node", root.key.to_string()),
            )
        })?;
        let decay = chain.vertex(&inner.key).ok_or_else(|| {
            assembly_error(
                ErrorInfo::new("vertex-missing", "pair split has no vertex")
                    .with_context("node", inner.key.to_string()),
            )
        })?;
        let propagator = chain.propagator(&inner.key).ok_or_else(|| {
            assembly_error(
                ErrorInfo::new("propagator-missing", "pair split has no propagator")
                    .with_context("node", inner.key.to_string()),
            )
        })?;
        let function = definition
            .functions
            .get(&propagator.parametrization)
            .ok_or_else(|| {
                assembly_error(
                    ErrorInfo::new(
                        "unknown-parametrization",
                        "propagator references an undefined parametrization",
                    )
                    .with_context("parametrization", propagator.parametrization.clone()),
                )
            })?;
        let context = BuildContext {
            function_name: &propagator.parametrization,
            fields: &function.fields,
        };
        let lineshape = cache.get_or_build(registry, &propagator.kind, &context)?;

        let kinematics = &definition.kinematics;
        let alignment =
            alignment::plan(&chain.topology, &definition.reference_topology, kinematics)?;
        Ok(ChainAmplitude {
            spectator,
            pair_a,
            pair_b,
            cyclic_first,
            root_pair_first,
            two_j0: kinematics.initial().spin.doubled(),
            two_jr: propagator.spin.doubled(),
            two_ja: kinematics.particle(pair_a)?.spin.doubled(),
            two_jb: kinematics.particle(pair_b)?.spin.doubled(),
            two_jk: kinematics.particle(spectator)?.spin.doubled(),
            production: production.recoupling.clone(),
            decay: decay.recoupling.clone(),
            lineshape,
            weight: chain.weight,
            alignment,
        })
    }

    /// The chain's alignment against the reference topology.
    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }

    /// Spectator index of the chain's cascade.
    pub fn spectator(&self) -> u32 {
        self.spectator
    }

    /// Amplitude with helicities quantized in the chain's own cascade,
    /// without the chain weight.
    pub fn evaluate_in_chain_frame(
        &self,
        kinematics: &Kinematics,
        point: &DalitzPoint,
        config: &HelicityConfiguration,
    ) -> Result<Complex64, AmpError> {
        let two_la = config.projection(self.pair_a);
        let two_lb = config.projection(self.pair_b);
        let two_lk = config.projection(self.spectator);

        let sigma = point.sigma(self.spectator)?;
        let cosine = kinematics.cos_decay_angle(point, self.spectator)?;
        let signed = if self.pair_a == self.cyclic_first {
            cosine
        } else {
            -cosine
        };
        let theta = signed.clamp(-1.0, 1.0).acos();

        let decay_spins = VertexSpins {
            two_j: self.two_jr,
            two_ja: self.two_ja,
            two_jb: self.two_jb,
        };
        let mut sum = 0.0;
        for two_tau in Spin::from_doubled(self.two_jr)?.projections() {
            let expected_lambda0 = if self.root_pair_first {
                two_tau - two_lk
            } else {
                two_lk - two_tau
            };
            if expected_lambda0 != config.two_lambda0 {
                continue;
            }
            let production = if self.root_pair_first {
                self.production.coefficient(
                    two_tau,
                    two_lk,
                    &VertexSpins {
                        two_j: self.two_j0,
                        two_ja: self.two_jr,
                        two_jb: self.two_jk,
                    },
                )
            } else {
                self.production.coefficient(
                    two_lk,
                    two_tau,
                    &VertexSpins {
                        two_j: self.two_j0,
                        two_ja: self.two_jk,
                        two_jb: self.two_jr,
                    },
                )
            };
            if production == 0.0 {
                continue;
            }
            let rotation = wigner_small_d(self.two_jr, two_tau, two_la - two_lb, theta);
            let decay = self.decay.coefficient(two_la, two_lb, &decay_spins);
            sum += production * rotation * decay;
        }

        let normalization = (f64::from(self.two_j0) + 1.0).sqrt()
            * (f64::from(self.two_jr) + 1.0).sqrt();
        Ok(normalization * sum * (self.lineshape)(sigma))
    }

    /// Weighted amplitude with helicities in the reference basis.
    pub fn evaluate(
        &self,
        kinematics: &Kinematics,
        point: &DalitzPoint,
        config: &HelicityConfiguration,
    ) -> Result<Complex64, AmpError> {
        let aligned = match &self.alignment {
            Alignment::Identity => self.evaluate_in_chain_frame(kinematics, point, config)?,
            Alignment::Rotate {
                chain_spectator,
                reference_spectator,
                entries,
            } => {
                let mut rotations = Vec::with_capacity(entries.len());
                for entry in entries {
                    let zeta = alignment::wigner_rotation_angle(
                        kinematics,
                        point,
                        entry.particle,
                        *chain_spectator,
                        *reference_spectator,
                    )?;
                    rotations.push((*entry, zeta));
                }
                self.aligned_sum(kinematics, point, &rotations, 0, *config)?
            }
        };
        Ok(self.weight * aligned)
    }

    fn aligned_sum(
        &self,
        kinematics: &Kinematics,
        point: &DalitzPoint,
        rotations: &[(crate::alignment::AlignmentEntry, f64)],
        position: usize,
        config: HelicityConfiguration,
    ) -> Result<Complex64, AmpError> {
        let Some((entry, zeta)) = rotations.get(position) else {
            return self.evaluate_in_chain_frame(kinematics, point, &config);
        };
        let requested = config.projection(entry.particle);
        let mut total = Complex64::new(0.0, 0.0);
        for nu in Spin::from_doubled(entry.two_j)?.projections() {
            let rotation = wigner_small_d(entry.two_j, requested, nu, *zeta);
            if rotation == 0.0 {
                continue;
            }
            let mut inner = config;
            inner.set_projection(entry.particle, nu);
            total += rotation * self.aligned_sum(kinematics, point, rotations, position + 1, inner)?;
        }
        Ok(total)
    }
}
