//! Model assembly and intensity evaluation.

use num_complex::Complex64;
use rayon::prelude::*;

use amp_core::errors::{AmpError, ErrorInfo};
use amp_core::kin::{DalitzPoint, Kinematics};
use amp_core::Spin;
use amp_dyn::{LineshapeCache, LineshapeRegistry};

use crate::chain::{ChainAmplitude, HelicityConfiguration};
use crate::doc::ModelDefinition;

fn intensity_error(info: ErrorInfo) -> AmpError {
    AmpError::Intensity(info)
}

/// Hermitian density matrix of the decaying system's polarization, indexed
/// by helicity projection from `-j0` to `+j0`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarizationMatrix {
    entries: Vec<Vec<Complex64>>,
}

impl PolarizationMatrix {
    /// Builds the matrix from its rows, which must form a square.
    pub fn from_rows(entries: Vec<Vec<Complex64>>) -> Result<Self, AmpError> {
        let dimension = entries.len();
        if dimension == 0 || entries.iter().any(|row| row.len() != dimension) {
            return Err(intensity_error(
                ErrorInfo::new("polarization-shape", "polarization matrix must be square")
                    .with_context("rows", dimension.to_string()),
            ));
        }
        Ok(PolarizationMatrix { entries })
    }

    /// The identity matrix of the given dimension.
    pub fn identity(dimension: usize) -> Self {
        let mut entries = vec![vec![Complex64::new(0.0, 0.0); dimension]; dimension];
        for (position, row) in entries.iter_mut().enumerate() {
            row[position] = Complex64::new(1.0, 0.0);
        }
        PolarizationMatrix { entries }
    }

    /// The unpolarized density matrix, identity divided by its dimension.
    pub fn identity_normalized(dimension: usize) -> Self {
        let mut matrix = PolarizationMatrix::identity(dimension);
        let scale = 1.0 / dimension as f64;
        for row in &mut matrix.entries {
            for entry in row {
                *entry *= scale;
            }
        }
        matrix
    }

    pub fn dimension(&self) -> usize {
        self.entries.len()
    }

    fn entry(&self, row: usize, column: usize) -> Complex64 {
        self.entries[row][column]
    }

    fn is_hermitian(&self, tolerance: f64) -> bool {
        let dimension = self.dimension();
        for row in 0..dimension {
            for column in row..dimension {
                let mismatch = self.entries[row][column] - self.entries[column][row].conj();
                if mismatch.norm() > tolerance {
                    return false;
                }
            }
        }
        true
    }
}

/// The assembled model: total amplitude and intensity functions, immutable
/// and reusable across evaluation points.
pub struct AmplitudeModel {
    kinematics: Kinematics,
    chains: Vec<ChainAmplitude>,
    two_j0: i32,
    two_j: [i32; 3],
    fingerprint: String,
}

impl std::fmt::Debug for AmplitudeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmplitudeModel")
            .field("chains", &self.chains)
            .field("two_j0", &self.two_j0)
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

/// Builds every chain amplitude and wires them into one model.
///
/// Lineshapes are resolved through the explicit `registry`; definitions
/// shared between chains are built once via the content-addressed cache.
pub fn assemble_model(
    definition: &ModelDefinition,
    registry: &LineshapeRegistry,
) -> Result<AmplitudeModel, AmpError> {
    if definition.kinematics.final_count() != 3 {
        return Err(AmpError::Document(
            ErrorInfo::new(
                "three-body-only",
                "amplitude assembly supports three final-state particles",
            )
            .with_context(
                "final_count",
                definition.kinematics.final_count().to_string(),
            ),
        ));
    }
    let mut cache = LineshapeCache::new();
    let mut chains = Vec::with_capacity(definition.chains.len());
    for chain in &definition.chains {
        chains.push(ChainAmplitude::build(chain, definition, registry, &mut cache)?);
    }
    let kinematics = definition.kinematics.clone();
    let two_j = [
        kinematics.particle(1)?.spin.doubled(),
        kinematics.particle(2)?.spin.doubled(),
        kinematics.particle(3)?.spin.doubled(),
    ];
    Ok(AmplitudeModel {
        two_j0: kinematics.initial().spin.doubled(),
        two_j,
        kinematics,
        chains,
        fingerprint: definition.fingerprint.clone(),
    })
}

impl AmplitudeModel {
    /// SHA-256 fingerprint of the source document.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    pub fn chains(&self) -> &[ChainAmplitude] {
        &self.chains
    }

    /// Coherent sum of the weighted, aligned chain amplitudes.
    pub fn total_amplitude(
        &self,
        point: &DalitzPoint,
        config: &HelicityConfiguration,
    ) -> Result<Complex64, AmpError> {
        let mut total = Complex64::new(0.0, 0.0);
        for chain in &self.chains {
            total += chain.evaluate(&self.kinematics, point, config)?;
        }
        Ok(total)
    }

    /// Every external helicity configuration of the decay.
    pub fn helicity_grid(&self) -> Vec<HelicityConfiguration> {
        let spin0 = Spin::from_doubled(self.two_j0).unwrap_or(Spin::ZERO);
        let spins: Vec<Spin> = self
            .two_j
            .iter()
            .map(|&two_j| Spin::from_doubled(two_j).unwrap_or(Spin::ZERO))
            .collect();
        let mut grid = Vec::new();
        for two_lambda0 in spin0.projections() {
            for two_l1 in spins[0].projections() {
                for two_l2 in spins[1].projections() {
                    for two_l3 in spins[2].projections() {
                        grid.push(HelicityConfiguration {
                            two_lambda0,
                            two_lambda: [two_l1, two_l2, two_l3],
                        });
                    }
                }
            }
        }
        grid
    }

    /// Incoherent sum of `|total amplitude|^2` over the full helicity grid.
    pub fn unpolarized_intensity(&self, point: &DalitzPoint) -> Result<f64, AmpError> {
        let mut intensity = 0.0;
        for config in self.helicity_grid() {
            intensity += self.total_amplitude(point, &config)?.norm_sqr();
        }
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(intensity_error(
                ErrorInfo::new("intensity-not-finite", "unpolarized intensity is not a finite non-negative number")
                    .with_context("value", intensity.to_string())
                    .with_context("sigma1", point.sigma1.to_string())
                    .with_context("sigma2", point.sigma2.to_string()),
            ));
        }
        Ok(intensity)
    }

    /// Contraction of the amplitude with a polarization density matrix.
    ///
    /// The result must come out real within tolerance after summation; a
    /// larger imaginary residue is reported, never clamped away.
    pub fn polarized_intensity(
        &self,
        point: &DalitzPoint,
        polarization: &PolarizationMatrix,
    ) -> Result<f64, AmpError> {
        let dimension = Spin::from_doubled(self.two_j0)?.multiplicity();
        if polarization.dimension() != dimension {
            return Err(intensity_error(
                ErrorInfo::new(
                    "polarization-dimension",
                    "polarization matrix dimension must be 2 j0 + 1",
                )
                .with_context("expected", dimension.to_string())
                .with_context("actual", polarization.dimension().to_string()),
            ));
        }
        if !polarization.is_hermitian(1e-12) {
            return Err(intensity_error(ErrorInfo::new(
                "polarization-not-hermitian",
                "polarization density matrix must be Hermitian",
            )));
        }

        let spin0 = Spin::from_doubled(self.two_j0)?;
        let final_spins: Vec<Spin> = self
            .two_j
            .iter()
            .map(|&two_j| Spin::from_doubled(two_j))
            .collect::<Result<_, _>>()?;
        let mut total = Complex64::new(0.0, 0.0);
        for two_l1 in final_spins[0].projections() {
            for two_l2 in final_spins[1].projections() {
                for two_l3 in final_spins[2].projections() {
                    let amplitudes: Vec<Complex64> = spin0
                        .projections()
                        .map(|two_lambda0| {
                            self.total_amplitude(
                                point,
                                &HelicityConfiguration {
                                    two_lambda0,
                                    two_lambda: [two_l1, two_l2, two_l3],
                                },
                            )
                        })
                        .collect::<Result<_, _>>()?;
                    for (row, amplitude) in amplitudes.iter().enumerate() {
                        for (column, partner) in amplitudes.iter().enumerate() {
                            total += partner.conj() * polarization.entry(row, column) * amplitude;
                        }
                    }
                }
            }
        }

        let scale = total.re.abs().max(1.0);
        if !total.re.is_finite() || total.im.abs() > 1e-9 * scale {
            return Err(intensity_error(
                ErrorInfo::new(
                    "intensity-residue",
                    "polarized intensity has a non-real or non-finite residue",
                )
                .with_context("re", total.re.to_string())
                .with_context("im", total.im.to_string())
                .with_context("sigma1", point.sigma1.to_string())
                .with_context("sigma2", point.sigma2.to_string()),
            ));
        }
        Ok(total.re)
    }

    /// Evaluates the unpolarized intensity over a grid of points in
    /// parallel. Point order is preserved in the output.
    pub fn unpolarized_intensity_grid(
        &self,
        points: &[DalitzPoint],
    ) -> Result<Vec<f64>, AmpError> {
        points
            .par_iter()
            .map(|point| self.unpolarized_intensity(point))
            .collect()
    }
}
