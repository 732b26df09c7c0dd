//! Planar Lorentz kinematics for the alignment engine.
//!
//! A three-body decay is coplanar, so every frame change used by the engine
//! is a composition of rotations about y and boosts along z. Matrices act on
//! `(e, x, y, z)` components.

use serde::{Deserialize, Serialize};

/// A four-momentum in `(e, x, y, z)` order. The y component stays zero for
/// the planar configurations built here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourVector {
    pub e: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl FourVector {
    pub fn new(e: f64, x: f64, y: f64, z: f64) -> Self {
        FourVector { e, x, y, z }
    }

    /// Magnitude of the spatial momentum.
    pub fn momentum(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// A 4x4 Lorentz transformation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LorentzMatrix {
    rows: [[f64; 4]; 4],
}

impl LorentzMatrix {
    pub fn identity() -> Self {
        let mut rows = [[0.0; 4]; 4];
        for (position, row) in rows.iter_mut().enumerate() {
            row[position] = 1.0;
        }
        LorentzMatrix { rows }
    }

    /// Active rotation about the y axis by `angle`.
    pub fn rot_y(angle: f64) -> Self {
        let mut matrix = LorentzMatrix::identity();
        let (sin, cos) = angle.sin_cos();
        matrix.rows[1][1] = cos;
        matrix.rows[1][3] = sin;
        matrix.rows[3][1] = -sin;
        matrix.rows[3][3] = cos;
        matrix
    }

    /// Boost along the z axis with rapidity `eta`.
    pub fn boost_z(eta: f64) -> Self {
        let mut matrix = LorentzMatrix::identity();
        let (sinh, cosh) = (eta.sinh(), eta.cosh());
        matrix.rows[0][0] = cosh;
        matrix.rows[0][3] = sinh;
        matrix.rows[3][0] = sinh;
        matrix.rows[3][3] = cosh;
        matrix
    }

    /// Matrix product `self * other` (apply `other` first).
    pub fn mul(&self, other: &LorentzMatrix) -> Self {
        let mut rows = [[0.0; 4]; 4];
        for row in 0..4 {
            for column in 0..4 {
                let mut value = 0.0;
                for inner in 0..4 {
                    value += self.rows[row][inner] * other.rows[inner][column];
                }
                rows[row][column] = value;
            }
        }
        LorentzMatrix { rows }
    }

    /// Applies the transformation to a four-vector.
    pub fn apply(&self, vector: &FourVector) -> FourVector {
        let components = [vector.e, vector.x, vector.y, vector.z];
        let mut result = [0.0; 4];
        for (position, row) in self.rows.iter().enumerate() {
            result[position] = row
                .iter()
                .zip(components.iter())
                .map(|(entry, component)| entry * component)
                .sum();
        }
        FourVector::new(result[0], result[1], result[2], result[3])
    }

    /// Inverse via the metric, `g * transpose * g`, exact for any Lorentz
    /// transformation without numeric matrix inversion.
    pub fn lorentz_inverse(&self) -> Self {
        let mut rows = [[0.0; 4]; 4];
        for row in 0..4 {
            for column in 0..4 {
                let sign = if (row == 0) == (column == 0) { 1.0 } else { -1.0 };
                rows[row][column] = sign * self.rows[column][row];
            }
        }
        LorentzMatrix { rows }
    }

    /// Reads the angle of a pure rotation about y from the x-z block.
    pub fn rotation_angle_y(&self) -> f64 {
        self.rows[1][3].atan2(self.rows[1][1])
    }
}

/// Transformation from the current frame into the helicity frame of the
/// state with four-momentum `momentum`: rotate its direction onto +z, then
/// boost to its rest frame. Momenta at rest yield the identity.
pub fn helicity_transform(momentum: &FourVector) -> LorentzMatrix {
    let magnitude = momentum.momentum();
    if magnitude == 0.0 {
        return LorentzMatrix::identity();
    }
    let theta = momentum.x.atan2(momentum.z);
    let rapidity = (magnitude / momentum.e).atanh();
    LorentzMatrix::boost_z(-rapidity).mul(&LorentzMatrix::rot_y(-theta))
}
