//! Wigner-rotation alignment between decay topologies.
//!
//! Every chain quantizes helicities in its own cascade of helicity frames.
//! When a chain's topology equals the reference topology the bases coincide
//! and no extra work is needed. Otherwise each spinning particle picks up a
//! Wigner rotation between the two helicity frames, computed here by
//! composing the explicit closed-form Lorentz transforms of one fixed planar
//! momentum configuration. No iterative solving is involved.

use serde::{Deserialize, Serialize};

use amp_core::errors::{AmpError, ErrorInfo};
use amp_core::kin::{cyclic_pair, kallen, DalitzPoint, Kinematics};
use amp_topo::Topology;

use crate::frames::{helicity_transform, FourVector, LorentzMatrix};

fn alignment_error(info: ErrorInfo) -> AmpError {
    AmpError::Kinematics(info)
}

/// One spinning particle needing an alignment rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentEntry {
    pub particle: u32,
    pub two_j: i32,
}

/// Alignment of one chain relative to the reference topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Alignment {
    /// Chain and reference topologies are structurally equal.
    Identity,
    /// One Wigner-d sum per spinning particle.
    Rotate {
        chain_spectator: u32,
        reference_spectator: u32,
        entries: Vec<AlignmentEntry>,
    },
}

/// Spectator of a three-body topology: the lone leaf at the root split.
pub fn spectator_of(topology: &Topology) -> Result<u32, AmpError> {
    let root = &topology.internal_nodes()[0];
    let lone = if root.first.len() == 1 {
        &root.first
    } else if root.second.len() == 1 {
        &root.second
    } else {
        return Err(alignment_error(
            ErrorInfo::new(
                "no-spectator",
                "three-body root split must isolate one final-state particle",
            )
            .with_context("node", root.key.to_string()),
        ));
    };
    Ok(lone.indices()[0])
}

/// Plans the alignment of a chain against the reference topology.
pub fn plan(
    chain: &Topology,
    reference: &Topology,
    kinematics: &Kinematics,
) -> Result<Alignment, AmpError> {
    if chain.structural_eq(reference) {
        return Ok(Alignment::Identity);
    }
    let chain_spectator = spectator_of(chain)?;
    let reference_spectator = spectator_of(reference)?;
    let mut entries = Vec::new();
    for particle in 0..=kinematics.final_count() as u32 {
        let two_j = kinematics.particle(particle)?.spin.doubled();
        if two_j > 0 {
            entries.push(AlignmentEntry { particle, two_j });
        }
    }
    Ok(Alignment::Rotate {
        chain_spectator,
        reference_spectator,
        entries,
    })
}

/// Explicit planar four-momenta of the decay at a Dalitz point, in the
/// parent rest frame, indexed by particle (0 is the parent at rest).
///
/// The configuration is oriented on the chain of `orientation_spectator`:
/// that spectator flies along -z, its pair along +z, and the decay plane is
/// the x-z plane with the first cyclic partner at non-negative x.
pub fn planar_momenta(
    kinematics: &Kinematics,
    point: &DalitzPoint,
    orientation_spectator: u32,
) -> Result<[FourVector; 4], AmpError> {
    let parent_mass = kinematics.initial().mass;
    let parent_mass_sq = parent_mass * parent_mass;
    let (i, j) = cyclic_pair(orientation_spectator)?;
    let m_i = kinematics.mass(i)?;
    let m_j = kinematics.mass(j)?;
    let m_k = kinematics.mass(orientation_spectator)?;

    let sigma_k = point.sigma(orientation_spectator)?;
    let sigma_i = point.sigma(i)?;
    let sigma_j = point.sigma(j)?;

    let e_k = (parent_mass_sq + m_k * m_k - sigma_k) / (2.0 * parent_mass);
    let e_i = (parent_mass_sq + m_i * m_i - sigma_i) / (2.0 * parent_mass);
    let e_j = (parent_mass_sq + m_j * m_j - sigma_j) / (2.0 * parent_mass);

    let p_k = kallen(parent_mass_sq, sigma_k, m_k * m_k).max(0.0).sqrt() / (2.0 * parent_mass);
    if p_k == 0.0 {
        return Err(alignment_error(
            ErrorInfo::new(
                "degenerate-configuration",
                "spectator at rest, decay plane orientation is undefined",
            )
            .with_context("spectator", orientation_spectator.to_string())
            .with_context("sigma", sigma_k.to_string()),
        ));
    }
    let p_i = kallen(parent_mass_sq, sigma_i, m_i * m_i).max(0.0).sqrt() / (2.0 * parent_mass);

    // sigma_j is the invariant mass squared of the (k, i) pair; solving
    // 2 p_k . p_i = sigma_j - m_k^2 - m_i^2 for the z component of p_i.
    let p_iz = ((sigma_j - m_k * m_k - m_i * m_i) / 2.0 - e_k * e_i) / p_k;
    let p_ix = (p_i * p_i - p_iz * p_iz).max(0.0).sqrt();

    let mut momenta = [FourVector::new(parent_mass, 0.0, 0.0, 0.0); 4];
    momenta[orientation_spectator as usize] = FourVector::new(e_k, 0.0, 0.0, -p_k);
    momenta[i as usize] = FourVector::new(e_i, p_ix, 0.0, p_iz);
    momenta[j as usize] = FourVector::new(e_j, -p_ix, 0.0, p_k - p_iz);
    Ok(momenta)
}

/// Transformation from the parent rest frame into the helicity frame of
/// `particle` as reached through the cascade with spectator `spectator`.
fn cascade_transform(
    momenta: &[FourVector; 4],
    particle: u32,
    spectator: u32,
) -> Result<LorentzMatrix, AmpError> {
    let spectator_momentum = momenta[spectator as usize];
    let pair_momentum = FourVector::new(
        momenta[0].e - spectator_momentum.e,
        -spectator_momentum.x,
        -spectator_momentum.y,
        -spectator_momentum.z,
    );
    if particle == 0 {
        // The parent is already at rest; only the frame orientation along
        // the pair's flight direction differs between cascades.
        let theta = pair_momentum.x.atan2(pair_momentum.z);
        return Ok(LorentzMatrix::rot_y(-theta));
    }
    if particle == spectator {
        return Ok(helicity_transform(&spectator_momentum));
    }
    let (i, j) = cyclic_pair(spectator)?;
    if particle != i && particle != j {
        return Err(alignment_error(
            ErrorInfo::new("cascade-member", "particle does not belong to the cascade")
                .with_context("particle", particle.to_string())
                .with_context("spectator", spectator.to_string()),
        ));
    }
    let to_pair = helicity_transform(&pair_momentum);
    let in_pair = to_pair.apply(&momenta[particle as usize]);
    Ok(helicity_transform(&in_pair).mul(&to_pair))
}

/// Wigner rotation angle carrying the helicity basis of `particle` from the
/// cascade with spectator `from_spectator` into the cascade with spectator
/// `to_spectator`, at the given Dalitz point.
///
/// The composed mismatch transform fixes the particle's rest vector and the
/// decay plane, so it is a pure rotation about y; its angle is read off the
/// x-z block directly.
pub fn wigner_rotation_angle(
    kinematics: &Kinematics,
    point: &DalitzPoint,
    particle: u32,
    from_spectator: u32,
    to_spectator: u32,
) -> Result<f64, AmpError> {
    let momenta = planar_momenta(kinematics, point, to_spectator)?;
    let from_transform = cascade_transform(&momenta, particle, from_spectator)?;
    let to_transform = cascade_transform(&momenta, particle, to_spectator)?;
    let mismatch = from_transform.mul(&to_transform.lorentz_inverse());
    Ok(mismatch.rotation_angle_y())
}
