//! Amplitude-model assembly for three-body cascade decays.
//!
//! Consumes the declarative model document (kinematics, reference topology,
//! weighted decay chains with recoupling vertices and resonance propagators)
//! and produces a computable transition amplitude with unpolarized and
//! polarized intensities, plus a checksum validation harness. Everything is
//! a pure transform of the immutable [`doc::ModelDefinition`].

pub mod alignment;
pub mod chain;
pub mod doc;
pub mod frames;
pub mod model;
pub mod recoupling;
pub mod validate;

pub use alignment::{plan, spectator_of, wigner_rotation_angle, Alignment, AlignmentEntry};
pub use chain::{ChainAmplitude, HelicityConfiguration};
pub use doc::{
    load_model, ChainDefinition, ChecksumDoc, FunctionDoc, ModelDefinition, ModelDocument,
    PropagatorDefinition, VertexDefinition,
};
pub use model::{assemble_model, AmplitudeModel, PolarizationMatrix};
pub use recoupling::{Recoupling, VertexSpins};
pub use validate::{validate, CheckReport, ValidationConfig};
