//! Foundation crate for the amp decay-amplitude engine.
//!
//! Provides the shared error surface, exact half-integer spin arithmetic,
//! Wigner/Clebsch-Gordan angular functions, the particle kinematics registry
//! with three-body Dalitz invariants, and canonical-JSON helpers for
//! structural hashing. Everything here is a pure value or a pure function;
//! nothing holds external resources.

pub mod angular;
pub mod errors;
pub mod kin;
pub mod serde;
pub mod spin;

pub use angular::{clebsch_gordan, wigner_small_d};
pub use errors::{AmpError, ErrorInfo};
pub use kin::{breakup_momentum_sq, cyclic_pair, kallen, DalitzPoint, Kinematics, Particle};
pub use spin::{parse_half_integer, Spin};
