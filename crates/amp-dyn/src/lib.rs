//! Resonance lineshape construction for the amp engine.
//!
//! Provides the built-in Breit-Wigner family, the explicit registry mapping
//! propagator `type` strings to builders, and a content-addressed cache that
//! shares built lineshapes across chains.

pub mod cache;
pub mod lineshape;
pub mod registry;

pub use cache::{function_hash, LineshapeCache};
pub use lineshape::{
    blatt_weisskopf_sq, BreitWigner, BreitWignerDef, ChannelDef, MultichannelBreitWigner,
    MultichannelBreitWignerDef,
};
pub use registry::{BuildContext, LineshapeBuilder, LineshapeFn, LineshapeRegistry};
