//! Decay-topology model for the amp engine.
//!
//! Converts the nested-list boundary encoding into an owned binary tree with
//! cached traversal order, and answers the structural queries the assembly
//! pipeline needs: spanned index sets, order-independent equality, and the
//! outermost-first sequence of two-body splits.

pub mod topology;

pub use topology::{node_key_from_value, DecayNode, NodeKey, Split, Topology};
