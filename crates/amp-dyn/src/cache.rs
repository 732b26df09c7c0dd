//! Content-addressed cache for built lineshapes.
//!
//! Chains frequently share a resonance parametrization. The cache keys built
//! lineshapes by a SHA-256 hash of the canonical JSON of `(type, fields)`, so
//! identical definitions share one closure and re-deriving an entry always
//! reproduces the original value.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use amp_core::errors::AmpError;
use amp_core::serde::to_canonical_json_bytes;

use crate::registry::{BuildContext, LineshapeFn, LineshapeRegistry};

/// Structural hash of a lineshape definition.
pub fn function_hash(kind: &str, fields: &Value) -> Result<String, AmpError> {
    let payload = json!({ "type": kind, "fields": fields });
    let bytes = to_canonical_json_bytes(&payload)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Value-level memoization of registry builds within one assembly.
#[derive(Default)]
pub struct LineshapeCache {
    entries: BTreeMap<String, LineshapeFn>,
}

impl std::fmt::Debug for LineshapeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineshapeCache")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LineshapeCache {
    pub fn new() -> Self {
        LineshapeCache {
            entries: BTreeMap::new(),
        }
    }

    /// Number of distinct definitions built so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached lineshape for the definition, building it once.
    pub fn get_or_build(
        &mut self,
        registry: &LineshapeRegistry,
        kind: &str,
        ctx: &BuildContext<'_>,
    ) -> Result<LineshapeFn, AmpError> {
        let key = function_hash(kind, ctx.fields)?;
        if let Some(existing) = self.entries.get(&key) {
            return Ok(existing.clone());
        }
        let built = registry.build(kind, ctx)?;
        self.entries.insert(key, built.clone());
        Ok(built)
    }
}
