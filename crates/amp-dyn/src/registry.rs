//! Explicit lineshape registry.
//!
//! Dispatch from the propagator `type` string to a builder is a plain map
//! value passed into model assembly; there is no ambient global registry.
//! Callers extend the built-in set with [`LineshapeRegistry::register`]
//! before assembling a model.

use std::collections::BTreeMap;
use std::sync::Arc;

use num_complex::Complex64;
use serde::de::DeserializeOwned;
use serde_json::Value;

use amp_core::errors::{AmpError, ErrorInfo};

use crate::lineshape::{BreitWigner, MultichannelBreitWigner};

/// A built lineshape: a pure function of the invariant mass squared.
pub type LineshapeFn = Arc<dyn Fn(f64) -> Complex64 + Send + Sync>;

/// Everything a builder may inspect while constructing a lineshape.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// Name of the parametrization in the model's function table.
    pub function_name: &'a str,
    /// Raw parameter fields of the named function definition.
    pub fields: &'a Value,
}

impl BuildContext<'_> {
    /// Decodes the parameter fields into a typed definition.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, AmpError> {
        serde_json::from_value(self.fields.clone()).map_err(|err| {
            AmpError::Lineshape(
                ErrorInfo::new("lineshape-fields", "malformed lineshape parameter fields")
                    .with_context("function", self.function_name.to_string())
                    .with_hint(err.to_string()),
            )
        })
    }
}

/// Constructs a lineshape from a typed parameter set.
pub trait LineshapeBuilder: Send + Sync {
    fn build(&self, ctx: &BuildContext<'_>) -> Result<LineshapeFn, AmpError>;
}

impl<F> LineshapeBuilder for F
where
    F: Fn(&BuildContext<'_>) -> Result<LineshapeFn, AmpError> + Send + Sync,
{
    fn build(&self, ctx: &BuildContext<'_>) -> Result<LineshapeFn, AmpError> {
        self(ctx)
    }
}

/// Map from the propagator `type` string to its builder.
#[derive(Clone, Default)]
pub struct LineshapeRegistry {
    builders: BTreeMap<String, Arc<dyn LineshapeBuilder>>,
}

impl LineshapeRegistry {
    /// An empty registry with no builders at all.
    pub fn empty() -> Self {
        LineshapeRegistry {
            builders: BTreeMap::new(),
        }
    }

    /// The registry preloaded with the built-in lineshapes.
    pub fn with_builtins() -> Self {
        let mut registry = LineshapeRegistry::empty();
        registry.register("BreitWigner", Arc::new(BreitWigner));
        registry.register("MultichannelBreitWigner", Arc::new(MultichannelBreitWigner));
        registry
    }

    /// Registers (or overrides) a builder for a `type` string.
    pub fn register(&mut self, kind: impl Into<String>, builder: Arc<dyn LineshapeBuilder>) {
        self.builders.insert(kind.into(), builder);
    }

    /// True when a builder is registered for `kind`.
    pub fn contains(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    /// Registered type strings in deterministic order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.builders.keys().map(String::as_str)
    }

    /// Builds a lineshape of the given kind, failing when no builder exists.
    pub fn build(&self, kind: &str, ctx: &BuildContext<'_>) -> Result<LineshapeFn, AmpError> {
        let builder = self.builders.get(kind).ok_or_else(|| {
            AmpError::Lineshape(
                ErrorInfo::new("unsupported-lineshape", "no builder registered for lineshape type")
                    .with_context("type", kind.to_string())
                    .with_context("function", ctx.function_name.to_string())
                    .with_hint("register a custom builder before assembling the model"),
            )
        })?;
        builder.build(ctx)
    }
}

impl std::fmt::Debug for LineshapeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineshapeRegistry")
            .field("kinds", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}
