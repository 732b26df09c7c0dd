//! Structured error types shared across the amp crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`AmpError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (chain index, node identifier, type string, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller fix the source document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the amplitude-model engine.
///
/// Variants follow the fault taxonomy of the engine: structural faults fail at
/// load time, dispatch faults at assembly time, numeric integrity faults at
/// evaluation time. Validation mismatches are not errors; the harness reports
/// them per checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum AmpError {
    /// Malformed decay-topology descriptions.
    #[error("topology error: {0}")]
    Topology(ErrorInfo),
    /// Kinematics-table structural errors.
    #[error("kinematics error: {0}")]
    Kinematics(ErrorInfo),
    /// Unknown vertex recoupling types.
    #[error("recoupling error: {0}")]
    Recoupling(ErrorInfo),
    /// Unsupported or malformed lineshape definitions.
    #[error("lineshape error: {0}")]
    Lineshape(ErrorInfo),
    /// Non-real or non-finite intensity results.
    #[error("intensity error: {0}")]
    Intensity(ErrorInfo),
    /// Other structural faults in the model document.
    #[error("document error: {0}")]
    Document(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl AmpError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            AmpError::Topology(info)
            | AmpError::Kinematics(info)
            | AmpError::Recoupling(info)
            | AmpError::Lineshape(info)
            | AmpError::Intensity(info)
            | AmpError::Document(info) => info,
        }
    }
}
