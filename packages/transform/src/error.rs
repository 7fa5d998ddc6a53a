// Transform Errors
//
// Every failure the transform can report for a unit.

use thiserror::Error;

/// Errors raised while transforming one compilation unit.
///
/// There is no retry model: the transform is deterministic, so any error
/// aborts the unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The options could not be resolved (missing or unknown artifact, empty prefix).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The host parser rejected the unit.
    #[error("failed to parse {path}: {}", .messages.join("; "))]
    Parse { path: String, messages: Vec<String> },

    /// The host semantic analysis reported errors.
    #[error("semantic analysis of {path} failed: {}", .messages.join("; "))]
    Semantic { path: String, messages: Vec<String> },

    /// An `@internal` declaration has a shape this transform refuses to mangle.
    #[error("unsupported internal declaration `{name}`: {reason}")]
    Unsupported { name: String, reason: String },

    /// The synthesized forwarding code for a declaration did not parse.
    #[error("could not synthesize forwarding declaration for `{name}`: {}", .messages.join("; "))]
    Synthesis { name: String, messages: Vec<String> },

    /// Type erasure of the rewritten unit failed.
    #[error("failed to strip types from {path}: {}", .messages.join("; "))]
    Emit { path: String, messages: Vec<String> },
}

impl TransformError {
    pub fn unsupported(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type TransformResult<T> = Result<T, TransformError>;
