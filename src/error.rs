//! Error types for document resolution.
//!
//! Soft outcomes (no premods, no proposition link, no pattern match) are never
//! errors. Only malformed input, missing parameters, broken references and
//! capacity violations surface here.

use thiserror::Error;

/// Errors that can occur while loading resources or resolving a document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolutionError {
    /// Malformed configuration, pattern or document structure.
    #[error("unexpected input: {message}")]
    UnexpectedInput { message: String },

    /// A parameter required by the enabled passes is absent.
    #[error("missing required parameter `{name}`")]
    MissingParameter { name: String },

    /// A designed limit was exceeded or a reference does not resolve.
    #[error("internal inconsistency: {message}")]
    InternalInconsistency { message: String },

    /// A configuration, pattern or model file could not be read or parsed.
    #[error("failed to load {path}: {message}")]
    Load { path: String, message: String },
}

impl ResolutionError {
    #[must_use]
    pub fn unexpected_input(message: impl Into<String>) -> Self {
        ResolutionError::UnexpectedInput {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        ResolutionError::MissingParameter { name: name.into() }
    }

    #[must_use]
    pub fn inconsistency(message: impl Into<String>) -> Self {
        ResolutionError::InternalInconsistency {
            message: message.into(),
        }
    }

    /// Capacity overflow for a bounded collection.
    #[must_use]
    pub fn capacity(what: &str, limit: usize) -> Self {
        ResolutionError::InternalInconsistency {
            message: format!("{} exceeds the limit of {}", what, limit),
        }
    }

    #[must_use]
    pub fn load(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        ResolutionError::Load {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// True for capacity and reference failures.
    pub fn is_inconsistency(&self) -> bool {
        matches!(self, ResolutionError::InternalInconsistency { .. })
    }
}

/// Result type for resolution operations.
pub type ResolutionResult<T> = Result<T, ResolutionError>;
