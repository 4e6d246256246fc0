//! Core error types for Trail
//!
//! All errors are explicit - no silent failures allowed. The only condition
//! handled inside the engine is a not-yet-resolved step ([`TrailError::NotReady`]),
//! which is retried after a batched fetch and never escapes a public call.
//!
//! # Error Code Scheme
//!
//! | Range | Category |
//! |-------|----------|
//! | 10xxx | Provider errors |
//! | 20xxx | Search/validation errors |
//! | 40xxx | Configuration errors |
//! | 50xxx | Internal/Runtime errors |

use crate::types::ids::VertexRef;
use thiserror::Error;

/// Top-level error type for path enumeration
#[derive(Debug, Clone, Error)]
pub enum TrailError {
    /// The provider could not expand or resolve a step
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A filter, prune or post-filter expression failed to evaluate
    #[error("Expression '{expression}' failed: {message}")]
    ValidationExpression { expression: String, message: String },

    /// The provider reported a weight the search cannot order by
    #[error("Invalid edge weight {weight} on edge '{edge}'")]
    InvalidWeight { edge: String, weight: f64 },

    /// Memory or queue growth denied by the resource monitor
    ///
    /// Error codes in range 50xxx.
    #[error("Resource exhausted [{code}]: requested {requested} bytes, {used} of {limit} in use")]
    ResourceExhausted {
        code: u32,
        requested: usize,
        used: usize,
        limit: usize,
    },

    /// A step referenced by a candidate has not been resolved yet
    #[error("Step for vertex '{vertex}' is not resolved yet")]
    NotReady { vertex: VertexRef },
}

impl TrailError {
    /// Numeric code for this error, following the table in the module docs
    pub fn code(&self) -> u32 {
        match self {
            TrailError::Provider(e) => e.code(),
            TrailError::Config(_) => 40001,
            TrailError::ValidationExpression { .. } => 20001,
            TrailError::InvalidWeight { .. } => 20002,
            TrailError::NotReady { .. } => 20003,
            TrailError::ResourceExhausted { code, .. } => *code,
        }
    }

    pub(crate) fn expression(expression: &str, message: impl Into<String>) -> Self {
        TrailError::ValidationExpression {
            expression: expression.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised by a [`Provider`](crate::graph::Provider) implementation
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Vertex not found: {vertex}")]
    VertexNotFound { vertex: VertexRef },

    #[error("I/O error: {message}")]
    Io { message: String },

    /// The provider's remote engines were already released
    #[error("Provider engines destroyed")]
    Destroyed,
}

impl ProviderError {
    pub fn code(&self) -> u32 {
        match self {
            ProviderError::VertexNotFound { .. } => 10001,
            ProviderError::Io { .. } => 10002,
            ProviderError::Destroyed => 10003,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("Missing required parameter: {name}")]
    MissingParameter { name: &'static str },
}

/// Convenience type alias for Trail results
pub type TrailResult<T> = Result<T, TrailError>;
