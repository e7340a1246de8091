// src/error.rs
use std::fmt;

/// Error types for the dx-sim library
#[derive(Debug, Clone, PartialEq)]
pub enum SdeError {
    /// Invalid parameter values (negative rate, negative volatility, ...)
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Malformed input data (empty date sequence, mismatched shapes, ...)
    InvalidInput { context: String, reason: String },

    /// Operation attempted before its precondition holds
    InvalidState { operation: String, reason: String },

    /// Correlated simulation without its shared random numbers or factor
    MissingDependency { dependency: String, context: String },

    /// Lookup of an unknown key in a market environment or registry
    KeyNotFound { kind: String, key: String },
}

impl SdeError {
    pub(crate) fn invalid_input(context: &str, reason: impl Into<String>) -> Self {
        SdeError::InvalidInput {
            context: context.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_state(operation: &str, reason: impl Into<String>) -> Self {
        SdeError::InvalidState {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_dependency(dependency: &str, context: &str) -> Self {
        SdeError::MissingDependency {
            dependency: dependency.to_string(),
            context: context.to_string(),
        }
    }

    pub(crate) fn key_not_found(kind: &str, key: &str) -> Self {
        SdeError::KeyNotFound {
            kind: kind.to_string(),
            key: key.to_string(),
        }
    }
}

impl fmt::Display for SdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdeError::InvalidParameters {
                parameter,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}' = {}: {}",
                    parameter, value, constraint
                )
            }
            SdeError::InvalidInput { context, reason } => {
                write!(f, "Invalid input for {}: {}", context, reason)
            }
            SdeError::InvalidState { operation, reason } => {
                write!(f, "Cannot {} in current state: {}", operation, reason)
            }
            SdeError::MissingDependency {
                dependency,
                context,
            } => {
                write!(f, "Missing dependency '{}' for {}", dependency, context)
            }
            SdeError::KeyNotFound { kind, key } => {
                write!(f, "No {} found for key '{}'", kind, key)
            }
        }
    }
}

impl std::error::Error for SdeError {}

/// Result type alias for dx-sim operations
pub type SdeResult<T> = Result<T, SdeError>;

/// Validation utilities
pub mod validation {
    use super::{SdeError, SdeResult};

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> SdeResult<()> {
        if value <= 0.0 || value.is_nan() {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> SdeResult<()> {
        if value < 0.0 || value.is_nan() {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> SdeResult<()> {
        if !value.is_finite() {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate paths count
    pub fn validate_paths(paths: i64) -> SdeResult<usize> {
        if paths <= 0 {
            Err(SdeError::InvalidParameters {
                parameter: "paths".to_string(),
                value: paths as f64,
                constraint: "must be greater than 0".to_string(),
            })
        } else if paths > 1_000_000_000 {
            Err(SdeError::InvalidParameters {
                parameter: "paths".to_string(),
                value: paths as f64,
                constraint: "exceeds maximum allowed (1 billion)".to_string(),
            })
        } else {
            Ok(paths as usize)
        }
    }
}
