//! Configuration Error Types
//!
//! Error handling for configuration resolution and endpoint assembly.
//! Provides specific, actionable error messages for the failure scenarios
//! the assembly pipeline can run into:
//! - Required values that are absent
//! - Present values that fail to parse as their declared type
//! - Values that become mandatory only in the presence of another value
//! - Mutation attempted after an endpoint definition has been sealed
//!
//! All configuration errors are detected eagerly during finalization and
//! propagate synchronously to the caller. None are retried internally:
//! malformed configuration is a startup-time contract violation.

use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Required configuration value is absent
    #[error("Missing required configuration value '{key}': {context}")]
    MissingRequiredValue { key: String, context: String },

    /// Present value fails to parse as its declared type
    #[error("Invalid value '{value}' for configuration key '{key}': expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },

    /// A value that is mandatory only because another value is set
    #[error("Configuration value '{key}' is required when '{dependent_on}' is set")]
    DependentValueMissing { key: String, dependent_on: String },

    /// Mutation attempted after the endpoint definition was sealed
    #[error("Endpoint '{endpoint}' is already sealed; '{operation}' is no longer allowed")]
    AlreadySealed { endpoint: String, operation: String },
}

impl ConfigurationError {
    /// Create a missing required value error
    pub fn missing_required_value<K: Into<String>, C: Into<String>>(key: K, context: C) -> Self {
        Self::MissingRequiredValue {
            key: key.into(),
            context: context.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value<K: Into<String>, V: Into<String>, E: Into<String>>(
        key: K,
        value: V,
        expected: E,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a dependent value missing error
    pub fn dependent_value_missing<K: Into<String>, D: Into<String>>(
        key: K,
        dependent_on: D,
    ) -> Self {
        Self::DependentValueMissing {
            key: key.into(),
            dependent_on: dependent_on.into(),
        }
    }

    /// Create an already sealed error
    pub fn already_sealed<E: Into<String>, O: Into<String>>(endpoint: E, operation: O) -> Self {
        Self::AlreadySealed {
            endpoint: endpoint.into(),
            operation: operation.into(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigurationError>;
