//! Error types for Project Ember.

use thiserror::Error;

/// Top-level error type for Ember operations.
#[derive(Debug, Error)]
pub enum EmberError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Scene loading errors
    #[error("Scene error: {0}")]
    Scene(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while interpreting a declarative emitter or well config.
///
/// The simulation treats all of these as recoverable: the offending
/// sub-object is skipped with a warning and the rest of the config applies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Zone object is missing a source or has an unknown type
    #[error("invalid zone: {0}")]
    InvalidZone(String),

    /// Shape object could not be interpreted
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// Bounds object is missing required fields
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    /// Expected an object or a field with a different type
    #[error("unexpected value for `{key}`: expected {expected}")]
    UnexpectedType {
        /// Property key
        key: String,
        /// Human readable description of the accepted shapes
        expected: &'static str,
    },
}

/// Result type alias for Ember operations.
pub type EmberResult<T> = Result<T, EmberError>;
