//! Error types for the demo binary.
//!
//! [`DemoError`] wraps every failure mode of configuration loading and
//! scenario execution so `main` can propagate with `?`.

use sourced_aggregate::{EventError, ValidationError};

use crate::config::ConfigError;

/// Top-level error for the demo binary.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// An aggregate, decoding, or repository operation failed.
    #[error("event error: {source}")]
    Event {
        /// The underlying event error.
        #[from]
        source: EventError,
    },

    /// A change the scenario expected to succeed was rejected.
    #[error("validation error: {source}")]
    Validation {
        /// The underlying validation error.
        #[from]
        source: ValidationError,
    },

    /// A spawned writer task panicked or was cancelled.
    #[error("writer task failed: {message}")]
    Task {
        /// Description of the join failure.
        message: String,
    },
}
