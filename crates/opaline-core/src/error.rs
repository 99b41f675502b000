//! Error types for the Opaline runtime.

use std::fmt;

/// Errors that can occur in Opaline processors.
///
/// All of these are local and recoverable: a failed state load leaves the
/// previous parameter values intact, and nothing here is ever raised from
/// the audio thread as a panic.
#[derive(Debug)]
pub enum PluginError {
    /// Activation failed (e.g. the host supplied a zero sample rate).
    ActivationError(String),
    /// State serialization/deserialization error.
    StateError(String),
    /// Invalid processor or patch configuration.
    ConfigError(String),
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActivationError(msg) => write!(f, "Activation error: {}", msg),
            Self::StateError(msg) => write!(f, "State error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for PluginError {}

/// Result type for Opaline operations.
pub type PluginResult<T> = Result<T, PluginError>;
