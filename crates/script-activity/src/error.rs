//! Error types for the script activity

use script_engine::EvalError;
use thiserror::Error;

/// Result type alias for invocation outcomes
pub type Result<T> = std::result::Result<T, ActivityError>;

/// Failures an invocation reports to the host.
///
/// Every variant renders to the single human-readable message the host
/// receives; full detail is logged at the point of catch before the
/// reduction.
#[derive(Debug, Error)]
pub enum ActivityError {
    /// The configured engine name does not resolve; nothing was evaluated
    #[error("Unable to find script engine")]
    EngineNotFound,

    /// The caller supplied data for a port that was never declared
    #[error("Unexpected data for port {0}")]
    UnexpectedData(String),

    /// Engine-level failure during evaluation, verbatim message with an
    /// optional source line
    #[error(transparent)]
    Evaluation(#[from] EvalError),

    /// Reference-service failure while rendering inputs or registering
    /// outputs; deliberately generic, naming only the activity instance
    #[error("Error accessing input/output data for {0}")]
    DataAccess(String),
}

/// Failures raised while configuring an activity, before any invocation.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A declared data port uses one of the reserved stream tokens
    #[error("'{0}' is a reserved port name")]
    ReservedPortName(String),

    /// The serialized configuration could not be deserialized
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] serde_json::Error),
}
