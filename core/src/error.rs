//! The core error taxonomy.
//!
//! Every externally invoked operation in this crate returns a
//! `Result<_, CoreError>`. `CoreError::kind()` maps each variant to a
//! nine-entry error taxonomy (`validation_error`, `config_error`, ...)
//! for callers that need to branch on error class rather than match
//! the full enum — useful when forwarding errors onto a
//! `jido.agent.error` signal, which carries `type` as a string.

use thiserror::Error;

/// Errors raised by pure Agent Value operations (`new`, `set`, `validate`,
/// `plan`) and by the runtime layers built on top of them.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid inputs, directives, or types.
    #[error("validation error: {0}")]
    Validation(String),

    /// Referencing an unregistered action or missing module.
    #[error("config error: {0}")]
    Config(String),

    /// Runtime failure inside an action or executor.
    #[error("execution error: {0}")]
    Execution(String),

    /// No route matched a signal's type.
    #[error("routing error: {0}")]
    Routing(String),

    /// The signal queue is at `max_queue_size`.
    #[error("queue overflow: size={queue_size} max={max_size}")]
    QueueOverflow {
        /// Queue length at the time of the rejected enqueue.
        queue_size: usize,
        /// The queue's configured cap.
        max_size: usize,
    },

    /// An illegal state-machine move was attempted.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// The state the server was in.
        from: String,
        /// The state the caller requested.
        to: String,
    },

    /// Unknown agent reference or instance-manager key.
    #[error("not found: {0}")]
    NotFound(String),

    /// Server construction was attempted with a null/missing agent.
    #[error("invalid agent: {0}")]
    InvalidAgent(String),

    /// A lifecycle hook rejected the start.
    #[error("mount failed: {0}")]
    MountFailed(String),

    /// Catch-all for errors surfaced through a foreign boundary
    /// (an action implementation, a storage backend, a dispatch adapter).
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl CoreError {
    /// The taxonomy string for this error, e.g. for a `jido.agent.error` signal's
    /// `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation_error",
            CoreError::Config(_) => "config_error",
            CoreError::Execution(_) => "execution_error",
            CoreError::Routing(_) => "routing_error",
            CoreError::QueueOverflow { .. } => "queue_overflow",
            CoreError::InvalidTransition { .. } => "invalid_transition",
            CoreError::NotFound(_) => "not_found",
            CoreError::InvalidAgent(_) => "invalid_agent",
            CoreError::MountFailed(_) => "mount_failed",
            CoreError::Other(_) => "execution_error",
        }
    }
}
