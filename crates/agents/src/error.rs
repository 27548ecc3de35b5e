use thiserror::Error;

/// Errors from the automation engine collaborator.
///
/// Recoverable run failures never surface here; they land in the
/// trajectory's error list with `success = false`. This type is reserved
/// for faults the engine itself cannot recover from.
#[derive(Debug, Error)]
pub enum AgentRunError {
    /// The engine reported an unrecoverable internal fault.
    #[error("engine fault: {0}")]
    EngineFault(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
