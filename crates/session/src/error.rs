//! Session error types.

use thiserror::Error;

/// Errors raised while provisioning or releasing a remote browser session.
///
/// Provisioning failures are fatal to the invocation and are never retried:
/// a half-created session cannot be salvaged.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("provisioning service returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid connection endpoint: {0}")]
    Endpoint(String),
}
