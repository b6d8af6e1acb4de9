/// Domain-level error kinds surfaced to API callers.
///
/// Token and fingerprint failures never get a variant of their own; they are
/// folded into [`CoreError::Unauthorized`] so a caller cannot tell which
/// check rejected them.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
