/// Convenience result type used across the engine.
pub type OpticsResult<T> = Result<T, OpticsError>;

/// Request-level failures surfaced to callers as [`crate::RenderResult::Error`].
///
/// Cancellation is not an error: a superseded request travels as [`crate::Aborted`] and ends as
/// [`crate::RenderResult::Cancelled`].
#[derive(thiserror::Error, Debug)]
pub enum OpticsError {
    /// Parameters outside their physically meaningful domain (non-finite, negative radius, ...).
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The source image is missing, empty or could not be decoded.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OpticsError {
    /// Build an [`OpticsError::InvalidParameters`] value.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// Build an [`OpticsError::SourceUnavailable`] value.
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
