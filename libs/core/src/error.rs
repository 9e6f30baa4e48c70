use thiserror::Error;

/// Errors raised while constructing cards.
///
/// Content problems found in an already assembled card are not errors; they are
/// reported through [`ValidationResult`](crate::ValidationResult) instead.
#[derive(Debug, Error)]
pub enum CardError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("card serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CardError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CardError::InvalidArgument(message.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CardError::InvalidArgument(_))
    }
}

pub type CardResult<T> = Result<T, CardError>;

/// Fails with [`CardError::InvalidArgument`] when `value` is blank.
pub(crate) fn require_non_empty(field: &str, value: &str) -> CardResult<()> {
    if value.trim().is_empty() {
        return Err(CardError::invalid(format!("{field} must not be empty")));
    }
    Ok(())
}
