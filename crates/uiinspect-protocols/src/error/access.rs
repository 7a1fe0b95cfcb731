//! Element access errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The handle no longer refers to a live element.
    #[error("Stale element: {0}")]
    Stale(String),

    /// The backend could not answer (target process busy or gone).
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl AccessError {
    pub fn stale(message: impl Into<String>) -> Self {
        Self::Stale(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
