/// Convenience result type used across reviewsync.
pub type ReviewResult<T> = Result<T, ReviewError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Out-of-range seeks and unsupported rates are not errors: they are clamped.
/// An unavailable render surface suppresses rendering instead of failing.
#[derive(thiserror::Error, Debug)]
pub enum ReviewError {
    /// Invalid session or annotation data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Session descriptor or annotation batch could not be fetched within the retry budget.
    #[error("load error after {attempts} attempt(s): {message}")]
    Load {
        /// Attempts made before giving up.
        attempts: u32,
        /// Message of the last failure.
        message: String,
    },

    /// An authoring command was issued while playback was not paused.
    #[error("authoring conflict: {0}")]
    AuthoringConflict(String),

    /// A command that is not valid in the current engine state.
    #[error("state error: {0}")]
    State(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from collaborators or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReviewError {
    /// Build a [`ReviewError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReviewError::Load`] value.
    pub fn load(attempts: u32, msg: impl Into<String>) -> Self {
        Self::Load {
            attempts,
            message: msg.into(),
        }
    }

    /// Build a [`ReviewError::AuthoringConflict`] value.
    pub fn authoring_conflict(msg: impl Into<String>) -> Self {
        Self::AuthoringConflict(msg.into())
    }

    /// Build a [`ReviewError::State`] value.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Build a [`ReviewError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Load failures leave the host in a retryable state; nothing else does.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Load { .. })
    }
}

impl From<serde_json::Error> for ReviewError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
