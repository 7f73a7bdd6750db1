//! Error types for edit sessions and their collaborators.

use crate::validation::InvalidTimetable;

/// Result type for edit-session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Failure at the scoring or persistence boundary.
///
/// Always recoverable: the session keeps its state and shows
/// [`CollaboratorError::user_message`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{operation} timed out after {after_ms} ms")]
    Timeout {
        operation: &'static str,
        after_ms: u64,
    },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Quality score {0} is outside 0..=100")]
    InvalidScore(f64),
}

impl CollaboratorError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CollaboratorError::Timeout { .. } | CollaboratorError::Unavailable(_)
        )
    }

    /// Message suitable for showing to the person editing.
    pub fn user_message(&self) -> String {
        match self {
            CollaboratorError::Timeout { operation, .. } => {
                format!("The {operation} service did not respond in time. Please try again.")
            }
            CollaboratorError::Unavailable(_) => {
                "The service is currently unavailable. Your changes are kept locally.".to_string()
            }
            CollaboratorError::Rejected(reason) => format!("The request was rejected: {reason}"),
            CollaboratorError::InvalidScore(_) => {
                "The quality service returned an invalid score.".to_string()
            }
        }
    }
}

/// Edit-session error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Reset discards all changes and must be confirmed")]
    ResetNotConfirmed,

    #[error("Cannot save while {errors} blocking conflict(s) remain")]
    SaveBlocked { errors: usize },

    #[error("A save is already in progress")]
    SaveInFlight,

    #[error("No save is in progress for this ticket")]
    NoSaveInFlight,

    #[error(transparent)]
    Invalid(#[from] InvalidTimetable),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
