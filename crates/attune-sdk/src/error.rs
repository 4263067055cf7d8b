//! Error types for the Attune SDK
//!
//! Three families, per the client core's error design:
//! - validation errors surface inline to the user and leave state
//!   unchanged
//! - transport/decode errors from remote collaborators trigger local
//!   fallback where available, otherwise a retryable error state
//! - state errors mark invalid transitions; they are no-ops on state

use crate::flow::FlowStep;
use attune_api_client::ApiError;
use thiserror::Error;

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// SDK error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Submit or advance attempted without a primary emotion selected
    #[error("no primary emotion selected")]
    MissingPrimary,

    /// Secondary emotion duplicates the primary selection
    #[error("secondary emotion {0} duplicates the primary selection")]
    DuplicateSecondary(i64),

    /// No valid transition from the current flow step
    #[error("no transition available from {0:?}")]
    InvalidTransition(FlowStep),

    /// The flow was cancelled while a submission was in flight
    #[error("submission cancelled")]
    SubmissionCancelled,

    /// A second submission was attempted while one is pending
    #[error("a submission is already in flight")]
    SubmissionInFlight,

    /// Network or non-success response from a remote collaborator
    #[error("network error: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("decode error: {0}")]
    Decode(String),
}

impl CoreError {
    /// Validation errors are surfaced inline and never fatal.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::MissingPrimary | CoreError::DuplicateSecondary(_))
    }

    /// Remote failures that local fallback or an explicit retry can
    /// recover from.
    pub fn is_remote_failure(&self) -> bool {
        matches!(self, CoreError::Transport(_) | CoreError::Decode(_))
    }
}

impl From<ApiError> for CoreError {
    fn from(err: ApiError) -> Self {
        // Decode failures are treated identically to transport failures
        // for fallback purposes, but keep their own variant for logs.
        if err.is_decode() {
            CoreError::Decode(err.to_string())
        } else {
            CoreError::Transport(err.to_string())
        }
    }
}
