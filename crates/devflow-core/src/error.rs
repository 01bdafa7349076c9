//! Error types for DevFlow Core
//!
//! Provides error handling for:
//! - Storage failures (surfaced, never retried)
//! - Session transitions (unknown user, missing session)
//! - Task suggestion requests (in-flight guard, adapter failures)
//! - Configuration loading
//!
//! An id that does not resolve during a mutation is not an error: the action
//! becomes a no-op.

use devflow_model::{PhaseId, ProjectId, UserId};
use devflow_storage::StorageError;

/// Main DevFlow error type
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Persistence failed; the triggering action was not applied
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Login with an id that is on no project team
    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    /// Operation needs a logged-in user
    #[error("no user is logged in")]
    NotLoggedIn,

    /// A suggestion request for this phase is still pending
    #[error("task suggestion already running for {project}/{phase}")]
    SuggestionInFlight {
        /// Project id
        project: ProjectId,
        /// Phase id
        phase: PhaseId,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Check if the error came from the persistence layer
    #[inline]
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Task suggestion adapter failures
///
/// These never reach callers of the suggestion runner; they degrade to an
/// empty suggestion list.
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    /// No API key configured
    #[error("missing API key (set {0})")]
    MissingApiKey(String),

    /// Transport failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status
    #[error("suggestion service returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// Response did not have the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
