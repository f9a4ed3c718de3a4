use std::sync::Arc;

use reqwest::StatusCode;
use thiserror::Error;

/// Subsystem label threaded through transport calls and connection errors.
pub const USER_PROFILE_SYSTEM: &str = "userProfile";

/// Failures surfaced by the profile client.
///
/// The 4xx-derived variants are expected, user-correctable conditions and
/// report `log_as_info() == true`. `ConnectionProblem` covers every other
/// failed status as well as pure connection failures.
#[derive(Debug, Error)]
pub enum UserProfileError {
    #[error("bad profile request for user {user_id} (request {request_id})")]
    BadRequest { user_id: String, request_id: String },

    #[error("unauthorized profile access for user {user_id} (request {request_id})")]
    Unauthorized { user_id: String, request_id: String },

    #[error("no profile found for user {user_id} (request {request_id})")]
    UserNotFound { user_id: String, request_id: String },

    #[error("problem connecting to the profile API at {url} (request {request_id})")]
    ConnectionProblem {
        user_id: String,
        request_id: String,
        url: String,
        /// Status the server answered with, if it answered at all.
        status: Option<StatusCode>,
    },

    /// Not a fetch failure; re-raised untranslated.
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// A failure shared between coalesced loader callers.
    #[error(transparent)]
    Shared(Arc<UserProfileError>),
}

impl UserProfileError {
    /// Stable machine-readable code for the domain variants.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::BadRequest { .. } => Some("BAD_REQUEST"),
            Self::Unauthorized { .. } => Some("UNAUTHORIZED"),
            Self::UserNotFound { .. } => Some("USER_NOT_FOUND"),
            Self::ConnectionProblem { .. } => Some("CONNECTION_PROBLEM"),
            Self::Other(_) => None,
            Self::Shared(inner) => inner.code(),
        }
    }

    /// HTTP status associated with the error, when one applies.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::BadRequest { .. } => Some(StatusCode::BAD_REQUEST),
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::UserNotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::ConnectionProblem { status, .. } => *status,
            Self::Other(_) => None,
            Self::Shared(inner) => inner.status_code(),
        }
    }

    /// The user id the failed call was about, for the domain variants.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::BadRequest { user_id, .. }
            | Self::Unauthorized { user_id, .. }
            | Self::UserNotFound { user_id, .. }
            | Self::ConnectionProblem { user_id, .. } => Some(user_id),
            Self::Other(_) => None,
            Self::Shared(inner) => inner.user_id(),
        }
    }

    /// Correlation id of the call that failed, for the domain variants.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::BadRequest { request_id, .. }
            | Self::Unauthorized { request_id, .. }
            | Self::UserNotFound { request_id, .. }
            | Self::ConnectionProblem { request_id, .. } => Some(request_id),
            Self::Other(_) => None,
            Self::Shared(inner) => inner.request_id(),
        }
    }

    /// Whether the condition is expected and should be logged at info
    /// severity rather than treated as a hard failure.
    pub fn log_as_info(&self) -> bool {
        match self {
            Self::BadRequest { .. } | Self::Unauthorized { .. } | Self::UserNotFound { .. } => true,
            Self::ConnectionProblem { .. } | Self::Other(_) => false,
            Self::Shared(inner) => inner.log_as_info(),
        }
    }

    /// Unwrap a coalesced failure when this caller is its only owner.
    pub(crate) fn from_shared(error: Arc<UserProfileError>) -> Self {
        Arc::try_unwrap(error).unwrap_or_else(Self::Shared)
    }
}
