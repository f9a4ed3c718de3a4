use std::sync::Arc;

use futures::future::try_join_all;
use reqwest::StatusCode;

use crate::services::api_fetcher::{
    ApiFetcher, FetchError, FetchPayload, FetchRequest, FetchResponse, HttpFetcher,
};

use super::errors::{USER_PROFILE_SYSTEM, UserProfileError};
use super::types::{UserProfile, UserProfileConfig, UserProfileLoaderInput, UserProfileUpdateInput};

/// Client for the remote user profile API.
pub struct UserProfileClient {
    config: UserProfileConfig,
    fetcher: Arc<dyn ApiFetcher>,
}

impl UserProfileClient {
    pub fn new(config: UserProfileConfig) -> Self {
        Self::with_fetcher(config, Arc::new(HttpFetcher::new()))
    }

    /// Build a client over a caller-supplied transport.
    pub fn with_fetcher(config: UserProfileConfig, fetcher: Arc<dyn ApiFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Profile URL for a user, built from the configured endpoint on every
    /// call (the endpoint is never cached separately).
    pub fn generate_user_profile_url(&self, user_id: &str) -> String {
        format!("{}/users/{}/profile", self.config.api_endpoint, user_id)
    }

    /// Fetch one user's profile. Exactly one attempt; no retry.
    pub async fn retrieve_user_profile(
        &self,
        user_id: &str,
        request_id: &str,
    ) -> Result<UserProfile, UserProfileError> {
        let url = self.generate_user_profile_url(user_id);
        let request = FetchRequest {
            url: url.clone(),
            payload: FetchPayload::get_json(),
            system: USER_PROFILE_SYSTEM,
            request_id: request_id.to_string(),
        };

        match self.fetcher.fetch_data(request).await {
            Ok(response) => transform_user_profile_response(&response),
            Err(error) => Err(map_user_profile_error(error, user_id, &url, request_id)),
        }
    }

    /// Update one user's profile and return the server's post-update
    /// representation, not the input echoed back.
    pub async fn update_user_profile(
        &self,
        user_id: &str,
        update: &UserProfileUpdateInput,
        request_id: &str,
    ) -> Result<UserProfile, UserProfileError> {
        let url = self.generate_user_profile_url(user_id);
        let body = serde_json::to_string(update).map_err(anyhow::Error::from)?;
        let request = FetchRequest {
            url: url.clone(),
            payload: FetchPayload::put_json(body),
            system: USER_PROFILE_SYSTEM,
            request_id: request_id.to_string(),
        };

        match self.fetcher.fetch_data(request).await {
            Ok(response) => transform_user_profile_response(&response),
            Err(error) => Err(map_user_profile_error(error, user_id, &url, request_id)),
        }
    }

    /// Fetch every requested profile concurrently and join on all of them.
    ///
    /// The result preserves input order. All-or-nothing: the first failed
    /// retrieval fails the whole batch; in-flight siblings are left to the
    /// transport to wind down.
    pub async fn load_user_profiles(
        &self,
        inputs: &[UserProfileLoaderInput],
    ) -> Result<Vec<UserProfile>, UserProfileError> {
        try_join_all(
            inputs
                .iter()
                .map(|input| self.retrieve_user_profile(&input.user_id, &input.request_id)),
        )
        .await
    }
}

/// Map a successful response body into a [`UserProfile`].
///
/// Missing `userId`/`userName`/`email` are kept as `None`; consumers decide
/// whether that matters. A body that is not JSON at all surfaces as an
/// untranslated error, the same as any other non-fetch failure.
fn transform_user_profile_response(
    response: &FetchResponse,
) -> Result<UserProfile, UserProfileError> {
    response
        .json()
        .map_err(|error| UserProfileError::Other(error.into()))
}

/// Translate a transport failure into the domain taxonomy.
///
/// 400/401/404 become user-correctable profile errors, every other status
/// (or the absence of one) becomes a connection problem. Anything that is
/// not a fetch failure is re-raised unchanged.
fn map_user_profile_error(
    error: FetchError,
    user_id: &str,
    url: &str,
    request_id: &str,
) -> UserProfileError {
    match error {
        FetchError::Status { status, .. } => match status.as_u16() {
            400 => {
                tracing::info!(user_id, request_id, "profile API rejected the request");
                UserProfileError::BadRequest {
                    user_id: user_id.to_string(),
                    request_id: request_id.to_string(),
                }
            }
            401 => {
                tracing::info!(user_id, request_id, "profile API denied access");
                UserProfileError::Unauthorized {
                    user_id: user_id.to_string(),
                    request_id: request_id.to_string(),
                }
            }
            404 => {
                tracing::info!(user_id, request_id, "no profile for user");
                UserProfileError::UserNotFound {
                    user_id: user_id.to_string(),
                    request_id: request_id.to_string(),
                }
            }
            _ => connection_problem(user_id, url, request_id, Some(status)),
        },
        FetchError::Connection { source, .. } => {
            tracing::error!(
                system = USER_PROFILE_SYSTEM,
                url,
                request_id,
                "profile API unreachable: {source}"
            );
            connection_problem(user_id, url, request_id, None)
        }
        FetchError::Other(error) => UserProfileError::Other(error),
    }
}

fn connection_problem(
    user_id: &str,
    url: &str,
    request_id: &str,
    status: Option<StatusCode>,
) -> UserProfileError {
    if let Some(status) = status {
        tracing::error!(
            system = USER_PROFILE_SYSTEM,
            url,
            request_id,
            "profile API answered {status}"
        );
    }
    UserProfileError::ConnectionProblem {
        user_id: user_id.to_string(),
        request_id: request_id.to_string(),
        url: url.to_string(),
        status,
    }
}
