use std::sync::Arc;

use super::client::UserProfileClient;
use super::errors::UserProfileError;
use super::loader::{Loader, LoaderKey, MemoLoader};
use super::types::{UserProfile, UserProfileConfig, UserProfileLoaderInput, UserProfileUpdateInput};

/// Per-request correlation id plus the loader capability owned by the
/// caller. Lifecycle of the loader (and therefore its dedup window) is the
/// caller's business; one context per inbound request is the usual shape.
#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub loader: Arc<dyn Loader>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, loader: Arc<dyn Loader>) -> Self {
        Self {
            request_id: request_id.into(),
            loader,
        }
    }

    /// Context with the default memoizing loader.
    pub fn with_memo_loader(request_id: impl Into<String>, capacity: u64) -> Self {
        Self::new(request_id, Arc::new(MemoLoader::new(capacity)))
    }
}

/// Batch-aware entry points over [`UserProfileClient`].
pub struct UserProfileService {
    pub client: Arc<UserProfileClient>,
}

impl UserProfileService {
    pub fn new(config: UserProfileConfig) -> Self {
        Self {
            client: Arc::new(UserProfileClient::new(config)),
        }
    }

    pub fn with_client(client: Arc<UserProfileClient>) -> Self {
        Self { client }
    }

    /// Fetch a group of profiles through the context's loader, keyed by the
    /// requested ids and the request id. The loader decides whether the
    /// batch actually runs or a memoized result is handed back.
    pub async fn fetch_user_profiles_from_loader(
        &self,
        user_ids: Vec<String>,
        context: &RequestContext,
    ) -> Result<Vec<UserProfile>, UserProfileError> {
        let key = LoaderKey::ProfileBatch {
            user_ids: user_ids.clone(),
            request_id: context.request_id.clone(),
        };

        let client = self.client.clone();
        let request_id = context.request_id.clone();
        let work = Box::pin(async move {
            let inputs: Vec<UserProfileLoaderInput> = user_ids
                .into_iter()
                .map(|user_id| UserProfileLoaderInput {
                    user_id,
                    request_id: request_id.clone(),
                })
                .collect();
            client.load_user_profiles(&inputs).await
        });

        context.loader.load(key, work).await
    }

    /// Update one profile through the context's loader, keyed by the user
    /// id, the update payload and the request id, so identical concurrent
    /// updates coalesce per the loader's policy.
    pub async fn update_user_profiles(
        &self,
        user_id: &str,
        update: UserProfileUpdateInput,
        context: &RequestContext,
    ) -> Result<UserProfile, UserProfileError> {
        let key = LoaderKey::ProfileUpdate {
            user_id: user_id.to_string(),
            update: update.clone(),
            request_id: context.request_id.clone(),
        };

        let client = self.client.clone();
        let request_id = context.request_id.clone();
        let update_user_id = user_id.to_string();
        let work = Box::pin(async move {
            client
                .update_user_profile(&update_user_id, &update, &request_id)
                .await
                .map(|profile| vec![profile])
        });

        let mut profiles = context.loader.load(key, work).await?;
        profiles.pop().ok_or_else(|| {
            UserProfileError::Other(anyhow::anyhow!(
                "loader returned no profile for update of user {user_id}"
            ))
        })
    }
}
