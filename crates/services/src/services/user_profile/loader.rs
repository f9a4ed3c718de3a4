use async_trait::async_trait;
use futures::future::BoxFuture;
use moka::future::Cache;

use super::errors::UserProfileError;
use super::types::{UserProfile, UserProfileUpdateInput};

/// Key identifying one unit of loader work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoaderKey {
    /// A batched profile fetch.
    ProfileBatch {
        user_ids: Vec<String>,
        request_id: String,
    },
    /// A single profile update.
    ProfileUpdate {
        user_id: String,
        update: UserProfileUpdateInput,
        request_id: String,
    },
}

/// Deferred work handed to a loader; yields the profiles it produced.
pub type LoaderWork = BoxFuture<'static, Result<Vec<UserProfile>, UserProfileError>>;

/// An opaque keyed memoizer: runs `work` at most once per distinct key
/// within its own retention window and hands the memoized result to every
/// caller presenting the same key. Batching window and eviction are the
/// implementation's business.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(
        &self,
        key: LoaderKey,
        work: LoaderWork,
    ) -> Result<Vec<UserProfile>, UserProfileError>;
}

/// Default [`Loader`] backed by a moka future cache.
///
/// Concurrent calls presenting the same key coalesce onto one execution of
/// the work. Failures are handed to every coalesced waiter but never
/// cached, so the next call with that key runs the work again.
pub struct MemoLoader {
    cache: Cache<LoaderKey, Vec<UserProfile>>,
}

impl MemoLoader {
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::new(capacity),
        }
    }
}

#[async_trait]
impl Loader for MemoLoader {
    async fn load(
        &self,
        key: LoaderKey,
        work: LoaderWork,
    ) -> Result<Vec<UserProfile>, UserProfileError> {
        self.cache
            .try_get_with(key, work)
            .await
            .map_err(UserProfileError::from_shared)
    }
}
