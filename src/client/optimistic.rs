use async_trait::async_trait;
use tracing::warn;

use super::cache::QueryCache;
use super::error::ApiError;

/// A write whose effect is shown in the cache before the server confirms it.
#[async_trait]
pub trait OptimisticMutation: Send + Sync {
    /// Whatever `revert_locally` needs to undo `apply_locally`.
    type Snapshot: Send;
    type Output: Send;

    fn apply_locally(&self, cache: &QueryCache) -> Self::Snapshot;
    fn revert_locally(&self, cache: &QueryCache, snapshot: Self::Snapshot);
    async fn remote_call(&self) -> Result<Self::Output, ApiError>;
}

/// Applies the mutation locally, then awaits the server. On failure the
/// cache goes back to the captured snapshot and the error is returned.
pub async fn run_optimistic<M>(cache: &QueryCache, mutation: &M) -> Result<M::Output, ApiError>
where
    M: OptimisticMutation,
{
    let snapshot = mutation.apply_locally(cache);
    match mutation.remote_call().await {
        Ok(output) => Ok(output),
        Err(err) => {
            warn!(code = err.code(), "Optimistic update rejected, reverting");
            mutation.revert_locally(cache, snapshot);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::cache::QueryKey;
    use serde_json::{json, Value as JsonValue};
    use std::time::Duration;

    struct SetFlag {
        fail: bool,
    }

    #[async_trait]
    impl OptimisticMutation for SetFlag {
        type Snapshot = Vec<(QueryKey, JsonValue)>;
        type Output = ();

        fn apply_locally(&self, cache: &QueryCache) -> Self::Snapshot {
            let snapshot = cache.snapshot("flag");
            cache.update_resource("flag", |value| *value = json!(true));
            snapshot
        }

        fn revert_locally(&self, cache: &QueryCache, snapshot: Self::Snapshot) {
            cache.restore(snapshot);
        }

        async fn remote_call(&self) -> Result<(), ApiError> {
            if self.fail {
                Err(ApiError::SimulatedFailure {
                    message: "Random failure".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn success_keeps_the_local_change() {
        let cache = QueryCache::new(Duration::from_secs(10));
        let key = QueryKey::new("flag", "");
        cache.set(key.clone(), &false);

        run_optimistic(&cache, &SetFlag { fail: false }).await.unwrap();
        assert_eq!(cache.get_fresh::<bool>(&key), Some(true));
    }

    #[tokio::test]
    async fn failure_reverts_to_the_snapshot() {
        let cache = QueryCache::new(Duration::from_secs(10));
        let key = QueryKey::new("flag", "");
        cache.set(key.clone(), &false);

        let result = run_optimistic(&cache, &SetFlag { fail: true }).await;
        assert!(matches!(result, Err(ApiError::SimulatedFailure { .. })));
        assert_eq!(cache.get_fresh::<bool>(&key), Some(false));
    }
}
