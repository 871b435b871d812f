use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use tokio::time::Instant;

/// Logical resource plus the serialized parameters that select it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: &'static str,
    pub params: String,
}

impl QueryKey {
    pub const JOBS: &'static str = "jobs";
    pub const JOB: &'static str = "job";
    pub const CANDIDATES: &'static str = "candidates";
    pub const CANDIDATE_TIMELINE: &'static str = "candidate-timeline";
    pub const ASSESSMENT: &'static str = "assessment";

    pub fn new(resource: &'static str, params: impl Into<String>) -> Self {
        Self {
            resource,
            params: params.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: JsonValue,
    stored_at: Instant,
}

/// Cached JSON snapshots of earlier reads. Entries younger than the stale
/// time are served without a request.
#[derive(Debug, Clone)]
pub struct QueryCache {
    stale_time: Duration,
    entries: Arc<Mutex<HashMap<QueryKey, Entry>>>,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            stale_time,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_fresh<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.lock();
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() >= self.stale_time {
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    pub fn set<T: Serialize>(&self, key: QueryKey, value: &T) {
        let Ok(value) = serde_json::to_value(value) else {
            return;
        };
        self.lock().insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock().contains_key(key)
    }

    pub fn invalidate(&self, key: &QueryKey) {
        self.lock().remove(key);
    }

    /// Drops every entry of a resource, whatever its parameters.
    pub fn invalidate_resource(&self, resource: &str) {
        self.lock().retain(|key, _| key.resource != resource);
    }

    /// Copies of every entry of a resource, for later [`QueryCache::restore`].
    pub fn snapshot(&self, resource: &str) -> Vec<(QueryKey, JsonValue)> {
        self.lock()
            .iter()
            .filter(|(key, _)| key.resource == resource)
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    pub fn restore(&self, snapshot: Vec<(QueryKey, JsonValue)>) {
        let mut entries = self.lock();
        for (key, value) in snapshot {
            entries.insert(
                key,
                Entry {
                    value,
                    stored_at: Instant::now(),
                },
            );
        }
    }

    /// Rewrites every cached value of a resource in place. Freshness is kept.
    pub fn update_resource<F>(&self, resource: &str, mut apply: F)
    where
        F: FnMut(&mut JsonValue),
    {
        for (key, entry) in self.lock().iter_mut() {
            if key.resource == resource {
                apply(&mut entry.value);
            }
        }
    }
}
