/// Profile Cache - in-memory TTL cache with coalesced loading
use crate::{
    metrics,
    profile::{CachedProfile, GameProfile},
};
use chrono::{DateTime, Duration, Utc};
use moka::future::Cache;
use std::{future::Future, sync::Arc};
use tracing::debug;

/// Upper bound on distinct names kept at once
const MAX_CACHED_PROFILES: u64 = 10_000;

/// Source of the current time for expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Looked-up profile cache keyed by player name
///
/// Entries expire `ttl` after insertion. Expired entries are evicted by the
/// underlying moka cache and, when read before eviction, reloaded. At most
/// one load per name is in flight at a time.
#[derive(Clone)]
pub struct ProfileCache {
    entries: Cache<String, CachedProfile>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ProfileCache {
    /// Create a new cache using the system clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a new cache with a custom clock
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let entries = Cache::builder()
            .max_capacity(MAX_CACHED_PROFILES)
            .time_to_live(ttl.to_std().unwrap_or_default())
            .build();

        Self {
            entries,
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_live(&self, entry: &CachedProfile) -> bool {
        self.clock.now() - entry.inserted_at < self.ttl
    }

    /// Get a live cached entry without loading
    pub async fn get(&self, name: &str) -> Option<CachedProfile> {
        self.entries
            .get(name)
            .await
            .filter(|entry| self.is_live(entry))
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, entry)| self.is_live(entry))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the cached entry for `name`, or load it
    ///
    /// On a miss or an expired entry the loader runs once; concurrent callers
    /// for the same name wait for its result.
    pub async fn get_or_load<F, Fut>(&self, name: &str, load: F) -> CachedProfile
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<GameProfile>>,
    {
        if let Some(entry) = self.get(name).await {
            debug!("Profile cache HIT: {}", entry.name);
            metrics::record_cache_access("hit");
            return entry;
        }

        let init = async {
            debug!("Profile cache MISS: {}", name);
            CachedProfile {
                name: name.to_string(),
                profile: load().await,
                inserted_at: self.clock.now(),
            }
        };

        let entry = self
            .entries
            .entry_by_ref(name)
            .or_insert_with_if(init, |current| !self.is_live(current))
            .await;

        if entry.is_fresh() {
            metrics::record_cache_access("miss");
        } else {
            debug!("Profile cache JOIN: {}", name);
            metrics::record_cache_access("coalesced");
        }

        entry.into_value()
    }
}
