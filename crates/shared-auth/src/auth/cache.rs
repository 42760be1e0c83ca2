//! Cache of converted public keys, keyed by key ID.
//!
//! Owned by a single `JwtValidator`; never process-global, so validators in
//! tests do not share state. The cache never fetches on its own. On a miss
//! the validator fetches, converts, and stores.
//!
//! Lookups take a shared lock and stores an exclusive one. Two requests
//! missing on the same key ID may both fetch and both store; conversion is
//! deterministic, so whichever store lands last is equivalent.
//!
//! # Expiry
//!
//! By default entries live for the life of the process, which means a key
//! the provider has rotated out keeps verifying tokens here until restart.
//! `with_max_age` bounds that window: older entries read as misses and are
//! replaced by the next store.

use crate::auth::keys::PublicKeyMaterial;
use crate::observability::metrics;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct CachedKey {
    key: Arc<PublicKeyMaterial>,
    stored_at: Instant,
}

/// Key ID to converted key map, safe for concurrent use.
#[derive(Default)]
pub struct KeyCache {
    entries: RwLock<HashMap<String, CachedKey>>,
    max_age: Option<Duration>,
}

impl KeyCache {
    /// Create an empty cache whose entries never expire.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache whose entries expire after `max_age`.
    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_age: Some(max_age),
        }
    }

    /// Configured maximum entry age, if any.
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Look up a converted key.
    pub async fn lookup(&self, kid: &str) -> Option<Arc<PublicKeyMaterial>> {
        let entries = self.entries.read().await;

        let hit = entries
            .get(kid)
            .filter(|entry| !self.is_stale(entry))
            .map(|entry| Arc::clone(&entry.key));

        if hit.is_some() {
            tracing::debug!(target: "auth.cache", kid = %kid, "Key cache hit");
            metrics::record_key_cache_lookup("hit");
        } else {
            tracing::debug!(target: "auth.cache", kid = %kid, "Key cache miss");
            metrics::record_key_cache_lookup("miss");
        }

        hit
    }

    /// Store a converted key, replacing any previous entry for `kid`.
    pub async fn store(&self, kid: &str, key: PublicKeyMaterial) -> Arc<PublicKeyMaterial> {
        let key = Arc::new(key);
        let mut entries = self.entries.write().await;
        entries.insert(
            kid.to_string(),
            CachedKey {
                key: Arc::clone(&key),
                stored_at: Instant::now(),
            },
        );
        tracing::debug!(target: "auth.cache", kid = %kid, cached_keys = entries.len(), "Key cached");
        key
    }

    /// Number of stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn is_stale(&self, entry: &CachedKey) -> bool {
        self.max_age
            .is_some_and(|max_age| entry.stored_at.elapsed() >= max_age)
    }
}
