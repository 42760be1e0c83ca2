//! In-process key sources
//!
//! `KeySetSource` implementations for tests that need to count fetches or
//! force a failure without a network round-trip.

use crate::crypto_fixtures::TestKey;
use async_trait::async_trait;
use shared_auth::auth::{JwkSet, JwksError, KeySetSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Serves a fixed key set and counts how often it is asked.
#[derive(Clone)]
pub struct CountingKeySource {
    key_set: JwkSet,
    calls: Arc<AtomicUsize>,
}

impl CountingKeySource {
    pub fn new(keys: &[TestKey]) -> Self {
        let json = crate::crypto_fixtures::jwks_json(keys);
        let key_set = serde_json::from_value(json).expect("fixture JWKS deserializes");
        Self::from_key_set(key_set)
    }

    pub fn from_key_set(key_set: JwkSet) -> Self {
        Self {
            key_set,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `fetch_key_set` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySetSource for CountingKeySource {
    async fn fetch_key_set(&self) -> Result<JwkSet, JwksError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.key_set.clone())
    }
}

/// Always fails with the given upstream status, counting calls.
#[derive(Clone)]
pub struct FailingKeySource {
    status: u16,
    calls: Arc<AtomicUsize>,
}

impl FailingKeySource {
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySetSource for FailingKeySource {
    async fn fetch_key_set(&self) -> Result<JwkSet, JwksError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(JwksError::Status(self.status))
    }
}
