//! Refresh decision for one (entity, category) pair.
//!
//! [`decide`] is a pure function of the loaded record, the candidate
//! fingerprint, the category TTL and the current time. [`StalenessCache`]
//! wraps it with the store reads and writes, failing open on store errors.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::{CacheRecord, Digest, DocumentStore};
use crate::{Category, CategoryTtls, Error};

/// Result of loading a cache record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Found(CacheRecord),
    Absent,
    /// The backing store could not be read.
    Unavailable,
}

/// Which rule decided the outcome. Only `Fresh` skips the refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    StoreUnavailable,
    FirstFetch,
    FingerprintFailed,
    ContentChanged,
    Expired,
    Fresh,
}

impl Decision {
    pub fn should_refresh(self) -> bool {
        !matches!(self, Decision::Fresh)
    }
}

/// Decide whether a category must be refreshed.
///
/// Rules apply in order: unreadable store, no record, failed fingerprint,
/// changed fingerprint, elapsed TTL. A changed fingerprint wins regardless of
/// the TTL; the TTL only forces re-verification of unchanged content.
pub fn decide(lookup: &CacheLookup, candidate: &Digest, ttl: Duration, now: DateTime<Utc>) -> Decision {
    let record = match lookup {
        CacheLookup::Unavailable => return Decision::StoreUnavailable,
        CacheLookup::Absent => return Decision::FirstFetch,
        CacheLookup::Found(record) => record,
    };

    if candidate.is_failed() {
        return Decision::FingerprintFailed;
    }

    if record.fingerprint != *candidate {
        return Decision::ContentChanged;
    }

    if now - record.last_update > ttl {
        return Decision::Expired;
    }

    Decision::Fresh
}

/// Store-backed staleness cache.
///
/// Holds no state of its own; every call reads or writes the store.
pub struct StalenessCache<'a> {
    store: &'a dyn DocumentStore,
    ttls: &'a CategoryTtls,
}

impl<'a> StalenessCache<'a> {
    pub fn new(store: &'a dyn DocumentStore, ttls: &'a CategoryTtls) -> Self {
        Self { store, ttls }
    }

    /// Load the record for a pair, mapping store errors to `Unavailable`.
    pub async fn lookup(&self, entity: &str, category: Category) -> CacheLookup {
        match self.store.get_cache_record(entity, category).await {
            Ok(Some(record)) => CacheLookup::Found(record),
            Ok(None) => CacheLookup::Absent,
            Err(e) => {
                tracing::warn!(%entity, %category, error = %e, "cache record unreadable, refreshing");
                CacheLookup::Unavailable
            }
        }
    }

    /// Load the record and decide.
    pub async fn check(&self, entity: &str, category: Category, candidate: &Digest, now: DateTime<Utc>) -> Decision {
        let lookup = self.lookup(entity, category).await;
        let decision = decide(&lookup, candidate, self.ttls.ttl(category), now);

        if decision.should_refresh() {
            tracing::debug!(%entity, %category, ?decision, "refresh required");
        } else {
            tracing::info!(%entity, %category, "cache hit");
        }

        decision
    }

    pub async fn should_refresh(&self, entity: &str, category: Category, candidate: &Digest, now: DateTime<Utc>) -> bool {
        self.check(entity, category, candidate, now).await.should_refresh()
    }

    /// Overwrite the record after a successful fetch and extraction.
    ///
    /// Must never be called after a failed attempt.
    pub async fn record_refresh(
        &self, entity: &str, category: Category, fingerprint: &Digest, timestamp: DateTime<Utc>,
    ) -> Result<(), Error> {
        self.store
            .put_cache_record(entity, category, fingerprint, timestamp)
            .await?;
        tracing::info!(%entity, %category, %fingerprint, "cache record updated");
        Ok(())
    }

    /// Note a verified cache hit without moving `last_update`.
    pub async fn record_hit(&self, entity: &str, category: Category, at: DateTime<Utc>) -> Result<(), Error> {
        self.store.touch_fetch_attempt(entity, category, at).await
    }
}
