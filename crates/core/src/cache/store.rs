//! Persistence boundary used by the staleness cache and the pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CacheDb, CacheRecord, Digest, EntitySnapshot, EntityUpdate};
use crate::{Category, Error};

/// Document store holding cache records and entity documents.
///
/// Implemented by [`CacheDb`]; the trait exists so pipeline code can run
/// against test doubles that fail on demand.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_cache_record(&self, entity: &str, category: Category) -> Result<Option<CacheRecord>, Error>;

    async fn put_cache_record(
        &self, entity: &str, category: Category, fingerprint: &Digest, last_update: DateTime<Utc>,
    ) -> Result<(), Error>;

    async fn touch_fetch_attempt(&self, entity: &str, category: Category, at: DateTime<Utc>) -> Result<(), Error>;

    async fn get_entity_snapshot(&self, entity: &str) -> Result<Option<EntitySnapshot>, Error>;

    async fn merge_entity_fields(&self, update: &EntityUpdate) -> Result<(), Error>;
}

#[async_trait]
impl DocumentStore for CacheDb {
    async fn get_cache_record(&self, entity: &str, category: Category) -> Result<Option<CacheRecord>, Error> {
        CacheDb::get_cache_record(self, entity, category).await
    }

    async fn put_cache_record(
        &self, entity: &str, category: Category, fingerprint: &Digest, last_update: DateTime<Utc>,
    ) -> Result<(), Error> {
        CacheDb::put_cache_record(self, entity, category, fingerprint, last_update).await
    }

    async fn touch_fetch_attempt(&self, entity: &str, category: Category, at: DateTime<Utc>) -> Result<(), Error> {
        CacheDb::touch_fetch_attempt(self, entity, category, at).await
    }

    async fn get_entity_snapshot(&self, entity: &str) -> Result<Option<EntitySnapshot>, Error> {
        CacheDb::get_entity_snapshot(self, entity).await
    }

    async fn merge_entity_fields(&self, update: &EntityUpdate) -> Result<(), Error> {
        CacheDb::merge_entity_fields(self, update).await
    }
}
