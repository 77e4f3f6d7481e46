//! Cache record operations.
//!
//! One row per (entity, category) holding the last accepted fingerprint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::Digest;
use super::connection::CacheDb;
use crate::{Category, Error};

/// Persisted staleness bookkeeping for one (entity, category) pair.
///
/// A record only exists once a refresh has been accepted, so `fingerprint`
/// is always the digest of the last successfully extracted content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub fingerprint: Digest,
    pub last_update: DateTime<Utc>,
    pub last_fetch_attempt: DateTime<Utc>,
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidRecord(format!("bad timestamp '{value}': {e}")))
}

fn decode_record(fingerprint: &str, last_update: &str, last_fetch_attempt: &str) -> Result<CacheRecord, Error> {
    Ok(CacheRecord {
        fingerprint: Digest::from_stored(fingerprint)?,
        last_update: parse_timestamp(last_update)?,
        last_fetch_attempt: parse_timestamp(last_fetch_attempt)?,
    })
}

impl CacheDb {
    /// Get the cache record for an (entity, category) pair.
    ///
    /// Returns None if no refresh has ever been recorded for the pair.
    pub async fn get_cache_record(&self, entity: &str, category: Category) -> Result<Option<CacheRecord>, Error> {
        let entity = entity.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheRecord>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT fingerprint, last_update, last_fetch_attempt
                     FROM cache_records WHERE entity = ?1 AND category = ?2",
                )?;

                let result = stmt.query_row(params![entity, category.as_str()], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
                });

                match result {
                    Ok((fingerprint, last_update, last_fetch_attempt)) => {
                        decode_record(&fingerprint, &last_update, &last_fetch_attempt).map(Some)
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Overwrite the cache record for an (entity, category) pair.
    ///
    /// Uses UPSERT semantics; `last_fetch_attempt` is set to `last_update`.
    pub async fn put_cache_record(
        &self, entity: &str, category: Category, fingerprint: &Digest, last_update: DateTime<Utc>,
    ) -> Result<(), Error> {
        let entity = entity.to_string();
        let fingerprint = fingerprint.to_stored();
        let last_update = last_update.to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_records (entity, category, fingerprint, last_update, last_fetch_attempt)
                     VALUES (?1, ?2, ?3, ?4, ?4)
                     ON CONFLICT(entity, category) DO UPDATE SET
                        fingerprint = excluded.fingerprint,
                        last_update = excluded.last_update,
                        last_fetch_attempt = excluded.last_fetch_attempt",
                    params![entity, category.as_str(), fingerprint, last_update],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Advance `last_fetch_attempt` on an existing record.
    ///
    /// Does nothing when no record exists; never creates one.
    pub async fn touch_fetch_attempt(&self, entity: &str, category: Category, at: DateTime<Utc>) -> Result<(), Error> {
        let entity = entity.to_string();
        let at = at.to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "UPDATE cache_records SET last_fetch_attempt = ?3 WHERE entity = ?1 AND category = ?2",
                    params![entity, category.as_str(), at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// List every cache record stored for an entity, in category order.
    pub async fn list_cache_records(&self, entity: &str) -> Result<Vec<(Category, CacheRecord)>, Error> {
        let entity = entity.to_string();
        let mut records = self
            .conn
            .call(move |conn| -> Result<Vec<(Category, CacheRecord)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT category, fingerprint, last_update, last_fetch_attempt
                     FROM cache_records WHERE entity = ?1",
                )?;

                let rows = stmt.query_map(params![entity], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })?;

                let mut records = Vec::new();
                for row in rows {
                    let (category, fingerprint, last_update, last_fetch_attempt) = row?;
                    let category: Category = category.parse()?;
                    records.push((category, decode_record(&fingerprint, &last_update, &last_fetch_attempt)?));
                }
                Ok(records)
            })
            .await
            .map_err(Error::from)?;

        records.sort_by_key(|(category, _)| *category);
        Ok(records)
    }
}
