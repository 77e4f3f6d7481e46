//! Entity document operations with merge-write semantics.
//!
//! Each entity is a header row plus one JSON value per field. A merge only
//! touches the fields it carries; everything else stays as it was.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::CacheDb;
use super::records::parse_timestamp;
use crate::Error;

/// Normalize a club name into its document key.
pub fn entity_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Last persisted state of an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub entity: String,
    pub display_name: Option<String>,
    pub last_checked: Option<DateTime<Utc>>,
    pub fields: BTreeMap<String, Value>,
}

impl EntitySnapshot {
    /// Deserialize one persisted field, if present.
    pub fn field<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<Option<T>, Error> {
        self.fields
            .get(name)
            .map(|value| serde_json::from_value(value.clone()).map_err(Error::from))
            .transpose()
    }
}

/// Partial update of an entity document.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityUpdate {
    pub entity: String,
    pub display_name: String,
    pub checked_at: DateTime<Utc>,
    /// Fields to overwrite. Fields not listed are left untouched.
    pub fields: BTreeMap<String, Value>,
}

impl CacheDb {
    /// Get the persisted document for an entity.
    ///
    /// Returns None if nothing has ever been written for the entity.
    pub async fn get_entity_snapshot(&self, entity: &str) -> Result<Option<EntitySnapshot>, Error> {
        let entity = entity.to_string();
        self.conn
            .call(move |conn| -> Result<Option<EntitySnapshot>, Error> {
                let header = conn.query_row(
                    "SELECT display_name, last_checked FROM entities WHERE entity = ?1",
                    params![entity],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                );

                let (display_name, last_checked) = match header {
                    Ok((name, checked)) => (Some(name), Some(parse_timestamp(&checked)?)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => (None, None),
                    Err(e) => return Err(e.into()),
                };

                let mut stmt = conn.prepare("SELECT field, value_json FROM entity_fields WHERE entity = ?1")?;
                let rows = stmt.query_map(params![entity], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;

                let mut fields = BTreeMap::new();
                for row in rows {
                    let (field, json) = row?;
                    fields.insert(field, serde_json::from_str(&json)?);
                }

                if display_name.is_none() && fields.is_empty() {
                    return Ok(None);
                }

                Ok(Some(EntitySnapshot { entity, display_name, last_checked, fields }))
            })
            .await
            .map_err(Error::from)
    }

    /// Merge fields into an entity document in one transaction.
    ///
    /// The header (display name, last checked) is always written; only the
    /// fields present in the update are overwritten.
    pub async fn merge_entity_fields(&self, update: &EntityUpdate) -> Result<(), Error> {
        let entity = update.entity.clone();
        let display_name = update.display_name.clone();
        let checked_at = update.checked_at.to_rfc3339();
        let fields: Vec<(String, String)> = update
            .fields
            .iter()
            .map(|(name, value)| Ok((name.clone(), serde_json::to_string(value)?)))
            .collect::<Result<_, Error>>()?;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO entities (entity, display_name, last_checked) VALUES (?1, ?2, ?3)
                     ON CONFLICT(entity) DO UPDATE SET
                        display_name = excluded.display_name,
                        last_checked = excluded.last_checked",
                    params![entity, display_name, checked_at],
                )?;
                for (field, json) in &fields {
                    tx.execute(
                        "INSERT INTO entity_fields (entity, field, value_json, updated_at) VALUES (?1, ?2, ?3, ?4)
                         ON CONFLICT(entity, field) DO UPDATE SET
                            value_json = excluded.value_json,
                            updated_at = excluded.updated_at",
                        params![entity, field, json, checked_at],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn update(fields: BTreeMap<String, Value>) -> EntityUpdate {
        EntityUpdate {
            entity: "arsenal".into(),
            display_name: "Arsenal".into(),
            checked_at: Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap(),
            fields,
        }
    }

    #[test]
    fn test_entity_key() {
        assert_eq!(entity_key("  Arsenal "), "arsenal");
        assert_eq!(entity_key("Coritiba"), "coritiba");
    }

    #[tokio::test]
    async fn test_missing_snapshot() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.get_entity_snapshot("arsenal").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_merge_and_read() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fields = BTreeMap::from([("roster".to_string(), json!([{"name": "Saka"}]))]);
        db.merge_entity_fields(&update(fields)).await.unwrap();

        let snapshot = db.get_entity_snapshot("arsenal").await.unwrap().unwrap();
        assert_eq!(snapshot.display_name.as_deref(), Some("Arsenal"));
        assert_eq!(snapshot.fields["roster"], json!([{"name": "Saka"}]));
        assert!(snapshot.last_checked.is_some());
    }

    #[tokio::test]
    async fn test_merge_leaves_absent_fields_untouched() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let first = BTreeMap::from([
            ("roster".to_string(), json!(["Saka", "Rice"])),
            ("suspensions".to_string(), json!([{"name": "Rice"}])),
        ]);
        db.merge_entity_fields(&update(first)).await.unwrap();

        let second = BTreeMap::from([("roster".to_string(), json!(["Saka", "Rice", "Merino"]))]);
        db.merge_entity_fields(&update(second)).await.unwrap();

        let snapshot = db.get_entity_snapshot("arsenal").await.unwrap().unwrap();
        assert_eq!(snapshot.fields["roster"], json!(["Saka", "Rice", "Merino"]));
        assert_eq!(snapshot.fields["suspensions"], json!([{"name": "Rice"}]));
    }

    #[tokio::test]
    async fn test_merge_with_no_fields_only_touches_header() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.merge_entity_fields(&update(BTreeMap::new())).await.unwrap();

        let snapshot = db.get_entity_snapshot("arsenal").await.unwrap().unwrap();
        assert!(snapshot.fields.is_empty());
        assert_eq!(snapshot.display_name.as_deref(), Some("Arsenal"));
    }

    #[tokio::test]
    async fn test_empty_list_is_persisted_not_dropped() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fields = BTreeMap::from([("suspensions".to_string(), json!([]))]);
        db.merge_entity_fields(&update(fields)).await.unwrap();

        let snapshot = db.get_entity_snapshot("arsenal").await.unwrap().unwrap();
        let suspensions: Option<Vec<Value>> = snapshot.field("suspensions").unwrap();
        assert_eq!(suspensions, Some(vec![]));
        let injuries: Option<Vec<Value>> = snapshot.field("injuries").unwrap();
        assert!(injuries.is_none());
    }
}
