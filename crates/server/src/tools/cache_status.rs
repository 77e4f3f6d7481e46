//! cache_status tool implementation.
//!
//! Reports what the store holds for one club: a cache record per category
//! and the names of the persisted fields.

use chrono::{DateTime, SecondsFormat, Utc};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use clubwatch_core::{AppConfig, CacheDb, Category, Error, entity_key};

use crate::handler::AppState;

/// Parameters for the cache_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatusParams {
    /// Configured key of the club.
    pub team: String,
}

/// One category's cache record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryEntry {
    pub category: Category,
    /// Stored fingerprint: hex digest or the verified-empty marker.
    pub fingerprint: String,
    pub last_update: String,
    pub last_fetch_attempt: String,
    pub ttl_minutes: u64,
    /// Whether the TTL has elapsed since `last_update`.
    pub expired: bool,
}

/// Output from the cache_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatusOutput {
    pub entity: String,
    pub display_name: Option<String>,
    pub last_checked: Option<String>,
    pub records: Vec<CategoryEntry>,
    pub fields: Vec<String>,
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

async fn status_at(
    db: &CacheDb, config: &AppConfig, team: &str, now: DateTime<Utc>,
) -> Result<CacheStatusOutput, Error> {
    if team.trim().is_empty() {
        return Err(Error::InvalidInput("missing parameter: team".into()));
    }
    let team = config.team(team)?;
    let entity = entity_key(&team.name);

    let records = db
        .list_cache_records(&entity)
        .await?
        .into_iter()
        .map(|(category, record)| CategoryEntry {
            category,
            fingerprint: record.fingerprint.to_stored(),
            last_update: timestamp(record.last_update),
            last_fetch_attempt: timestamp(record.last_fetch_attempt),
            ttl_minutes: config.ttl.minutes(category),
            expired: now - record.last_update > config.ttl.ttl(category),
        })
        .collect();

    let snapshot = db.get_entity_snapshot(&entity).await?.unwrap_or_default();

    Ok(CacheStatusOutput {
        entity,
        display_name: snapshot.display_name,
        last_checked: snapshot.last_checked.map(timestamp),
        records,
        fields: snapshot.fields.into_keys().collect(),
    })
}

/// Implementation of the cache_status tool.
pub async fn cache_status_impl(state: &AppState, params: CacheStatusParams) -> Result<CallToolResult, McpError> {
    let output = status_at(&state.db, &state.config, &params.team, Utc::now()).await?;
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize status: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
