//! Refresh of both clubs of a fixture.

use chrono::{DateTime, Utc};
use clubwatch_core::{AppConfig, DocumentStore, Error};
use schemars::JsonSchema;
use serde::Serialize;

use super::entity::{EntityReport, EntityStatus, refresh_entity};
use crate::fetch::Fetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Success,
    PartialSuccess,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct MatchReport {
    pub status: MatchStatus,
    /// Home club first.
    pub entities: Vec<EntityReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

fn required<'a>(name: &str, value: &'a str) -> Result<&'a str, Error> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("missing parameter: {name}")));
    }
    Ok(value)
}

/// Refresh the home and away clubs of a fixture.
///
/// Only the pre-flight checks fail the call: empty keys are `InvalidInput`
/// and unconfigured team or league keys are `UnknownEntity`. After that each
/// club runs in isolation and problems are collected into the report.
pub async fn refresh_match(
    fetcher: &dyn Fetcher, store: &dyn DocumentStore, config: &AppConfig, home_key: &str, away_key: &str,
    league_key: &str, now: DateTime<Utc>,
) -> Result<MatchReport, Error> {
    let home = config.team(required("home_team", home_key)?)?;
    let away = config.team(required("away_team", away_key)?)?;
    let league = config.league(required("league_key", league_key)?)?;

    tracing::info!(home = %home.name, away = %away.name, league = %league_key, "refreshing fixture");

    let mut entities = Vec::with_capacity(2);
    let mut errors = Vec::new();
    for team in [home, away] {
        let report = refresh_entity(fetcher, store, config, team, league, now).await;
        if report.status != EntityStatus::Success {
            errors.extend(report.error_messages());
        }
        entities.push(report);
    }

    let status = if errors.is_empty() { MatchStatus::Success } else { MatchStatus::PartialSuccess };
    Ok(MatchReport { status, entities, errors })
}
