//! refresh_match tool implementation.

use chrono::Utc;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use clubwatch_core::Error;

use crate::handler::AppState;

/// Parameters for the refresh_match tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RefreshMatchParams {
    /// Configured key of the home club (e.g. "remo").
    pub home_team: String,
    /// Configured key of the away club.
    pub away_team: String,
    /// Configured key of the league the fixture belongs to (e.g. "br1").
    pub league_key: String,
}

/// Implementation of the refresh_match tool.
///
/// Fails only on missing or unknown keys. Per-club problems are part of the report.
pub async fn refresh_match_impl(state: &AppState, params: RefreshMatchParams) -> Result<CallToolResult, McpError> {
    let report = clubwatch_client::refresh_match(
        &state.fetcher,
        &state.db,
        &state.config,
        &params.home_team,
        &params.away_team,
        &params.league_key,
        Utc::now(),
    )
    .await?;

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize report: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubwatch_client::{FetchClient, FetchConfig};
    use clubwatch_core::{AppConfig, CacheDb};

    async fn state() -> AppState {
        AppState {
            config: AppConfig::default(),
            db: CacheDb::open_in_memory().await.unwrap(),
            fetcher: FetchClient::new(FetchConfig::default()).unwrap(),
        }
    }

    fn params(home: &str, away: &str, league: &str) -> RefreshMatchParams {
        RefreshMatchParams { home_team: home.into(), away_team: away.into(), league_key: league.into() }
    }

    #[tokio::test]
    async fn test_missing_team_is_invalid_params() {
        let state = state().await;
        let err = refresh_match_impl(&state, params("", "coritiba", "br1")).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("home_team"));
    }

    #[tokio::test]
    async fn test_unknown_league_is_rejected_before_fetching() {
        let state = state().await;
        let err = refresh_match_impl(&state, params("remo", "coritiba", "zz9")).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("zz9"));
        assert!(state.db.get_entity_snapshot("remo").await.unwrap().is_none());
    }
}
