//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::Category;
use crate::config::AppConfig;
use thiserror::Error;

/// Longest TTL accepted for any category: one year, in minutes.
const MAX_TTL_MINUTES: u64 = 525_600;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn check_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ConfigError::Invalid { field: field.to_string(), reason: format!("not a valid URL: {e}") })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::Invalid { field: field.to_string(), reason: format!("unsupported scheme: {scheme}") }),
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `source_base_url` or any league URL is not an http(s) URL
    /// - any category TTL is 0 or longer than a year
    /// - a team entry has an empty name, slug or id
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        check_http_url("source_base_url", &self.source_base_url)?;

        for category in Category::ALL {
            let minutes = self.ttl.minutes(category);
            if minutes == 0 || minutes > MAX_TTL_MINUTES {
                return Err(ConfigError::Invalid {
                    field: format!("ttl.{category}"),
                    reason: format!("must be between 1 and {MAX_TTL_MINUTES} minutes"),
                });
            }
        }

        for (key, team) in &self.teams {
            if team.name.trim().is_empty() || team.slug.trim().is_empty() || team.id.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: format!("teams.{key}"),
                    reason: "name, slug and id must not be empty".into(),
                });
            }
        }

        for (key, league) in &self.leagues {
            check_http_url(&format!("leagues.{key}.table_url"), &league.table_url)?;
            check_http_url(&format!("leagues.{key}.form_url"), &league.form_url)?;
        }

        if self.teams.is_empty() {
            tracing::warn!("No teams configured; every refresh request will be rejected");
        }

        Ok(())
    }
}
