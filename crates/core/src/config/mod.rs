//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CLUBWATCH_*)
//! 2. TOML config file (if CLUBWATCH_CONFIG_FILE set)
//! 3. Built-in defaults

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::{Category, Error};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (CLUBWATCH_*)
/// 2. TOML config file (if CLUBWATCH_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite store.
    ///
    /// Set via CLUBWATCH_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via CLUBWATCH_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per page.
    ///
    /// Set via CLUBWATCH_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via CLUBWATCH_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects followed per fetch.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Scheme and host that club pages are built on.
    ///
    /// Set via CLUBWATCH_SOURCE_BASE_URL environment variable.
    #[serde(default = "default_source_base_url")]
    pub source_base_url: String,

    /// Season used for the squad-list page.
    #[serde(default = "default_season_id")]
    pub season_id: u32,

    /// Per-category time-to-live table. Every category must be present.
    pub ttl: CategoryTtls,

    /// Club lookup table keyed by request key (lower-case).
    #[serde(default)]
    pub teams: BTreeMap<String, TeamRef>,

    /// League lookup table keyed by league key (lower-case).
    #[serde(default)]
    pub leagues: BTreeMap<String, LeagueRef>,
}

/// Time-to-live in minutes for each category.
///
/// Fields carry no serde defaults: a table missing a category fails to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTtls {
    pub roster: u64,
    pub injuries: u64,
    pub suspensions: u64,
    pub suspensions_secondary: u64,
    pub league_position: u64,
    pub recent_form: u64,
    pub player_statistics: u64,
}

impl Default for CategoryTtls {
    fn default() -> Self {
        Self {
            roster: 10_080,
            injuries: 10_080,
            suspensions: 10_080,
            suspensions_secondary: 10_080,
            league_position: 1_440,
            recent_form: 10_080,
            player_statistics: 4_320,
        }
    }
}

impl CategoryTtls {
    /// Configured TTL in minutes.
    pub fn minutes(&self, category: Category) -> u64 {
        match category {
            Category::Roster => self.roster,
            Category::Injuries => self.injuries,
            Category::Suspensions => self.suspensions,
            Category::SuspensionsSecondary => self.suspensions_secondary,
            Category::LeaguePosition => self.league_position,
            Category::RecentForm => self.recent_form,
            Category::PlayerStatistics => self.player_statistics,
        }
    }

    /// Configured TTL as a chrono duration, for comparison against stored timestamps.
    pub fn ttl(&self, category: Category) -> chrono::Duration {
        chrono::Duration::minutes(self.minutes(category) as i64)
    }
}

/// Static reference data for one club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    /// Display name, also matched against league tables.
    pub name: String,
    /// URL slug on the source site.
    pub slug: String,
    /// Numeric club id on the source site.
    pub id: String,
}

/// League table pages shared by every club in the league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueRef {
    pub table_url: String,
    pub form_url: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./clubwatch.sqlite")
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; clubwatch/0.1)".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    18_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_source_base_url() -> String {
    "https://www.transfermarkt.com.tr".into()
}

fn default_season_id() -> u32 {
    2025
}

fn default_teams() -> BTreeMap<String, TeamRef> {
    [
        ("chapecoense", "Chapecoense", "chapecoense", "17776"),
        ("remo", "Remo", "clube-do-remo-pa-", "10997"),
        ("coritiba", "Coritiba", "coritiba-fc", "776"),
    ]
    .into_iter()
    .map(|(key, name, slug, id)| (key.to_string(), TeamRef { name: name.into(), slug: slug.into(), id: id.into() }))
    .collect()
}

fn default_leagues() -> BTreeMap<String, LeagueRef> {
    let base = default_source_base_url();
    [
        ("en1", "premier-league", "GB1"),
        ("es1", "laliga", "ES1"),
        ("de1", "bundesliga", "L1"),
        ("tr1", "super-lig", "TR1"),
        ("fr1", "ligue-1", "FR1"),
        ("br1", "campeonato-brasileiro-serie-a", "BRA1"),
        ("sa1", "saudi-professional-league", "SA1"),
        ("it1", "serie-a", "IT1"),
        ("hl1", "eredivisie", "NL1"),
        ("pt1", "liga-nos", "PO1"),
    ]
    .into_iter()
    .map(|(key, slug, code)| {
        let league = LeagueRef {
            table_url: format!("{base}/{slug}/tabelle/wettbewerb/{code}"),
            form_url: format!("{base}/{slug}/formtabelle/wettbewerb/{code}"),
        };
        (key.to_string(), league)
    })
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            source_base_url: default_source_base_url(),
            season_id: default_season_id(),
            ttl: CategoryTtls::default(),
            teams: default_teams(),
            leagues: default_leagues(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `CLUBWATCH_`
    /// 2. TOML file from `CLUBWATCH_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - A category is missing from the TTL table
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CLUBWATCH_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CLUBWATCH_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(figment)
    }

    /// Extract and validate a configuration from an assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Look up a club by request key.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEntity` if the key is not configured.
    pub fn team(&self, key: &str) -> Result<&TeamRef, Error> {
        let key = key.trim().to_lowercase();
        self.teams.get(&key).ok_or_else(|| {
            let known: Vec<&str> = self.teams.keys().map(String::as_str).collect();
            Error::UnknownEntity(format!("team '{key}' not found, known teams: {}", known.join(", ")))
        })
    }

    /// Look up a league by key.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEntity` if the key is not configured.
    pub fn league(&self, key: &str) -> Result<&LeagueRef, Error> {
        let key = key.trim().to_lowercase();
        self.leagues
            .get(&key)
            .ok_or_else(|| Error::UnknownEntity(format!("league '{key}' not found")))
    }
}
