//! Per-category extraction of club data from fetched pages.
//!
//! ### Stable Abstraction
//! - Each category has one [`Extractor`], which owns both its fingerprint
//!   policy and its parser.
//! - Extractors are synchronous and operate on a parsed `scraper::Html`.
//!
//! ### Output
//! - Every extractor returns a [`CategoryData`] variant, persisted as one
//!   JSON field of the club document.

pub mod injuries;
pub mod roster;
pub mod standings;
pub mod stats;
pub mod suspensions;

pub use injuries::InjuryExtractor;
pub use roster::RosterExtractor;
pub use standings::{LeaguePositionExtractor, RecentFormExtractor};
pub use stats::PlayerStatsExtractor;
pub use suspensions::{SecondarySuspensionExtractor, SuspensionExtractor};

use clubwatch_core::{Category, Digest, Error};
use schemars::JsonSchema;
use scraper::Html;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fingerprint;

/// A squad member from the club overview page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Player {
    pub name: String,
    pub position: String,
    pub market_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Injury {
    pub name: String,
    /// Position from the roster, when the player is on it.
    pub position: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SuspensionKind {
    RedCard,
    YellowCard,
    Other,
}

impl SuspensionKind {
    /// Classify a suspension marker title.
    pub fn from_title(title: &str) -> Self {
        let title = title.to_lowercase();
        if title.contains("kırmızı kart") || title.contains("red card") {
            SuspensionKind::RedCard
        } else if title.contains("sarı kart") || title.contains("yellow card") {
            SuspensionKind::YellowCard
        } else {
            SuspensionKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Suspension {
    pub name: String,
    /// Shirt number, only listed on the squad page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub position: Option<String>,
    pub kind: SuspensionKind,
    /// Marker title as published upstream.
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Win,
    Draw,
    Loss,
}

impl MatchResult {
    /// Map a form-table letter (Turkish `G/B/M` or English `W/D/L`).
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim() {
            "G" | "W" => Some(MatchResult::Win),
            "B" | "D" => Some(MatchResult::Draw),
            "M" | "L" => Some(MatchResult::Loss),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecentForm {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub last_matches: Vec<MatchResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerStat {
    pub name: String,
    pub played_matches: u32,
    pub minutes_played: u32,
}

/// Extracted content of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CategoryData {
    Roster(Vec<Player>),
    Injuries(Vec<Injury>),
    Suspensions(Vec<Suspension>),
    LeaguePosition(u32),
    RecentForm(RecentForm),
    PlayerStatistics(Vec<PlayerStat>),
}

impl CategoryData {
    /// Value stored in the club document.
    pub fn to_value(&self) -> Result<Value, Error> {
        Ok(serde_json::to_value(self)?)
    }

    /// Number of records, for logging.
    pub fn record_count(&self) -> usize {
        match self {
            CategoryData::Roster(v) => v.len(),
            CategoryData::Injuries(v) => v.len(),
            CategoryData::Suspensions(v) => v.len(),
            CategoryData::PlayerStatistics(v) => v.len(),
            CategoryData::LeaguePosition(_) | CategoryData::RecentForm(_) => 1,
        }
    }
}

/// Inputs an extractor may need beyond the page itself.
#[derive(Debug, Clone, Default)]
pub struct ExtractContext {
    /// Display name used to find the club in league tables.
    pub team_name: String,
    /// Squad used to fill in positions.
    pub roster: Vec<Player>,
}

impl ExtractContext {
    pub fn new(team_name: impl Into<String>, roster: Vec<Player>) -> Self {
        Self { team_name: team_name.into(), roster }
    }

    /// Position of a rostered player, matched by exact name.
    pub fn position_of(&self, name: &str) -> Option<String> {
        self.roster
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.position.clone())
    }
}

/// Fingerprint policy plus parser for one category.
pub trait Extractor: Send + Sync {
    fn category(&self) -> Category;

    /// Digest compared against the cache record.
    ///
    /// Defaults to the text of the section named by the locator.
    fn fingerprint(&self, doc: &Html, selector: Option<&str>) -> Digest {
        fingerprint::fingerprint(doc, selector)
    }

    fn extract(&self, doc: &Html, ctx: &ExtractContext) -> Result<CategoryData, Error>;
}

/// The extractor for a category.
pub fn for_category(category: Category) -> Box<dyn Extractor> {
    match category {
        Category::Roster => Box::new(RosterExtractor),
        Category::Injuries => Box::new(InjuryExtractor),
        Category::Suspensions => Box::new(SuspensionExtractor),
        Category::SuspensionsSecondary => Box::new(SecondarySuspensionExtractor),
        Category::LeaguePosition => Box::new(LeaguePositionExtractor),
        Category::RecentForm => Box::new(RecentFormExtractor),
        Category::PlayerStatistics => Box::new(PlayerStatsExtractor),
    }
}
