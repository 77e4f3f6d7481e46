//! Data categories tracked independently per club.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One kind of club data with its own fingerprint, TTL and persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Roster,
    Injuries,
    Suspensions,
    SuspensionsSecondary,
    LeaguePosition,
    RecentForm,
    PlayerStatistics,
}

impl Category {
    /// Every category, in pipeline order (roster first).
    pub const ALL: [Category; 7] = [
        Category::Roster,
        Category::Injuries,
        Category::Suspensions,
        Category::SuspensionsSecondary,
        Category::LeaguePosition,
        Category::RecentForm,
        Category::PlayerStatistics,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Roster => "roster",
            Category::Injuries => "injuries",
            Category::Suspensions => "suspensions",
            Category::SuspensionsSecondary => "suspensions_secondary",
            Category::LeaguePosition => "league_position",
            Category::RecentForm => "recent_form",
            Category::PlayerStatistics => "player_statistics",
        }
    }

    /// Whether extraction enriches records with roster data.
    pub fn needs_roster(self) -> bool {
        matches!(self, Category::Injuries | Category::Suspensions)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| crate::Error::InvalidRecord(format!("unknown category: {s}")))
    }
}
