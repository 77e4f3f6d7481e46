//! Client code for clubwatch.
//!
//! This crate provides the HTTP fetcher, section fingerprinting, per-category
//! extractors and the refresh pipeline that ties them to the staleness cache.

pub mod extract;
pub mod fetch;
pub mod fingerprint;
pub mod html;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testing;

pub use extract::{
    CategoryData, ExtractContext, Extractor, Injury, MatchResult, Player, PlayerStat, RecentForm,
    Suspension, SuspensionKind,
};
pub use fetch::{FetchClient, FetchConfig, Fetcher, Locator, ParsedContent};
pub use fingerprint::{fingerprint, fingerprint_rows};
pub use pipeline::{
    CategoryOutcome, CategoryReport, CategorySource, CategorySources, CategoryStatus, EntityReport, EntityStatus,
    MatchReport, MatchStatus, refresh_entity, refresh_match, run_category,
};
