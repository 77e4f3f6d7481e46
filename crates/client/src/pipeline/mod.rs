//! Refresh pipeline: fetch, fingerprint, decide, extract.
//!
//! [`run_category`] handles one (entity, category) pair and never fails as a
//! whole; its [`CategoryOutcome`] says whether new data is available.
//! [`refresh_entity`] runs every category for a club and persists the fresh
//! ones in a single merge; [`refresh_match`] does that for both clubs of a
//! fixture.

pub mod entity;
pub mod matchday;
pub mod sources;

pub use entity::{CategoryReport, CategoryStatus, EntityReport, EntityStatus, refresh_entity};
pub use matchday::{MatchReport, MatchStatus, refresh_match};
pub use sources::{CategorySource, CategorySources};

use chrono::{DateTime, Utc};
use clubwatch_core::{Digest, Error, StalenessCache};

use crate::extract::{CategoryData, ExtractContext};
use crate::fetch::Fetcher;

/// Result of one category run.
#[derive(Debug)]
pub enum CategoryOutcome {
    /// Content changed, expired or was never seen; `fingerprint` is what to
    /// record once the data is persisted.
    Fresh { data: CategoryData, fingerprint: Digest },
    /// Verified unchanged within its TTL. The persisted field stays valid.
    NoChange,
    /// Fetch or extraction failed. Nothing may be written for the category.
    Failed(Error),
}

impl CategoryOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, CategoryOutcome::Failed(_))
    }
}

/// Run one category for an entity.
///
/// Fetch errors and extraction errors become `Failed`. Store errors never do:
/// an unreadable record means refresh, and a hit that cannot be noted is
/// still a hit.
pub async fn run_category(
    fetcher: &dyn Fetcher, cache: &StalenessCache<'_>, entity: &str, source: &CategorySource, ctx: &ExtractContext,
    now: DateTime<Utc>,
) -> CategoryOutcome {
    let category = source.category();

    let content = match fetcher.fetch(&source.locator).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(%entity, %category, reason = %e, "fetch failed");
            return CategoryOutcome::Failed(e);
        }
    };

    let fingerprint = {
        let doc = content.document();
        source.extractor.fingerprint(&doc, content.selector())
    };

    let decision = cache.check(entity, category, &fingerprint, now).await;
    if !decision.should_refresh() {
        if let Err(e) = cache.record_hit(entity, category, now).await {
            tracing::warn!(%entity, %category, error = %e, "failed to note cache hit");
        }
        return CategoryOutcome::NoChange;
    }

    let extracted = {
        let doc = content.document();
        source.extractor.extract(&doc, ctx)
    };

    match extracted {
        Ok(data) => {
            tracing::info!(%entity, %category, ?decision, records = data.record_count(), "category refreshed");
            CategoryOutcome::Fresh { data, fingerprint }
        }
        Err(e) => {
            tracing::warn!(%entity, %category, reason = %e, "extraction failed");
            CategoryOutcome::Failed(e)
        }
    }
}
