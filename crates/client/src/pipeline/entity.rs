//! Refresh of every category of one club.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use clubwatch_core::{
    AppConfig, Category, Digest, DocumentStore, EntityUpdate, Error, LeagueRef, StalenessCache, TeamRef, entity_key,
};
use schemars::JsonSchema;
use serde::Serialize;

use super::{CategoryOutcome, CategorySources, run_category};
use crate::extract::{CategoryData, ExtractContext, Player};
use crate::fetch::Fetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    Refreshed,
    Unchanged,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct CategoryReport {
    pub category: Category,
    pub status: CategoryStatus,
    /// Records written, for refreshed categories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CategoryReport {
    fn new(category: Category, status: CategoryStatus) -> Self {
        Self { category, status, records: None, error: None }
    }

    fn failed(category: Category, err: &Error) -> Self {
        Self { error: Some(err.to_string()), ..Self::new(category, CategoryStatus::Failed) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Success,
    Partial,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct EntityReport {
    pub entity: String,
    pub team: String,
    pub status: EntityStatus,
    pub categories: Vec<CategoryReport>,
    /// Failure affecting the whole club rather than one category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntityReport {
    fn new(team: &TeamRef, categories: Vec<CategoryReport>, error: Option<String>) -> Self {
        let failed = categories.iter().filter(|c| c.status == CategoryStatus::Failed).count();
        let status = if error.is_some() || (failed > 0 && failed == categories.len()) {
            EntityStatus::Failed
        } else if failed > 0 {
            EntityStatus::Partial
        } else {
            EntityStatus::Success
        };
        Self { entity: entity_key(&team.name), team: team.name.clone(), status, categories, error }
    }

    /// One line per problem, prefixed with the club name.
    pub fn error_messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self.error.iter().map(|e| format!("{}: {e}", self.team)).collect();
        for report in &self.categories {
            if let Some(error) = &report.error {
                messages.push(format!("{} {}: {error}", self.team, report.category));
            }
        }
        messages
    }
}

/// Roster for dependent categories when the roster itself was not refreshed.
///
/// Falls back to an empty roster (unknown positions) if the snapshot cannot be read.
async fn persisted_roster(store: &dyn DocumentStore, entity: &str) -> Vec<Player> {
    let snapshot = match store.get_entity_snapshot(entity).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(%entity, error = %e, "persisted roster unreadable, positions unknown");
            return Vec::new();
        }
    };

    match snapshot.map(|s| s.field::<Vec<Player>>(Category::Roster.as_str())) {
        Some(Ok(Some(players))) => players,
        Some(Err(e)) => {
            tracing::warn!(%entity, error = %e, "persisted roster malformed, positions unknown");
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Refresh every category of a club and persist the fresh ones.
///
/// Categories are isolated: a failed one is reported and omitted from the
/// merge, never written as empty. Fingerprints are recorded only after the
/// merge succeeds, so a record never points at data that was not stored.
pub async fn refresh_entity(
    fetcher: &dyn Fetcher, store: &dyn DocumentStore, config: &AppConfig, team: &TeamRef, league: &LeagueRef,
    now: DateTime<Utc>,
) -> EntityReport {
    let entity = entity_key(&team.name);
    let sources = match CategorySources::for_team(team, league, config) {
        Ok(sources) => sources,
        Err(e) => {
            tracing::warn!(%entity, error = %e, "cannot build category sources");
            return EntityReport::new(team, Vec::new(), Some(e.to_string()));
        }
    };
    let cache = StalenessCache::new(store, &config.ttl);

    let mut outcomes = Vec::with_capacity(Category::ALL.len());

    let roster_ctx = ExtractContext::new(&team.name, Vec::new());
    let roster_outcome = run_category(fetcher, &cache, &entity, &sources.roster, &roster_ctx, now).await;
    let fresh_roster = match &roster_outcome {
        CategoryOutcome::Fresh { data: CategoryData::Roster(players), .. } => Some(players.clone()),
        _ => None,
    };
    let roster = match fresh_roster {
        Some(players) => players,
        None => persisted_roster(store, &entity).await,
    };
    outcomes.push((Category::Roster, roster_outcome));

    let ctx = ExtractContext::new(&team.name, roster);
    for source in sources.dependents.iter().chain(&sources.independents) {
        let outcome = run_category(fetcher, &cache, &entity, source, &ctx, now).await;
        outcomes.push((source.category(), outcome));
    }

    let mut fields = BTreeMap::new();
    let mut accepted: Vec<(Category, Digest)> = Vec::new();
    let mut reports = Vec::with_capacity(outcomes.len());

    for (category, outcome) in outcomes {
        match outcome {
            CategoryOutcome::Fresh { data, fingerprint } => match data.to_value() {
                Ok(value) => {
                    fields.insert(category.as_str().to_string(), value);
                    accepted.push((category, fingerprint));
                    reports.push(CategoryReport {
                        records: Some(data.record_count()),
                        ..CategoryReport::new(category, CategoryStatus::Refreshed)
                    });
                }
                Err(e) => reports.push(CategoryReport::failed(category, &e)),
            },
            CategoryOutcome::NoChange => reports.push(CategoryReport::new(category, CategoryStatus::Unchanged)),
            CategoryOutcome::Failed(e) => reports.push(CategoryReport::failed(category, &e)),
        }
    }

    let update = EntityUpdate { entity: entity.clone(), display_name: team.name.clone(), checked_at: now, fields };
    if let Err(e) = store.merge_entity_fields(&update).await {
        tracing::warn!(%entity, error = %e, "failed to persist club document");
        for report in reports.iter_mut().filter(|r| r.status == CategoryStatus::Refreshed) {
            report.status = CategoryStatus::Failed;
            report.records = None;
            report.error = Some(e.to_string());
        }
        return EntityReport::new(team, reports, Some(e.to_string()));
    }

    for (category, fingerprint) in accepted {
        if fingerprint.is_failed() {
            tracing::debug!(%entity, %category, "no comparable fingerprint, record left as is");
            continue;
        }
        if let Err(e) = cache.record_refresh(&entity, category, &fingerprint, now).await {
            tracing::warn!(%entity, %category, error = %e, "failed to record refresh");
        }
    }

    let report = EntityReport::new(team, reports, None);
    tracing::info!(%entity, status = ?report.status, "club refreshed");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        FaultyStore, Page, ScriptedFetcher, absences_page, form_page, kader_page, league_page, squad_page,
        squad_players,
    };
    use chrono::{Duration, TimeZone};
    use clubwatch_core::CacheDb;
    use serde_json::{Value, json};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap()
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.teams.insert(
            "arsenal".into(),
            TeamRef { name: "Arsenal".into(), slug: "fc-arsenal".into(), id: "11".into() },
        );
        config
    }

    struct Fixture {
        config: AppConfig,
        fetcher: ScriptedFetcher,
    }

    impl Fixture {
        fn new() -> Self {
            let fixture = Self { config: config(), fetcher: ScriptedFetcher::default() };
            fixture.serve(Category::Roster, squad_page(&squad_players(28), &[]));
            fixture.serve(Category::Injuries, absences_page(&["Player 3"], &[]));
            fixture.serve(Category::SuspensionsSecondary, kader_page(&[("Player 5", "5", "Stoper", None)]));
            fixture.serve(Category::LeaguePosition, league_page(&["Liverpool", "Arsenal"]));
            fixture.serve(Category::RecentForm, form_page("Arsenal", (4, 1, 0), &["G", "G", "B"]));
            fixture.serve(
                Category::PlayerStatistics,
                crate::testing::stats_page(&[("Player 1Orta saha", "10", "900'")]),
            );
            fixture
        }

        fn url(&self, category: Category) -> String {
            let team = self.config.team("arsenal").unwrap();
            let league = self.config.league("en1").unwrap();
            let sources = CategorySources::for_team(team, league, &self.config).unwrap();
            sources.get(category).unwrap().locator.url.to_string()
        }

        fn serve(&self, category: Category, html: String) {
            self.fetcher.set(&self.url(category), Page::Html(html));
        }

        fn fail(&self, category: Category) {
            self.fetcher.set(&self.url(category), Page::Timeout);
        }

        async fn refresh(&self, store: &dyn DocumentStore, at: DateTime<Utc>) -> EntityReport {
            let team = self.config.team("arsenal").unwrap();
            let league = self.config.league("en1").unwrap();
            refresh_entity(&self.fetcher, store, &self.config, team, league, at).await
        }
    }

    fn status(report: &EntityReport, category: Category) -> CategoryStatus {
        report.categories.iter().find(|c| c.category == category).unwrap().status
    }

    async fn field(db: &CacheDb, name: &str) -> Option<Value> {
        db.get_entity_snapshot("arsenal").await.unwrap().and_then(|s| s.fields.get(name).cloned())
    }

    #[tokio::test]
    async fn test_first_refresh_persists_everything() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fixture = Fixture::new();

        let report = fixture.refresh(&db, now()).await;
        assert_eq!(report.status, EntityStatus::Success, "{report:?}");
        assert!(report.categories.iter().all(|c| c.status == CategoryStatus::Refreshed));

        let snapshot = db.get_entity_snapshot("arsenal").await.unwrap().unwrap();
        assert_eq!(snapshot.fields.len(), Category::ALL.len());
        assert_eq!(snapshot.fields["league_position"], json!(2));
        assert_eq!(snapshot.fields["injuries"], json!([{"name": "Player 3", "position": "Orta saha"}]));
        assert_eq!(db.list_cache_records("arsenal").await.unwrap().len(), Category::ALL.len());
    }

    #[tokio::test]
    async fn test_unchanged_roster_is_not_rewritten() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fixture = Fixture::new();
        fixture.refresh(&db, now()).await;
        let d1 = db.get_cache_record("arsenal", Category::Roster).await.unwrap().unwrap().fingerprint;

        // a marker value proves the second run does not touch the field
        let marker = EntityUpdate {
            entity: "arsenal".into(),
            display_name: "Arsenal".into(),
            checked_at: now(),
            fields: BTreeMap::from([("roster".to_string(), json!("marker"))]),
        };
        db.merge_entity_fields(&marker).await.unwrap();

        let report = fixture.refresh(&db, now() + Duration::hours(1)).await;
        assert_eq!(status(&report, Category::Roster), CategoryStatus::Unchanged);
        assert_eq!(field(&db, "roster").await, Some(json!("marker")));

        let record = db.get_cache_record("arsenal", Category::Roster).await.unwrap().unwrap();
        assert_eq!(record.fingerprint, d1);
        assert_eq!(record.last_update, now());
    }

    #[tokio::test]
    async fn test_changed_roster_refreshes_within_ttl() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fixture = Fixture::new();
        fixture.refresh(&db, now()).await;
        let d1 = db.get_cache_record("arsenal", Category::Roster).await.unwrap().unwrap().fingerprint;

        fixture.serve(Category::Roster, squad_page(&squad_players(29), &[]));
        let later = now() + Duration::minutes(1);
        let report = fixture.refresh(&db, later).await;
        assert_eq!(status(&report, Category::Roster), CategoryStatus::Refreshed);

        let roster = field(&db, "roster").await.unwrap();
        assert_eq!(roster.as_array().map(Vec::len), Some(29));
        let record = db.get_cache_record("arsenal", Category::Roster).await.unwrap().unwrap();
        assert_ne!(record.fingerprint, d1);
        assert_eq!(record.last_update, later);
    }

    #[tokio::test]
    async fn test_failed_suspensions_keep_previous_data() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fixture = Fixture::new();
        fixture.serve(Category::Roster, squad_page(&squad_players(28), &[("Player 2", "Kırmızı kart cezalısı")]));
        fixture.refresh(&db, now()).await;
        let before = db.get_cache_record("arsenal", Category::Suspensions).await.unwrap().unwrap();

        fixture.fail(Category::Suspensions);
        let report = fixture.refresh(&db, now() + Duration::days(8)).await;
        assert_eq!(report.status, EntityStatus::Partial);
        assert_eq!(status(&report, Category::Suspensions), CategoryStatus::Failed);
        assert_eq!(status(&report, Category::LeaguePosition), CategoryStatus::Refreshed);

        let after = db.get_cache_record("arsenal", Category::Suspensions).await.unwrap().unwrap();
        assert_eq!(after, before);
        let suspensions = field(&db, "suspensions").await.unwrap();
        assert_eq!(suspensions[0]["name"], json!("Player 2"));
    }

    #[tokio::test]
    async fn test_layout_change_keeps_previous_injuries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fixture = Fixture::new();
        fixture.refresh(&db, now()).await;
        let before = db.get_cache_record("arsenal", Category::Injuries).await.unwrap().unwrap();

        fixture.serve(Category::Injuries, "<html><body><p>Bakım çalışması</p></body></html>".into());
        let report = fixture.refresh(&db, now() + Duration::hours(1)).await;
        assert_eq!(status(&report, Category::Injuries), CategoryStatus::Failed);
        assert_eq!(report.status, EntityStatus::Partial);

        let after = db.get_cache_record("arsenal", Category::Injuries).await.unwrap().unwrap();
        assert_eq!(after, before);
        assert_eq!(field(&db, "injuries").await, Some(json!([{"name": "Player 3", "position": "Orta saha"}])));
    }

    #[tokio::test]
    async fn test_no_suspensions_is_recorded_and_persisted() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fixture = Fixture::new();

        fixture.refresh(&db, now()).await;
        let record = db.get_cache_record("arsenal", Category::Suspensions).await.unwrap().unwrap();
        assert_eq!(record.fingerprint, Digest::VerifiedEmpty);
        assert_eq!(field(&db, "suspensions").await, Some(json!([])));

        let report = fixture.refresh(&db, now() + Duration::hours(1)).await;
        assert_eq!(status(&report, Category::Suspensions), CategoryStatus::Unchanged);
    }

    #[tokio::test]
    async fn test_dependents_use_persisted_roster() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fixture = Fixture::new();
        fixture.refresh(&db, now()).await;

        // roster page unchanged, injury list grows
        fixture.serve(Category::Injuries, absences_page(&["Player 3", "Player 4"], &[]));
        let report = fixture.refresh(&db, now() + Duration::hours(1)).await;
        assert_eq!(status(&report, Category::Roster), CategoryStatus::Unchanged);
        assert_eq!(status(&report, Category::Injuries), CategoryStatus::Refreshed);

        let injuries = field(&db, "injuries").await.unwrap();
        assert_eq!(injuries[1], json!({"name": "Player 4", "position": "Orta saha"}));
    }

    #[tokio::test]
    async fn test_unreadable_store_refreshes_with_unknown_positions() {
        let store = FaultyStore::new(true, false).await;
        let fixture = Fixture::new();
        fixture.fail(Category::Roster);
        fixture.serve(Category::Injuries, absences_page(&["Player 3"], &[]));

        let report = fixture.refresh(&store, now()).await;
        assert_eq!(status(&report, Category::Roster), CategoryStatus::Failed);
        assert_eq!(status(&report, Category::Injuries), CategoryStatus::Refreshed);

        let snapshot = store.db.get_entity_snapshot("arsenal").await.unwrap().unwrap();
        assert_eq!(snapshot.fields["injuries"], json!([{"name": "Player 3", "position": null}]));
        assert!(!snapshot.fields.contains_key("roster"));
        assert!(!snapshot.fields.contains_key("suspensions"));
    }

    #[tokio::test]
    async fn test_failed_merge_records_nothing() {
        let store = FaultyStore::new(false, true).await;
        let fixture = Fixture::new();

        let report = fixture.refresh(&store, now()).await;
        assert_eq!(report.status, EntityStatus::Failed);
        assert!(report.error.is_some());
        assert!(report.categories.iter().all(|c| c.status == CategoryStatus::Failed));
        assert!(store.db.list_cache_records("arsenal").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_messages_name_club_and_category() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fixture = Fixture::new();
        fixture.fail(Category::RecentForm);

        let report = fixture.refresh(&db, now()).await;
        let messages = report.error_messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Arsenal recent_form: FETCH_TIMEOUT"));
    }
}
