//! Where each category of a club is fetched from.

use clubwatch_core::{AppConfig, Category, Error, LeagueRef, TeamRef};

use crate::extract::{self, Extractor};
use crate::fetch::Locator;

/// Locator plus extractor for one category.
pub struct CategorySource {
    pub locator: Locator,
    pub extractor: Box<dyn Extractor>,
}

impl CategorySource {
    pub fn new(category: Category, url: &str, selector: &str) -> Result<Self, Error> {
        Ok(Self { locator: Locator::parse(url, Some(selector))?, extractor: extract::for_category(category) })
    }

    pub fn category(&self) -> Category {
        self.extractor.category()
    }
}

/// All category sources of a club, grouped by run order.
pub struct CategorySources {
    pub roster: CategorySource,
    /// Categories enriched with roster positions.
    pub dependents: Vec<CategorySource>,
    pub independents: Vec<CategorySource>,
}

impl CategorySources {
    /// Build the sources for a club playing in a league.
    pub fn for_team(team: &TeamRef, league: &LeagueRef, config: &AppConfig) -> Result<Self, Error> {
        let base = config.source_base_url.trim_end_matches('/');
        let club_page = |page: &str| format!("{base}/{}/{page}/verein/{}", team.slug, team.id);
        let squad_page = format!("{}/saison_id/{}", club_page("kader"), config.season_id);

        Ok(Self {
            roster: CategorySource::new(Category::Roster, &club_page("startseite"), "table.items")?,
            dependents: vec![
                CategorySource::new(Category::Injuries, &club_page("sperrenundverletzungen"), "table.items")?,
                CategorySource::new(Category::Suspensions, &club_page("startseite"), "table.items")?,
            ],
            independents: vec![
                CategorySource::new(Category::SuspensionsSecondary, &squad_page, "table.items")?,
                CategorySource::new(Category::LeaguePosition, &league.table_url, "table.items")?,
                CategorySource::new(Category::RecentForm, &league.form_url, "div.responsive-table")?,
                CategorySource::new(Category::PlayerStatistics, &club_page("leistungsdaten"), "table.items")?,
            ],
        })
    }

    /// Sources in run order, roster first.
    pub fn iter(&self) -> impl Iterator<Item = &CategorySource> {
        std::iter::once(&self.roster)
            .chain(&self.dependents)
            .chain(&self.independents)
    }

    pub fn get(&self, category: Category) -> Option<&CategorySource> {
        self.iter().find(|source| source.category() == category)
    }
}
