//! HTML fixtures and test doubles shared by the client tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clubwatch_core::{
    CacheDb, CacheRecord, Category, Digest, DocumentStore, EntitySnapshot, EntityUpdate, Error,
};

use crate::extract::Player;
use crate::fetch::{Fetcher, Locator, ParsedContent};

pub(crate) fn squad_players(n: usize) -> Vec<Player> {
    (1..=n)
        .map(|i| Player {
            name: format!("Player {i}"),
            position: "Orta saha".into(),
            market_value: format!("{i},00 mil. €"),
        })
        .collect()
}

/// Club overview page. `suspended` pairs a player name with a marker title.
pub(crate) fn squad_page(players: &[Player], suspended: &[(&str, &str)]) -> String {
    let mut rows = String::new();
    for (i, p) in players.iter().enumerate() {
        let class = if i % 2 == 0 { "odd" } else { "even" };
        let marker = suspended
            .iter()
            .find(|(name, _)| *name == p.name)
            .map(|(_, title)| format!(r#"<span class="ausfall-1-table" title="{title}"></span>"#))
            .unwrap_or_default();
        rows.push_str(&format!(
            r#"<tr class="{class}">
                <td class="zentriert rueckennummer">{n}</td>
                <td class="posrela"><table class="inline-table"><tbody>
                    <tr><td rowspan="2"><img src="p.png"></td><td class="hauptlink"><a href="/p/{n}">{name}{marker}</a></td></tr>
                    <tr><td>{position}</td></tr>
                </tbody></table></td>
                <td class="zentriert">24</td>
                <td class="rechts hauptlink">{value}</td>
            </tr>"#,
            n = i + 1,
            name = p.name,
            position = p.position,
            value = p.market_value,
        ));
    }
    format!(
        r#"<html><body><div class="data-header">Son güncelleme: bugün</div>
        <div class="responsive-table"><table class="items"><thead><tr><th>#</th></tr></thead>
        <tbody>{rows}</tbody></table></div></body></html>"#
    )
}

fn absence_rows(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| {
            format!(
                r#"<tr class="odd"><td><table class="inline-table"><tbody>
                    <tr><td><a href="/p">{name}</a></td></tr>
                </tbody></table></td><td>Sakatlık</td></tr>"#
            )
        })
        .collect()
}

/// Absences page: an injury section (omitted when empty) and a suspension section.
pub(crate) fn absences_page(injured: &[&str], suspended: &[&str]) -> String {
    let injuries = if injured.is_empty() {
        String::new()
    } else {
        format!(r#"<tr class="extrarow"><td colspan="2">Sakatlıklar</td></tr>{}"#, absence_rows(injured))
    };
    format!(
        r#"<html><body><table class="items"><tbody>
            {injuries}
            <tr class="extrarow"><td colspan="2">Cezalılar</td></tr>{}
        </tbody></table></body></html>"#,
        absence_rows(suspended)
    )
}

/// Season squad page rows: (name, number, position, marker title).
pub(crate) fn kader_page(rows: &[(&str, &str, &str, Option<&str>)]) -> String {
    let body: String = rows
        .iter()
        .map(|(name, number, position, title)| {
            let marker = title
                .map(|t| format!(r#" <span class="ausfall-table" title="{t}"></span>"#))
                .unwrap_or_default();
            format!(
                r#"<tr class="odd">
                    <td class="zentriert rueckennummer"><div class="rn_nummer">{number}</div></td>
                    <td class="posrela"><table class="inline-table"><tbody>
                        <tr><td rowspan="2"><img src="p.png"></td><td class="hauptlink"><a href="/p">{name}</a>{marker}</td></tr>
                        <tr><td>{position}</td></tr>
                    </tbody></table></td>
                </tr>"#
            )
        })
        .collect();
    format!(r#"<html><body><table class="items"><tbody>{body}</tbody></table></body></html>"#)
}

/// League table with clubs ranked in the given order.
pub(crate) fn league_page(clubs: &[&str]) -> String {
    let rows: String = clubs
        .iter()
        .enumerate()
        .map(|(i, club)| {
            format!(
                r#"<tr><td class="rechts hauptlink">{rank}</td><td class="zentriert"><img src="c.png"></td>
                <td class="no-border-links hauptlink">{club}</td><td>20</td><td>45</td></tr>"#,
                rank = i + 1
            )
        })
        .collect();
    format!(r#"<html><body><table class="items"><tbody>{rows}</tbody></table></body></html>"#)
}

/// Form table with one club row.
pub(crate) fn form_page(club: &str, (w, d, l): (u32, u32, u32), form: &[&str]) -> String {
    let spans: String = form.iter().map(|r| format!("<span>{r}</span>")).collect();
    format!(
        r#"<html><body><div class="responsive-table"><table><tbody>
            <tr><td>1</td><td><img src="c.png"></td><td class="no-border-links hauptlink"><a href="/c">{club}</a></td>
            <td>{played}</td><td>{w}</td><td>{d}</td><td>{l}</td><td>12:3</td><td>9</td><td>24</td><td>{spans}</td></tr>
        </tbody></table></div></body></html>"#,
        played = w + d + l
    )
}

/// Performance page rows: (raw name cell, matches, minutes).
pub(crate) fn stats_page(rows: &[(&str, &str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(name, played, minutes)| {
            format!(
                r#"<tr class="odd"><td>7</td><td>-</td><td><img src="p.png"></td><td>{name}</td><td>ENG</td>
                <td>24</td><td>-</td><td>-</td><td>{played}</td><td>2</td><td>{minutes}</td></tr>"#
            )
        })
        .collect();
    format!(r#"<html><body><table class="items"><tbody>{body}</tbody></table></body></html>"#)
}

/// Canned response for a scripted URL.
#[derive(Debug, Clone)]
pub(crate) enum Page {
    Html(String),
    Timeout,
    Status(u16),
}

/// Fetcher serving pages from memory, keyed by URL.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    pages: Mutex<HashMap<String, Page>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub(crate) fn set(&self, url: &str, page: Page) {
        self.pages.lock().unwrap().insert(url.to_string(), page);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, locator: &Locator) -> Result<ParsedContent, Error> {
        let url = locator.url.to_string();
        self.calls.lock().unwrap().push(url.clone());
        let page = self.pages.lock().unwrap().get(&url).cloned();
        match page {
            Some(Page::Html(body)) => Ok(ParsedContent::new(locator, body)),
            Some(Page::Timeout) => Err(Error::FetchTimeout(url)),
            Some(Page::Status(code)) => Err(Error::HttpError(format!("status {code} for {url}"))),
            None => Err(Error::HttpError(format!("status 404 for {url}"))),
        }
    }
}

/// Store wrapping an in-memory database with switchable failures.
pub(crate) struct FaultyStore {
    pub(crate) db: CacheDb,
    pub(crate) fail_reads: bool,
    pub(crate) fail_writes: bool,
}

impl FaultyStore {
    pub(crate) async fn new(fail_reads: bool, fail_writes: bool) -> Self {
        Self { db: CacheDb::open_in_memory().await.unwrap(), fail_reads, fail_writes }
    }

    fn check(&self, failing: bool) -> Result<(), Error> {
        if failing { Err(Error::InvalidRecord("store offline".into())) } else { Ok(()) }
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn get_cache_record(&self, entity: &str, category: Category) -> Result<Option<CacheRecord>, Error> {
        self.check(self.fail_reads)?;
        self.db.get_cache_record(entity, category).await
    }

    async fn put_cache_record(
        &self, entity: &str, category: Category, fingerprint: &Digest, last_update: DateTime<Utc>,
    ) -> Result<(), Error> {
        self.check(self.fail_writes)?;
        self.db.put_cache_record(entity, category, fingerprint, last_update).await
    }

    async fn touch_fetch_attempt(&self, entity: &str, category: Category, at: DateTime<Utc>) -> Result<(), Error> {
        self.check(self.fail_writes)?;
        self.db.touch_fetch_attempt(entity, category, at).await
    }

    async fn get_entity_snapshot(&self, entity: &str) -> Result<Option<EntitySnapshot>, Error> {
        self.check(self.fail_reads)?;
        self.db.get_entity_snapshot(entity).await
    }

    async fn merge_entity_fields(&self, update: &EntityUpdate) -> Result<(), Error> {
        self.check(self.fail_writes)?;
        self.db.merge_entity_fields(update).await
    }
}
