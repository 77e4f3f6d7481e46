//! Appearances and minutes from the club performance page.

use clubwatch_core::{Category, Error};
use regex::Regex;
use scraper::Html;

use super::{CategoryData, ExtractContext, Extractor, PlayerStat};
use crate::html;

const POSITION_LABELS: &str = r"(?i)(Merkez Orta Saha|Orta saha|Kaleci|Defans|Stoper|Sağ Bek|Sol Bek|On Numara|Forvet|Santrafor|Sol Kanat|Sağ Kanat)";
const NOT_USED: &str = "oynatılmadı";

/// Name-cell cleanup. The cell concatenates the full name, an abbreviated
/// repeat ("B. Saka") and the position label.
struct NameCleaner {
    positions: Regex,
    abbreviated_tail: Regex,
    initials: Regex,
}

impl NameCleaner {
    fn new() -> Result<Self, Error> {
        let compile = |re: &str| Regex::new(re).map_err(|e| Error::ExtractFailed(format!("bad pattern: {e}")));
        Ok(Self {
            positions: compile(POSITION_LABELS)?,
            abbreviated_tail: compile(r"^(.+?)\p{Lu}\.\s*\S.*$")?,
            initials: compile(r"\b\p{Lu}\.\s*")?,
        })
    }

    fn clean(&self, raw: &str) -> String {
        let without_position = self.positions.replace_all(raw, "");
        let mut name = without_position.trim().to_string();

        if let Some(caps) = self.abbreviated_tail.captures(&name) {
            let head = caps[1].trim();
            if !head.is_empty() {
                name = head.to_string();
            }
        }

        let name = self.initials.replace_all(&name, "");
        let mut words: Vec<&str> = name.split_whitespace().collect();
        if words.len() >= 2 && words[words.len() - 1] == words[words.len() - 2] {
            words.pop();
        }
        words.join(" ")
    }
}

/// First run of digits after dropping thousands separators and minute marks.
fn first_int(value: &str) -> u32 {
    let digits: String = value
        .chars()
        .filter(|c| !matches!(c, '\'' | '.' | ','))
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

pub struct PlayerStatsExtractor;

impl Extractor for PlayerStatsExtractor {
    fn category(&self) -> Category {
        Category::PlayerStatistics
    }

    /// Rows with at least 11 cells: name in cell 3, matches in cell 8 and
    /// minutes in cell 10. Players without minutes are skipped.
    fn extract(&self, doc: &Html, _ctx: &ExtractContext) -> Result<CategoryData, Error> {
        let table = html::select_first(doc, "table.items")?
            .ok_or_else(|| Error::ExtractFailed("performance table not found".into()))?;
        let rows = html::selector("tbody tr")?;
        let td = html::selector("td")?;
        let cleaner = NameCleaner::new()?;

        let mut players = Vec::new();
        for row in table.select(&rows) {
            let texts: Vec<String> = html::cells(row, &td).into_iter().map(html::compact_text).collect();
            if texts.len() < 11 {
                continue;
            }

            let name = cleaner.clean(&texts[3]);
            if name.is_empty() {
                continue;
            }

            let minutes_text = texts[10].replace(['\'', '.'], "");
            let unused = texts.iter().any(|t| t.to_lowercase().contains(NOT_USED));
            if unused || minutes_text.is_empty() || !minutes_text.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }

            let minutes_played = first_int(&minutes_text);
            if minutes_played == 0 {
                continue;
            }

            players.push(PlayerStat { name, played_matches: first_int(&texts[8]), minutes_played });
        }

        if players.is_empty() {
            return Err(Error::ExtractFailed("no player statistics found".into()));
        }

        Ok(CategoryData::PlayerStatistics(players))
    }
}
