//! Squad list from the club overview page.

use clubwatch_core::{Category, Error};
use scraper::Html;

use super::{CategoryData, ExtractContext, Extractor, Player};
use crate::html;

pub struct RosterExtractor;

impl Extractor for RosterExtractor {
    fn category(&self) -> Category {
        Category::Roster
    }

    /// One player per `tr.odd`/`tr.even` row of the first `table.items`.
    ///
    /// Cells are counted across nested tables: the fifth is the position and
    /// the last is the market value.
    fn extract(&self, doc: &Html, _ctx: &ExtractContext) -> Result<CategoryData, Error> {
        let table = html::select_first(doc, "table.items")?
            .ok_or_else(|| Error::ExtractFailed("squad table not found".into()))?;

        let rows = html::selector("tr.odd, tr.even")?;
        let name_cell = html::selector("td.hauptlink")?;
        let td = html::selector("td")?;

        let mut players = Vec::new();
        for row in table.select(&rows) {
            let Some(name) = row.select(&name_cell).next().map(html::text) else {
                continue;
            };
            let cells = html::cells(row, &td);
            if name.is_empty() || cells.len() < 5 {
                tracing::debug!(%name, cells = cells.len(), "skipping malformed squad row");
                continue;
            }

            players.push(Player {
                name,
                position: html::text(cells[4]),
                market_value: cells.last().map(|c| html::text(*c)).unwrap_or_default(),
            });
        }

        if players.is_empty() {
            return Err(Error::ExtractFailed("squad table has no players".into()));
        }

        Ok(CategoryData::Roster(players))
    }
}
