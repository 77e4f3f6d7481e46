//! League table position and recent form of a club.

use clubwatch_core::{Category, Error};
use scraper::{ElementRef, Html};

use super::{CategoryData, ExtractContext, Extractor, MatchResult, RecentForm};
use crate::html;

fn parse_count(cell: ElementRef<'_>, what: &str) -> Result<u32, Error> {
    let value = html::text(cell);
    value
        .parse()
        .map_err(|_| Error::ExtractFailed(format!("{what} is not a number: '{value}'")))
}

/// Direct `tbody > tr` rows of a table, skipping nested tables.
fn body_rows(table: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    table
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tbody")
        .flat_map(|tbody| tbody.children().filter_map(ElementRef::wrap))
        .filter(|el| el.value().name() == "tr")
}

pub struct LeaguePositionExtractor;

impl Extractor for LeaguePositionExtractor {
    fn category(&self) -> Category {
        Category::LeaguePosition
    }

    /// Rank of the row whose third cell names the club (case-insensitive).
    fn extract(&self, doc: &Html, ctx: &ExtractContext) -> Result<CategoryData, Error> {
        let table = html::select_first(doc, "table.items")?
            .ok_or_else(|| Error::ExtractFailed("league table not found".into()))?;
        let td = html::selector("td")?;
        let wanted = ctx.team_name.to_lowercase();

        for row in body_rows(table) {
            let cells = html::cells(row, &td);
            if cells.len() < 3 {
                continue;
            }
            if html::text(cells[2]).to_lowercase() == wanted {
                return parse_count(cells[0], "league rank").map(CategoryData::LeaguePosition);
            }
        }

        Err(Error::ExtractFailed(format!("'{}' not in league table", ctx.team_name)))
    }
}

pub struct RecentFormExtractor;

impl Extractor for RecentFormExtractor {
    fn category(&self) -> Category {
        Category::RecentForm
    }

    /// Win/draw/loss counts (cells 4-6) and the result markers of cell 10.
    fn extract(&self, doc: &Html, ctx: &ExtractContext) -> Result<CategoryData, Error> {
        let rows = html::selector("div.responsive-table table tbody tr")?;
        let club_link = html::selector("td.no-border-links.hauptlink a")?;
        let td = html::selector("td")?;
        let span = html::selector("span")?;
        let wanted = ctx.team_name.to_lowercase();

        let row = doc
            .select(&rows)
            .find(|row| {
                row.select(&club_link)
                    .next()
                    .is_some_and(|link| html::text(link).to_lowercase().contains(&wanted))
            })
            .ok_or_else(|| Error::ExtractFailed(format!("'{}' not in form table", ctx.team_name)))?;

        let cells = html::cells(row, &td);
        if cells.len() < 11 {
            return Err(Error::ExtractFailed(format!("form row has {} cells", cells.len())));
        }

        let last_matches = cells[10]
            .select(&span)
            .filter_map(|s| MatchResult::from_letter(&html::text(s)))
            .collect();

        Ok(CategoryData::RecentForm(RecentForm {
            wins: parse_count(cells[4], "wins")?,
            draws: parse_count(cells[5], "draws")?,
            losses: parse_count(cells[6], "losses")?,
            last_matches,
        }))
    }
}
