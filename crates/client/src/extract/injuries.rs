//! Injured players from the absences page.

use clubwatch_core::{Category, Error};
use scraper::{ElementRef, Html};

use super::{CategoryData, ExtractContext, Extractor, Injury};
use crate::html;

/// Header cell opening the injury section of the absences table.
const INJURY_HEADER: &str = "Sakatlıklar";

const ABSENCES_TABLE: &str = "table.items";

pub struct InjuryExtractor;

impl Extractor for InjuryExtractor {
    fn category(&self) -> Category {
        Category::Injuries
    }

    /// Rows between the injury header and the next `extrarow` header.
    ///
    /// A missing absences table is `ExtractFailed`; a table without the
    /// header lists no injuries.
    fn extract(&self, doc: &Html, ctx: &ExtractContext) -> Result<CategoryData, Error> {
        let table = html::select_first(doc, ABSENCES_TABLE)?
            .ok_or_else(|| Error::ExtractFailed(format!("{ABSENCES_TABLE} not found")))?;
        let td = html::selector("td")?;
        let player_link = html::selector("table.inline-table a[href]")?;

        let header_row = table
            .select(&td)
            .find(|cell| html::text(*cell) == INJURY_HEADER)
            .and_then(|cell| {
                cell.ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|el| el.value().name() == "tr")
            });

        let Some(header_row) = header_row else {
            return Ok(CategoryData::Injuries(Vec::new()));
        };

        let injuries = header_row
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .take_while(|row| !html::has_class(*row, "extrarow"))
            .filter_map(|row| row.select(&player_link).next())
            .map(|link| {
                let name = html::text(link);
                let position = ctx.position_of(&name);
                Injury { name, position }
            })
            .filter(|injury| !injury.name.is_empty())
            .collect();

        Ok(CategoryData::Injuries(injuries))
    }
}
