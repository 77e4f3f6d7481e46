//! Suspended players from the overview page markers and the squad page.
//!
//! Both categories fingerprint their marker rows rather than the page
//! section, since "nobody suspended" is a legitimate and common state. The
//! row scan is scoped to `table.items`; without it the digest is `Failed`.

use clubwatch_core::{Category, Digest, Error};
use scraper::{ElementRef, Html};

use super::{CategoryData, ExtractContext, Extractor, Suspension, SuspensionKind};
use crate::fingerprint::fingerprint_rows;
use crate::html;

const SCOPE: &str = "table.items";

/// A row carrying a suspension marker.
#[derive(Debug)]
struct MarkedRow {
    name: String,
    title: String,
    number: Option<String>,
    position: Option<String>,
}

impl MarkedRow {
    fn key(&self) -> String {
        format!("{}:{}", self.name, self.title)
    }

    fn into_suspension(self, position: Option<String>) -> Suspension {
        Suspension {
            name: self.name,
            number: self.number,
            position,
            kind: SuspensionKind::from_title(&self.title),
            details: self.title,
        }
    }
}

fn scope<'a>(doc: &'a Html, selector: Option<&str>) -> Result<ElementRef<'a>, Error> {
    let css = selector.unwrap_or(SCOPE);
    html::select_first(doc, css)?.ok_or_else(|| Error::ExtractFailed(format!("{css} not found")))
}

fn digest(rows: Result<Vec<MarkedRow>, Error>) -> Digest {
    fingerprint_rows(rows.ok().map(|rows| rows.iter().map(MarkedRow::key).collect()))
}

/// Marker spans on the player link of the overview squad table.
fn overview_rows(table: ElementRef<'_>) -> Result<Vec<MarkedRow>, Error> {
    let rows = html::selector("tr.odd, tr.even")?;
    let link = html::selector("table.inline-table a[href]")?;
    let marker = html::selector("span.ausfall-1-table, span.ausfall-2-table, span.ausfall-3-table")?;

    let mut marked = Vec::new();
    for row in table.select(&rows) {
        let Some(link) = row.select(&link).next() else {
            continue;
        };
        let Some(span) = link.select(&marker).next() else {
            continue;
        };
        marked.push(MarkedRow {
            name: html::text(link),
            title: span.value().attr("title").unwrap_or_default().trim().to_string(),
            number: None,
            position: None,
        });
    }
    Ok(marked)
}

/// `span.ausfall-table` markers of the season squad page.
fn squad_rows(table: ElementRef<'_>) -> Result<Vec<MarkedRow>, Error> {
    let rows = html::selector("tr.odd, tr.even")?;
    let marker = html::selector("span.ausfall-table")?;
    let name_cell = html::selector("td.hauptlink")?;
    let number = html::selector("div.rn_nummer")?;
    let pos_cell = html::selector("td.posrela")?;
    let td = html::selector("td")?;

    let mut marked = Vec::new();
    for row in table.select(&rows) {
        let Some(span) = row.select(&marker).next() else {
            continue;
        };
        let Some(name) = row.select(&name_cell).next().map(html::text) else {
            tracing::debug!("suspension marker without player name");
            continue;
        };

        let number = row
            .select(&number)
            .next()
            .map(html::text)
            .filter(|n| !n.is_empty() && n != "-");

        let position = row.select(&pos_cell).next().and_then(|cell| {
            let nested = html::cells(cell, &td);
            if nested.len() > 1 { nested.last().map(|c| html::text(*c)) } else { None }
        });

        marked.push(MarkedRow {
            name,
            title: span.value().attr("title").unwrap_or_default().trim().to_string(),
            number,
            position: position.filter(|p| !p.is_empty()),
        });
    }
    Ok(marked)
}

/// Red and yellow card suspensions flagged on the overview page.
pub struct SuspensionExtractor;

impl Extractor for SuspensionExtractor {
    fn category(&self) -> Category {
        Category::Suspensions
    }

    fn fingerprint(&self, doc: &Html, selector: Option<&str>) -> Digest {
        digest(scope(doc, selector).and_then(overview_rows))
    }

    fn extract(&self, doc: &Html, ctx: &ExtractContext) -> Result<CategoryData, Error> {
        let rows = overview_rows(scope(doc, None)?)?;
        let suspensions = rows
            .into_iter()
            .map(|row| {
                let position = ctx.position_of(&row.name);
                row.into_suspension(position)
            })
            .collect();
        Ok(CategoryData::Suspensions(suspensions))
    }
}

/// Suspensions listed on the season squad page, with shirt number and position.
pub struct SecondarySuspensionExtractor;

impl Extractor for SecondarySuspensionExtractor {
    fn category(&self) -> Category {
        Category::SuspensionsSecondary
    }

    fn fingerprint(&self, doc: &Html, selector: Option<&str>) -> Digest {
        digest(scope(doc, selector).and_then(squad_rows))
    }

    fn extract(&self, doc: &Html, _ctx: &ExtractContext) -> Result<CategoryData, Error> {
        let rows = squad_rows(scope(doc, None)?)?;
        let suspensions = rows
            .into_iter()
            .map(|mut row| {
                let position = row.position.take();
                row.into_suspension(position)
            })
            .collect();
        Ok(CategoryData::Suspensions(suspensions))
    }
}
