//! Small helpers over `scraper` shared by the fingerprinter and extractors.

use clubwatch_core::Error;
use clubwatch_core::cache::hash::normalize_text;
use scraper::{ElementRef, Html, Selector};

/// Parse a CSS selector, reporting failures as extraction errors.
pub fn selector(css: &str) -> Result<Selector, Error> {
    Selector::parse(css).map_err(|e| Error::ExtractFailed(format!("invalid selector '{css}': {e}")))
}

/// First element matching `css` in the document.
pub fn select_first<'a>(doc: &'a Html, css: &str) -> Result<Option<ElementRef<'a>>, Error> {
    let sel = selector(css)?;
    Ok(doc.select(&sel).next())
}

/// Text nodes joined with a space, then whitespace-normalized.
pub fn text(el: ElementRef<'_>) -> String {
    normalize_text(&el.text().collect::<Vec<_>>().join(" "))
}

/// Trimmed text nodes concatenated without a separator.
///
/// Matches how cell contents read when inline markup splits a value.
pub fn compact_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

pub fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// Direct and nested `td` cells of a row, in document order.
pub fn cells<'a>(row: ElementRef<'a>, td: &Selector) -> Vec<ElementRef<'a>> {
    row.select(td).collect()
}
