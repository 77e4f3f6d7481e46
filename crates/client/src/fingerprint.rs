//! Section and row fingerprints of fetched pages.
//!
//! A selector that matches nothing yields [`Digest::Failed`], never an empty
//! digest, so a layout change upstream cannot pass for "no data".

use clubwatch_core::Digest;
use clubwatch_core::cache::hash::{digest_rows, digest_text};
use scraper::Html;

use crate::html;

/// Fingerprint a whole document, or the first element matching `selector`.
pub fn fingerprint(doc: &Html, selector: Option<&str>) -> Digest {
    let Some(css) = selector else {
        return digest_text(&html::text(doc.root_element()));
    };

    match html::select_first(doc, css) {
        Ok(Some(section)) => digest_text(&html::text(section)),
        Ok(None) => {
            tracing::debug!(selector = css, "fingerprint section not found");
            Digest::Failed
        }
        Err(e) => {
            tracing::warn!(selector = css, error = %e, "fingerprint selector rejected");
            Digest::Failed
        }
    }
}

/// Fingerprint a set of row keys; `None` means the scan could not run.
pub fn fingerprint_rows(rows: Option<Vec<String>>) -> Digest {
    match rows {
        Some(rows) => digest_rows(&rows),
        None => Digest::Failed,
    }
}
