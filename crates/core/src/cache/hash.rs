//! Content digests over normalized text.

use sha2::{Digest as _, Sha256};

use super::Digest;

/// Collapse whitespace runs to a single space and trim the ends.
///
/// Case and punctuation are preserved.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn sha256(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Digest::Computed(hasher.finalize().into())
}

/// Digest a located section's text. Empty text is a verified empty state.
pub fn digest_text(text: &str) -> Digest {
    let normalized = normalize_text(text);
    if normalized.is_empty() {
        return Digest::VerifiedEmpty;
    }
    sha256(normalized.as_bytes())
}

/// Digest an unordered set of row keys.
///
/// Rows are normalized and sorted so upstream reordering does not register
/// as a change. No rows is a verified empty state.
pub fn digest_rows<S: AsRef<str>>(rows: &[S]) -> Digest {
    let mut keys: Vec<String> = rows
        .iter()
        .map(|row| normalize_text(row.as_ref()))
        .filter(|row| !row.is_empty())
        .collect();

    if keys.is_empty() {
        return Digest::VerifiedEmpty;
    }

    keys.sort();
    sha256(keys.join("|").as_bytes())
}
