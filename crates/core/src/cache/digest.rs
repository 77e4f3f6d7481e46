//! Typed content fingerprints.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

const VERIFIED_EMPTY: &str = "sentinel:verified-empty";
const FAILED: &str = "sentinel:failed";

/// Fingerprint of one category's upstream content.
///
/// `VerifiedEmpty` means the content was located and legitimately holds
/// nothing; `Failed` means the content could not be assessed at all.
/// The two are never interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Digest {
    Computed([u8; 32]),
    VerifiedEmpty,
    Failed,
}

impl Digest {
    pub fn is_failed(&self) -> bool {
        matches!(self, Digest::Failed)
    }

    /// Persisted form: 64 lowercase hex chars, or one of the sentinel strings.
    pub fn to_stored(&self) -> String {
        match self {
            Digest::Computed(bytes) => hex::encode(bytes),
            Digest::VerifiedEmpty => VERIFIED_EMPTY.to_string(),
            Digest::Failed => FAILED.to_string(),
        }
    }

    /// Parse the persisted form written by [`Digest::to_stored`].
    pub fn from_stored(value: &str) -> Result<Self, Error> {
        match value {
            VERIFIED_EMPTY => Ok(Digest::VerifiedEmpty),
            FAILED => Ok(Digest::Failed),
            hex_digest => {
                if hex_digest.len() != 64 || hex_digest.bytes().any(|b| b.is_ascii_uppercase()) {
                    return Err(Error::InvalidRecord(format!("malformed digest: {hex_digest}")));
                }
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(hex_digest, &mut bytes)
                    .map_err(|e| Error::InvalidRecord(format!("malformed digest: {e}")))?;
                Ok(Digest::Computed(bytes))
            }
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_stored())
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_stored()
    }
}

impl TryFrom<String> for Digest {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Digest::from_stored(&value)
    }
}
