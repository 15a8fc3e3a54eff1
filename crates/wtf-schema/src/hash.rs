//! SHA-256 digests for archive verification.

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

/// A SHA-256 digest as 64 lowercase hex characters.
///
/// Validated at construction, so a value of this type always holds a
/// well-formed digest. Comparison against published checksums is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Validate a hex digest, accepting an optional `sha256:` prefix.
    ///
    /// # Errors
    ///
    /// Returns an error string if the hex part is not exactly 64 ASCII hex
    /// characters.
    pub fn new(s: &str) -> Result<Self, String> {
        let hex = s.strip_prefix("sha256:").unwrap_or(s);
        if hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(hex.to_ascii_lowercase()))
        } else {
            Err(format!(
                "Invalid SHA256 digest: expected 64 hex chars, got '{s}'"
            ))
        }
    }

    /// Compute the digest of `data`.
    pub fn compute(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    /// Whether this digest equals a published hex string, ignoring case.
    pub fn matches(&self, published: &str) -> bool {
        self.0.eq_ignore_ascii_case(published.trim())
    }

    /// The digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
