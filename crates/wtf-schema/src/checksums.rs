//! `SHA256SUMS` manifests.
//!
//! One record per line, `<hex-sha256>␠␠<filename>`, the format written by
//! `sha256sum`. Lines that do not have exactly two fields are ignored.

/// A parsed checksum manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: Vec<(String, String)>,
}

impl ChecksumManifest {
    /// Parse manifest text. Never fails; malformed lines are skipped.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                match (fields.next(), fields.next(), fields.next()) {
                    (Some(digest), Some(filename), None) => {
                        // `sha256sum -b` marks binary mode with a leading `*`.
                        let filename = filename.strip_prefix('*').unwrap_or(filename);
                        Some((digest.to_string(), filename.to_string()))
                    }
                    _ => None,
                }
            })
            .collect();
        Self { entries }
    }

    /// The published digest for `filename`, if listed.
    pub fn digest_for(&self, filename: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, name)| name == filename)
            .map(|(digest, _)| digest.as_str())
    }

    /// Number of well-formed records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no well-formed records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
