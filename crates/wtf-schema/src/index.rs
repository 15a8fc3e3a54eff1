//! The release index document (`index.json`) served by the release host.
//!
//! ```json
//! { "versions": { "1.6.2": { "builds": [ { "os": "linux", "arch": "amd64" } ] } } }
//! ```
//!
//! Version keys are kept as raw strings: a key that is not a valid version
//! must not make the whole document unreadable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Top-level index document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseIndex {
    /// Releases keyed by their version string.
    #[serde(default)]
    pub versions: BTreeMap<String, ReleaseEntry>,
}

/// One release of the tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseEntry {
    /// Platform builds published for this release.
    #[serde(default)]
    pub builds: Vec<Build>,
}

/// A single platform build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    /// Operating system (`linux`, `darwin`, ...).
    pub os: String,
    /// Architecture (`amd64`, `arm64`, ...).
    pub arch: String,
    /// Archive file name, when the host publishes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl ReleaseIndex {
    /// Decode an index document.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the body is not a valid index document.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

impl ReleaseEntry {
    /// Whether any build targets `platform`.
    pub fn supports(&self, platform: &Platform) -> bool {
        self.builds
            .iter()
            .any(|build| platform.matches(&build.os, &build.arch))
    }
}
