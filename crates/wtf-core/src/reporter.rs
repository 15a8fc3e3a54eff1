//! Reporter trait for dependency injection
//!
//! Lets the installer report progress without being coupled to a
//! particular console implementation.

use std::path::Path;

use wtf_schema::Version;

pub trait Reporter {
    /// A download of `version` is starting from `url`.
    fn downloading(&self, version: &Version, url: &str);

    /// The archive for `version` passed checksum verification.
    fn verified(&self, version: &Version);

    /// `version` was written to `path`.
    fn installed(&self, version: &Version, path: &Path);

    /// `version` was already present and nothing was downloaded.
    fn already_installed(&self, version: &Version);

    /// A batch request failed.
    fn failed(&self, request: &str, reason: &str);
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn downloading(&self, _: &Version, _: &str) {}
    fn verified(&self, _: &Version) {}
    fn installed(&self, _: &Version, _: &Path) {}
    fn already_installed(&self, _: &Version) {}
    fn failed(&self, _: &str, _: &str) {}
}
