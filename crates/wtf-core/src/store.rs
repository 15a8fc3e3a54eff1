//! The local version store.
//!
//! A flat directory whose immediate children are executables named by their
//! version (`<store>/1.6.2`). Anything whose name does not parse as a
//! version is ignored, so the directory can share space with stray files
//! such as `.DS_Store`.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use wtf_schema::{Constraint, Version};

use crate::resolve;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access version store {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no versions installed in {}", .location.display())]
    EmptyStore { location: PathBuf },

    #[error("no installed version matches constraint '{constraint}'")]
    NoMatch { constraint: String },
}

/// Installed versions and where their binaries live.
#[derive(Debug, Clone)]
pub struct VersionStore {
    location: PathBuf,
    versions: BTreeMap<Version, PathBuf>,
}

impl VersionStore {
    /// Open the store at `location`, creating the directory if needed, and
    /// scan it.
    pub fn load(location: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let location = location.into();
        let fs_error = |source| StoreError::Filesystem {
            path: location.clone(),
            source,
        };

        fs::create_dir_all(&location).map_err(fs_error)?;

        let mut names = Vec::new();
        for entry in fs::read_dir(&location).map_err(fs_error)? {
            let entry = entry.map_err(fs_error)?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::trace!("skipping non UTF-8 store entry {raw:?}"),
            }
        }
        // Directory order is unspecified; sorting makes duplicate handling stable.
        names.sort();

        let mut versions = BTreeMap::new();
        for name in names {
            let version = match Version::parse(&name) {
                Ok(version) => version,
                Err(e) => {
                    tracing::trace!("skipping store entry '{name}': {e}");
                    continue;
                }
            };
            let path = location.join(&name);

            match versions.entry(version) {
                Entry::Vacant(slot) => {
                    slot.insert(path);
                }
                Entry::Occupied(mut slot) => {
                    let canonical = slot.key().to_string();
                    if name == canonical {
                        tracing::debug!(
                            "'{name}' replaces {} for version {canonical}",
                            slot.get().display()
                        );
                        slot.insert(path);
                    } else {
                        tracing::debug!("ignoring duplicate store entry '{name}' for {canonical}");
                    }
                }
            }
        }

        tracing::debug!(
            "loaded {} version(s) from {}",
            versions.len(),
            location.display()
        );
        Ok(Self { location, versions })
    }

    /// The store directory.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Installed versions, ascending.
    pub fn list_installed(&self) -> Vec<Version> {
        self.versions.keys().cloned().collect()
    }

    pub fn contains(&self, version: &Version) -> bool {
        self.versions.contains_key(version)
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Path of the binary for `version`.
    ///
    /// For versions that are not installed this is where the installer
    /// will put them.
    pub fn binary_path(&self, version: &Version) -> PathBuf {
        self.versions
            .get(version)
            .cloned()
            .unwrap_or_else(|| self.location.join(version.to_string()))
    }

    /// The greatest installed version satisfying `constraint`.
    pub fn find_latest(&self, constraint: &Constraint) -> Result<Version, StoreError> {
        if self.versions.is_empty() {
            return Err(StoreError::EmptyStore {
                location: self.location.clone(),
            });
        }

        let found = resolve::select_latest(self.versions.keys(), constraint).ok_or_else(|| {
            StoreError::NoMatch {
                constraint: constraint.to_string(),
            }
        })?;
        tracing::debug!("constraint '{constraint}' resolved to {found}");
        Ok(found.clone())
    }

    /// Make a freshly written binary visible to later lookups.
    pub(crate) fn record(&mut self, version: Version, path: PathBuf) {
        self.versions.insert(version, path);
    }
}

impl fmt::Display for VersionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for version in self.versions.keys() {
            writeln!(f, "{version}")?;
        }
        Ok(())
    }
}
