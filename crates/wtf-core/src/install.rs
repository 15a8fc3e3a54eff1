//! Download, verify and install missing versions.
//!
//! The archive is held in memory until its SHA-256 digest matches the
//! published manifest; only then is the executable extracted and written
//! into the store, through a temporary file renamed onto the version name.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use wtf_schema::{ChecksumManifest, Constraint, Sha256Digest, Version, VersionError};
use zip::result::ZipError;

use crate::catalog::ReleaseCatalog;
use crate::io::archive;
use crate::io::fetch::FetchError;
use crate::reporter::Reporter;
use crate::store::VersionStore;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("no checksum published for {filename}")]
    ChecksumNotFound { filename: String },

    #[error("checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    #[error("cannot read archive {filename}: {source}")]
    Archive {
        filename: String,
        #[source]
        source: ZipError,
    },

    #[error("archive does not contain '{name}'")]
    ExecutableNotFound { name: String },

    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why one request of a batch install failed.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    #[error("no release available for this platform")]
    NoRelease,

    #[error(transparent)]
    Install(#[from] InstallError),
}

impl From<FetchError> for BatchError {
    fn from(err: FetchError) -> Self {
        Self::Install(InstallError::Fetch(err))
    }
}

/// A failed request, tagged with the text the caller asked for.
#[derive(Debug)]
pub struct InstallFailure {
    pub request: String,
    pub error: BatchError,
}

/// Outcome of [`Installer::install_all`].
#[derive(Debug, Default)]
pub struct InstallReport {
    pub installed: Vec<(Version, PathBuf)>,
    pub already_installed: Vec<Version>,
    pub failures: Vec<InstallFailure>,
}

impl InstallReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Installs versions from a [`ReleaseCatalog`] into a [`VersionStore`].
#[derive(Debug)]
pub struct Installer<'a, R: Reporter> {
    catalog: &'a ReleaseCatalog,
    reporter: &'a R,
}

impl<'a, R: Reporter> Installer<'a, R> {
    pub fn new(catalog: &'a ReleaseCatalog, reporter: &'a R) -> Self {
        Self { catalog, reporter }
    }

    /// Download `version` for the catalog's platform, verify it, and write
    /// the executable to the store. Returns the installed path.
    ///
    /// An existing file at the destination is overwritten.
    pub fn download_version(
        &self,
        store: &mut VersionStore,
        version: &Version,
    ) -> Result<PathBuf, InstallError> {
        let source = self.catalog.source();
        let filename = source.archive_name(version);

        let sums = self.catalog.fetch(&source.checksums_url(version))?;
        let manifest = ChecksumManifest::parse(&String::from_utf8_lossy(&sums));
        let expected = manifest
            .digest_for(&filename)
            .ok_or_else(|| InstallError::ChecksumNotFound {
                filename: filename.clone(),
            })?
            .to_string();

        let url = source.archive_url(version);
        self.reporter.downloading(version, &url);
        let body = self.catalog.fetch(&url)?;

        let actual = Sha256Digest::compute(&body);
        if !actual.matches(&expected) {
            return Err(InstallError::ChecksumMismatch {
                filename,
                expected,
                actual: actual.to_string(),
            });
        }
        tracing::debug!("checksum verified for {filename}");
        self.reporter.verified(version);

        let name = source.executable_name();
        let binary = archive::read_entry(&body, &name)
            .map_err(|source| InstallError::Archive {
                filename: filename.clone(),
                source,
            })?
            .ok_or(InstallError::ExecutableNotFound { name })?;

        let dest = store.location().join(version.to_string());
        write_executable(&dest, &binary).map_err(|source| InstallError::Io {
            path: dest.clone(),
            source,
        })?;
        tracing::debug!("installed {version} at {}", dest.display());

        store.record(version.clone(), dest.clone());
        self.reporter.installed(version, &dest);
        Ok(dest)
    }

    /// Install every request, continuing past failures.
    ///
    /// A request is a version string or `latest`. Versions already in the
    /// store are skipped without touching the network.
    pub fn install_all(&self, store: &mut VersionStore, requests: &[String]) -> InstallReport {
        let mut report = InstallReport::default();

        for request in requests {
            match self.install_one(store, request) {
                Ok(Installed::Fresh(version, path)) => report.installed.push((version, path)),
                Ok(Installed::Existing(version)) => {
                    self.reporter.already_installed(&version);
                    report.already_installed.push(version);
                }
                Err(error) => {
                    self.reporter.failed(request, &error.to_string());
                    report.failures.push(InstallFailure {
                        request: request.clone(),
                        error,
                    });
                }
            }
        }

        report
    }

    fn install_one(&self, store: &mut VersionStore, request: &str) -> Result<Installed, BatchError> {
        let version = if request.trim() == "latest" {
            self.catalog
                .latest_matching(&Constraint::any())?
                .ok_or(BatchError::NoRelease)?
        } else {
            Version::parse(request)?
        };

        if store.contains(&version) {
            return Ok(Installed::Existing(version));
        }
        let path = self.download_version(store, &version)?;
        Ok(Installed::Fresh(version, path))
    }
}

enum Installed {
    Fresh(Version, PathBuf),
    Existing(Version),
}

/// Write `bytes` to a temporary file beside `dest` and rename it into place,
/// so `dest` only ever holds a complete executable. The temporary file is
/// removed if any step fails.
fn write_executable(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::Builder::new()
        .prefix(".wtf-download.")
        .tempfile_in(dir)?;
    file.write_all(bytes)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o700))?;
    }

    file.as_file().sync_all()?;
    file.persist(dest)?;
    Ok(())
}
