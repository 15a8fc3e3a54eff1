//! The remote release catalog.
//!
//! Release hosts follow the HashiCorp layout:
//!
//! ```text
//! <base>/index.json
//! <base>/<version>/<tool>_<version>_SHA256SUMS
//! <base>/<version>/<tool>_<version>_<os>_<arch>.zip
//! ```
//!
//! Nothing is cached; every call hits the network.

use reqwest::blocking::Client;
use wtf_schema::{Constraint, DEFAULT_RELEASE_URL, Platform, ReleaseIndex, TOOL_NAME, Version};

use crate::io::fetch::{self, FetchError};

/// Where releases of a tool come from and which platform to pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSource {
    tool: String,
    base_url: String,
    platform: Platform,
}

impl ReleaseSource {
    /// Releases of `terraform` for the host platform under `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            tool: TOOL_NAME.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            platform: Platform::current(),
        }
    }

    /// Target a platform other than the host.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn index_url(&self) -> String {
        format!("{}/index.json", self.base_url)
    }

    pub fn checksums_url(&self, version: &Version) -> String {
        format!(
            "{}/{version}/{}_{version}_SHA256SUMS",
            self.base_url, self.tool
        )
    }

    /// `terraform_1.6.2_linux_amd64.zip`
    pub fn archive_name(&self, version: &Version) -> String {
        format!("{}_{version}_{}.zip", self.tool, self.platform)
    }

    pub fn archive_url(&self, version: &Version) -> String {
        format!(
            "{}/{version}/{}",
            self.base_url,
            self.archive_name(version)
        )
    }

    /// Name of the executable inside the archive.
    pub fn executable_name(&self) -> String {
        self.platform.executable_name(&self.tool)
    }
}

impl Default for ReleaseSource {
    fn default() -> Self {
        Self::new(DEFAULT_RELEASE_URL)
    }
}

/// Client for a [`ReleaseSource`].
#[derive(Debug, Clone)]
pub struct ReleaseCatalog {
    source: ReleaseSource,
    client: Client,
}

impl ReleaseCatalog {
    pub fn new(source: ReleaseSource) -> Result<Self, FetchError> {
        let client = fetch::client().map_err(|source_err| FetchError::Transport {
            url: source.base_url.clone(),
            source: source_err,
        })?;
        Ok(Self { source, client })
    }

    pub fn source(&self) -> &ReleaseSource {
        &self.source
    }

    /// Versions that have a build for the target platform, ascending and
    /// without duplicates.
    pub fn list_available(&self) -> Result<Vec<Version>, FetchError> {
        let url = self.source.index_url();
        let body = self.fetch(&url)?;
        let index =
            ReleaseIndex::from_json(&body).map_err(|source| FetchError::Decode { url, source })?;

        let mut versions: Vec<Version> = index
            .versions
            .iter()
            .filter(|(_, release)| release.supports(&self.source.platform))
            .filter_map(|(key, _)| match Version::parse(key) {
                Ok(version) => Some(version),
                Err(e) => {
                    tracing::debug!("skipping index key '{key}': {e}");
                    None
                }
            })
            .collect();
        versions.sort();
        versions.dedup();

        tracing::debug!(
            "{} release(s) available for {}",
            versions.len(),
            self.source.platform
        );
        Ok(versions)
    }

    /// The greatest available version accepted by `constraint`.
    ///
    /// The empty constraint picks the newest release; a pre-release is only
    /// chosen when a clause names one.
    pub fn latest_matching(&self, constraint: &Constraint) -> Result<Option<Version>, FetchError> {
        let available = self.list_available()?;
        let candidates = available
            .iter()
            .filter(|version| !(constraint.is_any() && version.is_prerelease()));
        Ok(crate::resolve::select_latest(candidates, constraint).cloned())
    }

    pub(crate) fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        fetch::get_bytes(&self.client, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const INDEX: &str = r#"{
        "name": "terraform",
        "versions": {
            "1.5.7": { "builds": [ { "os": "linux", "arch": "amd64" }, { "os": "darwin", "arch": "arm64" } ] },
            "1.6.0-rc1": { "builds": [ { "os": "linux", "arch": "amd64" } ] },
            "1.6.2": { "builds": [ { "os": "linux", "arch": "amd64" } ] },
            "0.11.15": { "builds": [ { "os": "linux", "arch": "amd64" } ] },
            "0.12.0": { "builds": [ { "os": "darwin", "arch": "amd64" } ] },
            "v1.6.2": { "builds": [ { "os": "linux", "arch": "amd64" } ] },
            "nightly": { "builds": [ { "os": "linux", "arch": "amd64" } ] }
        }
    }"#;

    fn catalog(server: &Server) -> ReleaseCatalog {
        let source =
            ReleaseSource::new(format!("{}/", server.url())).with_platform(Platform::new("linux", "amd64"));
        ReleaseCatalog::new(source).unwrap()
    }

    #[test]
    fn urls_follow_release_layout() {
        let source = ReleaseSource::new("https://releases.example.com/terraform/")
            .with_platform(Platform::new("darwin", "arm64"));
        let v = Version::new(1, 6, 2);

        assert_eq!(source.index_url(), "https://releases.example.com/terraform/index.json");
        assert_eq!(
            source.checksums_url(&v),
            "https://releases.example.com/terraform/1.6.2/terraform_1.6.2_SHA256SUMS"
        );
        assert_eq!(source.archive_name(&v), "terraform_1.6.2_darwin_arm64.zip");
        assert_eq!(
            source.archive_url(&v),
            "https://releases.example.com/terraform/1.6.2/terraform_1.6.2_darwin_arm64.zip"
        );
        assert_eq!(source.executable_name(), "terraform");
    }

    #[test]
    fn lists_platform_versions_sorted_and_deduplicated() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/index.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(INDEX)
            .create();

        let versions = catalog(&server).list_available().unwrap();

        let rendered: Vec<String> = versions.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["0.11.15", "1.5.7", "1.6.0-rc1", "1.6.2"]);
        mock.assert();
    }

    #[test]
    fn latest_matching_applies_constraint() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/index.json")
            .with_status(200)
            .with_body(INDEX)
            .expect(3)
            .create();
        let catalog = catalog(&server);

        assert_eq!(
            catalog.latest_matching(&Constraint::any()).unwrap(),
            Some(Version::new(1, 6, 2))
        );
        assert_eq!(
            catalog.latest_matching(&"~> 1.5.0".parse().unwrap()).unwrap(),
            Some(Version::new(1, 5, 7))
        );
        assert_eq!(
            catalog.latest_matching(&">= 2.0.0".parse().unwrap()).unwrap(),
            None
        );
    }

    #[test]
    fn any_constraint_skips_newer_prereleases() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/index.json")
            .with_status(200)
            .with_body(
                r#"{"versions":{
                    "1.6.2":{"builds":[{"os":"linux","arch":"amd64"}]},
                    "1.7.0-alpha20240101":{"builds":[{"os":"linux","arch":"amd64"}]}
                }}"#,
            )
            .expect(3)
            .create();
        let catalog = catalog(&server);

        assert_eq!(
            catalog.latest_matching(&Constraint::any()).unwrap(),
            Some(Version::new(1, 6, 2))
        );
        assert_eq!(
            catalog
                .latest_matching(&">= 1.7.0-alpha20240101".parse().unwrap())
                .unwrap(),
            Some("1.7.0-alpha20240101".parse().unwrap())
        );
        assert_eq!(
            catalog.latest_matching(&"= 1.7.0-alpha20240101".parse().unwrap()).unwrap(),
            Some("1.7.0-alpha20240101".parse().unwrap())
        );
    }

    #[test]
    fn http_error_is_status() {
        let mut server = Server::new();
        let _mock = server.mock("GET", "/index.json").with_status(503).create();

        let err = catalog(&server).list_available().unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 503));
    }

    #[test]
    fn malformed_body_is_decode_error() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/index.json")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create();

        let err = catalog(&server).list_available().unwrap_err();
        match err {
            FetchError::Decode { url, .. } => assert!(url.ends_with("/index.json")),
            other => panic!("expected Decode, got {other:?}"),
        }
    }
}
