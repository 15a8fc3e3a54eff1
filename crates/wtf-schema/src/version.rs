//! Version parsing and ordering.
//!
//! Versions are semantic versions with a lenient front end: a leading `v`
//! is accepted, missing minor/patch segments default to zero and numeric
//! segments are read as integers, so `v01.2` and `1.2.0` are the same value.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur when parsing a [`Version`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The input was empty (or only whitespace).
    #[error("empty version string")]
    Empty,

    /// The input is not a version.
    #[error("invalid version '{input}': {reason}")]
    Invalid {
        /// The rejected input, as given.
        input: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl VersionError {
    fn invalid(input: &str, reason: impl fmt::Display) -> Self {
        Self::Invalid {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// An immutable, totally ordered semantic version.
///
/// Ordering is numeric on major/minor/patch, a pre-release sorts before its
/// release (`2.0.0-alpha < 2.0.0`) and build metadata only breaks ties, which
/// keeps `Ord` consistent with structural equality.
///
/// # Example
///
/// ```
/// use wtf_schema::Version;
///
/// let a: Version = "v1.02".parse().unwrap();
/// let b: Version = "1.2.0".parse().unwrap();
/// assert_eq!(a, b);
/// assert!("2.0.0-alpha".parse::<Version>().unwrap() < "2.0.0".parse().unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(semver::Version);

impl Version {
    /// Create a release version from its numeric parts.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Parse a version string.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError`] if the input is empty, has more than three
    /// numeric segments, a non-numeric segment, or malformed pre-release or
    /// build identifiers.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        Self::parse_counted(input).map(|(version, _)| version)
    }

    /// Parse a version and report how many numeric segments were written.
    ///
    /// `~> 1.2` and `~> 1.2.0` mean different things, so constraint parsing
    /// needs to know the precision the author used.
    pub(crate) fn parse_counted(input: &str) -> Result<(Self, usize), VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }
        let raw = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let (rest, build) = match raw.split_once('+') {
            Some((rest, build)) => (rest, Some(build)),
            None => (raw, None),
        };
        let (core, pre) = match rest.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (rest, None),
        };

        let segments: Vec<&str> = core.split('.').collect();
        if segments.len() > 3 {
            return Err(VersionError::invalid(
                input,
                "more than three numeric segments",
            ));
        }

        let mut numbers = [0u64; 3];
        for (slot, segment) in numbers.iter_mut().zip(&segments) {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionError::invalid(
                    input,
                    format!("'{segment}' is not a number"),
                ));
            }
            *slot = segment
                .parse::<u64>()
                .map_err(|e| VersionError::invalid(input, e))?;
        }

        let pre = match pre {
            Some("") => return Err(VersionError::invalid(input, "empty pre-release")),
            Some(pre) => {
                semver::Prerelease::new(pre).map_err(|e| VersionError::invalid(input, e))?
            }
            None => semver::Prerelease::EMPTY,
        };
        let build = match build {
            Some("") => return Err(VersionError::invalid(input, "empty build metadata")),
            Some(build) => {
                semver::BuildMetadata::new(build).map_err(|e| VersionError::invalid(input, e))?
            }
            None => semver::BuildMetadata::EMPTY,
        };

        let [major, minor, patch] = numbers;
        let version = semver::Version {
            major,
            minor,
            patch,
            pre,
            build,
        };
        Ok((Self(version), segments.len()))
    }

    /// Major version number.
    pub fn major(&self) -> u64 {
        self.0.major
    }

    /// Minor version number.
    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    /// Patch version number.
    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    /// The numeric `[major, minor, patch]` triple.
    pub fn segments(&self) -> [u64; 3] {
        [self.0.major, self.0.minor, self.0.patch]
    }

    /// Pre-release tag without the leading `-`, empty for releases.
    pub fn pre(&self) -> &str {
        self.0.pre.as_str()
    }

    /// Whether this is a pre-release (`1.0.0-rc1`).
    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }

    /// Compare by semantic-versioning precedence, ignoring build metadata.
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        self.segments()
            .cmp(&other.segments())
            .then_with(|| self.0.pre.cmp(&other.0.pre))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
