//! Host platform identification.
//!
//! Release hosts name platforms the way Go does (`darwin`, `amd64`, ...),
//! not the way Rust does (`macos`, `x86_64`). [`Platform`] stores the release
//! host's spelling so it can be compared against index entries and spliced
//! into archive file names directly.
//!
//! # Example
//!
//! ```
//! use wtf_schema::Platform;
//!
//! let current = Platform::current();
//! println!("Running on: {current}");
//! ```

use std::fmt;

/// An `(os, arch)` pair in release-index naming.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    os: String,
    arch: String,
}

impl Platform {
    /// Build a platform from release-index names.
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Self::from_rust(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Translate Rust target names (`std::env::consts`) to release-index names.
    ///
    /// Unknown names pass through unchanged.
    pub fn from_rust(os: &str, arch: &str) -> Self {
        let os = match os {
            "macos" => "darwin",
            other => other,
        };
        let arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            other => other,
        };
        Self::new(os, arch)
    }

    /// Operating system name (`linux`, `darwin`, `windows`, ...).
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Architecture name (`amd64`, `arm64`, `386`, `arm`, ...).
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Whether an index build entry targets this platform.
    pub fn matches(&self, os: &str, arch: &str) -> bool {
        self.os == os && self.arch == arch
    }

    /// Whether executables carry a `.exe` suffix.
    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// File name of `tool`'s executable on this platform.
    pub fn executable_name(&self, tool: &str) -> String {
        if self.is_windows() {
            format!("{tool}.exe")
        } else {
            tool.to_string()
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}
