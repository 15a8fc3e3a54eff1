//! Console output
//!
//! Progress goes to stderr so the wrapped tool's stdout is never mixed
//! with ours.

use std::path::Path;

use crossterm::style::Stylize;
use wtf_core::Reporter;
use wtf_schema::{TOOL_NAME, Version};

/// Reports installer progress on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn downloading(&self, version: &Version, url: &str) {
        eprintln!("{} {TOOL_NAME} {version} from {url}", "Downloading".cyan().bold());
    }

    fn verified(&self, version: &Version) {
        tracing::debug!("checksum ok for {version}");
    }

    fn installed(&self, version: &Version, path: &Path) {
        eprintln!(
            "{} {TOOL_NAME} {version} at {}",
            "Installed".green().bold(),
            path.display()
        );
    }

    fn already_installed(&self, version: &Version) {
        eprintln!("{} {TOOL_NAME} {version} is already installed", "Skipped".dark_grey());
    }

    fn failed(&self, request: &str, reason: &str) {
        eprintln!("{} {request}: {reason}", "Failed".red().bold());
    }
}

/// Print a line to stderr in verbose mode.
pub fn note(label: &str, value: impl std::fmt::Display) {
    eprintln!("{} {value}", format!("{label}:").dark_grey());
}
