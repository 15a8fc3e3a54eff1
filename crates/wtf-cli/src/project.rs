//! Find the version constraint declared by the project in a directory.
//!
//! Checked in order:
//! 1. the constraint file (`.terraform-version` by default): first line that
//!    is neither blank nor a `#` comment; `latest` means any version
//! 2. `versions.tf`: the `required_version = "..."` attribute; one that is
//!    not a string literal is an error
//! 3. nothing found: the empty constraint

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result, bail};
use regex::Regex;
use wtf_schema::Constraint;

pub const VERSIONS_TF: &str = "versions.tf";

pub fn detect(dir: &Path, constraint_file: &str) -> Result<Constraint> {
    let path = dir.join(constraint_file);
    if let Some(text) = read_optional(&path)? {
        let value = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'));
        match value {
            Some("latest") => return Ok(Constraint::any()),
            Some(value) => return parse(value, &path),
            None => tracing::debug!("{} declares no version", path.display()),
        }
    }

    let path = dir.join(VERSIONS_TF);
    if let Some(text) = read_optional(&path)? {
        let value = required_version(&text)
            .with_context(|| format!("failed to parse '{}'", path.display()))?;
        if let Some(value) = value {
            return parse(&value, &path);
        }
    }

    Ok(Constraint::any())
}

/// The `required_version` attribute of an HCL document, if present.
///
/// Comment lines are ignored. An attribute whose value is not a string
/// literal is an error.
fn required_version(hcl: &str) -> Result<Option<String>> {
    let code = hcl
        .lines()
        .filter(|line| {
            let line = line.trim_start();
            !line.starts_with('#') && !line.starts_with("//")
        })
        .collect::<Vec<_>>()
        .join("\n");

    let re = Regex::new(r#"\brequired_version\s*=\s*"([^"]*)""#)?;
    if let Some(caps) = re.captures(&code) {
        return Ok(Some(caps[1].to_string()));
    }
    if Regex::new(r"\brequired_version\s*=")?.is_match(&code) {
        bail!("required_version must be a string");
    }
    Ok(None)
}

fn parse(value: &str, source: &Path) -> Result<Constraint> {
    let constraint = Constraint::parse(value)
        .with_context(|| format!("invalid version constraint in '{}'", source.display()))?;
    tracing::debug!("constraint '{constraint}' from {}", source.display());
    Ok(constraint)
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("could not read '{}'", path.display())),
    }
}
