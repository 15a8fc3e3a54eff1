//! Configuration file handling
//!
//! The config is TOML, looked up at `$WTF_CONFIG`, then
//! `$XDG_CONFIG_HOME/wtf/config.toml`, then `~/.config/wtf/config.toml`.
//! Every key is optional:
//!
//! ```toml
//! binary_store_path = "~/.local/share/wtf/terraform-versions"
//! version_constraint_file_name = ".terraform-version"
//! release_url = "https://releases.hashicorp.com/terraform"
//! auto_install = true
//!
//! [wrapper]
//! script_template = ""
//! ```
//!
//! Environment access goes through an injected lookup function so path
//! resolution can be tested without touching the process environment.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use wtf_core::ReleaseSource;
use wtf_schema::DEFAULT_RELEASE_URL;

/// Looks up an environment variable.
pub type Env<'a> = &'a dyn Fn(&str) -> Option<String>;

/// The real process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

const DEFAULT_CONSTRAINT_FILE: &str = ".terraform-version";

/// Effective configuration, with defaults applied and paths expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub binary_store_path: PathBuf,
    pub version_constraint_file_name: String,
    pub release_url: String,
    pub auto_install: bool,
    pub wrapper: WrapperConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapperConfig {
    /// Handlebars template for the wrapper script; empty disables wrapping.
    ///
    /// Go-template field references, `if`/`if not`/`else`/`end` and the
    /// `{{-`/`-}}` trim markers are also understood.
    pub script_template: String,
}

/// The file as written, before defaults.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    binary_store_path: Option<String>,
    version_constraint_file_name: Option<String>,
    release_url: Option<String>,
    auto_install: Option<bool>,
    #[serde(default)]
    wrapper: WrapperConfig,
}

impl Config {
    /// Load the config file (if any) and apply defaults.
    pub fn load(env: Env<'_>) -> Result<Self> {
        let file = match config_path(env) {
            Some(path) => read_file(&path)?,
            None => {
                tracing::debug!("no home directory; using default configuration");
                ConfigFile::default()
            }
        };
        Self::resolve(file, env)
    }

    /// Parse config text and apply defaults.
    pub fn from_toml(text: &str, env: Env<'_>) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text)?;
        Self::resolve(file, env)
    }

    fn resolve(file: ConfigFile, env: Env<'_>) -> Result<Self> {
        let binary_store_path = match file.binary_store_path {
            Some(raw) => expand_path(&raw, env)?,
            None => default_store_path(env)?,
        };

        let release_url = env("WTF_RELEASE_URL")
            .filter(|url| !url.is_empty())
            .or(file.release_url)
            .unwrap_or_else(|| DEFAULT_RELEASE_URL.to_string());

        Ok(Self {
            binary_store_path,
            version_constraint_file_name: file
                .version_constraint_file_name
                .unwrap_or_else(|| DEFAULT_CONSTRAINT_FILE.to_string()),
            release_url,
            auto_install: file.auto_install.unwrap_or(true),
            wrapper: file.wrapper,
        })
    }

    /// Where releases are downloaded from.
    pub fn release_source(&self) -> ReleaseSource {
        ReleaseSource::new(self.release_url.clone())
    }

    /// Render as TOML, as `wtf config` prints it.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn read_file(path: &Path) -> Result<ConfigFile> {
    match fs::read_to_string(path) {
        Ok(text) => toml::from_str(&text)
            .with_context(|| format!("invalid config file '{}'", path.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("no config file '{}', using defaults", path.display());
            Ok(ConfigFile::default())
        }
        Err(e) => {
            Err(e).with_context(|| format!("config file '{}' could not be read", path.display()))
        }
    }
}

fn non_empty(env: Env<'_>, key: &str) -> Option<String> {
    env(key).filter(|value| !value.is_empty())
}

/// `$HOME`, falling back to the platform's notion of it.
pub fn home_dir(env: Env<'_>) -> Option<PathBuf> {
    non_empty(env, "HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
}

/// Location of the config file.
pub fn config_path(env: Env<'_>) -> Option<PathBuf> {
    if let Some(path) = non_empty(env, "WTF_CONFIG") {
        return Some(PathBuf::from(path));
    }
    if let Some(dir) = non_empty(env, "XDG_CONFIG_HOME") {
        return Some(Path::new(&dir).join("wtf").join("config.toml"));
    }
    home_dir(env).map(|home| home.join(".config").join("wtf").join("config.toml"))
}

/// Default store: `$XDG_DATA_HOME/wtf/terraform-versions`, else
/// `~/.local/share/wtf/terraform-versions`.
pub fn default_store_path(env: Env<'_>) -> Result<PathBuf> {
    let data = match non_empty(env, "XDG_DATA_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => home_dir(env)
            .context("could not determine home directory")?
            .join(".local")
            .join("share"),
    };
    Ok(data.join("wtf").join("terraform-versions"))
}

/// Expand a leading `~` and `$VAR` / `${VAR}` references.
/// Undefined variables expand to nothing.
pub fn expand_path(raw: &str, env: Env<'_>) -> Result<PathBuf> {
    let with_home = if raw == "~" || raw.starts_with("~/") {
        let home = home_dir(env).context("could not determine home directory")?;
        if raw == "~" {
            home.display().to_string()
        } else {
            home.join(&raw[2..]).display().to_string()
        }
    } else {
        raw.to_string()
    };

    let re = Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")?;
    let expanded = re.replace_all(&with_home, |caps: &Captures<'_>| {
        let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        env(name).unwrap_or_default()
    });

    Ok(PathBuf::from(expanded.into_owned()))
}
