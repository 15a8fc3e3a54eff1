use std::io::{self, Write};

use anyhow::{Context, Result};
use wtf_core::{ReleaseCatalog, VersionStore};

use crate::config::Config;

/// List versions available for this platform, marking installed ones.
/// With `installed_only`, list the local store without going online.
pub fn list_versions(config: &Config, installed_only: bool) -> Result<()> {
    let store = VersionStore::load(&config.binary_store_path)?;
    let mut out = io::stdout().lock();

    if installed_only {
        write!(out, "{store}")?;
        return Ok(());
    }

    let catalog = ReleaseCatalog::new(config.release_source())?;
    let available = catalog
        .list_available()
        .context("could not list available versions")?;

    for version in available {
        if store.contains(&version) {
            writeln!(out, "{version} [installed]")?;
        } else {
            writeln!(out, "{version}")?;
        }
    }
    Ok(())
}
