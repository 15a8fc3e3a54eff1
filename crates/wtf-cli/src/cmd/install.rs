use anyhow::{Result, bail};
use wtf_core::{Installer, ReleaseCatalog, VersionStore};

use crate::config::Config;
use crate::ui::ConsoleReporter;

/// Install each requested version (or `latest`), continuing past failures.
pub fn install(config: &Config, requests: &[String]) -> Result<()> {
    let mut store = VersionStore::load(&config.binary_store_path)?;
    let catalog = ReleaseCatalog::new(config.release_source())?;

    let report = Installer::new(&catalog, &ConsoleReporter).install_all(&mut store, requests);

    for failure in &report.failures {
        tracing::debug!("install of '{}' failed: {:?}", failure.request, failure.error);
    }
    if !report.is_success() {
        bail!("{} error(s) occurred", report.failures.len());
    }
    Ok(())
}
