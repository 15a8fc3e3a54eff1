use std::path::Path;

use anyhow::{Context, Result, bail};
use wtf_core::{
    Executor, Installer, ReleaseCatalog, StoreError, VersionStore, Wrapper, exit_code,
};
use wtf_schema::{Constraint, Version};

use crate::config::Config;
use crate::project;
use crate::ui::{self, ConsoleReporter};

/// Run the terraform version selected for `dir` with `args`.
///
/// Returns the child's exit code.
pub fn exec(config: &Config, dir: &Path, args: &[String], verbose: bool) -> Result<i32> {
    let constraint = project::detect(dir, &config.version_constraint_file_name)?;
    if verbose {
        ui::note("Version constraint", describe(&constraint));
    }

    let mut store = VersionStore::load(&config.binary_store_path)?;
    let version = select(config, &mut store, &constraint)?;
    if verbose {
        ui::note("Version used", &version);
        eprintln!();
    }

    let mut wrapper = Wrapper::new(config.wrapper.script_template.clone());
    let status = Executor::new(verbose)
        .run(&store, &version, args, &mut wrapper)
        .with_context(|| format!("could not run terraform {version}"))?;
    Ok(exit_code(&status))
}

/// Best installed match, installing the best available one if allowed.
fn select(config: &Config, store: &mut VersionStore, constraint: &Constraint) -> Result<Version> {
    let missing = match store.find_latest(constraint) {
        Ok(version) => return Ok(version),
        Err(err @ (StoreError::EmptyStore { .. } | StoreError::NoMatch { .. })) => err,
        Err(err) => return Err(err.into()),
    };
    if !config.auto_install {
        return Err(missing.into());
    }
    tracing::debug!("{missing}; checking available releases");

    let catalog = ReleaseCatalog::new(config.release_source())?;
    let Some(version) = catalog
        .latest_matching(constraint)
        .context("could not list available versions")?
    else {
        bail!("no available version matches '{}'", describe(constraint));
    };

    Installer::new(&catalog, &ConsoleReporter).download_version(store, &version)?;
    Ok(version)
}

fn describe(constraint: &Constraint) -> String {
    if constraint.is_any() {
        "any".to_string()
    } else {
        constraint.to_string()
    }
}
