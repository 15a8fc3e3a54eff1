//! wtf - Wrapper for Terraform
//!
//! Transparently work with multiple terraform versions.
//!
//! # Overview
//!
//! `wtf exec <args>` (or `terraform <args>` when the binary is installed
//! under that name) reads the version constraint of the project in the
//! current directory, picks the newest installed terraform satisfying it,
//! installs one from the release host if none does, and runs it.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.config/wtf/config.toml                 # optional configuration
//! ~/.local/share/wtf/terraform-versions/
//! ├── 1.5.7                                 # one executable per version
//! └── 1.6.2
//! ```

#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod cmd;
pub mod config;
pub mod project;
pub mod ui;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use wtf_schema::TOOL_NAME;

use crate::config::{Config, Env};

#[derive(Debug, Parser)]
#[command(name = "wtf")]
#[command(
    version = env!("WTF_VERSION"),
    about = "Wrapper for Terraform: transparently work with multiple terraform versions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the terraform version selected for the current directory
    #[command(disable_help_flag = true)]
    Exec {
        /// Arguments passed to terraform unchanged
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Install versions of terraform
    Install {
        /// Versions to install, or `latest`
        #[arg(required = true)]
        versions: Vec<String>,
    },
    /// List versions of terraform available for this platform
    ListVersions {
        /// Only list installed versions (no network access)
        #[arg(long)]
        installed: bool,
    },
    /// Print the effective configuration
    Config,
    /// Print version info
    Version,
}

/// Whether the binary was started under the managed tool's name
/// (e.g. through a `terraform` symlink).
pub fn invoked_as_tool(argv0: &str) -> bool {
    Path::new(argv0)
        .file_stem()
        .is_some_and(|stem| stem == TOOL_NAME)
}

/// Entry point shared by `main`: returns the process exit code.
pub fn run(args: Vec<String>, env: Env<'_>) -> Result<i32> {
    if args.first().is_some_and(|argv0| invoked_as_tool(argv0)) {
        let config = Config::load(env)?;
        let cwd = std::env::current_dir().context("could not determine working directory")?;
        return cmd::exec::exec(&config, &cwd, args.get(1..).unwrap_or_default(), false);
    }

    let table = Cli::command();
    let matches = table.get_matches_from(args);
    let cli = Cli::from_arg_matches(&matches)?;
    dispatch(cli, env)
}

/// Execute a parsed command line.
pub fn dispatch(cli: Cli, env: Env<'_>) -> Result<i32> {
    match cli.command {
        Commands::Exec { args } => {
            let config = Config::load(env)?;
            let cwd = std::env::current_dir().context("could not determine working directory")?;
            cmd::exec::exec(&config, &cwd, &args, true)
        }
        Commands::Install { versions } => {
            cmd::install::install(&Config::load(env)?, &versions)?;
            Ok(0)
        }
        Commands::ListVersions { installed } => {
            cmd::list_versions::list_versions(&Config::load(env)?, installed)?;
            Ok(0)
        }
        Commands::Config => {
            cmd::config::config(&Config::load(env)?)?;
            Ok(0)
        }
        Commands::Version => {
            cmd::version::version();
            Ok(0)
        }
    }
}
