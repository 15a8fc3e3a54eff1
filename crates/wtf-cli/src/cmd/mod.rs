//! One module per subcommand.

pub mod config;
pub mod exec;
pub mod install;
pub mod list_versions;
pub mod version;
