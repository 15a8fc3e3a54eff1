use anyhow::Result;

use crate::config::Config;

/// Print the effective configuration as TOML.
pub fn config(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
