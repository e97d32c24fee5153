//! Configuration file commands

use anyhow::Result;
use pwmconv_engine::EngineConfig;
use tracing::info;

use crate::commands::{ConfigCommands, read_config, resolve_config_path};
use crate::error::CliError;
use crate::output;

/// Execute a config command
pub fn execute(cmd: &ConfigCommands, json: bool) -> Result<()> {
    match cmd {
        ConfigCommands::Init { path, force } => {
            let path = resolve_config_path(path.as_deref());
            if path.exists() && !force {
                return Err(CliError::AlreadyExists(path).into());
            }
            EngineConfig::default().save_to_path(&path)?;
            info!(path = %path.display(), "Default configuration written");
            output::print_config_written(&path, json);
            Ok(())
        }
        ConfigCommands::Show { path } => {
            let path = resolve_config_path(path.as_deref());
            let (config, _) = read_config(&path)?;
            output::print_config(&config, &path, json);
            Ok(())
        }
        ConfigCommands::Validate { path } => {
            let path = resolve_config_path(path.as_deref());
            let (_, migrated) = read_config(&path)?;
            output::print_config_valid(&path, migrated, json);
            Ok(())
        }
    }
}
