//! Command implementations

pub mod config;
pub mod mix;
pub mod replay;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;
use pwmconv_engine::EngineConfig;
use tracing::{debug, warn};

use crate::error::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write the default configuration
    Init {
        /// Configuration file (defaults to the per-user config directory)
        #[arg(long, env = "PWMCONV_CONFIG")]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the configuration
    Show {
        /// Configuration file (defaults to the per-user config directory)
        #[arg(long, env = "PWMCONV_CONFIG")]
        path: Option<PathBuf>,
    },

    /// Check a configuration file without running anything
    Validate {
        /// Configuration file (defaults to the per-user config directory)
        #[arg(long, env = "PWMCONV_CONFIG")]
        path: Option<PathBuf>,
    },
}

/// `<config dir>/pwmconv/config.json`, or `./pwmconv.json` when the platform
/// has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("pwmconv").join("config.json"))
        .unwrap_or_else(|| PathBuf::from("pwmconv.json"))
}

pub fn resolve_config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(default_config_path)
}

/// Reads, migrates and validates a configuration file.
///
/// Returns the configuration and whether a legacy schema tag was upgraded.
pub fn read_config(path: &Path) -> Result<(EngineConfig, bool)> {
    if !path.exists() {
        return Err(CliError::ConfigNotFound(path.to_path_buf()).into());
    }

    let content = std::fs::read_to_string(path).map_err(CliError::from)?;
    let mut config = EngineConfig::from_json(&content)?;
    let migrated = config.migrate()?;
    if migrated {
        warn!(path = %path.display(), "Configuration uses a legacy schema tag");
    }
    config
        .validate()
        .map_err(|e| CliError::InvalidConfiguration(e.to_string()))?;
    debug!(path = %path.display(), "Configuration loaded");
    Ok((config, migrated))
}
