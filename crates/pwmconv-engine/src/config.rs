//! Converter configuration document
//!
//! Stored as pretty-printed JSON. The `schema_version` tag lets older
//! documents be migrated in place.

use std::path::Path;

use pwmconv_calibration::CalibrationLimits;
use pwmconv_errors::{ErrorContext, PwmConvError, Result, ResultExt, ValidationError};
use pwmconv_mixer::MixerTriggers;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::SignalLossPolicy;

/// Current configuration schema tag.
pub const SCHEMA_VERSION: &str = "pwmconv.config/1";

/// Complete converter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Configuration schema version
    pub schema_version: String,
    /// Endpoint and tolerance constants of the range tracker
    pub calibration: CalibrationLimits,
    /// Mixer deadbands
    pub mixer: MixerTriggers,
    /// Signal-loss gate
    pub gate: GateConfig,
    /// Motor output driver
    pub output: OutputConfig,
    /// Startup calibration wizard
    pub wizard: WizardConfig,
}

/// Signal-loss gate configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// A cycle with any pulse shorter than this is skipped (µs)
    pub detection_threshold_us: u32,
    /// What the outputs do while the signal is lost
    pub on_signal_loss: SignalLossPolicy,
}

/// Motor output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Duty-cycle carrier frequency in Hz
    pub frequency_hz: u32,
}

/// Startup wizard configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Run the wizard before normal operation
    pub enabled: bool,
    /// Delay between gate polls in milliseconds
    pub poll_interval_ms: u32,
    /// Time spent refining an extreme after a gate triggers, in milliseconds
    pub settle_ms: u32,
    /// How close to a nominal endpoint a reading must be to satisfy a gate (µs)
    pub extreme_window_us: u32,
    /// Polls before a gate gives up; `None` waits forever
    pub max_polls_per_gate: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            calibration: CalibrationLimits::default(),
            mixer: MixerTriggers::default(),
            gate: GateConfig::default(),
            output: OutputConfig::default(),
            wizard: WizardConfig::default(),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            detection_threshold_us: 800,
            on_signal_loss: SignalLossPolicy::Hold,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { frequency_hz: 1000 }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 50,
            settle_ms: 1000,
            extreme_window_us: 100,
            max_polls_per_gate: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from `path`, writing the default document first if
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or created.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "Config file not found, creating default");
            let config = Self::default();
            config.save_to_path(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).context(
            ErrorContext::new("read config").with("path", path.display().to_string()),
        )?;
        let config = Self::from_json(&content)?;

        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context("create config directory")?;
        }

        let content = self.to_json()?;
        std::fs::write(path, content).context(
            ErrorContext::new("write config").with("path", path.display().to_string()),
        )?;

        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`PwmConvError::Config`] if the JSON does not match the layout.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| PwmConvError::config(format!("Failed to parse config: {e}")))
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PwmConvError::Config`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PwmConvError::config(format!("Failed to serialize config: {e}")))
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns the first rule the document breaks.
    pub fn validate(&self) -> Result<()> {
        if !self.schema_version.starts_with("pwmconv.config/") {
            return Err(PwmConvError::config(format!(
                "Invalid schema version: {}",
                self.schema_version
            )));
        }

        let cal = &self.calibration;
        if cal.nominal_min_us >= cal.nominal_max_us {
            return Err(ValidationError::constraint(format!(
                "calibration.nominal_min_us ({}) must be below calibration.nominal_max_us ({})",
                cal.nominal_min_us, cal.nominal_max_us
            ))
            .into());
        }

        if cal.noise_guard_us >= cal.nominal_min_us {
            return Err(ValidationError::out_of_range(
                "calibration.noise_guard_us",
                cal.noise_guard_us,
                0,
                cal.nominal_min_us.saturating_sub(1),
            )
            .into());
        }

        if self.gate.detection_threshold_us >= cal.nominal_min_us {
            return Err(ValidationError::out_of_range(
                "gate.detection_threshold_us",
                self.gate.detection_threshold_us,
                0,
                cal.nominal_min_us.saturating_sub(1),
            )
            .into());
        }

        if self.output.frequency_hz == 0 {
            return Err(ValidationError::out_of_range(
                "output.frequency_hz",
                self.output.frequency_hz,
                1,
                u32::MAX,
            )
            .into());
        }

        if self.wizard.poll_interval_ms == 0 {
            return Err(ValidationError::out_of_range(
                "wizard.poll_interval_ms",
                self.wizard.poll_interval_ms,
                1,
                u32::MAX,
            )
            .into());
        }

        let half_span = cal.nominal_span() / 2;
        if self.wizard.extreme_window_us > half_span {
            return Err(ValidationError::out_of_range(
                "wizard.extreme_window_us",
                self.wizard.extreme_window_us,
                0,
                half_span,
            )
            .into());
        }

        Ok(())
    }

    /// Migrate configuration to the current schema version.
    ///
    /// Returns `true` if the document was changed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidFormat`] for an unknown schema tag.
    pub fn migrate(&mut self) -> Result<bool> {
        if self.schema_version == SCHEMA_VERSION {
            return Ok(false);
        }

        info!(
            from = %self.schema_version,
            to = SCHEMA_VERSION,
            "Migrating config"
        );

        match self.schema_version.as_str() {
            // Same layout; only the tag changed.
            "pwmconv.config/0" => {
                self.schema_version = SCHEMA_VERSION.to_string();
            }
            other => {
                return Err(ValidationError::invalid_format(
                    "schema_version",
                    format!("unsupported tag '{other}'"),
                )
                .into());
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwmconv_errors::ErrorCategory;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_nominal() {
        let mut config = EngineConfig::default();
        config.calibration.nominal_min_us = 2000;
        let err = config.validate().err();
        assert!(matches!(err, Some(PwmConvError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_guard_wider_than_min() {
        let mut config = EngineConfig::default();
        config.calibration.noise_guard_us = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_threshold_inside_channel_range() {
        let mut config = EngineConfig::default();
        config.gate.detection_threshold_us = 1000;
        let msg = config.validate().err().map(|e| e.to_string()).unwrap_or_default();
        assert!(msg.contains("gate.detection_threshold_us"));
    }

    #[test]
    fn test_validate_rejects_zero_frequency_and_poll() {
        let mut config = EngineConfig::default();
        config.output.frequency_hz = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.wizard.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_wide_extreme_window() {
        let mut config = EngineConfig::default();
        config.wizard.extreme_window_us = 500;
        assert!(config.validate().is_ok());
        config.wizard.extreme_window_us = 501;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_foreign_schema() {
        let config = EngineConfig {
            schema_version: "wheel.config/1".to_string(),
            ..EngineConfig::default()
        };
        let err = config.validate().err();
        assert_eq!(err.map(|e| e.category()), Some(ErrorCategory::Config));
    }

    #[test]
    fn test_migrate() -> Result<()> {
        let mut config = EngineConfig::default();
        assert!(!config.migrate()?);

        config.schema_version = "pwmconv.config/0".to_string();
        assert!(config.migrate()?);
        assert_eq!(config.schema_version, SCHEMA_VERSION);

        config.schema_version = "pwmconv.config/9".to_string();
        let Err(PwmConvError::Validation(ValidationError::InvalidFormat { field, reason })) =
            config.migrate()
        else {
            return Err(PwmConvError::other("unknown tag should be an InvalidFormat error"));
        };
        assert_eq!(field, "schema_version");
        assert!(reason.contains("pwmconv.config/9"));
        Ok(())
    }

    #[test]
    fn test_signal_loss_policy_spelling() -> Result<()> {
        let json = EngineConfig::default().to_json()?;
        assert!(json.contains("\"on_signal_loss\": \"hold\""));
        assert!(json.contains("\"max_polls_per_gate\": null"));
        Ok(())
    }
}
