//! Capture replay through the control cycle

use std::path::Path;

use anyhow::Result;
use pwmconv_engine::{
    CalibrationWizard, ControlCycle, CycleOutcome, CycleStats, DutySink, EngineConfig, NoDelay,
    ReplayPulseSource, WizardReport,
};
use pwmconv_errors::{DeviceError, PwmConvError};
use pwmconv_mixer::{WheelOutput, WheelOutputs};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::commands::read_config;
use crate::error::CliError;
use crate::output;

/// Result of one replay run.
#[derive(Debug, Serialize)]
pub struct ReplaySummary {
    /// Frames in the capture.
    pub frames: usize,
    /// Carrier frequency the sink was configured with.
    pub frequency_hz: u32,
    /// Output range after the last widening.
    pub output_range: u32,
    /// Wizard readings, when `--wizard` ran.
    pub wizard: Option<WizardReport>,
    /// Outcome of every cycle, in order.
    pub cycles: Vec<CycleOutcome>,
    /// Counters at the end of the run.
    pub stats: CycleStats,
    /// Duties in effect when the capture ended.
    pub final_outputs: WheelOutputs,
}

/// Duty sink standing in for the PWM driver during a replay.
#[derive(Debug, Default)]
struct ReplaySink {
    frequency_hz: u32,
    range: u32,
    writes: u64,
}

impl DutySink for ReplaySink {
    fn configure_frequency(&mut self, hz: u32) -> Result<(), DeviceError> {
        if hz == 0 {
            return Err(DeviceError::ConfigurationRejected {
                setting: "frequency_hz",
                value: hz,
            });
        }
        self.frequency_hz = hz;
        Ok(())
    }

    fn configure_range(&mut self, range: u32) -> Result<(), DeviceError> {
        if range == 0 {
            return Err(DeviceError::ConfigurationRejected {
                setting: "range",
                value: range,
            });
        }
        debug!(range, "Replay sink range configured");
        self.range = range;
        Ok(())
    }

    fn set_duty(&mut self, output: WheelOutput, duty: u32) -> Result<(), DeviceError> {
        if duty > self.range {
            return Err(DeviceError::write_failed(
                output.name(),
                format!("duty {duty} exceeds range {}", self.range),
            ));
        }
        self.writes = self.writes.saturating_add(1);
        Ok(())
    }
}

/// Execute the replay command
pub fn execute(capture: &Path, config: Option<&Path>, wizard: bool, json: bool) -> Result<()> {
    let config = match config {
        Some(path) => read_config(path)?.0,
        None => EngineConfig::default(),
    };

    let mut source = ReplayPulseSource::from_path(capture).map_err(PwmConvError::from)?;
    if source.total_frames() == 0 {
        return Err(
            CliError::CaptureError(format!("{} contains no frames", capture.display())).into(),
        );
    }
    info!(
        capture = %capture.display(),
        frames = source.total_frames(),
        "Replaying capture"
    );

    let mut cycle = ControlCycle::new(&config);

    if wizard && !config.wizard.enabled {
        warn!("Calibration wizard disabled in configuration, skipping");
    }
    let wizard_report = if wizard && config.wizard.enabled {
        let report = CalibrationWizard::new(&config)
            .run(&mut source, &mut NoDelay)
            .map_err(PwmConvError::from)?;
        cycle.apply_wizard(&report).map_err(PwmConvError::from)?;
        info!(frames_read = source.frames_read(), "Wizard complete");
        Some(report)
    } else {
        None
    };

    let mut sink = ReplaySink::default();
    let mut cycles = Vec::with_capacity(source.total_frames());
    let stats = cycle
        .run(&mut source, &mut sink, |outcome| cycles.push(*outcome))
        .map_err(PwmConvError::from)?;
    debug!(duty_writes = sink.writes, "Replay finished");

    let summary = ReplaySummary {
        frames: source.total_frames(),
        frequency_hz: sink.frequency_hz,
        output_range: sink.range,
        wizard: wizard_report,
        cycles,
        stats,
        final_outputs: cycle.last_outputs(),
    };
    output::print_replay(&summary, json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_rejects_duty_above_range() -> Result<(), DeviceError> {
        let mut sink = ReplaySink::default();
        sink.configure_range(100)?;
        sink.set_duty(WheelOutput::Wheel1Cw, 100)?;
        assert!(matches!(
            sink.set_duty(WheelOutput::Wheel2Ccw, 101),
            Err(DeviceError::WriteFailed { .. })
        ));
        assert_eq!(sink.writes, 1);
        Ok(())
    }

    #[test]
    fn sink_rejects_zero_settings() {
        let mut sink = ReplaySink::default();
        assert_eq!(
            sink.configure_frequency(0),
            Err(DeviceError::ConfigurationRejected {
                setting: "frequency_hz",
                value: 0
            })
        );
        assert!(sink.configure_range(0).is_err());
    }
}
