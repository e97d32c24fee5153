//! Startup calibration wizard
//!
//! Before normal operation the operator moves each trim to its extremes in a
//! fixed order. Each gate polls one channel until a reading lands near the
//! expected endpoint, then keeps sampling for the settle period and keeps the
//! most extreme reading. The six readings become the seeded bounds of the
//! throttle, pan and tilt channels.

use std::fmt;

use pwmconv_calibration::{
    CalibrationLimits, CalibrationResult, ChannelBounds, ChannelId, RangeGrowth, RangeTracker,
};
use pwmconv_errors::WizardError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Delay, EngineConfig, PulseSource};

/// Which endpoint a gate waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extreme {
    /// Shortest pulse, stick fully down or left.
    Low,
    /// Longest pulse, stick fully up or right.
    High,
}

/// One step of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    /// Channel being polled.
    pub channel: ChannelId,
    /// Endpoint the operator moves it to.
    pub extreme: Extreme,
}

impl Gate {
    /// Gates in the order the operator is asked to move the sticks.
    pub const SEQUENCE: [Gate; 6] = [
        Gate::new(ChannelId::Throttle, Extreme::Low),
        Gate::new(ChannelId::Throttle, Extreme::High),
        Gate::new(ChannelId::Pan, Extreme::Low),
        Gate::new(ChannelId::Pan, Extreme::High),
        Gate::new(ChannelId::Tilt, Extreme::Low),
        Gate::new(ChannelId::Tilt, Extreme::High),
    ];

    const fn new(channel: ChannelId, extreme: Extreme) -> Self {
        Self { channel, extreme }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extreme = match self.extreme {
            Extreme::Low => "low",
            Extreme::High => "high",
        };
        write!(f, "{} {extreme}", self.channel)
    }
}

/// Reading that satisfied a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReading {
    /// Gate this reading completed.
    pub gate: Gate,
    /// Most extreme valid pulse width seen (µs).
    pub duration_us: u32,
    /// Polls before the gate triggered.
    pub polls: u32,
}

/// Measured endpoints of the steered channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardReport {
    /// Completed gates in polling order.
    pub readings: Vec<GateReading>,
}

impl WizardReport {
    /// Bounds measured for `channel`, if both of its gates completed.
    pub fn bounds(&self, channel: ChannelId) -> Option<ChannelBounds> {
        let find = |extreme| {
            self.readings
                .iter()
                .find(|r| r.gate.channel == channel && r.gate.extreme == extreme)
                .map(|r| r.duration_us)
        };
        Some(ChannelBounds::new(find(Extreme::Low)?, find(Extreme::High)?))
    }

    /// Seeds `tracker` with every measured channel.
    ///
    /// # Errors
    ///
    /// Returns an error if a measured minimum exceeds its maximum; channels
    /// seeded before the failing one keep their new bounds.
    pub fn apply(&self, tracker: &mut RangeTracker) -> CalibrationResult<Option<RangeGrowth>> {
        let mut growth: Option<RangeGrowth> = None;
        for channel in ChannelId::ALL {
            let Some(bounds) = self.bounds(channel) else {
                continue;
            };
            if let Some(g) = tracker.seed(channel, bounds)? {
                growth = Some(RangeGrowth {
                    previous_range: growth.map_or(g.previous_range, |p| p.previous_range),
                    current_range: g.current_range,
                });
            }
        }
        Ok(growth)
    }
}

/// Drives the six gates against a pulse source.
#[derive(Debug, Clone)]
pub struct CalibrationWizard {
    limits: CalibrationLimits,
    detection_threshold_us: u32,
    poll_interval_ms: u32,
    settle_ms: u32,
    extreme_window_us: u32,
    max_polls_per_gate: Option<u32>,
}

impl CalibrationWizard {
    /// Wizard using the limits, signal gate and wizard timing of `config`.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            limits: config.calibration,
            detection_threshold_us: config.gate.detection_threshold_us,
            poll_interval_ms: config.wizard.poll_interval_ms,
            settle_ms: config.wizard.settle_ms,
            extreme_window_us: config.wizard.extreme_window_us,
            max_polls_per_gate: config.wizard.max_polls_per_gate,
        }
    }

    /// Whether `raw_us` satisfies `extreme`.
    ///
    /// The reading must clear the loss threshold, lie inside the tracker's
    /// guard band, and be within the window of the nominal endpoint.
    pub fn accepts(&self, extreme: Extreme, raw_us: u32) -> bool {
        if raw_us < self.detection_threshold_us {
            return false;
        }
        match extreme {
            Extreme::Low => {
                raw_us > self.limits.lower_guard_us()
                    && raw_us <= self.limits.nominal_min_us.saturating_add(self.extreme_window_us)
            }
            Extreme::High => {
                raw_us < self.limits.upper_guard_us()
                    && raw_us >= self.limits.nominal_max_us.saturating_sub(self.extreme_window_us)
            }
        }
    }

    /// Runs every gate in order.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::GateTimeout`] when a gate exceeds its poll
    /// budget and [`WizardError::Source`] when the source fails.
    pub fn run(
        &self,
        source: &mut impl PulseSource,
        delay: &mut impl Delay,
    ) -> Result<WizardReport, WizardError> {
        let mut readings = Vec::with_capacity(Gate::SEQUENCE.len());
        for gate in Gate::SEQUENCE {
            info!(gate = %gate, "Move the stick to its extreme");
            let reading = self.run_gate(gate, source, delay)?;
            info!(gate = %gate, duration_us = reading.duration_us, polls = reading.polls, "Gate reached");
            readings.push(reading);
        }
        Ok(WizardReport { readings })
    }

    fn run_gate(
        &self,
        gate: Gate,
        source: &mut impl PulseSource,
        delay: &mut impl Delay,
    ) -> Result<GateReading, WizardError> {
        let mut polls: u32 = 0;
        let mut best = loop {
            if let Some(max) = self.max_polls_per_gate
                && polls >= max
            {
                return Err(WizardError::GateTimeout {
                    gate: gate.to_string(),
                    polls,
                });
            }

            let raw = source.read_pulse_width(gate.channel)?;
            polls = polls.saturating_add(1);
            if self.accepts(gate.extreme, raw) {
                break raw;
            }
            delay.delay_ms(self.poll_interval_ms);
        };

        let settle_polls = self.settle_ms / self.poll_interval_ms.max(1);
        for _ in 0..settle_polls {
            delay.delay_ms(self.poll_interval_ms);
            let raw = source.read_pulse_width(gate.channel)?;
            if !self.accepts(gate.extreme, raw) {
                continue;
            }
            let more_extreme = match gate.extreme {
                Extreme::Low => raw < best,
                Extreme::High => raw > best,
            };
            if more_extreme {
                debug!(gate = %gate, duration_us = raw, "Refined extreme");
                best = raw;
            }
        }

        Ok(GateReading {
            gate,
            duration_us: best,
            polls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoDelay;
    use crate::mock::ScriptedPulseSource;
    use pwmconv_calibration::PulseFrame;
    use pwmconv_errors::DeviceError;

    fn config(settle_ms: u32) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.wizard.settle_ms = settle_ms;
        config
    }

    /// Frames that walk the sticks through every gate with no settle period.
    fn happy_path() -> Vec<PulseFrame> {
        vec![
            PulseFrame::splat(1500),
            PulseFrame::new(1010, 1500, 1500, 1500),
            PulseFrame::new(1990, 1500, 1500, 1500),
            PulseFrame::new(1500, 980, 1500, 1500),
            PulseFrame::new(1500, 2040, 1500, 1500),
            PulseFrame::new(1500, 1500, 1005, 1500),
            PulseFrame::new(1500, 1500, 1995, 1500),
        ]
    }

    #[test]
    fn test_gate_labels() {
        let labels: Vec<String> = Gate::SEQUENCE.iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            [
                "throttle low",
                "throttle high",
                "pan low",
                "pan high",
                "tilt low",
                "tilt high"
            ]
        );
    }

    #[test]
    fn test_accepts_window_and_guards() {
        let wizard = CalibrationWizard::new(&EngineConfig::default());
        assert!(wizard.accepts(Extreme::Low, 1100));
        assert!(!wizard.accepts(Extreme::Low, 1101));
        assert!(!wizard.accepts(Extreme::Low, 900));
        assert!(wizard.accepts(Extreme::High, 1900));
        assert!(!wizard.accepts(Extreme::High, 2100));
        assert!(!wizard.accepts(Extreme::Low, 0));
    }

    #[test]
    fn test_runs_all_gates_in_order() -> Result<(), WizardError> {
        let wizard = CalibrationWizard::new(&config(0));
        // The first poll lands on a centered frame and is rejected.
        let mut source = ScriptedPulseSource::new(happy_path());
        let report = wizard.run(&mut source, &mut NoDelay)?;

        assert_eq!(report.readings.len(), 6);
        assert_eq!(report.readings.first().map(|r| r.polls), Some(2));
        assert_eq!(report.bounds(ChannelId::Throttle), Some(ChannelBounds::new(1010, 1990)));
        assert_eq!(report.bounds(ChannelId::Pan), Some(ChannelBounds::new(980, 2040)));
        assert_eq!(report.bounds(ChannelId::Tilt), Some(ChannelBounds::new(1005, 1995)));
        assert_eq!(report.bounds(ChannelId::Aux), None);
        Ok(())
    }

    #[test]
    fn test_settle_keeps_most_extreme() -> Result<(), WizardError> {
        // 100 ms settle at 50 ms cadence: two extra polls per gate.
        let wizard = CalibrationWizard::new(&config(100));
        // Each gate polls its channel once to trigger, then twice more.
        let frames: Vec<PulseFrame> = [
            1050, 1040, 1020, // throttle low
            1950, 1990, 0, // throttle high, dropout ignored
            1010, 1015, 1012, // pan low
            1980, 1985, 1970, // pan high
            1000, 1000, 1000, // tilt low
            2000, 2000, 2000, // tilt high
        ]
        .into_iter()
        .map(PulseFrame::splat)
        .collect();

        let report = wizard.run(&mut ScriptedPulseSource::new(frames), &mut NoDelay)?;
        assert_eq!(report.bounds(ChannelId::Throttle), Some(ChannelBounds::new(1020, 1990)));
        assert_eq!(report.bounds(ChannelId::Pan), Some(ChannelBounds::new(1010, 1985)));
        assert_eq!(report.bounds(ChannelId::Tilt), Some(ChannelBounds::new(1000, 2000)));
        Ok(())
    }

    #[test]
    fn test_gate_timeout() {
        let mut config = config(0);
        config.wizard.max_polls_per_gate = Some(3);
        let wizard = CalibrationWizard::new(&config);
        let mut source = ScriptedPulseSource::new(vec![PulseFrame::splat(1500); 10]);

        let result = wizard.run(&mut source, &mut NoDelay);
        assert_eq!(
            result,
            Err(WizardError::GateTimeout {
                gate: "throttle low".to_string(),
                polls: 3,
            })
        );
    }

    #[test]
    fn test_source_failure_surfaces() {
        let wizard = CalibrationWizard::new(&config(0));
        let mut source = ScriptedPulseSource::new([PulseFrame::splat(1500)]);
        let result = wizard.run(&mut source, &mut NoDelay);
        assert_eq!(result, Err(WizardError::Source(DeviceError::Exhausted)));
    }

    #[test]
    fn test_apply_seeds_tracker_and_reports_growth() -> Result<(), WizardError> {
        let wizard = CalibrationWizard::new(&config(0));
        let report = wizard.run(&mut ScriptedPulseSource::new(happy_path()), &mut NoDelay)?;

        let mut tracker = RangeTracker::new(CalibrationLimits::default());
        let growth = report.apply(&mut tracker)?;
        assert_eq!(
            growth,
            Some(RangeGrowth {
                previous_range: 1000,
                current_range: 1040,
            })
        );
        assert_eq!(tracker.state().bounds(ChannelId::Throttle), ChannelBounds::new(1010, 1990));
        assert_eq!(tracker.state().bounds(ChannelId::Aux), ChannelBounds::new(1000, 2000));
        Ok(())
    }
}
