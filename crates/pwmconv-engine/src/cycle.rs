//! The control cycle: acquire, track, normalize, mix, emit
//!
//! Data flows one way per cycle. The cycle owns the tracker, normalizer and
//! mixer and passes values between them; the collaborators are borrowed per
//! call.

use pwmconv_calibration::{
    CalibrationState, ChannelId, ChannelMap, Normalizer, PulseFrame,
    RangeGrowth, RangeTracker,
};
use pwmconv_errors::{DeviceError, WizardError};
use pwmconv_mixer::{DriveMixer, MixInput, MixOutput, WheelOutputs};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::{DutySink, EngineConfig, PulseSource, WizardReport};

/// What the outputs do while the receiver signal is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalLossPolicy {
    /// Leave the last emitted duties in effect.
    #[default]
    Hold,
    /// Emit all-zero duties once when the loss begins.
    Stop,
}

/// Everything one emitted cycle computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Raw pulse widths as acquired.
    pub frame: PulseFrame,
    /// Normalized channel values.
    pub normalized: ChannelMap<u32>,
    /// Drive intent and wheel duties that were emitted.
    pub output: MixOutput,
    /// Set when this cycle widened the output range.
    pub range_growth: Option<RangeGrowth>,
}

/// Result of [`ControlCycle::run_once`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Duties were computed and written.
    Emitted(CycleReport),
    /// A pulse fell below the detection threshold; mixing was skipped.
    SignalLost {
        /// First channel found below the threshold.
        channel: ChannelId,
        /// Its pulse width.
        duration_us: u32,
        /// Zero duties were written this cycle.
        stopped: bool,
    },
}

impl CycleOutcome {
    /// The report of an emitted cycle.
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Emitted(report) => Some(report),
            CycleOutcome::SignalLost { .. } => None,
        }
    }
}

/// Running counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CycleStats {
    /// Cycles attempted.
    pub cycles: u64,
    /// Cycles that wrote mixed duties.
    pub emitted: u64,
    /// Cycles skipped for signal loss.
    pub skipped: u64,
    /// Times the output range grew.
    pub range_growths: u64,
    /// Separate signal-loss episodes.
    pub loss_episodes: u64,
}

/// Single-threaded control loop state.
#[derive(Debug, Clone)]
pub struct ControlCycle {
    tracker: RangeTracker,
    normalizer: Normalizer,
    mixer: DriveMixer,
    detection_threshold_us: u32,
    policy: SignalLossPolicy,
    frequency_hz: u32,
    configured_range: Option<u32>,
    last_outputs: WheelOutputs,
    signal_lost: bool,
    stats: CycleStats,
}

impl ControlCycle {
    /// Creates a cycle with nominal calibration from `config`.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tracker: RangeTracker::new(config.calibration),
            normalizer: Normalizer::new(),
            mixer: DriveMixer::new(config.mixer),
            detection_threshold_us: config.gate.detection_threshold_us,
            policy: config.gate.on_signal_loss,
            frequency_hz: config.output.frequency_hz,
            configured_range: None,
            last_outputs: WheelOutputs::STOPPED,
            signal_lost: false,
            stats: CycleStats::default(),
        }
    }

    /// Current calibration.
    pub fn state(&self) -> &CalibrationState {
        self.tracker.state()
    }

    /// Duties most recently written to the sink.
    pub fn last_outputs(&self) -> WheelOutputs {
        self.last_outputs
    }

    /// Counters since creation.
    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// True while inside a signal-loss episode.
    pub fn is_signal_lost(&self) -> bool {
        self.signal_lost
    }

    /// Installs the wizard's measured bounds.
    ///
    /// A wider range is pushed to the sink on the next emitted cycle.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Rejected`] if a measured minimum exceeds its
    /// maximum.
    pub fn apply_wizard(
        &mut self,
        report: &WizardReport,
    ) -> Result<Option<RangeGrowth>, WizardError> {
        let growth = report.apply(&mut self.tracker)?;
        if growth.is_some() {
            self.stats.range_growths = self.stats.range_growths.saturating_add(1);
        }
        Ok(growth)
    }

    /// Configures the sink's frequency and initial range.
    ///
    /// Called automatically by the first [`run_once`](Self::run_once).
    ///
    /// # Errors
    ///
    /// Returns the sink's error if it rejects either setting.
    pub fn start(&mut self, sink: &mut impl DutySink) -> Result<(), DeviceError> {
        let range = self.tracker.state().output_range();
        sink.configure_frequency(self.frequency_hz)?;
        sink.configure_range(range)?;
        self.configured_range = Some(range);
        info!(
            frequency_hz = self.frequency_hz,
            output_range = range,
            "Output driver configured"
        );
        Ok(())
    }

    /// Runs one acquire-to-emit iteration.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error when acquisition or emission fails.
    /// Signal loss is not an error.
    pub fn run_once(
        &mut self,
        source: &mut impl PulseSource,
        sink: &mut impl DutySink,
    ) -> Result<CycleOutcome, DeviceError> {
        if self.configured_range.is_none() {
            self.start(sink)?;
        }

        let frame = source.read_frame()?;
        self.stats.cycles = self.stats.cycles.saturating_add(1);

        if let Some(lost) = frame.first_below(self.detection_threshold_us) {
            return self.on_signal_lost(sink, lost.channel, lost.duration_us);
        }

        if self.signal_lost {
            self.signal_lost = false;
            info!(
                cycle = self.stats.cycles,
                skipped = self.stats.skipped,
                "Receiver signal recovered"
            );
        }

        let range_growth = self.tracker.observe(&frame);
        if range_growth.is_some() {
            self.stats.range_growths = self.stats.range_growths.saturating_add(1);
        }
        self.sync_range(sink)?;

        let state = self.tracker.state();
        let normalized = self.normalizer.normalize_frame(state, &frame);
        let input = MixInput {
            speed: *normalized.get(ChannelId::Throttle),
            pan: *normalized.get(ChannelId::Pan),
            tilt: *normalized.get(ChannelId::Tilt),
            pan_spread: state.bounds(ChannelId::Pan).spread(),
            tilt_spread: state.bounds(ChannelId::Tilt).spread(),
            output_range: state.output_range(),
        };
        let output = self.mixer.mix(&input);

        sink.emit(&output.wheels)?;
        self.last_outputs = output.wheels;
        self.stats.emitted = self.stats.emitted.saturating_add(1);

        trace!(
            wheel1_cw = output.wheels.wheel1_cw,
            wheel1_ccw = output.wheels.wheel1_ccw,
            wheel2_cw = output.wheels.wheel2_cw,
            wheel2_ccw = output.wheels.wheel2_ccw,
            "Cycle emitted"
        );

        Ok(CycleOutcome::Emitted(CycleReport {
            frame,
            normalized,
            output,
            range_growth,
        }))
    }

    /// Runs cycles until the source is exhausted, calling `on_cycle` after each.
    ///
    /// # Errors
    ///
    /// Returns any collaborator error other than [`DeviceError::Exhausted`].
    pub fn run(
        &mut self,
        source: &mut impl PulseSource,
        sink: &mut impl DutySink,
        mut on_cycle: impl FnMut(&CycleOutcome),
    ) -> Result<CycleStats, DeviceError> {
        loop {
            match self.run_once(source, sink) {
                Ok(outcome) => on_cycle(&outcome),
                Err(DeviceError::Exhausted) => {
                    debug!(cycles = self.stats.cycles, "Pulse source exhausted");
                    return Ok(self.stats);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn sync_range(&mut self, sink: &mut impl DutySink) -> Result<(), DeviceError> {
        let range = self.tracker.state().output_range();
        if self.configured_range == Some(range) {
            return Ok(());
        }
        sink.configure_range(range)?;
        info!(
            previous = ?self.configured_range,
            output_range = range,
            global_max_us = self.tracker.state().global_max_us(),
            "Output range widened"
        );
        self.configured_range = Some(range);
        Ok(())
    }

    fn on_signal_lost(
        &mut self,
        sink: &mut impl DutySink,
        channel: ChannelId,
        duration_us: u32,
    ) -> Result<CycleOutcome, DeviceError> {
        self.stats.skipped = self.stats.skipped.saturating_add(1);

        let entering = !self.signal_lost;
        if entering {
            self.signal_lost = true;
            self.stats.loss_episodes = self.stats.loss_episodes.saturating_add(1);
            warn!(
                channel = %channel,
                duration_us,
                policy = ?self.policy,
                "Receiver signal lost, skipping cycle"
            );
        } else {
            debug!(channel = %channel, duration_us, "Signal still lost");
        }

        let stopped = entering && self.policy == SignalLossPolicy::Stop;
        if stopped {
            sink.emit(&WheelOutputs::STOPPED)?;
            self.last_outputs = WheelOutputs::STOPPED;
        }

        Ok(CycleOutcome::SignalLost {
            channel,
            duration_us,
            stopped,
        })
    }
}
