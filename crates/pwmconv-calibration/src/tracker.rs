//! Running range tracker
//!
//! Bounds only ever widen. A shorter pulse becomes the new minimum when it is
//! still above `nominal_min - noise_guard`; a longer pulse becomes the new
//! maximum when it is still below `nominal_max + noise_guard`. Anything
//! outside those bands is jitter or a glitch and is ignored.

use crate::{
    CalibrationError, CalibrationLimits, CalibrationResult, CalibrationState, ChannelBounds,
    ChannelId, PulseFrame, RangeGrowth,
};

/// Owns the [`CalibrationState`] and applies the widening rule to it.
#[derive(Debug, Clone, Default)]
pub struct RangeTracker {
    state: CalibrationState,
}

impl RangeTracker {
    /// Creates a tracker seeded at the nominal endpoints of `limits`.
    pub fn new(limits: CalibrationLimits) -> Self {
        Self {
            state: CalibrationState::new(limits),
        }
    }

    /// Current calibration state.
    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    /// Widens the bounds of `channel` with one raw reading.
    ///
    /// Does not touch the global maximum; call [`refresh_global`](Self::refresh_global)
    /// once every channel of the cycle has been updated.
    pub fn update(&mut self, channel: ChannelId, raw_us: u32) {
        let limits = self.state.limits;
        let bounds = self.state.channels.get_mut(channel);

        if raw_us < bounds.min_us && raw_us > limits.lower_guard_us() {
            bounds.min_us = raw_us;
        }
        if raw_us > bounds.max_us && raw_us < limits.upper_guard_us() {
            bounds.max_us = raw_us;
        }
    }

    /// Recomputes the global maximum from every channel's maximum.
    ///
    /// Returns the range change when the maximum grew. The global maximum
    /// never decreases, even if a channel was re-seeded with a smaller maximum.
    pub fn refresh_global(&mut self) -> Option<RangeGrowth> {
        let observed = self
            .state
            .channels
            .iter()
            .map(|(_, bounds)| bounds.max_us)
            .fold(self.state.limits.nominal_max_us, u32::max);

        if observed <= self.state.global_max_us {
            return None;
        }

        let previous_range = self.state.output_range();
        self.state.global_max_us = observed;
        Some(RangeGrowth {
            previous_range,
            current_range: self.state.output_range(),
        })
    }

    /// Applies one full cycle of readings, then refreshes the global maximum.
    pub fn observe(&mut self, frame: &PulseFrame) -> Option<RangeGrowth> {
        for sample in frame.samples() {
            self.update(sample.channel, sample.duration_us);
        }
        self.refresh_global()
    }

    /// Replaces the bounds of `channel` with externally measured ones.
    ///
    /// Used once, before normal operation, to install the wizard's results.
    pub fn seed(
        &mut self,
        channel: ChannelId,
        bounds: ChannelBounds,
    ) -> CalibrationResult<Option<RangeGrowth>> {
        if bounds.min_us > bounds.max_us {
            return Err(CalibrationError::InvalidBounds {
                channel: channel.name(),
                min: bounds.min_us,
                max: bounds.max_us,
            });
        }
        *self.state.channels.get_mut(channel) = bounds;
        Ok(self.refresh_global())
    }
}
