//! Raw pulse width to output-scale normalization

use crate::{CalibrationState, ChannelId, ChannelMap, PulseFrame};

/// Maps raw pulse widths into `[0, output_range]` using the current calibration.
///
/// Keeps the previous normalized value of each channel so that a reading far
/// below the observed minimum repeats the last value instead of snapping to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    previous: ChannelMap<u32>,
}

impl Normalizer {
    /// Creates a normalizer with every channel's previous value at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value produced for `channel`.
    pub fn previous(&self, channel: ChannelId) -> u32 {
        *self.previous.get(channel)
    }

    /// Normalizes one raw reading.
    ///
    /// 1. A reading above `global_max + ignore_margin` is replaced by the
    ///    channel's observed maximum.
    /// 2. A reading above `observed_min - noise_guard` is shifted by the
    ///    observed minimum; anything lower keeps the previous value.
    /// 3. The result is clamped into `[0, output_range]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pwmconv_calibration::{CalibrationState, ChannelId, Normalizer};
    ///
    /// let state = CalibrationState::default();
    /// let mut normalizer = Normalizer::new();
    ///
    /// assert_eq!(normalizer.normalize(&state, ChannelId::Pan, 1250), 250);
    /// // A spike far above the range reads as full deflection.
    /// assert_eq!(normalizer.normalize(&state, ChannelId::Pan, 2400), 1000);
    /// ```
    pub fn normalize(&mut self, state: &CalibrationState, channel: ChannelId, raw_us: u32) -> u32 {
        let limits = state.limits();
        let bounds = state.bounds(channel);
        let range = state.output_range();

        let raw_us = if raw_us > state.global_max_us().saturating_add(limits.ignore_margin_us) {
            bounds.max_us
        } else {
            raw_us
        };

        let raw = i64::from(raw_us);
        let min = i64::from(bounds.min_us);
        let shifted = if raw > min - i64::from(limits.noise_guard_us) {
            raw - min
        } else {
            i64::from(self.previous(channel))
        };

        let value = clamp_to_range(shifted, range);
        *self.previous.get_mut(channel) = value;
        value
    }

    /// Normalizes all four readings of a cycle.
    pub fn normalize_frame(&mut self, state: &CalibrationState, frame: &PulseFrame) -> ChannelMap<u32> {
        ChannelMap::from_fn(|channel| self.normalize(state, channel, *frame.get(channel)))
    }

    /// Forgets every previous value.
    pub fn reset(&mut self) {
        self.previous = ChannelMap::default();
    }
}

fn clamp_to_range(value: i64, range: u32) -> u32 {
    let clamped = value.clamp(0, i64::from(range));
    u32::try_from(clamped).unwrap_or(range)
}
