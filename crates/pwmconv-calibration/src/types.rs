//! Calibration type definitions

use serde::{Deserialize, Serialize};

use crate::{ChannelId, ChannelMap};

/// Nominal shortest pulse of a proportional RC channel, in microseconds.
pub const NOMINAL_MIN_US: u32 = 1000;
/// Nominal longest pulse of a proportional RC channel, in microseconds.
pub const NOMINAL_MAX_US: u32 = 2000;
/// Width of the band around the nominal endpoints inside which drift is believed.
pub const NOISE_GUARD_US: u32 = 100;
/// Samples this far above the global maximum are treated as signal loss.
pub const IGNORE_MARGIN_US: u32 = 16;

/// Endpoints and tolerance bands used by the tracker and normalizer.
///
/// # Examples
///
/// ```
/// use pwmconv_calibration::CalibrationLimits;
///
/// let limits = CalibrationLimits::default();
/// assert_eq!(limits.nominal_span(), 1000);
/// assert_eq!(limits.lower_guard_us(), 900);
/// assert_eq!(limits.upper_guard_us(), 2100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationLimits {
    /// Nominal minimum pulse width (µs).
    pub nominal_min_us: u32,
    /// Nominal maximum pulse width (µs).
    pub nominal_max_us: u32,
    /// Noise guard around the nominal endpoints (µs).
    pub noise_guard_us: u32,
    /// Margin above the global maximum before a sample is discarded (µs).
    pub ignore_margin_us: u32,
}

impl Default for CalibrationLimits {
    fn default() -> Self {
        Self {
            nominal_min_us: NOMINAL_MIN_US,
            nominal_max_us: NOMINAL_MAX_US,
            noise_guard_us: NOISE_GUARD_US,
            ignore_margin_us: IGNORE_MARGIN_US,
        }
    }
}

impl CalibrationLimits {
    /// Nominal pulse span, the smallest output range there will ever be.
    pub const fn nominal_span(&self) -> u32 {
        self.nominal_max_us.saturating_sub(self.nominal_min_us)
    }

    /// A new minimum must lie strictly above this value to be accepted.
    pub const fn lower_guard_us(&self) -> u32 {
        self.nominal_min_us.saturating_sub(self.noise_guard_us)
    }

    /// A new maximum must lie strictly below this value to be accepted.
    pub const fn upper_guard_us(&self) -> u32 {
        self.nominal_max_us.saturating_add(self.noise_guard_us)
    }
}

/// Observed pulse-width bounds of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBounds {
    /// Shortest plausible pulse seen so far (µs).
    pub min_us: u32,
    /// Longest plausible pulse seen so far (µs).
    pub max_us: u32,
}

impl ChannelBounds {
    /// Creates bounds from a minimum and maximum.
    pub const fn new(min_us: u32, max_us: u32) -> Self {
        Self { min_us, max_us }
    }

    /// Bounds seeded at the nominal endpoints.
    pub const fn nominal(limits: &CalibrationLimits) -> Self {
        Self::new(limits.nominal_min_us, limits.nominal_max_us)
    }

    /// Distance between the bounds; zero for a channel never exercised.
    pub const fn spread(&self) -> u32 {
        self.max_us.saturating_sub(self.min_us)
    }
}

/// One raw reading from the acquisition collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSample {
    /// Channel the reading belongs to.
    pub channel: ChannelId,
    /// High-pulse duration in microseconds; 0 on acquisition timeout.
    pub duration_us: u32,
}

/// The four raw pulse widths acquired in one control cycle.
pub type PulseFrame = ChannelMap<u32>;

impl ChannelMap<u32> {
    /// Iterates the frame as [`RawSample`]s in acquisition order.
    pub fn samples(&self) -> impl Iterator<Item = RawSample> + '_ {
        self.iter().map(|(channel, &duration_us)| RawSample {
            channel,
            duration_us,
        })
    }

    /// Returns the first sample shorter than `threshold_us`, if any.
    pub fn first_below(&self, threshold_us: u32) -> Option<RawSample> {
        self.samples().find(|s| s.duration_us < threshold_us)
    }
}

/// Reported when the global maximum pulse width, and with it the output range, grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeGrowth {
    /// Output range before the update.
    pub previous_range: u32,
    /// Output range after the update.
    pub current_range: u32,
}

/// Per-channel observed bounds plus the process-wide maximum.
///
/// Created with nominal seeds, mutated only through [`RangeTracker`](crate::RangeTracker),
/// and read by the normalizer and the mixer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationState {
    pub(crate) limits: CalibrationLimits,
    pub(crate) channels: ChannelMap<ChannelBounds>,
    pub(crate) global_max_us: u32,
}

impl CalibrationState {
    /// Fresh state with every channel at the nominal endpoints.
    pub fn new(limits: CalibrationLimits) -> Self {
        Self {
            channels: ChannelMap::splat(ChannelBounds::nominal(&limits)),
            global_max_us: limits.nominal_max_us,
            limits,
        }
    }

    /// Limits the state was created with.
    pub fn limits(&self) -> &CalibrationLimits {
        &self.limits
    }

    /// Observed bounds of `channel`.
    pub fn bounds(&self, channel: ChannelId) -> ChannelBounds {
        *self.channels.get(channel)
    }

    /// Observed bounds of every channel.
    pub fn channels(&self) -> &ChannelMap<ChannelBounds> {
        &self.channels
    }

    /// Largest observed maximum of any channel, never below the nominal maximum.
    pub fn global_max_us(&self) -> u32 {
        self.global_max_us
    }

    /// Output range every normalized value and wheel duty is clamped into.
    pub fn output_range(&self) -> u32 {
        self.global_max_us.saturating_sub(self.limits.nominal_min_us)
    }
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self::new(CalibrationLimits::default())
    }
}
