//! Receiver channel calibration
//!
//! This crate learns the real pulse-width range of each RC receiver channel
//! while the vehicle runs and maps raw pulse widths onto a common output
//! scale.
//!
//! - [`RangeTracker`] widens per-channel bounds inside a noise guard band and
//!   reports when the global output range grows.
//! - [`Normalizer`] turns a raw pulse width into a value in `[0, output_range]`,
//!   replacing out-of-band spikes and holding through single undershoots.
//!
//! Neither component logs or fails: every input produces a bounded value.
//!
//! # Example
//!
//! ```
//! use pwmconv_calibration::{CalibrationLimits, ChannelId, Normalizer, PulseFrame, RangeTracker};
//!
//! let mut tracker = RangeTracker::new(CalibrationLimits::default());
//! let mut normalizer = Normalizer::new();
//!
//! let frame = PulseFrame::new(1500, 1500, 1500, 1500);
//! assert!(tracker.observe(&frame).is_none());
//!
//! let throttle = normalizer.normalize(tracker.state(), ChannelId::Throttle, 1500);
//! assert_eq!(throttle, 500);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod channel;
pub mod normalize;
pub mod tracker;
pub mod types;

pub use channel::*;
pub use normalize::*;
pub use tracker::*;
pub use types::*;

pub use pwmconv_errors::CalibrationError;

/// Result type for operations that accept external calibration data.
pub type CalibrationResult<T> = Result<T, CalibrationError>;
