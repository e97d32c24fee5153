//! Differential-drive mixer
//!
//! Turns three normalized stick values (throttle, pan, tilt) into duty values
//! for two reversible motors, each driven through a clockwise and a
//! counter-clockwise output.
//!
//! # Overview
//!
//! - The tilt axis decides forward/backward and the advance magnitude.
//! - The pan axis decides left/right and the rotation magnitude.
//! - Both magnitudes are the stick displacement beyond center, as a fraction
//!   of the half-spread, scaled by throttle.
//! - The direction pair picks one arbitration rule; the result is clamped
//!   into `[0, output_range]`.
//!
//! The mixer holds no state between calls and never fails. A zero spread on
//! an axis yields zero magnitude for that axis.
//!
//! # Example
//!
//! ```
//! use pwmconv_mixer::{DriveMixer, Longitudinal, MixInput};
//!
//! let mixer = DriveMixer::default();
//! let out = mixer.mix(&MixInput::nominal(500, 500, 540));
//!
//! assert_eq!(out.command.longitudinal, Longitudinal::Forward);
//! assert_eq!(out.wheels.wheel1_cw, 40);
//! assert_eq!(out.wheels.wheel2_cw, 40);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod command;
pub mod mixer;

pub use command::{DriveCommand, Lateral, Longitudinal, WheelOutput, WheelOutputs};
pub use mixer::{DriveMixer, MixInput, MixOutput, MixerTriggers, PAN_TRIGGER, TILT_TRIGGER};
