//! Centralized error types for the PWM converter
//!
//! The calibration core and the drive mixer are total: they never fail, they
//! clamp. Errors only exist at the edges of the system:
//!
//! - [`device`]: failures of the pulse acquisition and duty emission collaborators
//! - [`validation`]: configuration values that cannot be accepted
//! - [`calibration`]: externally supplied calibration bounds and the startup wizard
//! - [`common`]: the top-level [`PwmConvError`] with severity and category classification
//!
//! # Example
//!
//! ```
//! use pwmconv_errors::{PwmConvError, Result, ValidationError};
//!
//! fn check_frequency(hz: u32) -> Result<u32> {
//!     if hz == 0 {
//!         return Err(ValidationError::out_of_range("output.frequency_hz", hz, 1, 40_000).into());
//!     }
//!     Ok(hz)
//! }
//!
//! assert!(check_frequency(0).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod calibration;
pub mod common;
pub mod device;
pub mod validation;

pub use calibration::{CalibrationError, WizardError};
pub use common::{ErrorCategory, ErrorContext, ErrorSeverity, PwmConvError, ResultExt};
pub use device::DeviceError;
pub use validation::ValidationError;

/// A specialized `Result` type for converter operations.
pub type Result<T> = std::result::Result<T, PwmConvError>;
