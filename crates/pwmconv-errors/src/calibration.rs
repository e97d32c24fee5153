//! Calibration and startup wizard errors.

use crate::common::ErrorSeverity;
use crate::device::DeviceError;

/// Rejected calibration input.
///
/// The running range tracker cannot fail; this only covers bounds handed in
/// from outside (wizard results, restored sessions).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalibrationError {
    /// Seed bounds with `min > max`
    #[error("Invalid bounds for channel {channel}: min {min}us > max {max}us")]
    InvalidBounds {
        /// Channel name
        channel: &'static str,
        /// Proposed minimum in microseconds
        min: u32,
        /// Proposed maximum in microseconds
        max: u32,
    },
}

/// Startup calibration wizard failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// A gate was polled the configured number of times without the stick reaching it
    #[error("Gate '{gate}' not reached after {polls} polls")]
    GateTimeout {
        /// Gate description, e.g. `throttle low`
        gate: String,
        /// Number of polls performed
        polls: u32,
    },

    /// The pulse source failed while waiting for the operator
    #[error("Pulse source failed during wizard: {0}")]
    Source(#[from] DeviceError),

    /// The wizard produced bounds the tracker refused
    #[error(transparent)]
    Rejected(#[from] CalibrationError),
}

impl WizardError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            WizardError::GateTimeout { .. } => ErrorSeverity::Warning,
            WizardError::Source(e) => e.severity(),
            WizardError::Rejected(_) => ErrorSeverity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bounds_display() {
        let err = CalibrationError::InvalidBounds {
            channel: "pan",
            min: 1900,
            max: 1100,
        };
        assert_eq!(
            err.to_string(),
            "Invalid bounds for channel pan: min 1900us > max 1100us"
        );
    }

    #[test]
    fn test_wizard_severity_follows_source() {
        let err = WizardError::from(DeviceError::disconnected("receiver"));
        assert_eq!(err.severity(), ErrorSeverity::Critical);

        let err = WizardError::GateTimeout {
            gate: "tilt high".into(),
            polls: 10,
        };
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }
}
