//! Collaborator error types.
//!
//! The acquisition collaborator reports a bounded-wait timeout as a zero
//! pulse width, not as an error, so everything here is either terminal for
//! the source (`Disconnected`, `Exhausted`) or a failed duty write.

use crate::common::ErrorSeverity;

/// Pulse acquisition and duty emission errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// Source or sink is no longer reachable
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// A finite pulse source (capture replay, script) has no more samples
    #[error("Pulse source exhausted")]
    Exhausted,

    /// Capture data could not be decoded
    #[error("Malformed capture at line {line}: {reason}")]
    MalformedCapture {
        /// 1-based line number in the capture
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Duty write rejected by the output driver
    #[error("Failed to write duty to output {output}: {reason}")]
    WriteFailed {
        /// Output identifier
        output: String,
        /// Failure reason
        reason: String,
    },

    /// Output driver refused a range or frequency setting
    #[error("Output driver rejected {setting}={value}")]
    ConfigurationRejected {
        /// Setting name
        setting: &'static str,
        /// Rejected value
        value: u32,
    },
}

impl DeviceError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DeviceError::Disconnected(_) => ErrorSeverity::Critical,
            DeviceError::Exhausted => ErrorSeverity::Info,
            DeviceError::MalformedCapture { .. } => ErrorSeverity::Error,
            DeviceError::WriteFailed { .. } => ErrorSeverity::Error,
            DeviceError::ConfigurationRejected { .. } => ErrorSeverity::Error,
        }
    }

    /// Check if this error ends the acquisition stream.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, DeviceError::Exhausted | DeviceError::Disconnected(_))
    }

    /// Create a disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        DeviceError::Disconnected(device.into())
    }

    /// Create a malformed capture error.
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        DeviceError::MalformedCapture {
            line,
            reason: reason.into(),
        }
    }

    /// Create a write failure error.
    pub fn write_failed(output: impl Into<String>, reason: impl Into<String>) -> Self {
        DeviceError::WriteFailed {
            output: output.into(),
            reason: reason.into(),
        }
    }
}
