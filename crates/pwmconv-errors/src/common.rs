//! Top-level error type, classification and context helpers.

use core::fmt;

use crate::{CalibrationError, DeviceError, ValidationError, WizardError};

/// Top-level error type wrapping every converter sub-error.
#[derive(Debug, thiserror::Error)]
pub enum PwmConvError {
    /// Acquisition or emission collaborator failure
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Configuration validation failure
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Rejected calibration data
    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    /// Startup calibration wizard failure
    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Configuration document errors (parse, schema tag)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl PwmConvError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            PwmConvError::Device(_) => ErrorCategory::Device,
            PwmConvError::Validation(_) => ErrorCategory::Validation,
            PwmConvError::Calibration(_) | PwmConvError::Wizard(_) => ErrorCategory::Calibration,
            PwmConvError::Io(_) => ErrorCategory::IO,
            PwmConvError::Config(_) => ErrorCategory::Config,
            PwmConvError::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PwmConvError::Device(e) => e.severity(),
            PwmConvError::Wizard(e) => e.severity(),
            PwmConvError::Validation(_)
            | PwmConvError::Calibration(_)
            | PwmConvError::Io(_)
            | PwmConvError::Config(_)
            | PwmConvError::Other(_) => ErrorSeverity::Error,
        }
    }

    /// Check if this error is recoverable.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        PwmConvError::Config(msg.into())
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        PwmConvError::Other(msg.into())
    }
}

impl From<std::io::Error> for PwmConvError {
    fn from(e: std::io::Error) -> Self {
        PwmConvError::Io(e)
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Acquisition/emission collaborator errors
    Device = 1,
    /// Calibration data and wizard errors
    Calibration = 2,
    /// Configuration document errors
    Config = 3,
    /// I/O errors
    IO = 4,
    /// Validation errors
    Validation = 5,
    /// Other errors
    Other = 255,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Device => write!(f, "Device"),
            ErrorCategory::Calibration => write!(f, "Calibration"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Validation => write!(f, "Validation"),
            ErrorCategory::Other => write!(f, "Other"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the control loop cannot continue
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Context information attached to an error on its way up.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The operation that was being performed
    pub operation: String,
    /// Additional context key-value pairs
    pub context: Vec<(String, String)>,
}

impl ErrorContext {
    /// Create a new error context for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            context: Vec::new(),
        }
    }

    /// Add a context key-value pair.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation: {}", self.operation)?;
        for (key, value) in &self.context {
            write!(f, ", {key}: {value}")?;
        }
        Ok(())
    }
}

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, ctx: ErrorContext) -> Result<T, PwmConvError>;

    /// Add context with an operation name.
    fn with_context(self, operation: impl Into<String>) -> Result<T, PwmConvError>;
}

impl<T, E: Into<PwmConvError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, ctx: ErrorContext) -> Result<T, PwmConvError> {
        self.map_err(|e| {
            let err: PwmConvError = e.into();
            match err {
                // Keep the typed variant so callers can still classify it.
                PwmConvError::Io(io) => {
                    PwmConvError::Io(std::io::Error::new(io.kind(), format!("{ctx}: {io}")))
                }
                other => PwmConvError::Other(format!("{ctx}: {other}")),
            }
        })
    }

    fn with_context(self, operation: impl Into<String>) -> Result<T, PwmConvError> {
        self.context(ErrorContext::new(operation))
    }
}
