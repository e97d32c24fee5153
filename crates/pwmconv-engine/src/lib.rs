//! PWM converter engine
//!
//! Wires the calibration core and the drive mixer to the outside world:
//!
//! - [`io`]: the [`PulseSource`], [`DutySink`] and [`Delay`] collaborator traits
//! - [`cycle`]: the [`ControlCycle`] that runs one acquire-to-emit iteration
//! - [`wizard`]: the startup [`CalibrationWizard`]
//! - [`config`]: the [`EngineConfig`] document
//! - [`mock`] and [`replay`]: in-memory and capture-backed collaborators
//!
//! # Example
//!
//! ```
//! # fn main() -> Result<(), pwmconv_errors::DeviceError> {
//! use pwmconv_calibration::PulseFrame;
//! use pwmconv_engine::mock::{RecordingDutySink, ScriptedPulseSource};
//! use pwmconv_engine::{ControlCycle, EngineConfig};
//!
//! let mut cycle = ControlCycle::new(&EngineConfig::default());
//! let mut source = ScriptedPulseSource::new([PulseFrame::new(1500, 1500, 1540, 1500)]);
//! let mut sink = RecordingDutySink::new();
//!
//! let stats = cycle.run(&mut source, &mut sink, |_| {})?;
//! assert_eq!(stats.emitted, 1);
//! assert_eq!(cycle.last_outputs().wheel1_cw, 40);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod config;
pub mod cycle;
pub mod io;
pub mod mock;
pub mod replay;
pub mod wizard;

pub use config::{EngineConfig, GateConfig, OutputConfig, SCHEMA_VERSION, WizardConfig};
pub use cycle::{ControlCycle, CycleOutcome, CycleReport, CycleStats, SignalLossPolicy};
pub use io::{Delay, DutySink, NoDelay, PulseSource, ThreadDelay};
pub use replay::{ReplayPulseSource, parse_capture};
pub use wizard::{CalibrationWizard, Extreme, Gate, GateReading, WizardReport};
