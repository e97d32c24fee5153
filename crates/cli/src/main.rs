//! pwmconvctl - RC PWM converter control CLI
//!
//! Manages the converter configuration, replays recorded receiver pulse
//! captures through the control cycle, and evaluates the drive mixer offline.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pwmconv_errors::{ErrorCategory, PwmConvError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::ConfigCommands;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "pwmconvctl")]
#[command(about = "RC PWM converter CLI - configure, replay captures, and test the drive mixer")]
#[command(version)]
#[command(long_about = "
pwmconvctl manages the configuration of the RC PWM converter, which turns RC
receiver pulses into differential-drive wheel duties, and runs its control
cycle offline against recorded pulse captures.

Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration file management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Run the control cycle over a recorded pulse capture
    Replay {
        /// Capture file: four pulse widths (µs) per line
        capture: PathBuf,
        /// Configuration file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Run the calibration wizard over the head of the capture first
        #[arg(short, long)]
        wizard: bool,
    },

    /// Evaluate the drive mixer once
    Mix {
        /// Normalized throttle value
        #[arg(long)]
        speed: u32,
        /// Normalized pan value
        #[arg(long)]
        pan: u32,
        /// Normalized tilt value
        #[arg(long)]
        tilt: u32,
        /// Observed spread of pan and tilt, also used as the output range
        #[arg(long, default_value_t = 1000)]
        spread: u32,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("pwmconvctl={log_level},pwmconv_engine={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            ExitCode::from(exit_code(&e))
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Config(cmd) => commands::config::execute(cmd, cli.json),
        Commands::Replay {
            capture,
            config,
            wizard,
        } => commands::replay::execute(capture, config.as_deref(), *wizard, cli.json),
        Commands::Mix {
            speed,
            pan,
            tilt,
            spread,
        } => commands::mix::execute(*speed, *pan, *tilt, *spread, cli.json),
        Commands::Completion { shell } => {
            completion::generate_completion(*shell);
            Ok(())
        }
    }
}

/// Maps an error to the process exit code.
fn exit_code(e: &anyhow::Error) -> u8 {
    if let Some(cli_err) = e.downcast_ref::<CliError>() {
        return match cli_err {
            CliError::ConfigNotFound(_) | CliError::InvalidConfiguration(_) => 4,
            CliError::CaptureError(_) => 2,
            CliError::AlreadyExists(_) | CliError::IoError(_) | CliError::JsonError(_) => 1,
        };
    }

    match e.downcast_ref::<PwmConvError>().map(PwmConvError::category) {
        Some(ErrorCategory::Config | ErrorCategory::Validation) => 4,
        Some(ErrorCategory::Device | ErrorCategory::Calibration) => 2,
        _ => 1,
    }
}
