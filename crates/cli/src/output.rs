//! Output formatting for CLI responses

use std::path::Path;

use anyhow::Error;
use colored::*;
use pwmconv_calibration::ChannelId;
use pwmconv_engine::{CycleOutcome, CycleReport, EngineConfig, WizardReport};
use pwmconv_errors::PwmConvError;
use pwmconv_mixer::{DriveCommand, Lateral, Longitudinal, MixInput, MixOutput, WheelOutputs};
use serde::Serialize;
use serde_json::json;

use crate::commands::replay::ReplaySummary;
use crate::error::CliError;

fn print_json(value: &serde_json::Value, what: &str) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format {what} as JSON: {e}"),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    print_json(&error_json, "error");
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

fn error_type_name(error: &Error) -> String {
    if let Some(e) = error.downcast_ref::<PwmConvError>() {
        return e.category().to_string();
    }
    match error.downcast_ref::<CliError>() {
        Some(CliError::ConfigNotFound(_) | CliError::AlreadyExists(_)) => "Config".to_string(),
        Some(CliError::InvalidConfiguration(_)) => "Validation".to_string(),
        Some(CliError::CaptureError(_)) => "Device".to_string(),
        Some(CliError::IoError(_)) => "IO".to_string(),
        Some(CliError::JsonError(_)) => "Json".to_string(),
        None => "Other".to_string(),
    }
}

/// Print the configuration document
pub fn print_config(config: &EngineConfig, path: &Path, json: bool) {
    if json {
        print_json(
            &json!({
                "success": true,
                "path": path,
                "config": config
            }),
            "configuration",
        );
        return;
    }

    println!("{} {}", "Configuration:".bold(), path.display());
    println!("  Schema: {}", config.schema_version);

    let cal = &config.calibration;
    println!("  {}:", "Calibration".bold());
    println!(
        "    Nominal span: {}-{} µs",
        cal.nominal_min_us, cal.nominal_max_us
    );
    println!("    Noise guard: {} µs", cal.noise_guard_us);
    println!("    Ignore margin: {} µs", cal.ignore_margin_us);

    println!("  {}:", "Mixer".bold());
    println!("    Tilt trigger: {}", config.mixer.tilt_trigger);
    println!("    Pan trigger: {}", config.mixer.pan_trigger);

    println!("  {}:", "Signal gate".bold());
    println!(
        "    Detection threshold: {} µs",
        config.gate.detection_threshold_us
    );
    println!("    On signal loss: {:?}", config.gate.on_signal_loss);

    println!("  {}:", "Output".bold());
    println!("    Frequency: {} Hz", config.output.frequency_hz);

    let wiz = &config.wizard;
    println!("  {}:", "Wizard".bold());
    println!(
        "    Enabled: {}",
        if wiz.enabled { "Yes".green() } else { "No".yellow() }
    );
    println!("    Poll interval: {} ms", wiz.poll_interval_ms);
    println!("    Settle: {} ms", wiz.settle_ms);
    println!("    Extreme window: {} µs", wiz.extreme_window_us);
    match wiz.max_polls_per_gate {
        Some(max) => println!("    Max polls per gate: {max}"),
        None => println!("    Max polls per gate: unlimited"),
    }
}

/// Print the result of `config init`
pub fn print_config_written(path: &Path, json: bool) {
    if json {
        print_json(&json!({ "success": true, "path": path }), "result");
    } else {
        println!(
            "{} Wrote default configuration to {}",
            "✓".green(),
            path.display()
        );
    }
}

/// Print the result of `config validate`
pub fn print_config_valid(path: &Path, migrated: bool, json: bool) {
    if json {
        print_json(
            &json!({
                "success": true,
                "path": path,
                "valid": true,
                "migrated": migrated
            }),
            "result",
        );
    } else {
        println!("{} {} is valid", "✓".green(), path.display());
        if migrated {
            println!(
                "  {} legacy schema tag; save the file to upgrade it",
                "⚠".yellow()
            );
        }
    }
}

fn direction_label(command: &DriveCommand) -> String {
    let longitudinal = match command.longitudinal {
        Longitudinal::Forward => Some("forward"),
        Longitudinal::Backward => Some("backward"),
        Longitudinal::Neutral => None,
    };
    let lateral = match command.lateral {
        Lateral::Left => Some("left"),
        Lateral::Right => Some("right"),
        Lateral::Straight => None,
    };
    match (longitudinal, lateral) {
        (Some(l), Some(r)) => format!("{l}+{r}"),
        (Some(l), None) => l.to_string(),
        (None, Some(r)) => format!("pivot {r}"),
        (None, None) => "stop".to_string(),
    }
}

fn wheels_line(wheels: &WheelOutputs) -> String {
    wheels
        .iter()
        .map(|(output, duty)| format!("{} {duty:>4}", output.name()))
        .collect::<Vec<_>>()
        .join("  ")
}

fn frame_line(report: &CycleReport) -> String {
    ChannelId::ALL
        .iter()
        .map(|&channel| format!("{channel} {:>4}", report.frame.get(channel)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Print one cycle in human format
pub fn print_cycle_human(index: usize, outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Emitted(report) => {
            println!(
                "  {:>5}  {}  {:<16} {}",
                index,
                frame_line(report),
                direction_label(&report.output.command).cyan(),
                wheels_line(&report.output.wheels)
            );
            if let Some(growth) = report.range_growth {
                println!(
                    "         {} output range {} -> {}",
                    "↑".yellow(),
                    growth.previous_range,
                    growth.current_range
                );
            }
        }
        CycleOutcome::SignalLost {
            channel,
            duration_us,
            stopped,
        } => {
            let action = if *stopped { "outputs stopped" } else { "outputs held" };
            println!(
                "  {:>5}  {} {} at {} µs, {}",
                index,
                "signal lost:".red(),
                channel,
                duration_us,
                action
            );
        }
    }
}

fn print_wizard_human(report: &WizardReport) {
    println!("{}", "Calibration wizard:".bold());
    for reading in &report.readings {
        println!(
            "  {:<14} {:>5} µs after {} polls",
            reading.gate.to_string(),
            reading.duration_us,
            reading.polls
        );
    }
}

/// Print a replay run
pub fn print_replay(summary: &ReplaySummary, json: bool) {
    if json {
        match serde_json::to_value(summary) {
            Ok(mut value) => {
                if let Some(map) = value.as_object_mut() {
                    map.insert("success".to_string(), json!(true));
                }
                print_json(&value, "replay");
            }
            Err(e) => eprintln!("Failed to format replay as JSON: {e}"),
        }
        return;
    }

    if let Some(report) = &summary.wizard {
        print_wizard_human(report);
    }

    println!(
        "{} {} frames at {} Hz",
        "Replay:".bold(),
        summary.frames,
        summary.frequency_hz
    );
    for (index, outcome) in summary.cycles.iter().enumerate() {
        print_cycle_human(index.saturating_add(1), outcome);
    }

    let stats = &summary.stats;
    println!("{}", "Summary:".bold());
    println!("  Cycles: {}", stats.cycles);
    println!("  Emitted: {}", stats.emitted.to_string().green());
    if stats.skipped > 0 {
        println!(
            "  Skipped: {} ({} loss episodes)",
            stats.skipped.to_string().red(),
            stats.loss_episodes
        );
    } else {
        println!("  Skipped: 0");
    }
    println!(
        "  Output range: {} ({} widenings)",
        summary.output_range, stats.range_growths
    );
    println!("  Final duties: {}", wheels_line(&summary.final_outputs));
}

#[derive(Serialize)]
struct MixDocument<'a> {
    success: bool,
    input: &'a MixInput,
    command: &'a DriveCommand,
    wheels: &'a WheelOutputs,
}

/// Print a single mixer evaluation
pub fn print_mix(input: &MixInput, output: &MixOutput, json: bool) {
    if json {
        let doc = MixDocument {
            success: true,
            input,
            command: &output.command,
            wheels: &output.wheels,
        };
        match serde_json::to_value(&doc) {
            Ok(value) => print_json(&value, "mix"),
            Err(e) => eprintln!("Failed to format mix as JSON: {e}"),
        }
        return;
    }

    println!(
        "{} speed {} pan {} tilt {} (spread {})",
        "Mix:".bold(),
        input.speed,
        input.pan,
        input.tilt,
        input.output_range
    );
    println!(
        "  Direction: {}",
        direction_label(&output.command).cyan()
    );
    println!(
        "  Advance: {}  Rotation: {}",
        output.command.advance, output.command.rotation
    );
    for (wheel, duty) in output.wheels.iter() {
        println!("  {:<10} {duty}", wheel.name());
    }
}
