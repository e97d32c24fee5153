//! Snapshot tests pinning the arbitration table.
//!
//! Regenerate with `cargo insta review` after an intended change.

use pwmconv_mixer::{DriveCommand, DriveMixer, MixInput, WheelOutputs};
use serde::Serialize;

#[derive(Serialize)]
struct Row {
    tilt: u32,
    pan: u32,
    command: DriveCommand,
    wheels: WheelOutputs,
}

fn table(speed: u32, tilts: &[u32], pans: &[u32]) -> Vec<Row> {
    let mixer = DriveMixer::default();
    let mut rows = Vec::new();
    for &tilt in tilts {
        for &pan in pans {
            let out = mixer.mix(&MixInput::nominal(speed, pan, tilt));
            rows.push(Row {
                tilt,
                pan,
                command: out.command,
                wheels: out.wheels,
            });
        }
    }
    rows
}

#[test]
fn snapshot_arbitration_table() -> Result<(), Box<dyn std::error::Error>> {
    // advance 600 against rotation 200 at full throttle
    let rows = table(1000, &[800, 500, 200], &[600, 500, 400]);
    insta::assert_snapshot!("arbitration_table", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

#[test]
fn snapshot_rotation_dominant_turns() -> Result<(), Box<dyn std::error::Error>> {
    // advance 100 against rotation 400 at full throttle
    let rows = table(1000, &[550, 450], &[700, 300]);
    insta::assert_snapshot!("rotation_dominant_turns", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
