//! Offline mixer evaluation

use anyhow::Result;
use pwmconv_mixer::{DriveMixer, MixInput, MixerTriggers};

use crate::output;

/// Execute the mix command
pub fn execute(speed: u32, pan: u32, tilt: u32, spread: u32, json: bool) -> Result<()> {
    let input = MixInput::with_spread(speed, pan, tilt, spread);
    let out = DriveMixer::new(MixerTriggers::default()).mix(&input);
    output::print_mix(&input, &out, json);
    Ok(())
}
