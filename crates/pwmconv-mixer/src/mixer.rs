//! Three-axis to four-duty mixing

use serde::{Deserialize, Serialize};

use crate::{DriveCommand, Lateral, Longitudinal, WheelOutputs};

/// Default tilt deadband, in normalized units.
pub const TILT_TRIGGER: u32 = 20;
/// Default pan deadband, in normalized units.
pub const PAN_TRIGGER: u32 = 20;

/// Deadbands a stick must clear around center before its axis is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixerTriggers {
    /// Tilt deadband.
    pub tilt_trigger: u32,
    /// Pan deadband.
    pub pan_trigger: u32,
}

impl Default for MixerTriggers {
    fn default() -> Self {
        Self {
            tilt_trigger: TILT_TRIGGER,
            pan_trigger: PAN_TRIGGER,
        }
    }
}

/// Everything one mix needs, all in normalized units.
///
/// `pan_spread` and `tilt_spread` are the observed `max - min` of those
/// channels; their halves are the stick centers and the scaling divisors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixInput {
    /// Throttle value.
    pub speed: u32,
    /// Pan value.
    pub pan: u32,
    /// Tilt value.
    pub tilt: u32,
    /// Observed pan spread.
    pub pan_spread: u32,
    /// Observed tilt spread.
    pub tilt_spread: u32,
    /// Upper clamp for every wheel duty.
    pub output_range: u32,
}

impl MixInput {
    /// Input for a receiver calibrated at the nominal 1000 µs span.
    pub const fn nominal(speed: u32, pan: u32, tilt: u32) -> Self {
        Self::with_spread(speed, pan, tilt, 1000)
    }

    /// Input with both steering spreads and the output range set to `spread`.
    pub const fn with_spread(speed: u32, pan: u32, tilt: u32, spread: u32) -> Self {
        Self {
            speed,
            pan,
            tilt,
            pan_spread: spread,
            tilt_spread: spread,
            output_range: spread,
        }
    }
}

/// Result of one mix: the derived intent and the clamped wheel duties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MixOutput {
    /// Direction flags and magnitudes.
    pub command: DriveCommand,
    /// Duties for the four outputs.
    pub wheels: WheelOutputs,
}

/// Stateless differential-drive mixer.
///
/// Direction flags are recomputed from scratch on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveMixer {
    triggers: MixerTriggers,
}

/// Which side of center an axis is deflected to, with the scaled magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deflection {
    Centered,
    Positive(u32),
    Negative(u32),
}

impl Deflection {
    fn magnitude(self) -> u32 {
        match self {
            Deflection::Centered => 0,
            Deflection::Positive(m) | Deflection::Negative(m) => m,
        }
    }
}

/// Classifies `value` against the center of `spread` and scales the
/// displacement by `speed`.
fn deflect(speed: u32, value: u32, spread: u32, trigger: u32) -> Deflection {
    let half = spread / 2;
    if half == 0 {
        return Deflection::Centered;
    }

    let value = i64::from(value);
    let mid = i64::from(half);
    let trigger = i64::from(trigger);

    let rel = if value > mid + trigger {
        value - mid
    } else if value < mid - trigger {
        mid - value
    } else {
        return Deflection::Centered;
    };

    let scaled = i64::from(speed) * rel / mid;
    let magnitude = u32::try_from(scaled).unwrap_or(u32::MAX);
    if value > mid {
        Deflection::Positive(magnitude)
    } else {
        Deflection::Negative(magnitude)
    }
}

impl DriveMixer {
    /// Creates a mixer with the given deadbands.
    pub const fn new(triggers: MixerTriggers) -> Self {
        Self { triggers }
    }

    /// Deadbands in use.
    pub fn triggers(&self) -> &MixerTriggers {
        &self.triggers
    }

    /// Derives the drive intent without assigning wheel duties.
    pub fn command(&self, input: &MixInput) -> DriveCommand {
        let tilt = deflect(
            input.speed,
            input.tilt,
            input.tilt_spread,
            self.triggers.tilt_trigger,
        );
        let pan = deflect(
            input.speed,
            input.pan,
            input.pan_spread,
            self.triggers.pan_trigger,
        );

        DriveCommand {
            advance: tilt.magnitude(),
            rotation: pan.magnitude(),
            longitudinal: match tilt {
                Deflection::Centered => Longitudinal::Neutral,
                Deflection::Positive(_) => Longitudinal::Forward,
                Deflection::Negative(_) => Longitudinal::Backward,
            },
            lateral: match pan {
                Deflection::Centered => Lateral::Straight,
                Deflection::Positive(_) => Lateral::Right,
                Deflection::Negative(_) => Lateral::Left,
            },
        }
    }

    /// Mixes one cycle's stick values into wheel duties.
    ///
    /// # Examples
    ///
    /// ```
    /// use pwmconv_mixer::{DriveMixer, Lateral, MixInput, WheelOutputs};
    ///
    /// // Throttle at half, pan 40 right of center, tilt centered: pivot right.
    /// let out = DriveMixer::default().mix(&MixInput::nominal(500, 540, 500));
    /// assert_eq!(out.command.lateral, Lateral::Right);
    /// assert_eq!(
    ///     out.wheels,
    ///     WheelOutputs { wheel1_cw: 40, wheel1_ccw: 0, wheel2_cw: 0, wheel2_ccw: 40 }
    /// );
    /// ```
    pub fn mix(&self, input: &MixInput) -> MixOutput {
        let command = self.command(input);
        let wheels = arbitrate(&command).clamped(input.output_range);
        MixOutput { command, wheels }
    }
}

/// Assigns the four duties from the direction pair.
fn arbitrate(cmd: &DriveCommand) -> WheelOutputs {
    let a = i64::from(cmd.advance);
    let r = i64::from(cmd.rotation);

    let mut w = [0i64; 4];
    match cmd.longitudinal {
        Longitudinal::Forward => w = [a, 0, a, 0],
        Longitudinal::Backward => w = [0, a, 0, a],
        Longitudinal::Neutral => {}
    }

    if r > 0 {
        let inner_fwd = (a - r).max(0);
        let inner_rev = (r - a).max(0);
        let outer = a.max(r);
        let diff = (a - r).abs();

        w = match (cmd.longitudinal, cmd.lateral) {
            (Longitudinal::Forward, Lateral::Right) => [outer, 0, inner_fwd, inner_rev],
            (Longitudinal::Forward, Lateral::Left) => [inner_fwd, inner_rev, outer, 0],
            (Longitudinal::Backward, Lateral::Right) => [0, a, 0, diff],
            (Longitudinal::Backward, Lateral::Left) => [0, diff, 0, a],
            (Longitudinal::Neutral, Lateral::Right) => {
                let [w1cw, w1ccw, w2cw, w2ccw] = w;
                [w1cw + r, w1ccw, w2cw, w2ccw + r]
            }
            (Longitudinal::Neutral, Lateral::Left) => {
                let [w1cw, w1ccw, w2cw, w2ccw] = w;
                [w1cw, w1ccw + r, w2cw + r, w2ccw]
            }
            (_, Lateral::Straight) => w,
        };
    }

    let [wheel1_cw, wheel1_ccw, wheel2_cw, wheel2_ccw] = w.map(non_negative);
    WheelOutputs {
        wheel1_cw,
        wheel1_ccw,
        wheel2_cw,
        wheel2_ccw,
    }
}

fn non_negative(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

impl WheelOutputs {
    /// Clamps every duty to `range`.
    pub fn clamped(self, range: u32) -> Self {
        Self {
            wheel1_cw: self.wheel1_cw.min(range),
            wheel1_ccw: self.wheel1_ccw.min(range),
            wheel2_cw: self.wheel2_cw.min(range),
            wheel2_ccw: self.wheel2_ccw.min(range),
        }
    }
}
