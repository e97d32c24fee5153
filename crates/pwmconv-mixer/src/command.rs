//! Drive command and wheel duty types

use serde::{Deserialize, Serialize};

/// Direction chosen on the tilt axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Longitudinal {
    /// Tilt stick inside the deadband
    #[default]
    Neutral,
    /// Tilt stick pushed past center plus trigger
    Forward,
    /// Tilt stick pulled below center minus trigger
    Backward,
}

/// Direction chosen on the pan axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lateral {
    /// Pan stick inside the deadband
    #[default]
    Straight,
    /// Pan stick below center minus trigger
    Left,
    /// Pan stick above center plus trigger
    Right,
}

impl Lateral {
    /// The opposite turn direction.
    pub const fn mirrored(self) -> Self {
        match self {
            Lateral::Straight => Lateral::Straight,
            Lateral::Left => Lateral::Right,
            Lateral::Right => Lateral::Left,
        }
    }
}

/// Per-cycle drive intent derived from the tilt and pan axes.
///
/// The enums make "forward and backward at once" unrepresentable; the
/// `go_*` accessors give the flag view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DriveCommand {
    /// Throttle-scaled tilt displacement.
    pub advance: u32,
    /// Throttle-scaled pan displacement.
    pub rotation: u32,
    /// Tilt direction.
    pub longitudinal: Longitudinal,
    /// Pan direction.
    pub lateral: Lateral,
}

impl DriveCommand {
    /// Tilt is past the forward trigger.
    pub fn go_forward(&self) -> bool {
        self.longitudinal == Longitudinal::Forward
    }

    /// Tilt is past the backward trigger.
    pub fn go_backward(&self) -> bool {
        self.longitudinal == Longitudinal::Backward
    }

    /// Pan is past the left trigger.
    pub fn go_left(&self) -> bool {
        self.lateral == Lateral::Left
    }

    /// Pan is past the right trigger.
    pub fn go_right(&self) -> bool {
        self.lateral == Lateral::Right
    }
}

/// Output channels of the two motors.
///
/// Wheel 1 is the left motor, wheel 2 the right one; CW drives forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelOutput {
    /// Left motor, forward rotation
    Wheel1Cw,
    /// Left motor, reverse rotation
    Wheel1Ccw,
    /// Right motor, forward rotation
    Wheel2Cw,
    /// Right motor, reverse rotation
    Wheel2Ccw,
}

impl WheelOutput {
    /// All outputs in emission order.
    pub const ALL: [WheelOutput; 4] = [
        WheelOutput::Wheel1Cw,
        WheelOutput::Wheel1Ccw,
        WheelOutput::Wheel2Cw,
        WheelOutput::Wheel2Ccw,
    ];

    /// Name used in logs and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            WheelOutput::Wheel1Cw => "wheel1_cw",
            WheelOutput::Wheel1Ccw => "wheel1_ccw",
            WheelOutput::Wheel2Cw => "wheel2_cw",
            WheelOutput::Wheel2Ccw => "wheel2_ccw",
        }
    }
}

/// Motor duty commands for one cycle, each in `[0, output_range]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WheelOutputs {
    /// Left motor forward duty.
    pub wheel1_cw: u32,
    /// Left motor reverse duty.
    pub wheel1_ccw: u32,
    /// Right motor forward duty.
    pub wheel2_cw: u32,
    /// Right motor reverse duty.
    pub wheel2_ccw: u32,
}

impl WheelOutputs {
    /// All outputs off.
    pub const STOPPED: WheelOutputs = WheelOutputs {
        wheel1_cw: 0,
        wheel1_ccw: 0,
        wheel2_cw: 0,
        wheel2_ccw: 0,
    };

    /// Duty of one output.
    pub fn duty(&self, output: WheelOutput) -> u32 {
        match output {
            WheelOutput::Wheel1Cw => self.wheel1_cw,
            WheelOutput::Wheel1Ccw => self.wheel1_ccw,
            WheelOutput::Wheel2Cw => self.wheel2_cw,
            WheelOutput::Wheel2Ccw => self.wheel2_ccw,
        }
    }

    /// `(output, duty)` pairs in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (WheelOutput, u32)> + '_ {
        WheelOutput::ALL.into_iter().map(move |o| (o, self.duty(o)))
    }

    /// Swaps the left and right motors.
    pub const fn mirrored(self) -> Self {
        Self {
            wheel1_cw: self.wheel2_cw,
            wheel1_ccw: self.wheel2_ccw,
            wheel2_cw: self.wheel1_cw,
            wheel2_ccw: self.wheel1_ccw,
        }
    }

    /// True when every duty is zero.
    pub fn is_stopped(&self) -> bool {
        *self == Self::STOPPED
    }
}
