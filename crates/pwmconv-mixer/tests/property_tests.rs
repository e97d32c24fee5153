//! Property-based tests for the drive mixer.

use proptest::prelude::*;
use pwmconv_mixer::{DriveMixer, Lateral, Longitudinal, MixInput, MixerTriggers};

/// Spreads from degenerate to wider than nominal.
fn spread() -> impl Strategy<Value = u32> {
    prop_oneof![Just(0u32), Just(1u32), 2u32..200, 800u32..1200]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn centered_sticks_stop_both_wheels(speed in 0u32..=2000, spread in spread()) {
        let half = spread / 2;
        let input = MixInput::with_spread(speed, half, half, spread);
        let out = DriveMixer::default().mix(&input);
        prop_assert!(out.wheels.is_stopped());
        prop_assert_eq!(out.command.longitudinal, Longitudinal::Neutral);
        prop_assert_eq!(out.command.lateral, Lateral::Straight);
    }

    #[test]
    fn pan_deflection_mirrors_wheels(
        speed in 0u32..=1100,
        k in 0u32..=550,
        tilt in 0u32..=1100,
        spread in 2u32..=1100,
    ) {
        let mid = spread / 2;
        let k = k.min(mid);
        let mixer = DriveMixer::default();
        let right = mixer.mix(&MixInput::with_spread(speed, mid + k, tilt, spread));
        let left = mixer.mix(&MixInput::with_spread(speed, mid - k, tilt, spread));

        prop_assert_eq!(left.wheels, right.wheels.mirrored());
        prop_assert_eq!(left.command.lateral, right.command.lateral.mirrored());
        prop_assert_eq!(left.command.rotation, right.command.rotation);
    }

    #[test]
    fn duties_never_exceed_output_range(
        speed in 0u32..=5000,
        pan in 0u32..=5000,
        tilt in 0u32..=5000,
        pan_spread in spread(),
        tilt_spread in spread(),
        output_range in 0u32..=2000,
    ) {
        let input = MixInput { speed, pan, tilt, pan_spread, tilt_spread, output_range };
        let out = DriveMixer::default().mix(&input);
        for (_, duty) in out.wheels.iter() {
            prop_assert!(duty <= output_range);
        }
    }

    #[test]
    fn zero_spread_axis_has_zero_magnitude(
        speed in 0u32..=2000,
        pan in 0u32..=2000,
        tilt in 0u32..=2000,
        collapsed in 0u32..2,
    ) {
        let input = MixInput {
            speed,
            pan,
            tilt,
            pan_spread: collapsed,
            tilt_spread: collapsed,
            output_range: 1000,
        };
        let out = DriveMixer::default().mix(&input);
        prop_assert_eq!(out.command.advance, 0);
        prop_assert_eq!(out.command.rotation, 0);
        prop_assert!(out.wheels.is_stopped());
    }

    #[test]
    fn no_motor_is_driven_both_ways(
        speed in 0u32..=1000,
        pan in 0u32..=1000,
        tilt in 0u32..=1000,
        tilt_trigger in 0u32..100,
        pan_trigger in 0u32..100,
    ) {
        let mixer = DriveMixer::new(MixerTriggers { tilt_trigger, pan_trigger });
        let w = mixer.mix(&MixInput::nominal(speed, pan, tilt)).wheels;
        prop_assert!(w.wheel1_cw == 0 || w.wheel1_ccw == 0);
        prop_assert!(w.wheel2_cw == 0 || w.wheel2_ccw == 0);
    }

    #[test]
    fn deflection_inside_deadband_is_ignored(
        speed in 0u32..=1000,
        dp in -20i32..=20,
        dt in -20i32..=20,
    ) {
        let pan = u32::try_from(500 + dp).unwrap_or(500);
        let tilt = u32::try_from(500 + dt).unwrap_or(500);
        let out = DriveMixer::default().mix(&MixInput::nominal(speed, pan, tilt));
        prop_assert!(out.wheels.is_stopped());
    }
}
