//! Property-based tests for range tracking and normalization.

use proptest::prelude::*;
use pwmconv_calibration::{
    CalibrationLimits, ChannelBounds, ChannelId, Normalizer, PulseFrame, RangeTracker,
};

fn channel() -> impl Strategy<Value = ChannelId> {
    prop_oneof![
        Just(ChannelId::Throttle),
        Just(ChannelId::Pan),
        Just(ChannelId::Tilt),
        Just(ChannelId::Aux),
    ]
}

/// Pulse widths covering timeouts, glitches, the guard bands and spikes.
fn pulse() -> impl Strategy<Value = u32> {
    prop_oneof![
        Just(0u32),
        0u32..800,
        800u32..1200,
        1200u32..1800,
        1800u32..2200,
        2200u32..30_000,
    ]
}

fn frame() -> impl Strategy<Value = PulseFrame> {
    (pulse(), pulse(), pulse(), pulse()).prop_map(|(t, p, l, a)| PulseFrame::new(t, p, l, a))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn normalize_stays_within_output_range(
        frames in proptest::collection::vec(frame(), 1..40),
        sample_us in pulse(),
        ch in channel(),
    ) {
        let mut tracker = RangeTracker::new(CalibrationLimits::default());
        let mut normalizer = Normalizer::new();
        for f in &frames {
            tracker.observe(f);
            let values = normalizer.normalize_frame(tracker.state(), f);
            for (_, &v) in values.iter() {
                prop_assert!(v <= tracker.state().output_range());
            }
        }
        let v = normalizer.normalize(tracker.state(), ch, sample_us);
        prop_assert!(v <= tracker.state().output_range());
    }

    #[test]
    fn bounds_are_monotonic(frames in proptest::collection::vec(frame(), 1..60)) {
        let mut tracker = RangeTracker::new(CalibrationLimits::default());
        let mut before = tracker.state().clone();
        for f in &frames {
            tracker.observe(f);
            let after = tracker.state();
            for ch in ChannelId::ALL {
                let (old, new) = (before.bounds(ch), after.bounds(ch));
                prop_assert!(new.min_us <= old.min_us, "min increased on {}", ch);
                prop_assert!(new.max_us >= old.max_us, "max decreased on {}", ch);
                prop_assert!(new.min_us <= new.max_us);
            }
            prop_assert!(after.global_max_us() >= before.global_max_us());
            prop_assert!(after.output_range() >= CalibrationLimits::default().nominal_span());
            before = after.clone();
        }
    }

    #[test]
    fn bounds_stay_inside_guard_band(frames in proptest::collection::vec(frame(), 1..60)) {
        let limits = CalibrationLimits::default();
        let mut tracker = RangeTracker::new(limits);
        for f in &frames {
            tracker.observe(f);
        }
        for ch in ChannelId::ALL {
            let b = tracker.state().bounds(ch);
            prop_assert!(b.min_us > limits.lower_guard_us());
            prop_assert!(b.max_us < limits.upper_guard_us());
        }
    }

    #[test]
    fn repeated_input_is_idempotent(raw in 901u32..2100, ch in channel(), repeats in 2usize..20) {
        let mut tracker = RangeTracker::new(CalibrationLimits::default());
        tracker.update(ch, raw);
        tracker.refresh_global();
        let first = tracker.state().clone();
        for _ in 0..repeats {
            tracker.update(ch, raw);
            prop_assert!(tracker.refresh_global().is_none());
        }
        prop_assert_eq!(tracker.state(), &first);
    }

    #[test]
    fn global_growth_is_reported_exactly_when_range_changes(
        frames in proptest::collection::vec(frame(), 1..40),
    ) {
        let mut tracker = RangeTracker::new(CalibrationLimits::default());
        for f in &frames {
            let before = tracker.state().output_range();
            match tracker.observe(f) {
                Some(growth) => {
                    prop_assert_eq!(growth.previous_range, before);
                    prop_assert!(growth.current_range > before);
                    prop_assert_eq!(growth.current_range, tracker.state().output_range());
                }
                None => prop_assert_eq!(tracker.state().output_range(), before),
            }
        }
    }

    #[test]
    fn seed_rejects_only_inverted_bounds(min in 900u32..2100, max in 900u32..2100, ch in channel()) {
        let mut tracker = RangeTracker::new(CalibrationLimits::default());
        let result = tracker.seed(ch, ChannelBounds::new(min, max));
        prop_assert_eq!(result.is_ok(), min <= max);
    }
}
