//! Collaborator traits for pulse acquisition, duty emission and waiting

use std::collections::VecDeque;
use std::time::Duration;

use pwmconv_calibration::{ChannelId, ChannelMap, PulseFrame};
use pwmconv_errors::DeviceError;
use pwmconv_mixer::{WheelOutput, WheelOutputs};

/// Measures receiver pulse widths.
///
/// A read blocks for at most one bounded timeout. On timeout the source
/// returns `Ok(0)`, which the control cycle treats as signal loss. `Err` is
/// reserved for failures that end the loop, such as a disconnected receiver
/// or an exhausted capture.
pub trait PulseSource {
    /// Reads one high-pulse duration in microseconds.
    fn read_pulse_width(&mut self, channel: ChannelId) -> Result<u32, DeviceError>;

    /// Reads all four channels in acquisition order.
    fn read_frame(&mut self) -> Result<PulseFrame, DeviceError> {
        let throttle = self.read_pulse_width(ChannelId::Throttle)?;
        let pan = self.read_pulse_width(ChannelId::Pan)?;
        let tilt = self.read_pulse_width(ChannelId::Tilt)?;
        let aux = self.read_pulse_width(ChannelId::Aux)?;
        Ok(PulseFrame::new(throttle, pan, tilt, aux))
    }
}

/// Drives the four motor outputs.
pub trait DutySink {
    /// Sets the carrier frequency of every output.
    fn configure_frequency(&mut self, hz: u32) -> Result<(), DeviceError>;

    /// Sets the duty value that corresponds to 100%.
    fn configure_range(&mut self, range: u32) -> Result<(), DeviceError>;

    /// Sets one output's duty, in `[0, configured range]`.
    fn set_duty(&mut self, output: WheelOutput, duty: u32) -> Result<(), DeviceError>;

    /// Writes all four duties in emission order.
    fn emit(&mut self, wheels: &WheelOutputs) -> Result<(), DeviceError> {
        for (output, duty) in wheels.iter() {
            self.set_duty(output, duty)?;
        }
        Ok(())
    }
}

/// Waits between wizard polls.
pub trait Delay {
    /// Blocks for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Returns immediately; for replays and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay_ms(&mut self, _ms: u32) {}
}

impl<T: PulseSource + ?Sized> PulseSource for &mut T {
    fn read_pulse_width(&mut self, channel: ChannelId) -> Result<u32, DeviceError> {
        (**self).read_pulse_width(channel)
    }
}

impl<T: DutySink + ?Sized> DutySink for &mut T {
    fn configure_frequency(&mut self, hz: u32) -> Result<(), DeviceError> {
        (**self).configure_frequency(hz)
    }

    fn configure_range(&mut self, range: u32) -> Result<(), DeviceError> {
        (**self).configure_range(range)
    }

    fn set_duty(&mut self, output: WheelOutput, duty: u32) -> Result<(), DeviceError> {
        (**self).set_duty(output, duty)
    }
}

/// Serves pre-recorded frames.
///
/// Single-channel reads are answered from the current frame until a channel
/// is requested a second time, which moves on to the next frame, so a wizard
/// polling one channel consumes one frame per poll. Whole-frame reads always
/// start a fresh frame.
#[derive(Debug, Clone, Default)]
pub(crate) struct FrameCursor {
    pending: VecDeque<PulseFrame>,
    current: Option<PulseFrame>,
    consumed: ChannelMap<bool>,
    frames_started: usize,
}

impl FrameCursor {
    pub(crate) fn new(frames: impl IntoIterator<Item = PulseFrame>) -> Self {
        Self {
            pending: frames.into_iter().collect(),
            ..Self::default()
        }
    }

    pub(crate) fn push(&mut self, frame: PulseFrame) {
        self.pending.push_back(frame);
    }

    /// Frames not yet started.
    pub(crate) fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Frames read from so far.
    pub(crate) fn frames_started(&self) -> usize {
        self.frames_started
    }

    pub(crate) fn next_frame(&mut self) -> Option<PulseFrame> {
        let frame = self.pending.pop_front()?;
        self.current = Some(frame);
        self.consumed = ChannelMap::splat(true);
        self.frames_started = self.frames_started.saturating_add(1);
        Some(frame)
    }

    pub(crate) fn next(&mut self, channel: ChannelId) -> Option<u32> {
        if self.current.is_none() || *self.consumed.get(channel) {
            self.current = Some(self.pending.pop_front()?);
            self.consumed = ChannelMap::default();
            self.frames_started = self.frames_started.saturating_add(1);
        }
        *self.consumed.get_mut(channel) = true;
        self.current.as_ref().map(|frame| *frame.get(channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_one_frame_per_cycle() {
        let mut cursor = FrameCursor::new([
            PulseFrame::new(1, 2, 3, 4),
            PulseFrame::new(5, 6, 7, 8),
        ]);
        let first: Vec<_> = ChannelId::ALL.iter().filter_map(|&c| cursor.next(c)).collect();
        assert_eq!(first, [1, 2, 3, 4]);
        assert_eq!(cursor.next(ChannelId::Throttle), Some(5));
        assert_eq!(cursor.frames_started(), 2);
    }

    #[test]
    fn test_cursor_single_channel_polls_advance() {
        let mut cursor = FrameCursor::new([
            PulseFrame::splat(1000),
            PulseFrame::splat(1100),
        ]);
        assert_eq!(cursor.next(ChannelId::Pan), Some(1000));
        assert_eq!(cursor.next(ChannelId::Pan), Some(1100));
        assert_eq!(cursor.next(ChannelId::Pan), None);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_whole_frame_read_skips_partial_frame() {
        let mut cursor = FrameCursor::new([
            PulseFrame::splat(1000),
            PulseFrame::splat(2000),
            PulseFrame::splat(1500),
        ]);
        assert_eq!(cursor.next(ChannelId::Tilt), Some(1000));
        assert_eq!(cursor.next_frame(), Some(PulseFrame::splat(2000)));
        assert_eq!(cursor.next(ChannelId::Throttle), Some(1500));
        assert_eq!(cursor.next_frame(), None);
    }

    #[test]
    fn test_read_frame_order() -> Result<(), DeviceError> {
        struct Counting(u32);
        impl PulseSource for Counting {
            fn read_pulse_width(&mut self, _channel: ChannelId) -> Result<u32, DeviceError> {
                self.0 += 1;
                Ok(self.0)
            }
        }

        let frame = Counting(0).read_frame()?;
        assert_eq!(frame, PulseFrame::new(1, 2, 3, 4));
        Ok(())
    }
}
