//! In-memory collaborators for tests and offline runs

use pwmconv_calibration::{ChannelId, PulseFrame};
use pwmconv_errors::DeviceError;
use pwmconv_mixer::{WheelOutput, WheelOutputs};

use crate::io::FrameCursor;
use crate::{DutySink, PulseSource};

/// Pulse source that plays back a fixed list of frames.
///
/// Returns [`DeviceError::Exhausted`] once the frames run out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPulseSource {
    cursor: FrameCursor,
    disconnect_at_end: bool,
}

impl ScriptedPulseSource {
    /// Source that serves `frames` in order.
    pub fn new(frames: impl IntoIterator<Item = PulseFrame>) -> Self {
        Self {
            cursor: FrameCursor::new(frames),
            disconnect_at_end: false,
        }
    }

    /// Append a frame after the scripted ones.
    pub fn push_frame(&mut self, frame: PulseFrame) {
        self.cursor.push(frame);
    }

    /// Report a disconnect instead of exhaustion when the frames run out.
    pub fn disconnect_when_exhausted(&mut self) {
        self.disconnect_at_end = true;
    }

    /// Frames not yet started.
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }
}

impl PulseSource for ScriptedPulseSource {
    fn read_pulse_width(&mut self, channel: ChannelId) -> Result<u32, DeviceError> {
        match self.cursor.next(channel) {
            Some(us) => Ok(us),
            None if self.disconnect_at_end => Err(DeviceError::disconnected("scripted receiver")),
            None => Err(DeviceError::Exhausted),
        }
    }

    fn read_frame(&mut self) -> Result<PulseFrame, DeviceError> {
        match self.cursor.next_frame() {
            Some(frame) => Ok(frame),
            None if self.disconnect_at_end => Err(DeviceError::disconnected("scripted receiver")),
            None => Err(DeviceError::Exhausted),
        }
    }
}

/// One call made on a [`RecordingDutySink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// `configure_frequency(hz)`
    Frequency(u32),
    /// `configure_range(range)`
    Range(u32),
    /// `set_duty(output, duty)`
    Duty(WheelOutput, u32),
}

/// Duty sink that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingDutySink {
    events: Vec<SinkEvent>,
    failing: Option<WheelOutput>,
}

impl RecordingDutySink {
    /// Empty sink with no failing output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make writes to `output` fail.
    pub fn fail_output(&mut self, output: WheelOutput) {
        self.failing = Some(output);
    }

    /// Every call so far, oldest first.
    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Number of `set_duty` calls.
    pub fn duty_writes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SinkEvent::Duty(..)))
            .count()
    }

    /// Ranges passed to `configure_range`, in order.
    pub fn range_configurations(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Range(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    /// Duty writes grouped into complete four-output emissions.
    pub fn emissions(&self) -> Vec<WheelOutputs> {
        let duties: Vec<(WheelOutput, u32)> = self
            .events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Duty(o, d) => Some((*o, *d)),
                _ => None,
            })
            .collect();

        duties
            .chunks_exact(4)
            .map(|chunk| {
                let mut wheels = WheelOutputs::STOPPED;
                for &(output, duty) in chunk {
                    match output {
                        WheelOutput::Wheel1Cw => wheels.wheel1_cw = duty,
                        WheelOutput::Wheel1Ccw => wheels.wheel1_ccw = duty,
                        WheelOutput::Wheel2Cw => wheels.wheel2_cw = duty,
                        WheelOutput::Wheel2Ccw => wheels.wheel2_ccw = duty,
                    }
                }
                wheels
            })
            .collect()
    }

    /// Forget the recorded calls.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl DutySink for RecordingDutySink {
    fn configure_frequency(&mut self, hz: u32) -> Result<(), DeviceError> {
        self.events.push(SinkEvent::Frequency(hz));
        Ok(())
    }

    fn configure_range(&mut self, range: u32) -> Result<(), DeviceError> {
        self.events.push(SinkEvent::Range(range));
        Ok(())
    }

    fn set_duty(&mut self, output: WheelOutput, duty: u32) -> Result<(), DeviceError> {
        if self.failing == Some(output) {
            return Err(DeviceError::write_failed(output.name(), "injected failure"));
        }
        self.events.push(SinkEvent::Duty(output, duty));
        Ok(())
    }
}
