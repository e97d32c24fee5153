//! Pulse captures replayed from text
//!
//! One frame per line: throttle, pan, tilt and aux pulse widths in
//! microseconds, separated by whitespace or commas. Blank lines and anything
//! after `#` are ignored.
//!
//! ```text
//! # throttle pan tilt aux
//! 1500 1500 1500 1500
//! 1500,1540,1500,1500
//! ```

use std::path::Path;
use std::str::FromStr;

use pwmconv_calibration::{ChannelId, PulseFrame};
use pwmconv_errors::DeviceError;

use crate::PulseSource;
use crate::io::FrameCursor;

/// Parses a capture into frames.
///
/// # Errors
///
/// Returns [`DeviceError::MalformedCapture`] naming the first bad line.
pub fn parse_capture(text: &str) -> Result<Vec<PulseFrame>, DeviceError> {
    let mut frames = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_no = index.saturating_add(1);
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }

        let values = content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(|field| {
                u32::from_str(field)
                    .map_err(|e| DeviceError::malformed(line_no, format!("'{field}': {e}")))
            })
            .collect::<Result<Vec<u32>, DeviceError>>()?;

        let &[throttle, pan, tilt, aux] = values.as_slice() else {
            return Err(DeviceError::malformed(
                line_no,
                format!("expected 4 values, got {}", values.len()),
            ));
        };
        frames.push(PulseFrame::new(throttle, pan, tilt, aux));
    }
    Ok(frames)
}

/// Pulse source reading frames from a capture.
///
/// Returns [`DeviceError::Exhausted`] after the last frame.
#[derive(Debug, Clone)]
pub struct ReplayPulseSource {
    cursor: FrameCursor,
    total: usize,
}

impl ReplayPulseSource {
    /// Builds a source from capture text.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::MalformedCapture`] if the text does not parse.
    pub fn from_text(text: &str) -> Result<Self, DeviceError> {
        let frames = parse_capture(text)?;
        Ok(Self {
            total: frames.len(),
            cursor: FrameCursor::new(frames),
        })
    }

    /// Reads and parses a capture file.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Disconnected`] if the file cannot be read and
    /// [`DeviceError::MalformedCapture`] if it does not parse.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DeviceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DeviceError::disconnected(format!("{}: {e}", path.display())))?;
        Self::from_text(&text)
    }

    /// Frames in the capture.
    pub fn total_frames(&self) -> usize {
        self.total
    }

    /// Frames read from so far.
    pub fn frames_read(&self) -> usize {
        self.cursor.frames_started()
    }
}

impl PulseSource for ReplayPulseSource {
    fn read_pulse_width(&mut self, channel: ChannelId) -> Result<u32, DeviceError> {
        self.cursor.next(channel).ok_or(DeviceError::Exhausted)
    }

    fn read_frame(&mut self) -> Result<PulseFrame, DeviceError> {
        self.cursor.next_frame().ok_or(DeviceError::Exhausted)
    }
}
