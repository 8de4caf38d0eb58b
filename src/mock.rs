//! Mock device implementation for testing without hardware.

use crate::traits::{
    CameraDevice, CameraError, CaptureStream, DeviceCapabilities, Format, FourCC, Frame,
    FrameMetadata, Result,
};
use std::collections::VecDeque;
use std::time::Duration;

/// Mock device for testing without hardware.
pub struct MockDevice {
    index: u32,
    capabilities: DeviceCapabilities,
    format: Format,
    accepts_format: bool,
    pattern: TestPattern,
}

impl MockDevice {
    /// Create a new mock device with default settings.
    #[must_use]
    pub fn new(index: u32) -> Self {
        Self {
            index,
            capabilities: DeviceCapabilities {
                driver: "mock".to_owned(),
                card: "Mock Camera".to_owned(),
                bus_info: format!("mock:{index}"),
                can_capture: true,
                can_stream: true,
            },
            format: Format::new(640, 480, FourCC::YUYV),
            accepts_format: true,
            pattern: TestPattern::ColorBars,
        }
    }

    /// Set the format for this mock device.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Set the pattern streamed by this mock device.
    #[must_use]
    pub const fn with_pattern(mut self, pattern: TestPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Make `set_format` fail, like a driver that ignores the request.
    #[must_use]
    pub const fn rejecting_format_requests(mut self) -> Self {
        self.accepts_format = false;
        self
    }
}

impl CameraDevice for MockDevice {
    type Stream = MockStream;

    fn index(&self) -> u32 {
        self.index
    }

    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    fn format(&self) -> Result<Format> {
        Ok(self.format.clone())
    }

    fn set_format(&mut self, format: &Format) -> Result<Format> {
        if !self.accepts_format {
            return Err(CameraError::StreamError("VIDIOC_S_FMT rejected".to_owned()));
        }
        self.format = format.clone();
        Ok(self.format.clone())
    }

    fn into_stream(self, _buffer_count: u32) -> Result<Self::Stream> {
        Ok(MockStream::new(self.index, self.format).with_pattern(self.pattern))
    }
}

/// Test pattern types for mock frame generation.
#[derive(Debug, Clone, Copy)]
pub enum TestPattern {
    /// SMPTE color bars pattern.
    ColorBars,
    /// Horizontal gradient from dark to light.
    Gradient,
    /// Solid color with specified Y, U, V values.
    Solid(u8, u8, u8),
}

/// Mock capture stream for testing.
///
/// Pull outcomes can be scripted: each queued `false` makes one
/// `next_frame` call fail before the stream goes back to producing frames.
pub struct MockStream {
    index: u32,
    format: Format,
    pattern: TestPattern,
    frame_count: u32,
    pulls: u32,
    script: VecDeque<bool>,
}

impl MockStream {
    /// Create a stream producing frames in `format`.
    #[must_use]
    pub fn new(index: u32, format: Format) -> Self {
        Self {
            index,
            format,
            pattern: TestPattern::ColorBars,
            frame_count: 0,
            pulls: 0,
            script: VecDeque::new(),
        }
    }

    /// Set the test pattern for frame generation.
    #[must_use]
    pub const fn with_pattern(mut self, pattern: TestPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Fail the next `count` pulls.
    #[must_use]
    pub fn with_misses(mut self, count: usize) -> Self {
        self.script.extend(std::iter::repeat(false).take(count));
        self
    }

    /// Queue explicit pull outcomes (`true` = frame, `false` = miss).
    #[must_use]
    pub fn with_script(mut self, outcomes: &[bool]) -> Self {
        self.script.extend(outcomes.iter().copied());
        self
    }

    /// Number of `next_frame` calls made so far.
    #[must_use]
    pub const fn pulls(&self) -> u32 {
        self.pulls
    }
}

impl CaptureStream for MockStream {
    fn index(&self) -> u32 {
        self.index
    }

    fn next_frame(&mut self) -> Result<Frame> {
        self.pulls += 1;
        if !self.script.pop_front().unwrap_or(true) {
            return Err(CameraError::StreamError("no frame available".to_owned()));
        }

        let data = generate_test_frame(&self.format, self.pattern);
        let seq = self.frame_count;
        self.frame_count += 1;

        Ok(Frame {
            data,
            format: self.format.clone(),
            metadata: FrameMetadata {
                sequence: seq,
                timestamp: Duration::from_millis(u64::from(seq) * 33), // ~30fps
                bytes_used: self.format.size,
            },
        })
    }
}

/// Generate test frame data based on pattern.
fn generate_test_frame(format: &Format, pattern: TestPattern) -> Vec<u8> {
    let size = (format.width * format.height * 2) as usize; // YUYV = 2 bytes/pixel
    let mut data = vec![0u8; size];

    match pattern {
        TestPattern::ColorBars => {
            generate_color_bars(&mut data, format.width, format.height);
        }
        TestPattern::Gradient => {
            generate_gradient(&mut data, format.width, format.height);
        }
        TestPattern::Solid(y, u, v) => {
            generate_solid(&mut data, y, u, v);
        }
    }

    data
}

/// Generate YUYV color bars pattern.
fn generate_color_bars(data: &mut [u8], width: u32, height: u32) {
    // 8 color bars: White, Yellow, Cyan, Green, Magenta, Red, Blue, Black
    let bars: [(u8, u8, u8); 8] = [
        (235, 128, 128), // White
        (210, 16, 146),  // Yellow
        (170, 166, 16),  // Cyan
        (145, 54, 34),   // Green
        (106, 202, 222), // Magenta
        (81, 90, 240),   // Red
        (41, 240, 110),  // Blue
        (16, 128, 128),  // Black
    ];

    let bar_width = (width / 8).max(1);

    for y in 0..height {
        for x in (0..width).step_by(2) {
            let bar_idx = (x / bar_width).min(7) as usize;
            let (y_val, u_val, v_val) = bars[bar_idx];

            let offset = ((y * width + x) * 2) as usize;
            if offset + 3 < data.len() {
                data[offset] = y_val;
                data[offset + 1] = u_val;
                data[offset + 2] = y_val;
                data[offset + 3] = v_val;
            }
        }
    }
}

/// Generate YUYV horizontal gradient pattern.
fn generate_gradient(data: &mut [u8], width: u32, height: u32) {
    for y in 0..height {
        for x in (0..width).step_by(2) {
            #[allow(clippy::cast_possible_truncation)]
            let y_val = ((x * 255) / width) as u8;
            let offset = ((y * width + x) * 2) as usize;

            if offset + 3 < data.len() {
                data[offset] = y_val;
                data[offset + 1] = 128;
                data[offset + 2] = y_val;
                data[offset + 3] = 128;
            }
        }
    }
}

/// Generate solid color YUYV frame.
fn generate_solid(data: &mut [u8], y: u8, u: u8, v: u8) {
    for chunk in data.chunks_exact_mut(4) {
        chunk.copy_from_slice(&[y, u, y, v]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_device_creation() {
        let device = MockDevice::new(3);
        assert_eq!(device.index(), 3);
        assert_eq!(device.capabilities().driver, "mock");
        assert!(device.capabilities().can_capture);
        assert!(device.capabilities().can_stream);
    }

    #[test]
    fn test_mock_device_format() {
        let mut device = MockDevice::new(0);
        let format = device.format().expect("format should succeed");
        assert_eq!(format.width, 640);
        assert_eq!(format.height, 480);

        let new_format = Format::new(1280, 720, FourCC::YUYV);
        let actual = device.set_format(&new_format).expect("set_format should succeed");
        assert_eq!(actual.width, 1280);
        assert_eq!(actual.height, 720);
    }

    #[test]
    fn test_mock_stream_capture() {
        let device = MockDevice::new(0);
        let mut stream = device.into_stream(4).expect("into_stream should succeed");

        let frame1 = stream.next_frame().expect("next_frame should succeed");
        assert_eq!(frame1.metadata.sequence, 0);
        assert!(!frame1.data.is_empty());

        let frame2 = stream.next_frame().expect("next_frame should succeed");
        assert_eq!(frame2.metadata.sequence, 1);
    }

    #[test]
    fn test_mock_stream_scripted_misses() {
        let mut stream =
            MockStream::new(1, Format::new(64, 48, FourCC::YUYV)).with_script(&[false, true, false]);

        assert!(stream.next_frame().is_err());
        assert!(stream.next_frame().is_ok());
        assert!(stream.next_frame().is_err());
        assert!(stream.next_frame().is_ok());
        assert_eq!(stream.pulls(), 4);
    }

    #[test]
    fn test_color_bars_pattern() {
        let format = Format::new(640, 480, FourCC::YUYV);
        let data = generate_test_frame(&format, TestPattern::ColorBars);

        assert_eq!(data.len(), (640 * 480 * 2) as usize);
        // First bar should be white (Y=235)
        assert_eq!(data[0], 235);
    }

    #[test]
    fn test_solid_pattern() {
        let format = Format::new(64, 64, FourCC::YUYV);
        let data = generate_test_frame(&format, TestPattern::Solid(128, 64, 192));

        assert_eq!(data[0], 128);
        assert_eq!(data[2], 128);
        assert_eq!(data[1], 64);
        assert_eq!(data[3], 192);
    }
}
