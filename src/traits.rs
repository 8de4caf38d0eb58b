//! Core traits and types for the capture side of the viewer.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Pixel format representation (e.g., YUYV, MJPG, RGB3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Create a new `FourCC` from a 4-byte array.
    #[must_use]
    pub const fn new(code: &[u8; 4]) -> Self {
        Self(*code)
    }

    /// YUYV pixel format (4:2:2 packed).
    pub const YUYV: Self = Self::new(b"YUYV");
    /// MJPEG pixel format (Motion JPEG).
    pub const MJPG: Self = Self::new(b"MJPG");
    /// RGB3 pixel format (24-bit RGB).
    pub const RGB3: Self = Self::new(b"RGB3");
    /// BGR3 pixel format (24-bit BGR).
    pub const BGR3: Self = Self::new(b"BGR3");

    /// Bytes per pixel for packed formats, `None` for compressed ones.
    #[must_use]
    pub fn bytes_per_pixel(self) -> Option<u32> {
        match self {
            Self::YUYV => Some(2),
            Self::RGB3 | Self::BGR3 => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{}", char::from(byte))?;
        }
        Ok(())
    }
}

/// Error returned when a string is not a valid four character code.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid pixel format {0:?}: expected 4 ASCII characters")]
pub struct ParseFourCCError(String);

impl FromStr for FourCC {
    type Err = ParseFourCCError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| ParseFourCCError(s.to_owned()))?;
        if !bytes.iter().all(u8::is_ascii_graphic) {
            return Err(ParseFourCCError(s.to_owned()));
        }
        Ok(Self(bytes.map(|b| b.to_ascii_uppercase())))
    }
}

impl From<v4l::FourCC> for FourCC {
    fn from(fourcc: v4l::FourCC) -> Self {
        Self(fourcc.repr)
    }
}

impl From<FourCC> for v4l::FourCC {
    fn from(fourcc: FourCC) -> Self {
        Self::new(&fourcc.0)
    }
}

/// Video format specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format.
    pub fourcc: FourCC,
    /// Bytes per line (stride). Zero for compressed formats.
    pub stride: u32,
    /// Total frame size in bytes. Zero when only the driver knows it.
    pub size: u32,
}

impl Format {
    /// Create a new format specification with a tightly packed stride.
    #[must_use]
    pub fn new(width: u32, height: u32, fourcc: FourCC) -> Self {
        let stride = fourcc.bytes_per_pixel().map_or(0, |bpp| width * bpp);
        let size = stride * height;
        Self {
            width,
            height,
            fourcc,
            stride,
            size,
        }
    }
}

/// Device capability flags.
#[derive(Debug, Clone, Default)]
pub struct DeviceCapabilities {
    /// Driver name.
    pub driver: String,
    /// Card/device name.
    pub card: String,
    /// Bus information.
    pub bus_info: String,
    /// Whether the device can capture video.
    pub can_capture: bool,
    /// Whether the device supports streaming.
    pub can_stream: bool,
}

/// Metadata for a captured frame.
#[derive(Debug, Clone)]
pub struct FrameMetadata {
    /// Frame sequence number.
    pub sequence: u32,
    /// Capture timestamp.
    pub timestamp: Duration,
    /// Actual bytes used in the frame buffer.
    pub bytes_used: u32,
}

/// A captured video frame in the device's native layout.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw frame data.
    pub data: Vec<u8>,
    /// Format the data is laid out in.
    pub format: Format,
    /// Frame metadata.
    pub metadata: FrameMetadata,
}

/// Error type for camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// Failed to open the device at startup.
    #[error("Could not open camera {index}: {reason}")]
    DeviceOpenFailed {
        /// Camera index that failed.
        index: u32,
        /// Driver or OS message.
        reason: String,
    },
    /// Frame data is in a format the viewer cannot convert.
    #[error("Format not supported: {0}")]
    FormatNotSupported(FourCC),
    /// Error during streaming operation (no frame this pull).
    #[error("Stream error: {0}")]
    StreamError(String),
    /// Frame data could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for camera operations.
pub type Result<T> = std::result::Result<T, CameraError>;

/// Abstraction over an opened camera device.
pub trait CameraDevice {
    /// The stream type returned by `into_stream`.
    type Stream: CaptureStream;

    /// Index the device was opened with.
    fn index(&self) -> u32;

    /// Get device capabilities.
    fn capabilities(&self) -> &DeviceCapabilities;

    /// Get current format.
    fn format(&self) -> Result<Format>;

    /// Set capture format. Returns the actual format set by the driver.
    fn set_format(&mut self, format: &Format) -> Result<Format>;

    /// Start streaming with the given number of buffers. The stream takes
    /// ownership of the device and releases it when dropped.
    fn into_stream(self, buffer_count: u32) -> Result<Self::Stream>;
}

/// Abstraction over capture stream operations.
pub trait CaptureStream {
    /// Camera index this stream captures from.
    fn index(&self) -> u32;

    /// Capture the next frame from the stream. Blocks until the device
    /// delivers one.
    fn next_frame(&mut self) -> Result<Frame>;
}
