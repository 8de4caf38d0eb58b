//! V4L2 device implementation using the v4l crate.

use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream as V4lCaptureStream;
use v4l::video::Capture;
use v4l::Device;

use crate::convert;
use crate::traits::{
    CameraDevice, CameraError, CaptureStream, DeviceCapabilities, Format, FourCC, Frame,
    FrameMetadata, Result,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// V4L2 device implementation wrapping the v4l crate.
pub struct V4L2Device {
    index: u32,
    device: Device,
    capabilities: DeviceCapabilities,
}

impl V4L2Device {
    /// Open a V4L2 device by index (e.g., 0 for /dev/video0).
    pub fn open(index: u32) -> Result<Self> {
        let open_failed = |err: std::io::Error| CameraError::DeviceOpenFailed {
            index,
            reason: err.to_string(),
        };

        let device = Device::new(index as usize).map_err(open_failed)?;
        let caps = device.query_caps().map_err(open_failed)?;

        let capabilities = DeviceCapabilities {
            driver: caps.driver,
            card: caps.card,
            bus_info: caps.bus,
            can_capture: caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE),
            can_stream: caps.capabilities.contains(v4l::capability::Flags::STREAMING),
        };

        if !capabilities.can_capture {
            return Err(CameraError::DeviceOpenFailed {
                index,
                reason: format!("{} is not a video capture device", capabilities.card),
            });
        }

        Ok(Self {
            index,
            device,
            capabilities,
        })
    }
}

fn from_v4l(fmt: &v4l::Format) -> Format {
    Format {
        width: fmt.width,
        height: fmt.height,
        fourcc: FourCC::from(fmt.fourcc),
        stride: fmt.stride,
        size: fmt.size,
    }
}

impl CameraDevice for V4L2Device {
    type Stream = V4L2Stream;

    fn index(&self) -> u32 {
        self.index
    }

    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    fn format(&self) -> Result<Format> {
        let fmt = self
            .device
            .format()
            .map_err(|err| CameraError::StreamError(err.to_string()))?;

        Ok(from_v4l(&fmt))
    }

    fn set_format(&mut self, format: &Format) -> Result<Format> {
        let mut fmt = self
            .device
            .format()
            .map_err(|err| CameraError::StreamError(err.to_string()))?;

        fmt.width = format.width;
        fmt.height = format.height;
        fmt.fourcc = format.fourcc.into();

        let fmt = self
            .device
            .set_format(&fmt)
            .map_err(|err| CameraError::StreamError(err.to_string()))?;

        Ok(from_v4l(&fmt))
    }

    fn into_stream(self, buffer_count: u32) -> Result<Self::Stream> {
        let format = self.format()?;
        // The stream holds its own handle to the device fd.
        let stream = Stream::with_buffers(&self.device, Type::VideoCapture, buffer_count)
            .map_err(|err| CameraError::StreamError(err.to_string()))?;

        Ok(V4L2Stream {
            index: self.index,
            format,
            stream,
        })
    }
}

/// V4L2 capture stream wrapping mmap-based streaming.
pub struct V4L2Stream {
    index: u32,
    format: Format,
    stream: Stream<'static>,
}

impl CaptureStream for V4L2Stream {
    fn index(&self) -> u32 {
        self.index
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let (buf, meta) = self
            .stream
            .next()
            .map_err(|err| CameraError::StreamError(err.to_string()))?;

        // Safe conversions: V4L2 timestamps are always non-negative in practice
        #[allow(clippy::cast_sign_loss)]
        let secs = meta.timestamp.sec.max(0) as u64;
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let nanos = (meta.timestamp.usec.max(0) as u32).saturating_mul(1000);

        // Compressed payloads are shorter than the mapped buffer.
        let used = usize::try_from(meta.bytesused).unwrap_or(usize::MAX);
        let data = match used {
            0 => buf,
            n => buf.get(..n).unwrap_or(buf),
        };

        Ok(Frame {
            data: data.to_vec(),
            format: self.format.clone(),
            metadata: FrameMetadata {
                sequence: meta.sequence,
                timestamp: Duration::new(secs, nanos),
                bytes_used: meta.bytesused,
            },
        })
    }
}

/// Open every camera in `indices`, in order, and start a stream on each.
///
/// Fails fast: the first device that cannot be opened aborts the whole
/// operation with [`CameraError::DeviceOpenFailed`] naming its index.
/// Devices opened before the failure are dropped on return. The capture
/// resolution in `request` is best-effort; a driver that rejects it keeps
/// its own format.
pub fn open_cameras<D, F>(
    indices: &[u32],
    request: &Format,
    buffer_count: u32,
    mut open: F,
) -> Result<Vec<D::Stream>>
where
    D: CameraDevice,
    F: FnMut(u32) -> Result<D>,
{
    let mut devices = Vec::with_capacity(indices.len());
    for &index in indices {
        let device = open(index).map_err(|err| match err {
            err @ CameraError::DeviceOpenFailed { .. } => err,
            other => CameraError::DeviceOpenFailed {
                index,
                reason: other.to_string(),
            },
        })?;
        info!(
            index,
            card = %device.capabilities().card,
            driver = %device.capabilities().driver,
            "opened camera"
        );
        devices.push(device);
    }

    let mut streams = Vec::with_capacity(devices.len());
    for mut device in devices {
        let index = device.index();
        let negotiated = match device.set_format(request) {
            Ok(actual) => {
                debug!(
                    index,
                    width = actual.width,
                    height = actual.height,
                    fourcc = %actual.fourcc,
                    "negotiated capture format"
                );
                Some(actual)
            }
            Err(err) => {
                debug!(index, %err, "capture format request ignored");
                device.format().ok()
            }
        };
        if let Some(format) = negotiated.filter(|format| !convert::is_decodable(format.fourcc)) {
            warn!(
                index,
                fourcc = %format.fourcc,
                "camera delivers an undecodable pixel format, its quadrant stays black"
            );
        }

        let stream = device
            .into_stream(buffer_count)
            .map_err(|err| CameraError::DeviceOpenFailed {
                index,
                reason: err.to_string(),
            })?;
        streams.push(stream);
    }

    Ok(streams)
}
