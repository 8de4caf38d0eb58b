//! Command-line configuration.

use clap::Parser;
use thiserror::Error;

use crate::convert::Orientation;
use crate::layout::MAX_FEEDS;
use crate::traits::{Format, FourCC};

/// Configuration errors, detected before any device is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// More cameras than grid quadrants.
    #[error("at most {max} cameras fit the grid, got {count}")]
    TooManyCameras {
        /// Cameras requested.
        count: usize,
        /// Grid capacity.
        max: usize,
    },
    /// No camera given.
    #[error("at least one camera index is required")]
    NoCameras,
    /// The same index listed twice.
    #[error("camera {0} is listed more than once")]
    DuplicateCamera(u32),
}

/// Live 2x2 grid viewer for V4L2 cameras.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Camera index to show (/dev/videoN), repeat for each grid slot.
    #[arg(long = "camera", value_name = "INDEX", default_values_t = [0, 1, 2, 3])]
    pub cameras: Vec<u32>,

    /// Requested capture width (the driver may pick another).
    #[arg(long, default_value_t = 640)]
    pub capture_width: u32,

    /// Requested capture height (the driver may pick another).
    #[arg(long, default_value_t = 480)]
    pub capture_height: u32,

    /// Requested pixel format: YUYV, MJPG, RGB3 or BGR3.
    #[arg(long, default_value = "YUYV")]
    pub pixel_format: FourCC,

    /// Initial window size as a fraction of the primary monitor.
    #[arg(long, default_value_t = 0.8, value_parser = parse_scale)]
    pub window_scale: f64,

    /// Number of mmap buffers per capture stream.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..=32))]
    pub buffers: u32,

    /// How captured images are oriented on screen.
    #[arg(long, value_enum, default_value_t = Orientation::Mirrored)]
    pub orientation: Orientation,
}

impl Config {
    /// Check the camera list once, at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cameras.is_empty() {
            return Err(ConfigError::NoCameras);
        }
        if self.cameras.len() > MAX_FEEDS {
            return Err(ConfigError::TooManyCameras {
                count: self.cameras.len(),
                max: MAX_FEEDS,
            });
        }
        for (i, index) in self.cameras.iter().enumerate() {
            if self.cameras.iter().skip(i + 1).any(|other| other == index) {
                return Err(ConfigError::DuplicateCamera(*index));
            }
        }
        Ok(())
    }

    /// Capture format requested from every device.
    #[must_use]
    pub fn capture_format(&self) -> Format {
        Format::new(self.capture_width, self.capture_height, self.pixel_format)
    }
}

fn parse_scale(s: &str) -> Result<f64, String> {
    let scale: f64 = s.parse().map_err(|err| format!("{err}"))?;
    if scale > 0.0 && scale <= 1.0 {
        Ok(scale)
    } else {
        Err(format!("{scale} is not in (0, 1]"))
    }
}
