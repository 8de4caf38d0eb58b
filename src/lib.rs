//! Quad-Cam-Viewer: four V4L2 cameras shown live in a resizable 2x2 grid.
//!
//! Capture is abstracted behind the [`CameraDevice`] and [`CaptureStream`]
//! traits, so the render pass in [`Viewer`] runs the same way against real
//! hardware and against mock devices in tests.

pub mod app;
pub mod canvas;
pub mod clock;
pub mod config;
pub mod convert;
pub mod device;
pub mod font;
pub mod layout;
pub mod traits;
pub mod validation;
pub mod viewer;
pub mod window_state;

#[cfg(test)]
pub mod mock;

pub use canvas::Canvas;
pub use config::Config;
pub use device::{open_cameras, V4L2Device, V4L2Stream};
pub use layout::{Quadrant, ViewportLayout};
pub use traits::{
    CameraDevice, CameraError, CaptureStream, DeviceCapabilities, Format, FourCC, Frame,
    FrameMetadata,
};
pub use viewer::Viewer;
pub use window_state::{InputEvent, WindowMode, WindowState};
