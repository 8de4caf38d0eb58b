//! Quad-cam-viewer binary: open the cameras, then show them until the window
//! is closed.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use quad_cam_viewer::app::{self, AppError};
use quad_cam_viewer::{open_cameras, Config, V4L2Device, Viewer};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = Config::parse();

    // Quiet by default: a camera open failure must stay the only output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(err) = config.validate() {
        Config::command().error(ErrorKind::ValueValidation, err).exit();
    }
    info!(cameras = ?config.cameras, "starting");

    let streams = open_cameras(
        &config.cameras,
        &config.capture_format(),
        config.buffers,
        V4L2Device::open,
    )?;
    let viewer = Viewer::new(streams, config.orientation);

    app::run(viewer, config.window_scale)
}
