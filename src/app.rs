//! Window, input and presentation.
//!
//! `winit` drives the loop: input events update the [`WindowState`], and
//! every redraw runs one [`Viewer`] pass into a [`Canvas`] that is copied to
//! a `softbuffer` surface.

use std::num::NonZeroU32;
use std::rc::Rc;

use softbuffer::{Context, SoftBufferError, Surface};
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::monitor::MonitorHandle;
use winit::window::{Fullscreen, Window, WindowId};

use crate::canvas::Canvas;
use crate::traits::{CameraError, CaptureStream};
use crate::viewer::Viewer;
use crate::window_state::{InputEvent, SurfaceChange, Transition, WindowState};

/// Window title.
pub const WINDOW_TITLE: &str = "4-Camera View";

/// Monitor size assumed when the platform reports none.
const FALLBACK_MONITOR: (u32, u32) = (1280, 960);

/// Fatal errors of the viewer binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// A camera could not be opened.
    #[error(transparent)]
    Camera(#[from] CameraError),
    /// Event loop creation or execution failed.
    #[error("event loop error: {0}")]
    EventLoop(#[from] EventLoopError),
    /// The window could not be created.
    #[error("window creation failed: {0}")]
    Window(#[from] OsError),
    /// The presentation surface could not be set up.
    #[error("surface error: {0}")]
    Surface(#[from] SoftBufferError),
}

/// The primary monitor, or `fallback` where the platform reports none
/// (Wayland).
fn preferred_monitor<M>(primary: Option<M>, fallback: impl FnOnce() -> Option<M>) -> Option<M> {
    primary.or_else(fallback)
}

struct Display {
    window: Rc<Window>,
    surface: Surface<Rc<Window>, Rc<Window>>,
    _context: Context<Rc<Window>>,
    state: WindowState,
}

impl Display {
    fn create(event_loop: &ActiveEventLoop, window_scale: f64) -> Result<Self, AppError> {
        let monitor = preferred_monitor(event_loop.primary_monitor(), || {
            event_loop.available_monitors().next()
        })
        .map(|monitor| monitor.size());
        let (monitor_width, monitor_height) = monitor.map_or_else(
            || {
                warn!("no monitor reported, assuming {FALLBACK_MONITOR:?}");
                FALLBACK_MONITOR
            },
            |size| (size.width, size.height),
        );
        let (width, height) = WindowState::initial_size(monitor_width, monitor_height, window_scale);

        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(true);
        let window = Rc::new(event_loop.create_window(attributes)?);

        let context = Context::new(Rc::clone(&window))?;
        let surface = Surface::new(&context, Rc::clone(&window))?;
        info!(width, height, monitor_width, monitor_height, "window created");

        Ok(Self {
            window,
            surface,
            _context: context,
            state: WindowState::windowed(width, height),
        })
    }

    fn apply(&self, change: SurfaceChange) {
        match change {
            SurfaceChange::EnterFullscreen => {
                let monitor = preferred_monitor(self.window.primary_monitor(), || {
                    self.window.current_monitor()
                });
                let name = monitor.as_ref().and_then(MonitorHandle::name);
                info!(monitor = ?name, "entering fullscreen");
                self.window.set_fullscreen(Some(Fullscreen::Borderless(monitor)));
            }
            SurfaceChange::LeaveFullscreen { width, height } => {
                info!(width, height, "leaving fullscreen");
                self.window.set_fullscreen(None);
                self.window.set_resizable(true);
                let _ = self.window.request_inner_size(PhysicalSize::new(width, height));
            }
            // The window already has the new size; the surface follows on
            // the next redraw.
            SurfaceChange::Resize { width, height } => debug!(width, height, "window resized"),
        }
    }
}

struct App<S> {
    viewer: Viewer<S>,
    window_scale: f64,
    display: Option<Display>,
    canvas: Canvas,
    error: Option<AppError>,
}

impl<S: CaptureStream> App<S> {
    fn redraw(&mut self) -> Result<(), SoftBufferError> {
        let Some(display) = self.display.as_mut() else {
            return Ok(());
        };
        let size = display.window.inner_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            // Minimized: keep the capture queues moving so the first frames
            // after restore are current.
            self.viewer.discard_frames();
            return Ok(());
        };

        if (self.canvas.width(), self.canvas.height()) != (size.width, size.height) {
            display.surface.resize(width, height)?;
            self.canvas.resize(size.width, size.height);
        }

        self.viewer.render(&mut self.canvas);

        let mut buffer = display.surface.buffer_mut()?;
        for (dst, src) in buffer.iter_mut().zip(self.canvas.pixels()) {
            *dst = *src;
        }
        buffer.present()
    }
}

impl<S: CaptureStream> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.display.is_some() {
            return;
        }
        match Display::create(event_loop, self.window_scale) {
            Ok(display) => self.display = Some(display),
            Err(err) => {
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let input = match event {
            WindowEvent::CloseRequested => InputEvent::Quit,
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::F11),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => InputEvent::ToggleFullscreen,
            WindowEvent::Resized(size) => InputEvent::Resized {
                width: size.width,
                height: size.height,
            },
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    warn!(%err, "frame not presented");
                }
                return;
            }
            _ => return,
        };

        let Some(display) = self.display.as_mut() else {
            return;
        };
        match display.state.apply(input) {
            Transition::Quit => {
                info!("close requested");
                event_loop.exit();
            }
            Transition::Continue(Some(change)) => display.apply(change),
            Transition::Continue(None) => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(display) = &self.display {
            display.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        info!(cameras = self.viewer.camera_count(), "shutting down");
    }
}

/// Open the window and run the viewer until the window is closed.
///
/// On return the capture streams have been released, then the window.
pub fn run<S: CaptureStream>(viewer: Viewer<S>, window_scale: f64) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    // Not rate-limited: presentation paces the loop.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        viewer,
        window_scale,
        display: None,
        canvas: Canvas::default(),
        error: None,
    };
    event_loop.run_app(&mut app)?;

    // Cameras are released before the window and surface.
    let App {
        viewer,
        display,
        error,
        ..
    } = app;
    drop(viewer);
    drop(display);
    error.map_or(Ok(()), Err)
}
