//! Window mode state machine.
//!
//! The viewer is either windowed or fullscreen. Only the toggle key moves
//! between the two; resize events are self-transitions of the windowed
//! state and are ignored while fullscreen.

/// Presentation mode of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    /// Resizable window, initial mode.
    #[default]
    Windowed,
    /// Fullscreen on the current monitor.
    Fullscreen,
}

/// Input the viewer reacts to, decoupled from the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Window close requested.
    Quit,
    /// The fullscreen toggle key was pressed.
    ToggleFullscreen,
    /// The window was resized to the given inner size.
    Resized {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
}

/// Display surface change requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceChange {
    /// Go fullscreen at the monitor's resolution.
    EnterFullscreen,
    /// Return to a resizable window of the given size.
    LeaveFullscreen {
        /// Restored width.
        width: u32,
        /// Restored height.
        height: u32,
    },
    /// Follow a user resize, staying windowed.
    Resize {
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
}

/// Result of applying an [`InputEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep running, optionally reconfiguring the surface.
    Continue(Option<SurfaceChange>),
    /// Leave the loop.
    Quit,
}

/// Windowed size and current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    width: u32,
    height: u32,
    mode: WindowMode,
}

impl WindowState {
    /// Windowed state with the given size.
    #[must_use]
    pub const fn windowed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            mode: WindowMode::Windowed,
        }
    }

    /// Initial window size: `scale` of the monitor size, floored.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn initial_size(monitor_width: u32, monitor_height: u32, scale: f64) -> (u32, u32) {
        let scaled = |v: u32| (f64::from(v) * scale).floor().max(1.0) as u32;
        (scaled(monitor_width), scaled(monitor_height))
    }

    /// Last windowed width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Last windowed height.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> WindowMode {
        self.mode
    }

    /// Whether fullscreen is active.
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.mode == WindowMode::Fullscreen
    }

    /// Apply one input event.
    pub fn apply(&mut self, event: InputEvent) -> Transition {
        match (event, self.mode) {
            (InputEvent::Quit, _) => Transition::Quit,
            (InputEvent::ToggleFullscreen, WindowMode::Windowed) => {
                self.mode = WindowMode::Fullscreen;
                Transition::Continue(Some(SurfaceChange::EnterFullscreen))
            }
            (InputEvent::ToggleFullscreen, WindowMode::Fullscreen) => {
                self.mode = WindowMode::Windowed;
                Transition::Continue(Some(SurfaceChange::LeaveFullscreen {
                    width: self.width,
                    height: self.height,
                }))
            }
            (InputEvent::Resized { width, height }, WindowMode::Windowed) => {
                self.width = width;
                self.height = height;
                Transition::Continue(Some(SurfaceChange::Resize { width, height }))
            }
            (InputEvent::Resized { .. }, WindowMode::Fullscreen) => Transition::Continue(None),
        }
    }
}
