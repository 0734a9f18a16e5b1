pub mod decorator;

mod window_manager;

use std::fmt;
use std::time::Instant;

use crate::layout::floating::SizeConstraints;
use crate::layout::{Position, Size};

pub use window_manager::{CloseRequest, WindowManager, WmEvent};

/// Identifier of one tracked application instance, e.g. `terminal-2`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for InstanceId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for InstanceId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// How an open window is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    Normal,
    Maximized,
    /// Collapsed to the taskbar; `maximized` is the mode to return to.
    Minimized { maximized: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Open,
    /// Exit animation running; becomes `Closed` once `deadline` passes.
    Closing { deadline: Instant },
    Closed { at: Instant },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowState {
    pub mode: WindowMode,
    pub lifecycle: Lifecycle,
    pub position: Position,
    pub size: Option<Size>,
    pub z_index: u64,
    /// Bumped whenever mode or lifecycle changes under a pointer gesture.
    pub geometry_epoch: u64,
}

impl WindowState {
    pub fn is_minimized(&self) -> bool {
        matches!(self.mode, WindowMode::Minimized { .. })
    }

    pub fn is_maximized(&self) -> bool {
        matches!(
            self.mode,
            WindowMode::Maximized | WindowMode::Minimized { maximized: true }
        )
    }

    pub fn is_closing(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Closing { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Closed { .. })
    }

    pub fn is_open(&self) -> bool {
        self.lifecycle == Lifecycle::Open
    }

    /// Open, not minimized: the window can take pointer and keyboard input.
    pub fn is_interactive(&self) -> bool {
        self.is_open() && !self.is_minimized()
    }
}

/// Per-instance window behavior requested by the hosted app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    pub resizable: bool,
    /// Resize bounds; `None` falls back to the manager's minimum window size.
    pub constraints: Option<SizeConstraints>,
    pub confirm_close: bool,
    pub initial_size: Option<Size>,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            resizable: true,
            constraints: None,
            confirm_close: false,
            initial_size: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApplicationInstance<H> {
    pub(crate) id: InstanceId,
    pub(crate) name: String,
    pub(crate) handle: H,
    pub(crate) options: WindowOptions,
    pub(crate) state: WindowState,
}

impl<H> ApplicationInstance<H> {
    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn state(&self) -> &WindowState {
        &self.state
    }
}
