//! Shared crate-wide constants.
//!
//! Pixel values mirror the browser desktop the window manager models. The
//! terminal front-end scales them down through [`crate::config::WmConfig::terminal`].

/// First z-index handed out by a fresh window manager.
pub const BASE_Z_INDEX: u64 = 1000;

/// Spawn anchor for new windows, as a percentage of the viewport width.
pub const SPAWN_ANCHOR_X_PERCENT: u16 = 20;

/// Spawn anchor for new windows, as a percentage of the viewport height.
pub const SPAWN_ANCHOR_Y_PERCENT: u16 = 15;

/// Offset applied per additional instance of the same app so windows cascade.
pub const STAGGER_OFFSET: i32 = 50;

/// Smallest window footprint that `open` keeps inside the viewport.
pub const MIN_VISIBLE_WIDTH: u32 = 400;
pub const MIN_VISIBLE_HEIGHT: u32 = 300;

/// Default size of a new window, as a percentage of the viewport per axis.
pub const DEFAULT_SIZE_PERCENT: u16 = 50;

/// Amount of a dragged window that must stay reachable at either
/// horizontal extreme of the viewport.
pub const DRAG_KEEP_VISIBLE: i32 = 100;

/// Distance from the bottom of the viewport below which a title bar cannot
/// be dragged.
pub const TITLEBAR_REACH: i32 = 40;

/// Length of the closing animation before an instance becomes closed.
pub const CLOSE_DELAY_MS: u64 = 300;

/// Default minimum size of a resizable window.
pub const MIN_WINDOW_WIDTH: u32 = 400;
pub const MIN_WINDOW_HEIGHT: u32 = 300;

/// Width at which the viewport stops being classified as mobile.
pub const TABLET_BREAKPOINT: u32 = 768;

/// Width at which the viewport is classified as a desktop.
pub const DESKTOP_BREAKPOINT: u32 = 1024;

/// Two presses on the same title bar or icon within this window count as a
/// double-click.
pub const DOUBLE_CLICK_MS: u64 = 500;
