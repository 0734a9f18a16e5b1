//! Applications hosted inside desktop windows.
//!
//! Apps never touch window state themselves. Anything that affects a window
//! (minimize, close, opening another app) comes back to the desktop as an
//! [`AppRequest`] and goes through the same controls as the title bar.

pub mod chat;
pub mod commands;
pub mod pdf;
pub mod terminal;
pub mod vfs;

use std::fmt;

use crate::layout::Size;
use crate::window::WindowOptions;

pub use chat::{ChatEngine, ChatEngineKind, ChatSession};
pub use commands::{CommandRegistry, SystemInfo};
pub use pdf::PdfDocument;
pub use terminal::TerminalSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppKind {
    Terminal,
    PdfViewer,
    AiChat,
}

impl AppKind {
    pub const ALL: [AppKind; 3] = [AppKind::Terminal, AppKind::PdfViewer, AppKind::AiChat];

    pub fn base_id(self) -> &'static str {
        match self {
            AppKind::Terminal => "terminal",
            AppKind::PdfViewer => "pdf-viewer",
            AppKind::AiChat => "ai-chat",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AppKind::Terminal => "Terminal",
            AppKind::PdfViewer => "PDF Viewer",
            AppKind::AiChat => "AI Chat",
        }
    }

    /// Desktop icon glyph.
    pub fn icon(self) -> &'static str {
        match self {
            AppKind::Terminal => ">_",
            AppKind::PdfViewer => "[=]",
            AppKind::AiChat => "(?)",
        }
    }

    /// Window options this app asks for, given the preferred size on the
    /// current viewport.
    pub fn window_options(self, preferred: Size) -> WindowOptions {
        match self {
            AppKind::Terminal | AppKind::PdfViewer => WindowOptions {
                initial_size: Some(preferred),
                ..WindowOptions::default()
            },
            // a running conversation is lost on close
            AppKind::AiChat => WindowOptions {
                initial_size: Some(preferred),
                confirm_close: true,
                ..WindowOptions::default()
            },
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Window-level operations an app may ask for on its own window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    Minimize,
    Maximize,
    Close,
}

/// What an app hands back to the desktop after processing input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRequest {
    Window(WindowCommand),
    Open(AppKind),
}

/// The per-window state the desktop stores as the renderer handle.
#[derive(Debug)]
pub enum AppState {
    Terminal(TerminalSession),
    Pdf(PdfDocument),
    Chat(ChatSession),
}
