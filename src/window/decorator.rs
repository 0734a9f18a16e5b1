use ratatui::buffer::Buffer;
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};

use crate::layout::{FloatRect, Position};
use crate::ui::{put_str, visible_rect};

const BUTTON_WIDTH: i64 = 3;

/// What a press on the title bar should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    Minimize,
    Maximize,
    Close,
    /// Anywhere else on the title bar: start moving the window.
    Drag,
}

/// Per-frame facts the decorator needs about one window.
#[derive(Debug, Clone, Copy)]
pub struct WindowChrome<'a> {
    pub title: &'a str,
    pub focused: bool,
    pub maximized: bool,
    pub closing: bool,
}

pub trait WindowDecorator: std::fmt::Debug {
    /// Area left for the hosted app once the frame is drawn.
    fn content_rect(&self, rect: FloatRect) -> FloatRect;

    fn header_action_at(&self, rect: FloatRect, point: Position) -> Option<HeaderAction>;

    fn render_window(&self, buffer: &mut Buffer, rect: FloatRect, bounds: Rect, chrome: WindowChrome<'_>);
}

/// Box-drawn frame with a title bar under the top border and `[_][□][x]`
/// buttons at its right end. Every border cell doubles as a resize handle,
/// so the title bar never overlaps one.
#[derive(Debug, Clone, Copy)]
pub struct TitleBarDecorator {
    titlebar_height: u32,
}

impl Default for TitleBarDecorator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl TitleBarDecorator {
    pub fn new(titlebar_height: u32) -> Self {
        Self {
            titlebar_height: titlebar_height.max(1),
        }
    }

    /// Rows covered by the title bar.
    fn header_rows(&self, rect: FloatRect) -> std::ops::Range<i64> {
        let top = rect.y as i64 + 1;
        top..top + self.titlebar_height as i64
    }

    fn button_at(rect: FloatRect, x: i64) -> Option<HeaderAction> {
        // buttons sit just inside the right border
        let close_start = rect.right() - 1 - BUTTON_WIDTH;
        let maximize_start = close_start - BUTTON_WIDTH;
        let minimize_start = maximize_start - BUTTON_WIDTH;
        if minimize_start <= rect.x as i64 {
            return None;
        }
        if (close_start..close_start + BUTTON_WIDTH).contains(&x) {
            Some(HeaderAction::Close)
        } else if (maximize_start..close_start).contains(&x) {
            Some(HeaderAction::Maximize)
        } else if (minimize_start..maximize_start).contains(&x) {
            Some(HeaderAction::Minimize)
        } else {
            None
        }
    }
}

fn put(buffer: &mut Buffer, bounds: Rect, x: i64, y: i64, symbol: &str, style: Style) {
    let in_bounds = x >= bounds.x as i64
        && x < bounds.x as i64 + bounds.width as i64
        && y >= bounds.y as i64
        && y < bounds.y as i64 + bounds.height as i64;
    if in_bounds && let Some(cell) = buffer.cell_mut((x as u16, y as u16)) {
        cell.set_symbol(symbol);
        cell.set_style(style);
    }
}

impl WindowDecorator for TitleBarDecorator {
    fn content_rect(&self, rect: FloatRect) -> FloatRect {
        let top = 1 + self.titlebar_height;
        FloatRect {
            x: rect.x.saturating_add(1),
            y: rect.y.saturating_add(top as i32),
            width: rect.width.saturating_sub(2),
            height: rect.height.saturating_sub(top + 1),
        }
    }

    fn header_action_at(&self, rect: FloatRect, point: Position) -> Option<HeaderAction> {
        let x = point.x as i64;
        let inside = x > rect.x as i64 && x < rect.right() - 1;
        if !inside || !self.header_rows(rect).contains(&(point.y as i64)) {
            return None;
        }
        Some(Self::button_at(rect, x).unwrap_or(HeaderAction::Drag))
    }

    fn render_window(&self, buffer: &mut Buffer, rect: FloatRect, bounds: Rect, chrome: WindowChrome<'_>) {
        let header = self.header_rows(rect);
        if rect.width < 2 || (rect.height as i64) < header.end - rect.y as i64 + 1 {
            return;
        }
        let header_style = match (chrome.closing, chrome.focused) {
            (true, _) => Style::default().bg(Color::DarkGray).fg(Color::Gray),
            (false, true) => Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            (false, false) => Style::default().bg(Color::DarkGray).fg(Color::White),
        };
        let border_style = if chrome.focused && !chrome.closing {
            Style::default().fg(Color::Blue).bg(Color::Reset)
        } else {
            Style::default().fg(Color::DarkGray).bg(Color::Reset)
        };
        let body_style = Style::default().bg(Color::Reset);

        let left = rect.x as i64;
        let top = rect.y as i64;
        let right = rect.right() - 1;
        let bottom = rect.bottom() - 1;

        let mut horizontal = |y: i64, first: &str, last: &str| {
            for x in left..=right {
                let symbol = if x == left {
                    first
                } else if x == right {
                    last
                } else {
                    "─"
                };
                put(buffer, bounds, x, y, symbol, border_style);
            }
        };
        horizontal(top, "┌", "┐");
        horizontal(bottom, "└", "┘");

        for y in top + 1..bottom {
            put(buffer, bounds, left, y, "│", border_style);
            put(buffer, bounds, right, y, "│", border_style);
            let style = if header.contains(&y) {
                header_style
            } else {
                body_style
            };
            for x in left + 1..right {
                put(buffer, bounds, x, y, " ", style);
            }
        }

        // Title and buttons go on the first title bar row
        let row = header.start;
        let mut title_end = right;
        if let Some(buttons_start) = (left + 1..right).find(|x| Self::button_at(rect, *x).is_some()) {
            title_end = buttons_start - 1;
            let maximize_glyph = if chrome.maximized { "❐" } else { "□" };
            for (offset, glyph) in ["_", maximize_glyph, "x"].into_iter().enumerate() {
                let start = buttons_start + offset as i64 * BUTTON_WIDTH;
                put(buffer, bounds, start, row, "[", header_style);
                put(buffer, bounds, start + 1, row, glyph, header_style);
                put(buffer, bounds, start + 2, row, "]", header_style);
            }
        }
        let title = FloatRect {
            x: (left + 2) as i32,
            y: row as i32,
            width: (title_end - left - 2).max(0) as u32,
            height: 1,
        };
        if let Some(clip) = visible_rect(title, bounds) {
            put_str(buffer, clip, left + 2, row, chrome.title, header_style);
        }
    }
}
