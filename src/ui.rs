//! Small drawing helpers for painting into a ratatui [`Buffer`] from signed
//! window coordinates.
//!
//! Windows may hang off any edge of the screen, so every helper takes the
//! clip rectangle explicitly and silently drops cells outside it.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::layout::FloatRect;

/// The part of `rect` that lies on screen, or `None` when nothing does.
pub fn visible_rect(rect: FloatRect, bounds: Rect) -> Option<Rect> {
    let screen = FloatRect {
        x: bounds.x as i32,
        y: bounds.y as i32,
        width: bounds.width as u32,
        height: bounds.height as u32,
    };
    let clipped = rect.intersection(screen)?;
    Some(Rect {
        x: clipped.x as u16,
        y: clipped.y as u16,
        width: clipped.width as u16,
        height: clipped.height as u16,
    })
}

/// Write `text` starting at the signed cell `(x, y)`, keeping only the
/// cells inside `clip`. Wide glyphs take two cells; one cut by the clip
/// edge is replaced by a blank.
pub fn put_str(buffer: &mut Buffer, clip: Rect, x: i64, y: i64, text: &str, style: Style) {
    let clip = clip.intersection(buffer.area);
    if clip.width == 0 || clip.height == 0 {
        return;
    }
    if y < clip.y as i64 || y >= clip.bottom() as i64 {
        return;
    }
    let (left, right) = (clip.x as i64, clip.right() as i64);
    let mut cx = x;
    for ch in text.chars() {
        let width = ch.width().unwrap_or(0) as i64;
        if width == 0 {
            continue;
        }
        if cx >= right {
            break;
        }
        let whole = cx >= left && cx + width <= right;
        for offset in 0..width {
            let col = cx + offset;
            if col < left || col >= right {
                continue;
            }
            if let Some(cell) = buffer.cell_mut((col as u16, y as u16)) {
                if !whole {
                    cell.set_char(' ');
                } else if offset == 0 {
                    cell.set_char(ch);
                } else {
                    cell.set_symbol("");
                }
                cell.set_style(style);
            }
        }
        cx += width;
    }
}

/// Number of terminal columns `text` occupies.
pub fn display_width(text: &str) -> usize {
    text.width()
}

pub fn fill(buffer: &mut Buffer, area: Rect, style: Style) {
    let area = area.intersection(buffer.area);
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buffer.cell_mut((x, y)) {
                cell.set_char(' ');
                cell.set_style(style);
            }
        }
    }
}

/// A `width`×`height` rectangle centered in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Longest prefix of `value` that fits in `width` columns.
pub fn truncate_to_width(value: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in value.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}
