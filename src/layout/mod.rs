pub mod floating;

use std::fmt;

/// Top-left corner of a window in viewport coordinates. May be negative when
/// a window hangs off the left edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    pub fn offset_from(self, other: Position) -> Position {
        Position {
            x: self.x.saturating_sub(other.x),
            y: self.y.saturating_sub(other.y),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Resolve `percent` (0..=100) of each axis.
    pub fn percent(self, percent_w: u16, percent_h: u16) -> Size {
        let to_abs = |base: u32, pct: u16| (base as u64 * pct as u64 / 100) as u32;
        Size {
            width: to_abs(self.width, percent_w),
            height: to_abs(self.height, percent_h),
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Signed rectangle origin with unsigned size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl FloatRect {
    pub fn new(position: Position, size: Size) -> Self {
        Self {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn contains(&self, point: Position) -> bool {
        rect_contains(*self, point)
    }

    /// Intersection with `other`, or `None` when they do not overlap.
    pub fn intersection(&self, other: FloatRect) -> Option<FloatRect> {
        let left = self.x.max(other.x) as i64;
        let top = self.y.max(other.y) as i64;
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(FloatRect {
            x: left as i32,
            y: top as i32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }

    /// Shrink each side by `margin`, saturating at an empty rectangle.
    pub fn inset(&self, margin: u32) -> FloatRect {
        let shrink = margin.saturating_mul(2);
        FloatRect {
            x: self.x.saturating_add(margin as i32),
            y: self.y.saturating_add(margin as i32),
            width: self.width.saturating_sub(shrink),
            height: self.height.saturating_sub(shrink),
        }
    }
}

pub fn rect_contains(rect: FloatRect, point: Position) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let x = point.x as i64;
    let y = point.y as i64;
    x >= rect.x as i64 && x < rect.right() && y >= rect.y as i64 && y < rect.bottom()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_edge_cases() {
        let empty = FloatRect {
            x: 0,
            y: 0,
            width: 0,
            height: 5,
        };
        assert!(!rect_contains(empty, Position::new(0, 0)));
        let r = FloatRect {
            x: 1,
            y: 1,
            width: 3,
            height: 3,
        };
        assert!(rect_contains(r, Position::new(1, 1)));
        assert!(!rect_contains(r, Position::new(4, 1)));
    }

    #[test]
    fn rect_contains_negative_origin() {
        let r = FloatRect {
            x: -10,
            y: 0,
            width: 20,
            height: 5,
        };
        assert!(r.contains(Position::new(-10, 0)));
        assert!(r.contains(Position::new(9, 4)));
        assert!(!r.contains(Position::new(10, 4)));
    }

    #[test]
    fn intersection_clips_offscreen_part() {
        let window = FloatRect {
            x: -5,
            y: 2,
            width: 20,
            height: 10,
        };
        let screen = FloatRect {
            x: 0,
            y: 0,
            width: 80,
            height: 24,
        };
        assert_eq!(
            window.intersection(screen),
            Some(FloatRect {
                x: 0,
                y: 2,
                width: 15,
                height: 10
            })
        );
        let far = FloatRect {
            x: 100,
            y: 0,
            width: 5,
            height: 5,
        };
        assert_eq!(far.intersection(screen), None);
    }

    #[test]
    fn size_percent_truncates() {
        let viewport = Size::new(1024, 768);
        assert_eq!(viewport.percent(50, 50), Size::new(512, 384));
        assert_eq!(viewport.percent(20, 15), Size::new(204, 115));
    }
}
