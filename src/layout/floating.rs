use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::{FloatRect, Position, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeEdge {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeEdge {
    pub const ALL: [ResizeEdge; 8] = [
        ResizeEdge::Top,
        ResizeEdge::Bottom,
        ResizeEdge::Right,
        ResizeEdge::Left,
        ResizeEdge::TopRight,
        ResizeEdge::TopLeft,
        ResizeEdge::BottomRight,
        ResizeEdge::BottomLeft,
    ];

    /// Compass form used by handle names: `n s e w ne nw se sw`.
    pub fn compass(self) -> &'static str {
        match self {
            ResizeEdge::Top => "n",
            ResizeEdge::Bottom => "s",
            ResizeEdge::Right => "e",
            ResizeEdge::Left => "w",
            ResizeEdge::TopRight => "ne",
            ResizeEdge::TopLeft => "nw",
            ResizeEdge::BottomRight => "se",
            ResizeEdge::BottomLeft => "sw",
        }
    }

    pub fn moves_left(self) -> bool {
        matches!(
            self,
            ResizeEdge::Left | ResizeEdge::TopLeft | ResizeEdge::BottomLeft
        )
    }

    pub fn moves_right(self) -> bool {
        matches!(
            self,
            ResizeEdge::Right | ResizeEdge::TopRight | ResizeEdge::BottomRight
        )
    }

    pub fn moves_top(self) -> bool {
        matches!(
            self,
            ResizeEdge::Top | ResizeEdge::TopLeft | ResizeEdge::TopRight
        )
    }

    pub fn moves_bottom(self) -> bool {
        matches!(
            self,
            ResizeEdge::Bottom | ResizeEdge::BottomLeft | ResizeEdge::BottomRight
        )
    }
}

impl fmt::Display for ResizeEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.compass())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resize edge `{0}`")]
pub struct UnknownResizeEdge(pub String);

impl FromStr for ResizeEdge {
    type Err = UnknownResizeEdge;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResizeEdge::ALL
            .into_iter()
            .find(|edge| edge.compass() == s)
            .ok_or_else(|| UnknownResizeEdge(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResizeHandle {
    pub rect: FloatRect,
    pub edge: ResizeEdge,
}

/// Hit regions for the eight resize handles around `rect`.
///
/// Corners are `thickness` squares; edges span the remaining length of each
/// side. Corners come first so a hit test picks them over the edges.
pub fn resize_handles_for_rect(rect: FloatRect, thickness: u32) -> Vec<ResizeHandle> {
    let mut handles = Vec::new();
    if rect.width == 0 || rect.height == 0 || thickness == 0 {
        return handles;
    }
    let t = thickness.min(rect.width).min(rect.height);
    let right = (rect.right() - t as i64) as i32;
    let bottom = (rect.bottom() - t as i64) as i32;
    let square = |x: i32, y: i32, edge: ResizeEdge| ResizeHandle {
        rect: FloatRect {
            x,
            y,
            width: t,
            height: t,
        },
        edge,
    };
    handles.push(square(rect.x, rect.y, ResizeEdge::TopLeft));
    handles.push(square(right, rect.y, ResizeEdge::TopRight));
    handles.push(square(rect.x, bottom, ResizeEdge::BottomLeft));
    handles.push(square(right, bottom, ResizeEdge::BottomRight));

    let span_w = rect.width.saturating_sub(t * 2);
    if span_w > 0 {
        let x = rect.x.saturating_add(t as i32);
        handles.push(ResizeHandle {
            rect: FloatRect {
                x,
                y: rect.y,
                width: span_w,
                height: t,
            },
            edge: ResizeEdge::Top,
        });
        handles.push(ResizeHandle {
            rect: FloatRect {
                x,
                y: bottom,
                width: span_w,
                height: t,
            },
            edge: ResizeEdge::Bottom,
        });
    }
    let span_h = rect.height.saturating_sub(t * 2);
    if span_h > 0 {
        let y = rect.y.saturating_add(t as i32);
        handles.push(ResizeHandle {
            rect: FloatRect {
                x: rect.x,
                y,
                width: t,
                height: span_h,
            },
            edge: ResizeEdge::Left,
        });
        handles.push(ResizeHandle {
            rect: FloatRect {
                x: right,
                y,
                width: t,
                height: span_h,
            },
            edge: ResizeEdge::Right,
        });
    }
    handles
}

pub fn resize_edge_at(rect: FloatRect, thickness: u32, point: Position) -> Option<ResizeEdge> {
    resize_handles_for_rect(rect, thickness)
        .into_iter()
        .find(|handle| handle.rect.contains(point))
        .map(|handle| handle.edge)
}

/// Lower and optional upper bounds a resize must respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeConstraints {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl SizeConstraints {
    pub fn new(min: Size) -> Self {
        Self {
            min_width: min.width,
            min_height: min.height,
            max_width: None,
            max_height: None,
        }
    }

    pub fn with_max(mut self, max: Size) -> Self {
        self.max_width = Some(max.width);
        self.max_height = Some(max.height);
        self
    }
}

/// Apply a resize gesture to the geometry captured when it started.
///
/// The dragged edges move by the pointer delta. A shrink from the left or
/// top is capped at `start - min` so the opposite edge stays put when the
/// pointer overshoots the minimum. Returns `None` when the result would have
/// a non-positive width or height; callers skip that frame.
pub fn apply_resize(
    start_position: Position,
    start_size: Size,
    edge: ResizeEdge,
    delta: Position,
    constraints: &SizeConstraints,
) -> Option<FloatRect> {
    let dx = delta.x as i64;
    let dy = delta.y as i64;
    let min_w = constraints.min_width as i64;
    let min_h = constraints.min_height as i64;
    let start_w = start_size.width as i64;
    let start_h = start_size.height as i64;
    let mut x = start_position.x as i64;
    let mut y = start_position.y as i64;
    let mut width = start_w;
    let mut height = start_h;

    if edge.moves_right() {
        width = min_w.max(start_w + dx);
    }
    if edge.moves_left() {
        let width_delta = dx.min(start_w - min_w);
        width = start_w - width_delta;
        x += width_delta;
    }
    if edge.moves_bottom() {
        height = min_h.max(start_h + dy);
    }
    if edge.moves_top() {
        let height_delta = dy.min(start_h - min_h);
        height = start_h - height_delta;
        y += height_delta;
    }

    if let Some(max_w) = constraints.max_width {
        width = width.min(max_w as i64);
    }
    if let Some(max_h) = constraints.max_height {
        height = height.min(max_h as i64);
    }

    if width <= 0 || height <= 0 || width > u32::MAX as i64 || height > u32::MAX as i64 {
        return None;
    }
    let x = x.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    let y = y.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    Some(FloatRect {
        x,
        y,
        width: width as u32,
        height: height as u32,
    })
}

/// Clamp a dragged window's candidate origin.
///
/// Horizontally at least `keep_visible` of the window stays on screen at
/// either extreme; vertically the title bar can neither leave the top nor
/// sink below `viewport.height - titlebar_reach`.
pub fn clamp_drag_position(
    candidate: Position,
    window_width: u32,
    viewport: Size,
    keep_visible: i32,
    titlebar_reach: i32,
) -> Position {
    let min_x = keep_visible as i64 - window_width as i64;
    let max_x = viewport.width as i64 - keep_visible as i64;
    let min_y = 0i64;
    let max_y = viewport.height as i64 - titlebar_reach as i64;
    // min-then-max so an inverted range resolves to the lower bound instead of panicking
    let x = min_x.max(max_x.min(candidate.x as i64));
    let y = min_y.max(max_y.min(candidate.y as i64));
    Position {
        x: x.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        y: y.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
    }
}

/// Cascaded spawn origin for the `instance_number`-th (1-based) copy of an app.
pub fn spawn_position(
    viewport: Size,
    anchor_percent: (u16, u16),
    stagger: i32,
    instance_number: usize,
    min_visible: Size,
) -> Position {
    let anchor = viewport.percent(anchor_percent.0, anchor_percent.1);
    let step = instance_number.saturating_sub(1) as i64 * stagger as i64;
    let x = (anchor.width as i64 + step).min(viewport.width as i64 - min_visible.width as i64);
    let y = (anchor.height as i64 + step).min(viewport.height as i64 - min_visible.height as i64);
    Position {
        x: x.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        y: y.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
    }
}
