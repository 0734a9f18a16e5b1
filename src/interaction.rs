//! Pointer gestures that move or resize a window.
//!
//! A session snapshots the geometry it starts from, feeds updates into the
//! [`WindowManager`] while the pointer moves and drops the snapshot when the
//! gesture ends. Sessions remember the window's geometry epoch and cancel
//! themselves once the manager reports an external mode or lifecycle change.

use crate::layout::floating::{ResizeEdge, SizeConstraints, apply_resize, clamp_drag_position};
use crate::layout::{FloatRect, Position, Size};
use crate::window::{InstanceId, WindowManager, WindowMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    /// The window changed underneath the gesture; drop the session.
    Cancelled,
}

/// Where a pointer-down landed, as resolved by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureTarget {
    TitleBar(InstanceId),
    ResizeHandle(InstanceId, ResizeEdge),
}

fn gesture_origin<H>(
    wm: &WindowManager<H>,
    id: &str,
    button: PointerButton,
) -> Option<(FloatRect, u64)> {
    if button != PointerButton::Primary {
        return None;
    }
    let inst = wm.instance(id)?;
    let state = inst.state();
    if !state.is_interactive() || state.mode == WindowMode::Maximized {
        return None;
    }
    Some((wm.window_rect(id)?, state.geometry_epoch))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    id: InstanceId,
    /// Pointer position relative to the window origin at pointer-down.
    grab_offset: Position,
    window_width: u32,
    epoch: u64,
}

impl DragSession {
    pub fn begin<H>(
        wm: &WindowManager<H>,
        id: &str,
        button: PointerButton,
        pointer: Position,
    ) -> Option<Self> {
        let (rect, epoch) = gesture_origin(wm, id, button)?;
        tracing::trace!(instance_id = id, %pointer, "drag started");
        Some(Self {
            id: InstanceId::new(id),
            grab_offset: pointer.offset_from(rect.position()),
            window_width: rect.width,
            epoch,
        })
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn update<H>(&self, wm: &mut WindowManager<H>, pointer: Position) -> SessionStatus {
        if wm.geometry_epoch(self.id.as_str()) != Some(self.epoch) {
            tracing::debug!(instance_id = %self.id, "drag cancelled by window change");
            return SessionStatus::Cancelled;
        }
        let config = wm.config();
        let position = clamp_drag_position(
            pointer.offset_from(self.grab_offset),
            self.window_width,
            wm.viewport().size(),
            config.drag_keep_visible,
            config.titlebar_reach,
        );
        wm.update_position(self.id.as_str(), position);
        SessionStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSession {
    id: InstanceId,
    edge: ResizeEdge,
    start_pointer: Position,
    start_position: Position,
    start_size: Size,
    constraints: SizeConstraints,
    epoch: u64,
    preview: Option<FloatRect>,
}

impl ResizeSession {
    pub fn begin<H>(
        wm: &WindowManager<H>,
        id: &str,
        edge: ResizeEdge,
        button: PointerButton,
        pointer: Position,
    ) -> Option<Self> {
        let (rect, epoch) = gesture_origin(wm, id, button)?;
        if !wm.instance(id)?.options().resizable {
            return None;
        }
        tracing::trace!(instance_id = id, edge = edge.compass(), "resize started");
        Some(Self {
            id: InstanceId::new(id),
            edge,
            start_pointer: pointer,
            start_position: rect.position(),
            start_size: rect.size(),
            constraints: wm.constraints_for(id),
            epoch,
            preview: None,
        })
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn edge(&self) -> ResizeEdge {
        self.edge
    }

    /// Geometry the window would get if the gesture ended now.
    pub fn preview(&self) -> Option<FloatRect> {
        self.preview
    }

    pub fn update<H>(&mut self, wm: &WindowManager<H>, pointer: Position) -> SessionStatus {
        if wm.geometry_epoch(self.id.as_str()) != Some(self.epoch) {
            tracing::debug!(instance_id = %self.id, "resize cancelled by window change");
            return SessionStatus::Cancelled;
        }
        let delta = pointer.offset_from(self.start_pointer);
        // degenerate frames keep the previous preview
        if let Some(rect) = apply_resize(
            self.start_position,
            self.start_size,
            self.edge,
            delta,
            &self.constraints,
        ) {
            self.preview = Some(rect);
        }
        SessionStatus::Active
    }

    /// Commit the previewed geometry in one batch. Returns what was written.
    pub fn finish<H>(self, wm: &mut WindowManager<H>) -> Option<FloatRect> {
        if wm.geometry_epoch(self.id.as_str()) != Some(self.epoch) {
            return None;
        }
        let rect = self.preview?;
        wm.update_geometry(self.id.as_str(), rect.position(), rect.size());
        Some(rect)
    }
}

/// At most one gesture runs at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging(DragSession),
    Resizing(ResizeSession),
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// Start a gesture. Returns `false` when the target refuses it (wrong
    /// button, maximized, not resizable) or another gesture is running.
    pub fn pointer_down<H>(
        &mut self,
        wm: &WindowManager<H>,
        target: GestureTarget,
        button: PointerButton,
        pointer: Position,
    ) -> bool {
        if !self.is_idle() {
            return false;
        }
        let next = match target {
            GestureTarget::TitleBar(id) => {
                DragSession::begin(wm, id.as_str(), button, pointer).map(Interaction::Dragging)
            }
            GestureTarget::ResizeHandle(id, edge) => {
                ResizeSession::begin(wm, id.as_str(), edge, button, pointer)
                    .map(Interaction::Resizing)
            }
        };
        match next {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }

    pub fn pointer_move<H>(&mut self, wm: &mut WindowManager<H>, pointer: Position) {
        let status = match self {
            Interaction::Idle => return,
            Interaction::Dragging(drag) => drag.update(wm, pointer),
            Interaction::Resizing(resize) => resize.update(wm, pointer),
        };
        if status == SessionStatus::Cancelled {
            *self = Interaction::Idle;
        }
    }

    /// End the running gesture. A resize commits its final geometry; a drag
    /// has already written every position and just stops.
    pub fn pointer_up<H>(&mut self, wm: &mut WindowManager<H>, pointer: Position) {
        match std::mem::take(self) {
            Interaction::Idle | Interaction::Dragging(_) => {}
            Interaction::Resizing(mut resize) => {
                if resize.update(wm, pointer) == SessionStatus::Active {
                    resize.finish(wm);
                }
            }
        }
    }

    /// Window id and rectangle of a resize in progress, for live feedback.
    pub fn resize_preview(&self) -> Option<(&InstanceId, FloatRect)> {
        match self {
            Interaction::Resizing(resize) => resize.preview().map(|rect| (resize.id(), rect)),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&InstanceId> {
        match self {
            Interaction::Idle => None,
            Interaction::Dragging(drag) => Some(drag.id()),
            Interaction::Resizing(resize) => Some(resize.id()),
        }
    }
}
