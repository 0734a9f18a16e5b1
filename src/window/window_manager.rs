use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::{ApplicationInstance, InstanceId, Lifecycle, WindowMode, WindowOptions, WindowState};
use crate::config::WmConfig;
use crate::layout::floating::{SizeConstraints, spawn_position};
use crate::layout::{FloatRect, Position, Size};
use crate::viewport::Viewport;

/// State changes the presentation layer may want to react to; drained via
/// [`WindowManager::take_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmEvent {
    Opened(InstanceId),
    Raised { id: InstanceId, z_index: u64 },
    Minimized(InstanceId),
    Restored(InstanceId),
    Maximized(InstanceId),
    Unmaximized(InstanceId),
    Closing(InstanceId),
    Closed(InstanceId),
    Evicted(InstanceId),
    FocusChanged(Option<InstanceId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRequest {
    /// The window asks the user first; call [`WindowManager::close`] on confirm.
    NeedsConfirmation,
    Closing,
    /// Unknown id, or the instance is already closing or closed.
    Ignored,
}

/// Owns every application instance and is the single writer of their
/// window state.
///
/// Operations addressing an unknown id are no-ops. Instances are never
/// removed by `close`; they reach a terminal `Closed` lifecycle and stay in
/// the collection unless [`WmConfig::closed_retention`] evicts them.
pub struct WindowManager<H> {
    config: WmConfig,
    viewport: Viewport,
    instances: Vec<ApplicationInstance<H>>,
    active: Option<InstanceId>,
    next_z_index: u64,
    // per-base counters; ids never repeat even after eviction
    instance_counters: BTreeMap<String, usize>,
    events: Vec<WmEvent>,
}

impl<H> Default for WindowManager<H> {
    fn default() -> Self {
        Self::new(WmConfig::default(), Viewport::default())
    }
}

impl<H> WindowManager<H> {
    pub fn new(config: WmConfig, viewport: Viewport) -> Self {
        let next_z_index = config.base_z_index;
        Self {
            config,
            viewport,
            instances: Vec::new(),
            active: None,
            next_z_index,
            instance_counters: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &WmConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.viewport != viewport {
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                "viewport changed"
            );
            self.viewport = viewport;
        }
    }

    pub fn instances(&self) -> &[ApplicationInstance<H>] {
        &self.instances
    }

    pub fn instance(&self, id: &str) -> Option<&ApplicationInstance<H>> {
        self.instances.iter().find(|inst| inst.id == id)
    }

    pub fn active_id(&self) -> Option<&InstanceId> {
        self.active.as_ref()
    }

    pub fn active_instance(&self) -> Option<&ApplicationInstance<H>> {
        self.active
            .as_ref()
            .and_then(|id| self.instance(id.as_str()))
    }

    /// Mutable access to the application payload. Window state stays
    /// read-only outside the manager.
    pub fn handle_mut(&mut self, id: &str) -> Option<&mut H> {
        self.instances
            .iter_mut()
            .find(|inst| inst.id == id)
            .map(|inst| &mut inst.handle)
    }

    pub fn next_z_index(&self) -> u64 {
        self.next_z_index
    }

    pub fn take_events(&mut self) -> Vec<WmEvent> {
        std::mem::take(&mut self.events)
    }

    fn with_instance<T>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut ApplicationInstance<H>) -> T,
    ) -> Option<T> {
        self.instances
            .iter_mut()
            .find(|inst| inst.id == id)
            .map(f)
    }

    fn set_active(&mut self, active: Option<InstanceId>) {
        if self.active == active {
            return;
        }
        tracing::trace!(active = ?active, "focus changed");
        self.active = active.clone();
        self.events.push(WmEvent::FocusChanged(active));
    }

    fn clear_active_if(&mut self, id: &str) {
        if self.active.as_ref().is_some_and(|active| active == id) {
            self.set_active(None);
        }
    }

    fn allocate_z_index(&mut self) -> u64 {
        let z = self.next_z_index;
        self.next_z_index = z.saturating_add(1);
        z
    }

    pub fn default_size(&self) -> Size {
        let pct = self.config.default_size_percent;
        self.viewport.size().percent(pct, pct)
    }

    /// Open a new instance of `base_id` with default window options.
    pub fn open(&mut self, base_id: &str, name: &str, handle: H) -> InstanceId {
        self.open_with(base_id, name, handle, WindowOptions::default())
    }

    /// Open a new instance; it becomes topmost and active.
    ///
    /// The n-th instance of a base id is named `base-n` / `Name (n)` and is
    /// cascaded `n - 1` stagger steps from the spawn anchor.
    pub fn open_with(
        &mut self,
        base_id: &str,
        name: &str,
        handle: H,
        options: WindowOptions,
    ) -> InstanceId {
        let (id, number) = loop {
            let counter = self
                .instance_counters
                .entry(base_id.to_string())
                .or_insert(0);
            *counter += 1;
            let number = *counter;
            let candidate = if number == 1 {
                InstanceId::new(base_id)
            } else {
                InstanceId::new(format!("{base_id}-{number}"))
            };
            if self.instance(candidate.as_str()).is_none() {
                break (candidate, number);
            }
        };
        let name = if number > 1 {
            format!("{name} ({number})")
        } else {
            name.to_string()
        };
        let position = spawn_position(
            self.viewport.size(),
            self.config.spawn_anchor_percent,
            self.config.stagger_offset,
            number,
            self.config.min_visible_size,
        );
        let size = options.initial_size.unwrap_or_else(|| self.default_size());
        let z_index = self.allocate_z_index();

        tracing::debug!(
            instance_id = %id,
            z_index,
            x = position.x,
            y = position.y,
            "opened instance"
        );
        self.instances.push(ApplicationInstance {
            id: id.clone(),
            name,
            handle,
            options,
            state: WindowState {
                mode: WindowMode::Normal,
                lifecycle: Lifecycle::Open,
                position,
                size: Some(size),
                z_index,
                geometry_epoch: 0,
            },
        });
        self.events.push(WmEvent::Opened(id.clone()));
        self.set_active(Some(id.clone()));
        id
    }

    /// Ask to close `id`, honoring the window's confirmation preference.
    pub fn request_close(&mut self, id: &str) -> CloseRequest {
        match self.instance(id) {
            Some(inst) if inst.state.is_open() => {
                if inst.options.confirm_close {
                    CloseRequest::NeedsConfirmation
                } else {
                    self.close(id);
                    CloseRequest::Closing
                }
            }
            _ => CloseRequest::Ignored,
        }
    }

    pub fn close(&mut self, id: &str) {
        self.close_at(id, Instant::now());
    }

    /// Start the two-phase close: `Closing` now, `Closed` once
    /// [`tick`](Self::tick) observes `now + close_delay`.
    ///
    /// A second call while the instance is closing keeps the first deadline.
    pub fn close_at(&mut self, id: &str, now: Instant) {
        let deadline = now + self.config.close_delay;
        let started = self
            .with_instance(id, |inst| match inst.state.lifecycle {
                Lifecycle::Open => {
                    inst.state.lifecycle = Lifecycle::Closing { deadline };
                    inst.state.geometry_epoch += 1;
                    true
                }
                Lifecycle::Closing { .. } | Lifecycle::Closed { .. } => false,
            })
            .unwrap_or(false);
        if started {
            tracing::debug!(instance_id = id, "closing instance");
            self.events.push(WmEvent::Closing(InstanceId::new(id)));
        }
    }

    /// Fire due timers. Returns the ids that finished closing.
    pub fn tick(&mut self, now: Instant) -> Vec<InstanceId> {
        let mut finished = Vec::new();
        for inst in &mut self.instances {
            if let Lifecycle::Closing { deadline } = inst.state.lifecycle
                && deadline <= now
            {
                inst.state.lifecycle = Lifecycle::Closed { at: deadline };
                finished.push(inst.id.clone());
            }
        }
        for id in &finished {
            tracing::debug!(instance_id = %id, "closed instance");
            self.clear_active_if(id.as_str());
            self.events.push(WmEvent::Closed(id.clone()));
        }
        if let Some(retention) = self.config.closed_retention {
            self.evict_closed(now, retention);
        }
        finished
    }

    fn evict_closed(&mut self, now: Instant, retention: Duration) {
        let mut evicted = Vec::new();
        self.instances.retain(|inst| match inst.state.lifecycle {
            Lifecycle::Closed { at } if at + retention <= now => {
                evicted.push(inst.id.clone());
                false
            }
            _ => true,
        });
        for id in evicted {
            tracing::debug!(instance_id = %id, "evicted closed instance");
            self.events.push(WmEvent::Evicted(id));
        }
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let retention = self.config.closed_retention;
        self.instances
            .iter()
            .filter_map(|inst| match inst.state.lifecycle {
                Lifecycle::Closing { deadline } => Some(deadline),
                Lifecycle::Closed { at } => retention.map(|r| at + r),
                Lifecycle::Open => None,
            })
            .min()
    }

    /// Collapse `id` to the taskbar. Already-minimized windows stay minimized.
    pub fn minimize(&mut self, id: &str) {
        let changed = self
            .with_instance(id, |inst| {
                if !inst.state.is_open() {
                    return false;
                }
                let next = match inst.state.mode {
                    WindowMode::Normal => WindowMode::Minimized { maximized: false },
                    WindowMode::Maximized => WindowMode::Minimized { maximized: true },
                    WindowMode::Minimized { .. } => return false,
                };
                inst.state.mode = next;
                inst.state.geometry_epoch += 1;
                true
            })
            .unwrap_or(false);
        if changed {
            tracing::debug!(instance_id = id, "minimized instance");
            self.clear_active_if(id);
            self.events.push(WmEvent::Minimized(InstanceId::new(id)));
        }
    }

    /// Bring `id` back: un-minimize it, cancel a pending close, raise it
    /// and make it active. Closed instances stay closed.
    pub fn restore(&mut self, id: &str) {
        let restored = self.with_instance(id, |inst| {
            if inst.state.is_closed() {
                return None;
            }
            let mut changed = false;
            if inst.state.is_closing() {
                inst.state.lifecycle = Lifecycle::Open;
                changed = true;
            }
            if let WindowMode::Minimized { maximized } = inst.state.mode {
                inst.state.mode = if maximized {
                    WindowMode::Maximized
                } else {
                    WindowMode::Normal
                };
                changed = true;
            }
            if changed {
                inst.state.geometry_epoch += 1;
            }
            Some(changed)
        });
        let Some(Some(changed)) = restored else {
            return;
        };
        if changed {
            tracing::debug!(instance_id = id, "restored instance");
            self.events.push(WmEvent::Restored(InstanceId::new(id)));
        }
        self.raise(id);
    }

    /// Title-bar minimize button: minimizes, or restores when minimized.
    pub fn toggle_minimize(&mut self, id: &str) {
        match self.instance(id) {
            Some(inst) if inst.state.is_minimized() => self.restore(id),
            Some(_) => self.minimize(id),
            None => {}
        }
    }

    /// Switch the display mode. `Some(true)` when the window was minimized
    /// before, `None` when nothing changed.
    fn set_mode(&mut self, id: &str, mode: WindowMode) -> Option<bool> {
        self.with_instance(id, |inst| {
            if !inst.state.is_open() || inst.state.mode == mode {
                return None;
            }
            let was_minimized = inst.state.is_minimized();
            inst.state.mode = mode;
            inst.state.geometry_epoch += 1;
            Some(was_minimized)
        })
        .flatten()
    }

    fn push_mode_events(&mut self, id: &str, was_minimized: bool, event: WmEvent) {
        if was_minimized {
            self.events.push(WmEvent::Restored(InstanceId::new(id)));
        }
        self.events.push(event);
    }

    /// Fill the viewport. Also un-minimizes; focus is left untouched.
    pub fn maximize(&mut self, id: &str) {
        if let Some(was_minimized) = self.set_mode(id, WindowMode::Maximized) {
            tracing::debug!(instance_id = id, was_minimized, "maximized instance");
            self.push_mode_events(id, was_minimized, WmEvent::Maximized(InstanceId::new(id)));
        }
    }

    pub fn unmaximize(&mut self, id: &str) {
        let maximized = self
            .instance(id)
            .is_some_and(|inst| inst.state.mode == WindowMode::Maximized);
        if maximized && self.set_mode(id, WindowMode::Normal).is_some() {
            tracing::debug!(instance_id = id, "unmaximized instance");
            self.events.push(WmEvent::Unmaximized(InstanceId::new(id)));
        }
    }

    /// Title-bar maximize button. A minimized window that remembers being
    /// maximized comes back in the normal mode, reported as a restore
    /// followed by an unmaximize.
    pub fn toggle_maximize(&mut self, id: &str) {
        let Some(maximized) = self.instance(id).map(|inst| inst.state.is_maximized()) else {
            return;
        };
        if !maximized {
            self.maximize(id);
            return;
        }
        if let Some(was_minimized) = self.set_mode(id, WindowMode::Normal) {
            tracing::debug!(instance_id = id, was_minimized, "unmaximized instance");
            self.push_mode_events(id, was_minimized, WmEvent::Unmaximized(InstanceId::new(id)));
        }
    }

    /// Raise `id` above every other window and make it active.
    ///
    /// Always consumes a fresh z-index, even for the topmost window.
    pub fn bring_to_front(&mut self, id: &str) {
        if self.instance(id).is_some_and(|inst| !inst.state.is_closed()) {
            self.raise(id);
        }
    }

    fn raise(&mut self, id: &str) {
        let z_index = self.next_z_index;
        let raised = self
            .with_instance(id, |inst| {
                inst.state.z_index = z_index;
                inst.id.clone()
            });
        let Some(instance_id) = raised else {
            return;
        };
        self.allocate_z_index();
        tracing::trace!(instance_id = id, z_index, "raised instance");
        self.events.push(WmEvent::Raised {
            id: instance_id.clone(),
            z_index,
        });
        self.set_active(Some(instance_id));
    }

    /// Replace the stored position. No clamping happens here.
    pub fn update_position(&mut self, id: &str, position: Position) {
        self.with_instance(id, |inst| inst.state.position = position);
    }

    pub fn update_size(&mut self, id: &str, size: Size) {
        self.with_instance(id, |inst| inst.state.size = Some(size));
    }

    /// Commit position and size together, as a finished resize does.
    pub fn update_geometry(&mut self, id: &str, position: Position, size: Size) {
        let updated = self.with_instance(id, |inst| {
            inst.state.position = position;
            inst.state.size = Some(size);
        });
        if updated.is_some() {
            tracing::trace!(instance_id = id, %position, %size, "committed geometry");
        }
    }

    /// Instances that still own a window, minimized ones included.
    pub fn window_apps(&self) -> Vec<&ApplicationInstance<H>> {
        self.instances
            .iter()
            .filter(|inst| !inst.state.is_closed())
            .collect()
    }

    /// Instances represented on the desktop or taskbar: closed or minimized.
    pub fn desktop_apps(&self) -> Vec<&ApplicationInstance<H>> {
        self.instances
            .iter()
            .filter(|inst| inst.state.is_closed() || inst.state.is_minimized())
            .collect()
    }

    /// Minimized, still-open instances in creation order, for a taskbar.
    pub fn minimized_apps(&self) -> Vec<&ApplicationInstance<H>> {
        self.instances
            .iter()
            .filter(|inst| !inst.state.is_closed() && inst.state.is_minimized())
            .collect()
    }

    pub fn should_show_desktop_hint(&self) -> bool {
        self.instances.iter().all(|inst| inst.state.is_closed())
    }

    /// Windows to paint, bottom-most first.
    pub fn draw_order(&self) -> Vec<&ApplicationInstance<H>> {
        let mut visible: Vec<_> = self
            .instances
            .iter()
            .filter(|inst| !inst.state.is_closed() && !inst.state.is_minimized())
            .collect();
        visible.sort_by_key(|inst| inst.state.z_index);
        visible
    }

    /// On-screen rectangle of a window: the viewport when maximized,
    /// otherwise its position and stored (or default) size.
    pub fn window_rect(&self, id: &str) -> Option<FloatRect> {
        let inst = self.instance(id)?;
        if inst.state.mode == WindowMode::Maximized {
            return Some(self.viewport.bounds());
        }
        let size = inst.state.size.unwrap_or_else(|| self.default_size());
        Some(FloatRect::new(inst.state.position, size))
    }

    /// Topmost open window under `point`.
    pub fn topmost_at(&self, point: Position) -> Option<&InstanceId> {
        self.draw_order()
            .into_iter()
            .rev()
            .filter(|inst| inst.state.is_open())
            .find(|inst| {
                self.window_rect(inst.id.as_str())
                    .is_some_and(|rect| rect.contains(point))
            })
            .map(|inst| &inst.id)
    }

    pub fn geometry_epoch(&self, id: &str) -> Option<u64> {
        self.instance(id).map(|inst| inst.state.geometry_epoch)
    }

    pub fn constraints_for(&self, id: &str) -> SizeConstraints {
        self.instance(id)
            .and_then(|inst| inst.options.constraints)
            .unwrap_or_else(|| SizeConstraints::new(self.config.min_window_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wm() -> WindowManager<()> {
        WindowManager::new(WmConfig::default(), Viewport::new(1024, 768))
    }

    #[test]
    fn ids_and_names_are_suffixed_per_base() {
        let mut wm = wm();
        let a = wm.open("terminal", "Terminal", ());
        let b = wm.open("terminal", "Terminal", ());
        let c = wm.open("terminal", "Terminal", ());
        assert_eq!(a, "terminal");
        assert_eq!(b, "terminal-2");
        assert_eq!(c, "terminal-3");
        let names: Vec<_> = wm.instances().iter().map(|i| i.name().to_string()).collect();
        assert_eq!(names, ["Terminal", "Terminal (2)", "Terminal (3)"]);
    }

    #[test]
    fn ids_keep_counting_after_close() {
        let mut wm = wm();
        let t0 = Instant::now();
        let first = wm.open("pdf-viewer", "PDF Viewer", ());
        wm.close_at(first.as_str(), t0);
        wm.tick(t0 + Duration::from_millis(300));
        let second = wm.open("pdf-viewer", "PDF Viewer", ());
        assert_eq!(second, "pdf-viewer-2");
    }

    #[test]
    fn base_ids_sharing_a_prefix_do_not_interfere() {
        let mut wm = wm();
        wm.open("pdf", "PDF", ());
        let viewer = wm.open("pdf-viewer", "PDF Viewer", ());
        assert_eq!(viewer, "pdf-viewer");
    }

    #[test]
    fn colliding_base_skips_taken_ids() {
        let mut wm = wm();
        wm.open("terminal", "Terminal", ());
        wm.open("terminal", "Terminal", ());
        let odd = wm.open("terminal-2", "Odd", ());
        assert_eq!(odd, "terminal-2-2");
    }

    #[test]
    fn open_staggers_and_activates() {
        let mut wm = wm();
        let a = wm.open("terminal", "Terminal", ());
        let b = wm.open("terminal", "Terminal", ());
        assert_eq!(
            wm.instance(a.as_str()).unwrap().state().position,
            Position::new(204, 115)
        );
        assert_eq!(
            wm.instance(b.as_str()).unwrap().state().position,
            Position::new(254, 165)
        );
        assert_eq!(wm.active_id(), Some(&b));
        assert_eq!(
            wm.instance(b.as_str()).unwrap().state().size,
            Some(Size::new(512, 384))
        );
    }

    #[test]
    fn z_indices_increase_in_call_order() {
        let mut wm = wm();
        let a = wm.open("a", "A", ());
        let b = wm.open("b", "B", ());
        let z = |wm: &WindowManager<()>, id: &InstanceId| {
            wm.instance(id.as_str()).unwrap().state().z_index
        };
        assert_eq!(z(&wm, &a), 1000);
        assert_eq!(z(&wm, &b), 1001);

        wm.bring_to_front(a.as_str());
        assert_eq!(z(&wm, &a), 1002);
        wm.minimize(b.as_str());
        wm.restore(b.as_str());
        assert_eq!(z(&wm, &b), 1003);
        // raising the topmost window still consumes a value
        wm.bring_to_front(b.as_str());
        assert_eq!(z(&wm, &b), 1004);
        assert_eq!(wm.next_z_index(), 1005);
        let top = wm.draw_order().last().map(|i| i.id().clone());
        assert_eq!(top, Some(b));
    }

    #[test]
    fn close_is_two_phase() {
        let mut wm = wm();
        let t0 = Instant::now();
        let id = wm.open("terminal", "Terminal", ());
        wm.close_at(id.as_str(), t0);
        let state = wm.instance(id.as_str()).unwrap().state().clone();
        assert!(state.is_closing());
        assert!(!state.is_closed());
        assert_eq!(wm.active_id(), Some(&id));

        assert!(wm.tick(t0 + Duration::from_millis(299)).is_empty());
        assert!(wm.instance(id.as_str()).unwrap().state().is_closing());

        assert_eq!(wm.tick(t0 + Duration::from_millis(300)), vec![id.clone()]);
        let state = wm.instance(id.as_str()).unwrap().state();
        assert!(state.is_closed());
        assert!(!state.is_closing());
        assert_eq!(wm.active_id(), None);
        // still tracked
        assert_eq!(wm.instances().len(), 1);
    }

    #[test]
    fn repeated_close_keeps_first_deadline() {
        let mut wm = wm();
        let t0 = Instant::now();
        let id = wm.open("terminal", "Terminal", ());
        wm.close_at(id.as_str(), t0);
        wm.close_at(id.as_str(), t0 + Duration::from_millis(200));
        assert_eq!(wm.next_deadline(), Some(t0 + Duration::from_millis(300)));
        assert_eq!(wm.tick(t0 + Duration::from_millis(300)).len(), 1);
    }

    #[test]
    fn restore_cancels_pending_close() {
        let mut wm = wm();
        let t0 = Instant::now();
        let id = wm.open("terminal", "Terminal", ());
        wm.close_at(id.as_str(), t0);
        wm.restore(id.as_str());
        assert!(wm.tick(t0 + Duration::from_secs(1)).is_empty());
        assert!(wm.instance(id.as_str()).unwrap().state().is_open());
    }

    #[test]
    fn closed_is_terminal() {
        let mut wm = wm();
        let t0 = Instant::now();
        let id = wm.open("terminal", "Terminal", ());
        wm.close_at(id.as_str(), t0);
        wm.tick(t0 + Duration::from_millis(300));
        let before = wm.next_z_index();
        wm.restore(id.as_str());
        wm.bring_to_front(id.as_str());
        wm.maximize(id.as_str());
        wm.minimize(id.as_str());
        let state = wm.instance(id.as_str()).unwrap().state();
        assert!(state.is_closed());
        assert_eq!(state.mode, WindowMode::Normal);
        assert_eq!(wm.next_z_index(), before);
        assert_eq!(wm.active_id(), None);
    }

    #[test]
    fn toggles_pair_up() {
        let mut wm = wm();
        let id = wm.open("terminal", "Terminal", ());
        wm.toggle_minimize(id.as_str());
        assert!(wm.instance(id.as_str()).unwrap().state().is_minimized());
        wm.toggle_minimize(id.as_str());
        assert!(!wm.instance(id.as_str()).unwrap().state().is_minimized());

        wm.toggle_maximize(id.as_str());
        assert!(wm.instance(id.as_str()).unwrap().state().is_maximized());
        wm.toggle_maximize(id.as_str());
        assert!(!wm.instance(id.as_str()).unwrap().state().is_maximized());
    }

    #[test]
    fn explicit_minimize_is_idempotent() {
        let mut wm = wm();
        let id = wm.open("terminal", "Terminal", ());
        wm.minimize(id.as_str());
        wm.minimize(id.as_str());
        assert!(wm.instance(id.as_str()).unwrap().state().is_minimized());
        assert_eq!(wm.active_id(), None);
    }

    #[test]
    fn minimized_maximized_window_restores_maximized() {
        let mut wm = wm();
        let id = wm.open("terminal", "Terminal", ());
        wm.maximize(id.as_str());
        wm.minimize(id.as_str());
        let state = wm.instance(id.as_str()).unwrap().state();
        assert_eq!(state.mode, WindowMode::Minimized { maximized: true });
        wm.restore(id.as_str());
        assert_eq!(
            wm.instance(id.as_str()).unwrap().state().mode,
            WindowMode::Maximized
        );
        assert_eq!(wm.window_rect(id.as_str()), Some(wm.viewport().bounds()));
    }

    #[test]
    fn toggle_maximize_on_minimized_maximized_window_restores_then_unmaximizes() {
        let mut wm = wm();
        let id = wm.open("terminal", "Terminal", ());
        wm.maximize(id.as_str());
        wm.minimize(id.as_str());
        wm.take_events();
        wm.toggle_maximize(id.as_str());
        assert_eq!(
            wm.instance(id.as_str()).unwrap().state().mode,
            WindowMode::Normal
        );
        assert_eq!(
            wm.take_events(),
            vec![WmEvent::Restored(id.clone()), WmEvent::Unmaximized(id.clone())]
        );
    }

    #[test]
    fn maximize_unminimizes_without_focusing() {
        let mut wm = wm();
        let a = wm.open("a", "A", ());
        let b = wm.open("b", "B", ());
        wm.minimize(a.as_str());
        wm.maximize(a.as_str());
        let state = wm.instance(a.as_str()).unwrap().state();
        assert!(!state.is_minimized());
        assert!(state.is_maximized());
        assert_eq!(wm.active_id(), Some(&b));
        wm.unmaximize(a.as_str());
        assert_eq!(
            wm.instance(a.as_str()).unwrap().state().mode,
            WindowMode::Normal
        );
    }

    #[test]
    fn minimizing_inactive_window_keeps_focus() {
        let mut wm = wm();
        let a = wm.open("a", "A", ());
        let b = wm.open("b", "B", ());
        wm.minimize(a.as_str());
        assert_eq!(wm.active_id(), Some(&b));
    }

    #[test]
    fn desktop_hint_tracks_open_instances() {
        let mut wm = wm();
        assert!(wm.should_show_desktop_hint());
        let t0 = Instant::now();
        let a = wm.open("a", "A", ());
        assert!(!wm.should_show_desktop_hint());
        wm.minimize(a.as_str());
        assert!(!wm.should_show_desktop_hint());
        wm.close_at(a.as_str(), t0);
        assert!(!wm.should_show_desktop_hint());
        wm.tick(t0 + Duration::from_millis(300));
        assert!(wm.should_show_desktop_hint());
    }

    #[test]
    fn derived_collections() {
        let mut wm = wm();
        let t0 = Instant::now();
        let a = wm.open("a", "A", ());
        let b = wm.open("b", "B", ());
        let c = wm.open("c", "C", ());
        wm.minimize(b.as_str());
        wm.close_at(c.as_str(), t0);
        wm.tick(t0 + Duration::from_millis(300));

        let ids = |apps: Vec<&ApplicationInstance<()>>| {
            apps.into_iter()
                .map(|i| i.id().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(wm.window_apps()), [a.to_string(), b.to_string()]);
        assert_eq!(ids(wm.desktop_apps()), [b.to_string(), c.to_string()]);
        assert_eq!(ids(wm.minimized_apps()), [b.to_string()]);
        assert_eq!(ids(wm.draw_order()), [a.to_string()]);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut wm = wm();
        wm.open("a", "A", ());
        let z = wm.next_z_index();
        wm.close("nope");
        wm.minimize("nope");
        wm.maximize("nope");
        wm.restore("nope");
        wm.bring_to_front("nope");
        wm.update_position("nope", Position::new(1, 1));
        wm.update_size("nope", Size::new(1, 1));
        assert_eq!(wm.next_z_index(), z);
        assert_eq!(wm.request_close("nope"), CloseRequest::Ignored);
        assert_eq!(wm.active_id().map(|id| id.as_str()), Some("a"));
    }

    #[test]
    fn update_position_is_not_clamped() {
        let mut wm = wm();
        let id = wm.open("a", "A", ());
        wm.update_position(id.as_str(), Position::new(-5000, 9000));
        assert_eq!(
            wm.instance(id.as_str()).unwrap().state().position,
            Position::new(-5000, 9000)
        );
    }

    #[test]
    fn confirm_close_defers_to_caller() {
        let mut wm = wm();
        let id = wm.open_with(
            "chat",
            "Chat",
            (),
            WindowOptions {
                confirm_close: true,
                ..WindowOptions::default()
            },
        );
        assert_eq!(wm.request_close(id.as_str()), CloseRequest::NeedsConfirmation);
        assert!(wm.instance(id.as_str()).unwrap().state().is_open());
        let plain = wm.open("a", "A", ());
        assert_eq!(wm.request_close(plain.as_str()), CloseRequest::Closing);
        assert_eq!(wm.request_close(plain.as_str()), CloseRequest::Ignored);
    }

    #[test]
    fn retention_evicts_closed_instances() {
        let mut wm: WindowManager<()> = WindowManager::new(
            WmConfig {
                closed_retention: Some(Duration::from_secs(5)),
                ..WmConfig::default()
            },
            Viewport::new(1024, 768),
        );
        let t0 = Instant::now();
        let id = wm.open("a", "A", ());
        wm.close_at(id.as_str(), t0);
        wm.tick(t0 + Duration::from_millis(300));
        assert_eq!(wm.instances().len(), 1);
        assert_eq!(
            wm.next_deadline(),
            Some(t0 + Duration::from_millis(300) + Duration::from_secs(5))
        );
        wm.tick(t0 + Duration::from_secs(6));
        assert!(wm.instances().is_empty());
        assert!(wm.take_events().contains(&WmEvent::Evicted(id)));
        assert_eq!(wm.open("a", "A", ()), "a-2");
    }

    #[test]
    fn lifecycle_changes_bump_geometry_epoch() {
        let mut wm = wm();
        let id = wm.open("a", "A", ());
        let e0 = wm.geometry_epoch(id.as_str()).unwrap();
        wm.update_position(id.as_str(), Position::new(3, 3));
        assert_eq!(wm.geometry_epoch(id.as_str()), Some(e0));
        wm.maximize(id.as_str());
        assert!(wm.geometry_epoch(id.as_str()).unwrap() > e0);
    }

    #[test]
    fn topmost_at_respects_z_order() {
        let mut wm = wm();
        let a = wm.open("a", "A", ());
        let b = wm.open("b", "B", ());
        wm.update_position(a.as_str(), Position::new(0, 0));
        wm.update_position(b.as_str(), Position::new(100, 100));
        let overlap = Position::new(150, 150);
        assert_eq!(wm.topmost_at(overlap), Some(&b));
        wm.bring_to_front(a.as_str());
        assert_eq!(wm.topmost_at(overlap), Some(&a));
        assert_eq!(wm.topmost_at(Position::new(1000, 760)), None);
    }

    #[test]
    fn events_are_drained() {
        let mut wm = wm();
        let id = wm.open("a", "A", ());
        let events = wm.take_events();
        assert_eq!(
            events,
            vec![
                WmEvent::Opened(id.clone()),
                WmEvent::FocusChanged(Some(id)),
            ]
        );
        assert!(wm.take_events().is_empty());
    }
}
