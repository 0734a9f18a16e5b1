use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::window::{CloseRequest, InstanceId, WindowManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Window accelerators, scoped to the active window
    CloseWindow,
    MinimizeWindow,
    MaximizeWindow,
    // Desktop
    OpenTerminal,
    Quit,
    // Close confirmation overlay
    ConfirmAccept,
    ConfirmCancel,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::CloseWindow => "Close window",
            Action::MinimizeWindow => "Minimize window",
            Action::MaximizeWindow => "Maximize / restore window",
            Action::OpenTerminal => "Open terminal",
            Action::Quit => "Quit",
            Action::ConfirmAccept => "Confirm",
            Action::ConfirmCancel => "Cancel",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// One scope's accelerator table. Scopes never share a table, so a combo
/// maps to at most one action inside it.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accelerators that act on the active window.
    pub fn window_defaults() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(
            CloseWindow,
            KeyCombo::new(KeyCode::Char('w'), KeyModifiers::CONTROL),
        );
        kb.add(
            MinimizeWindow,
            KeyCombo::new(KeyCode::Char('m'), KeyModifiers::CONTROL),
        );
        // Ctrl+M arrives as Enter on many terminals
        kb.add(
            MinimizeWindow,
            KeyCombo::new(KeyCode::Char('m'), KeyModifiers::ALT),
        );
        kb.add(
            MaximizeWindow,
            KeyCombo::new(
                KeyCode::Enter,
                KeyModifiers::CONTROL | KeyModifiers::SHIFT,
            ),
        );
        kb.add(
            MaximizeWindow,
            KeyCombo::new(KeyCode::Enter, KeyModifiers::ALT),
        );
        kb
    }

    pub fn desktop_defaults() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(
            OpenTerminal,
            KeyCombo::new(KeyCode::Char(' '), KeyModifiers::NONE),
        );
        kb.add(
            OpenTerminal,
            KeyCombo::new(KeyCode::Enter, KeyModifiers::NONE),
        );
        kb.add(
            Quit,
            KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        kb
    }

    pub fn confirm_defaults() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(
            ConfirmAccept,
            KeyCombo::new(KeyCode::Enter, KeyModifiers::NONE),
        );
        kb.add(
            ConfirmAccept,
            KeyCombo::new(KeyCode::Char('y'), KeyModifiers::NONE),
        );
        kb.add(
            ConfirmCancel,
            KeyCombo::new(KeyCode::Esc, KeyModifiers::NONE),
        );
        kb.add(
            ConfirmCancel,
            KeyCombo::new(KeyCode::Char('n'), KeyModifiers::NONE),
        );
        kb
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        if let Some(list) = self.map.get(&action) {
            list.iter().any(|c| c.matches(key))
        } else {
            false
        }
    }

    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        for (act, list) in &self.map {
            if list.iter().any(|c| c.matches(key)) {
                return Some(*act);
            }
        }
        None
    }

    /// Return the display strings for all combos mapped to `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|list| list.iter().map(|c| c.display()).collect())
            .unwrap_or_default()
    }
}

/// Result of feeding one key event through the [`InputRouter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    /// A window accelerator was applied to this instance.
    Window(InstanceId, Action),
    /// Close was requested on a window that wants confirmation first.
    ConfirmClose(InstanceId),
    /// A desktop-level action for the caller to carry out.
    Desktop(Action),
    Unhandled,
}

/// Focus-scoped accelerator routing.
///
/// Window accelerators are registered for exactly one instance: the active
/// one, while it is open and not minimized. Everything else falls through to
/// the desktop table.
#[derive(Debug, Clone)]
pub struct InputRouter {
    window: KeyBindings,
    desktop: KeyBindings,
    focused: Option<InstanceId>,
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new(KeyBindings::window_defaults(), KeyBindings::desktop_defaults())
    }
}

impl InputRouter {
    pub fn new(window: KeyBindings, desktop: KeyBindings) -> Self {
        Self {
            window,
            desktop,
            focused: None,
        }
    }

    /// Instance the window accelerators are currently bound to.
    pub fn focused(&self) -> Option<&InstanceId> {
        self.focused.as_ref()
    }

    pub fn window_bindings(&self) -> &KeyBindings {
        &self.window
    }

    pub fn desktop_bindings(&self) -> &KeyBindings {
        &self.desktop
    }

    /// Re-register window accelerators after a focus or state change.
    pub fn sync_focus<H>(&mut self, wm: &WindowManager<H>) {
        let next = wm
            .active_instance()
            .filter(|inst| inst.state().is_interactive())
            .map(|inst| inst.id().clone());
        if next != self.focused {
            if let Some(old) = &self.focused {
                tracing::trace!(instance_id = %old, "window accelerators unregistered");
            }
            if let Some(new) = &next {
                tracing::trace!(instance_id = %new, "window accelerators registered");
            }
            self.focused = next;
        }
    }

    pub fn route<H>(&mut self, wm: &mut WindowManager<H>, key: &KeyEvent) -> Routed {
        if key.kind == KeyEventKind::Release {
            return Routed::Unhandled;
        }
        self.sync_focus(wm);
        if let Some(id) = self.focused.clone()
            && let Some(action) = self.window.action_for_key(key)
        {
            tracing::debug!(instance_id = %id, %action, "window accelerator");
            return match action {
                Action::CloseWindow => match wm.request_close(id.as_str()) {
                    CloseRequest::NeedsConfirmation => Routed::ConfirmClose(id),
                    CloseRequest::Closing | CloseRequest::Ignored => Routed::Window(id, action),
                },
                Action::MinimizeWindow => {
                    wm.minimize(id.as_str());
                    self.sync_focus(wm);
                    Routed::Window(id, action)
                }
                Action::MaximizeWindow => {
                    wm.toggle_maximize(id.as_str());
                    Routed::Window(id, action)
                }
                _ => Routed::Unhandled,
            };
        }
        match self.desktop.action_for_key(key) {
            Some(Action::OpenTerminal) if !wm.should_show_desktop_hint() => Routed::Unhandled,
            Some(action) => Routed::Desktop(action),
            None => Routed::Unhandled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WmConfig;
    use crate::viewport::Viewport;
    use crossterm::event::KeyEvent;

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn wm() -> WindowManager<()> {
        WindowManager::new(WmConfig::default(), Viewport::default())
    }

    #[test]
    fn defaults_match_quit() {
        let kb = KeyBindings::desktop_defaults();
        assert!(kb.matches(Action::Quit, &ctrl('q')));
    }

    #[test]
    fn combo_display() {
        let combo = KeyCombo::new(KeyCode::Enter, KeyModifiers::CONTROL | KeyModifiers::SHIFT);
        assert_eq!(combo.to_string(), "Ctrl+Shift+Enter");
        let kb = KeyBindings::desktop_defaults();
        assert_eq!(kb.combos_for(Action::OpenTerminal), ["Space", "Enter"]);
    }

    #[test]
    fn accelerators_target_active_window_only() {
        let mut wm = wm();
        let mut router = InputRouter::default();
        let a = wm.open("a", "A", ());
        let b = wm.open("b", "B", ());
        assert_eq!(
            router.route(&mut wm, &ctrl('m')),
            Routed::Window(b.clone(), Action::MinimizeWindow)
        );
        assert!(wm.instance(b.as_str()).unwrap().state().is_minimized());
        assert!(!wm.instance(a.as_str()).unwrap().state().is_minimized());
        // nothing is active any more
        assert_eq!(router.focused(), None);
        assert_eq!(router.route(&mut wm, &ctrl('w')), Routed::Unhandled);
    }

    #[test]
    fn closing_window_loses_accelerators() {
        let mut wm = wm();
        let mut router = InputRouter::default();
        let a = wm.open("a", "A", ());
        assert_eq!(
            router.route(&mut wm, &ctrl('w')),
            Routed::Window(a.clone(), Action::CloseWindow)
        );
        assert!(wm.instance(a.as_str()).unwrap().state().is_closing());
        let alt_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        assert_eq!(router.route(&mut wm, &alt_enter), Routed::Unhandled);
        assert!(!wm.instance(a.as_str()).unwrap().state().is_maximized());
    }

    #[test]
    fn maximize_accelerator_toggles() {
        let mut wm = wm();
        let mut router = InputRouter::default();
        let a = wm.open("a", "A", ());
        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL | KeyModifiers::SHIFT);
        router.route(&mut wm, &key);
        assert!(wm.instance(a.as_str()).unwrap().state().is_maximized());
        router.route(&mut wm, &key);
        assert!(!wm.instance(a.as_str()).unwrap().state().is_maximized());
    }

    #[test]
    fn open_terminal_only_from_empty_desktop() {
        let mut wm = wm();
        let mut router = InputRouter::default();
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(
            router.route(&mut wm, &space),
            Routed::Desktop(Action::OpenTerminal)
        );
        wm.open("terminal", "Terminal", ());
        assert_eq!(router.route(&mut wm, &space), Routed::Unhandled);
        assert_eq!(router.route(&mut wm, &ctrl('q')), Routed::Desktop(Action::Quit));
    }

    #[test]
    fn key_release_is_ignored() {
        let mut wm = wm();
        let mut router = InputRouter::default();
        wm.open("a", "A", ());
        let mut key = ctrl('w');
        key.kind = KeyEventKind::Release;
        assert_eq!(router.route(&mut wm, &key), Routed::Unhandled);
    }
}
