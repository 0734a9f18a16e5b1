//! The desktop surface hosted in a terminal.
//!
//! `Desktop` owns the [`WindowManager`] and everything around it: desktop
//! icons, the taskbar of minimized windows, title-bar buttons, pointer
//! gestures, focus-scoped accelerators and the close confirmation. It reads
//! crossterm events and paints into a ratatui [`Buffer`]; it never touches
//! the terminal itself, so it runs headless in tests.

use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

use crossterm::event::{
    Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::apps::chat::{ChatEngineKind, ChatStatus, Role};
use crate::apps::terminal::EntryKind;
use crate::apps::{
    AppKind, AppRequest, AppState, ChatSession, CommandRegistry, PdfDocument, TerminalSession,
    WindowCommand,
};
use crate::config::WmConfig;
use crate::constants::DOUBLE_CLICK_MS;
use crate::interaction::{GestureTarget, Interaction, PointerButton};
use crate::keybindings::{Action, InputRouter, KeyBindings, Routed};
use crate::layout::floating::{ResizeEdge, resize_edge_at};
use crate::layout::{FloatRect, Position, Size};
use crate::theme;
use crate::ui::{centered, display_width, fill, put_str, truncate_to_width, visible_rect};
use crate::viewport::Viewport;
use crate::window::decorator::{HeaderAction, TitleBarDecorator, WindowChrome, WindowDecorator};
use crate::window::{CloseRequest, InstanceId, WindowManager, WmEvent};

const TASKBAR_LABEL: &str = " folio ";
const ICON_WIDTH: u16 = 12;
const ICON_SPACING: u16 = 3;
const CONFIRM_WIDTH: u16 = 44;
const CONFIRM_HEIGHT: u16 = 7;
const ACCEPT_LABEL: &str = "[ Close ]";
const CANCEL_LABEL: &str = "[ Cancel ]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopOptions {
    /// Document shown by PDF viewer windows and attached to chat windows.
    pub document: Option<PathBuf>,
    pub document_pages: usize,
    /// Size asked for by new windows on tablet and desktop viewports.
    pub window_size: Size,
    pub chat_engine: ChatEngineKind,
    /// Icons open on a single tap instead of a double-click.
    pub touch: bool,
}

impl Default for DesktopOptions {
    fn default() -> Self {
        Self {
            document: None,
            document_pages: 1,
            window_size: Size::new(64, 18),
            chat_engine: ChatEngineKind::default(),
            touch: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClickTarget {
    Header(InstanceId),
    Icon(AppKind),
}

struct ConfirmLayout {
    frame: Rect,
    accept: Rect,
    cancel: Rect,
}

pub struct Desktop {
    wm: WindowManager<AppState>,
    interaction: Interaction,
    router: InputRouter,
    confirm_bindings: KeyBindings,
    decorator: TitleBarDecorator,
    registry: CommandRegistry,
    options: DesktopOptions,
    screen: Rect,
    pending_confirm: Option<InstanceId>,
    last_click: Option<(ClickTarget, Instant)>,
    quit: bool,
}

impl Desktop {
    pub fn new(
        config: WmConfig,
        screen: Rect,
        registry: CommandRegistry,
        options: DesktopOptions,
    ) -> Self {
        let decorator = TitleBarDecorator::new(config.titlebar_height);
        let wm = WindowManager::new(config, viewport_for(screen, options.touch));
        Self {
            wm,
            interaction: Interaction::default(),
            router: InputRouter::default(),
            confirm_bindings: KeyBindings::confirm_defaults(),
            decorator,
            registry,
            options,
            screen,
            pending_confirm: None,
            last_click: None,
            quit: false,
        }
    }

    pub fn wm(&self) -> &WindowManager<AppState> {
        &self.wm
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    /// Window waiting for the user to confirm its close.
    pub fn pending_confirm(&self) -> Option<&InstanceId> {
        self.pending_confirm.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.wm.next_deadline()
    }

    /// Windows live above the taskbar row.
    fn viewport_area(&self) -> Rect {
        Rect {
            height: self.screen.height.saturating_sub(1),
            ..self.screen
        }
    }

    fn taskbar_row(&self) -> Option<u16> {
        (self.screen.height > 0).then(|| self.screen.bottom() - 1)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen = Rect::new(0, 0, width, height);
        self.wm
            .set_viewport(viewport_for(self.screen, self.options.touch));
    }

    pub fn open_app(&mut self, kind: AppKind) -> InstanceId {
        let viewport = self.wm.viewport();
        let breakpoints = self.wm.config().breakpoints;
        let preferred = viewport.preferred_window_size(&breakpoints, self.options.window_size);
        let state = match kind {
            AppKind::Terminal => AppState::Terminal(TerminalSession::new()),
            AppKind::PdfViewer => AppState::Pdf(PdfDocument::new(
                self.options.document.clone(),
                self.options.document_pages,
            )),
            AppKind::AiChat => {
                let chat = ChatSession::new(self.options.chat_engine.build());
                AppState::Chat(match self.document_text() {
                    Some(text) => chat.with_context(text),
                    None => chat,
                })
            }
        };
        let id = self.wm.open_with(
            kind.base_id(),
            kind.display_name(),
            state,
            kind.window_options(preferred),
        );
        if viewport.prefers_fullscreen(&breakpoints) {
            self.wm.maximize(id.as_str());
        }
        tracing::info!(instance_id = %id, app = %kind, "launched app");
        self.router.sync_focus(&self.wm);
        id
    }

    /// Text attached to chat windows. Files that are not UTF-8 text are
    /// described by name and page count instead.
    fn document_text(&self) -> Option<String> {
        let path = self.options.document.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "document is not readable as text");
                Some(format!(
                    "{} ({} pages)",
                    path.display(),
                    self.options.document_pages
                ))
            }
        }
    }

    /// Fire due close timers and react to what changed.
    pub fn tick(&mut self, now: Instant) {
        self.wm.tick(now);
        for event in self.wm.take_events() {
            tracing::trace!(?event, "window event");
            if let WmEvent::Closing(id) | WmEvent::Closed(id) | WmEvent::Evicted(id) = &event
                && self.pending_confirm.as_ref() == Some(id)
            {
                self.pending_confirm = None;
            }
        }
        self.router.sync_focus(&self.wm);
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) {
        match event {
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            Event::Resize(width, height) => self.resize(*width, *height),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent, now: Instant) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if self.pending_confirm.is_some() {
            match self.confirm_bindings.action_for_key(key) {
                Some(Action::ConfirmAccept) => self.resolve_confirm(true, now),
                Some(Action::ConfirmCancel) => self.resolve_confirm(false, now),
                _ => {}
            }
            return;
        }
        match self.router.route(&mut self.wm, key) {
            Routed::ConfirmClose(id) => self.pending_confirm = Some(id),
            Routed::Window(..) => {}
            Routed::Desktop(Action::OpenTerminal) => {
                self.open_app(AppKind::Terminal);
            }
            Routed::Desktop(Action::Quit) => self.quit = true,
            Routed::Desktop(_) => {}
            Routed::Unhandled => self.forward_key(key),
        }
        self.router.sync_focus(&self.wm);
    }

    fn forward_key(&mut self, key: &KeyEvent) {
        let Some(id) = self.router.focused().cloned() else {
            return;
        };
        let registry = &self.registry;
        let request = match self.wm.handle_mut(id.as_str()) {
            Some(AppState::Terminal(term)) => term.handle_key(key, registry, SystemTime::now()),
            Some(AppState::Pdf(doc)) => {
                doc.handle_key(key);
                None
            }
            Some(AppState::Chat(chat)) => {
                chat.handle_key(key);
                None
            }
            None => None,
        };
        if let Some(request) = request {
            self.apply_request(&id, request);
        }
    }

    /// Carry out a request an app made for its own window, through the same
    /// controls the title bar uses.
    pub fn apply_request(&mut self, id: &InstanceId, request: AppRequest) {
        tracing::debug!(instance_id = %id, ?request, "app request");
        match request {
            AppRequest::Window(WindowCommand::Minimize) => self.wm.minimize(id.as_str()),
            AppRequest::Window(WindowCommand::Maximize) => self.wm.toggle_maximize(id.as_str()),
            AppRequest::Window(WindowCommand::Close) => self.request_close(id),
            AppRequest::Open(kind) => {
                self.open_app(kind);
            }
        }
        self.router.sync_focus(&self.wm);
    }

    fn request_close(&mut self, id: &InstanceId) {
        if self.wm.request_close(id.as_str()) == CloseRequest::NeedsConfirmation {
            self.pending_confirm = Some(id.clone());
        }
    }

    fn resolve_confirm(&mut self, accept: bool, now: Instant) {
        let Some(id) = self.pending_confirm.take() else {
            return;
        };
        tracing::debug!(instance_id = %id, accept, "close confirmation answered");
        if accept {
            self.wm.close_at(id.as_str(), now);
        }
        self.router.sync_focus(&self.wm);
    }

    fn is_double_click(&mut self, target: ClickTarget, now: Instant) -> bool {
        let window = Duration::from_millis(DOUBLE_CLICK_MS);
        let double = matches!(
            &self.last_click,
            Some((prev, at)) if *prev == target && now.saturating_duration_since(*at) <= window
        );
        self.last_click = if double { None } else { Some((target, now)) };
        double
    }

    pub fn handle_mouse(&mut self, mouse: &MouseEvent, now: Instant) {
        let point = Position::new(mouse.column as i32, mouse.row as i32);
        match mouse.kind {
            MouseEventKind::Down(button) => self.pointer_down(point, pointer_button(button), now),
            MouseEventKind::Drag(_) => self.interaction.pointer_move(&mut self.wm, point),
            MouseEventKind::Up(_) => self.interaction.pointer_up(&mut self.wm, point),
            _ => {}
        }
    }

    fn pointer_down(&mut self, point: Position, button: PointerButton, now: Instant) {
        if self.pending_confirm.is_some() {
            if let Some(layout) = self.confirm_layout() {
                if rect_hit(layout.accept, point) {
                    self.resolve_confirm(true, now);
                } else if rect_hit(layout.cancel, point) {
                    self.resolve_confirm(false, now);
                }
            }
            return;
        }
        if self.taskbar_row().is_some_and(|row| point.y == row as i32) {
            if button == PointerButton::Primary
                && let Some((id, _)) = self
                    .taskbar_entries()
                    .into_iter()
                    .find(|(_, rect)| rect_hit(*rect, point))
            {
                self.wm.restore(id.as_str());
                self.router.sync_focus(&self.wm);
            }
            return;
        }
        if let Some(id) = self.wm.topmost_at(point).cloned() {
            self.wm.bring_to_front(id.as_str());
            if button == PointerButton::Primary {
                self.press_window(&id, point, now);
            }
            self.router.sync_focus(&self.wm);
            return;
        }
        if button != PointerButton::Primary {
            return;
        }
        let icon = self
            .icon_rects()
            .into_iter()
            .find(|(_, rect)| rect_hit(*rect, point))
            .map(|(kind, _)| kind);
        match icon {
            Some(kind) => {
                let touch = self.wm.viewport().touch;
                if touch || self.is_double_click(ClickTarget::Icon(kind), now) {
                    self.open_app(kind);
                }
            }
            None => self.last_click = None,
        }
    }

    /// Border cells resize; everything else in the frame goes to the title
    /// bar. Maximized and fixed-size windows refuse the resize, so their
    /// borders fall through to the header.
    fn press_window(&mut self, id: &InstanceId, point: Position, now: Instant) {
        let Some(rect) = self.wm.window_rect(id.as_str()) else {
            return;
        };
        if let Some(edge) = self.resize_edge_under(rect, point)
            && self.interaction.pointer_down(
                &self.wm,
                GestureTarget::ResizeHandle(id.clone(), edge),
                PointerButton::Primary,
                point,
            )
        {
            return;
        }
        match self.decorator.header_action_at(rect, point) {
            Some(HeaderAction::Close) => self.request_close(id),
            Some(HeaderAction::Minimize) => self.wm.toggle_minimize(id.as_str()),
            Some(HeaderAction::Maximize) => self.wm.toggle_maximize(id.as_str()),
            Some(HeaderAction::Drag) => {
                if self.is_double_click(ClickTarget::Header(id.clone()), now) {
                    self.wm.toggle_maximize(id.as_str());
                } else {
                    self.interaction.pointer_down(
                        &self.wm,
                        GestureTarget::TitleBar(id.clone()),
                        PointerButton::Primary,
                        point,
                    );
                }
            }
            None => {}
        }
    }

    fn resize_edge_under(&self, rect: FloatRect, point: Position) -> Option<ResizeEdge> {
        let config = self.wm.config();
        if !self.wm.viewport().shows_resize_handles(&config.breakpoints) {
            return None;
        }
        resize_edge_at(rect, config.resize_handle_thickness, point)
    }

    fn icon_rects(&self) -> Vec<(AppKind, Rect)> {
        let area = self.viewport_area();
        AppKind::ALL
            .into_iter()
            .enumerate()
            .map(|(idx, kind)| {
                let rect = Rect {
                    x: area.x + 1,
                    y: area.y + 1 + idx as u16 * ICON_SPACING,
                    width: ICON_WIDTH,
                    height: 2,
                };
                (kind, rect.intersection(area))
            })
            .filter(|(_, rect)| !rect.is_empty())
            .collect()
    }

    /// Taskbar buttons for minimized windows, left to right in creation order.
    fn taskbar_entries(&self) -> Vec<(InstanceId, Rect)> {
        let Some(row) = self.taskbar_row() else {
            return Vec::new();
        };
        let mut x = self.screen.x + display_width(TASKBAR_LABEL) as u16 + 1;
        let mut entries = Vec::new();
        for inst in self.wm.minimized_apps() {
            let width = display_width(inst.name()) as u16 + 2;
            if x.saturating_add(width) > self.screen.right() {
                break;
            }
            entries.push((inst.id().clone(), Rect::new(x, row, width, 1)));
            x += width + 1;
        }
        entries
    }

    fn confirm_layout(&self) -> Option<ConfirmLayout> {
        self.pending_confirm.as_ref()?;
        let frame = centered(self.viewport_area(), CONFIRM_WIDTH, CONFIRM_HEIGHT);
        if frame.width < 4 || frame.height < 4 {
            return None;
        }
        let row = frame.bottom() - 2;
        let cancel_width = display_width(CANCEL_LABEL) as u16;
        let accept_width = display_width(ACCEPT_LABEL) as u16;
        let cancel_x = frame.right().saturating_sub(2 + cancel_width);
        let accept_x = cancel_x.saturating_sub(1 + accept_width);
        Some(ConfirmLayout {
            frame,
            accept: Rect::new(accept_x, row, accept_width, 1).intersection(frame),
            cancel: Rect::new(cancel_x, row, cancel_width, 1).intersection(frame),
        })
    }

    pub fn render(&self, buffer: &mut Buffer) {
        let area = self.screen.intersection(buffer.area);
        fill(buffer, area, theme::desktop_style());
        self.render_icons(buffer);
        if self.wm.should_show_desktop_hint() {
            self.render_hint(buffer);
        }

        let bounds = self.viewport_area().intersection(buffer.area);
        let preview = self.interaction.resize_preview();
        let active = self.wm.active_id();
        for inst in self.wm.draw_order() {
            let rect = match preview {
                Some((id, rect)) if id == inst.id() => rect,
                _ => match self.wm.window_rect(inst.id().as_str()) {
                    Some(rect) => rect,
                    None => continue,
                },
            };
            let focused = active == Some(inst.id());
            let chrome = WindowChrome {
                title: inst.name(),
                focused,
                maximized: inst.state().is_maximized(),
                closing: inst.state().is_closing(),
            };
            // painted bottom-up, so upper windows simply overwrite
            self.decorator.render_window(buffer, rect, bounds, chrome);
            let content = self.decorator.content_rect(rect);
            if let Some(clip) = visible_rect(content, bounds) {
                render_app(buffer, inst.handle(), content, clip, focused, &self.registry);
            }
        }

        self.render_taskbar(buffer);
        self.render_confirm(buffer);
    }

    fn render_icons(&self, buffer: &mut Buffer) {
        let style = Style::default()
            .bg(theme::desktop_bg())
            .fg(theme::icon_fg());
        for (kind, rect) in self.icon_rects() {
            let (x, y) = (rect.x as i64, rect.y as i64);
            put_str(buffer, rect, x + 1, y, kind.icon(), style.add_modifier(Modifier::BOLD));
            put_str(buffer, rect, x, y + 1, kind.display_name(), style);
        }
    }

    fn render_hint(&self, buffer: &mut Buffer) {
        let combos = self
            .router
            .desktop_bindings()
            .combos_for(Action::OpenTerminal);
        let gesture = if self.wm.viewport().touch {
            "Tap"
        } else {
            "Double-click"
        };
        let hint = format!(
            "{gesture} an icon or press {} to open a terminal",
            combos.join(" / ")
        );
        let area = self.viewport_area();
        let width = (display_width(&hint) as u16).min(area.width);
        let rect = centered(area, width, 1);
        let style = Style::default()
            .bg(theme::desktop_bg())
            .fg(theme::hint_fg());
        put_str(buffer, rect, rect.x as i64, rect.y as i64, &hint, style);
    }

    fn render_taskbar(&self, buffer: &mut Buffer) {
        let Some(row) = self.taskbar_row() else {
            return;
        };
        let bar = Rect::new(self.screen.x, row, self.screen.width, 1);
        fill(buffer, bar, theme::taskbar_style());
        put_str(
            buffer,
            bar,
            bar.x as i64,
            row as i64,
            TASKBAR_LABEL,
            theme::taskbar_style().add_modifier(Modifier::BOLD),
        );
        let entries = self.taskbar_entries();
        for (id, rect) in &entries {
            let Some(inst) = self.wm.instance(id.as_str()) else {
                continue;
            };
            let label = format!("[{}]", inst.name());
            put_str(
                buffer,
                bar,
                rect.x as i64,
                row as i64,
                &label,
                theme::taskbar_entry_style(),
            );
        }
        if let Some(active) = self.wm.active_instance() {
            let label = truncate_to_width(active.name(), bar.width as usize / 3);
            let x = bar.right() as i64 - display_width(&label) as i64 - 1;
            put_str(buffer, bar, x, row as i64, &label, theme::taskbar_style());
        }
    }

    fn render_confirm(&self, buffer: &mut Buffer) {
        let (Some(id), Some(layout)) = (self.pending_confirm.as_ref(), self.confirm_layout())
        else {
            return;
        };
        let name = self
            .wm
            .instance(id.as_str())
            .map(|inst| inst.name().to_string())
            .unwrap_or_else(|| id.to_string());
        let frame = layout.frame.intersection(buffer.area);
        Clear.render(frame, buffer);
        let style = Style::default()
            .bg(theme::dialog_bg())
            .fg(theme::dialog_fg());
        let block = Block::bordered()
            .title(" Close window ")
            .border_style(style.fg(theme::dialog_border()))
            .style(style);
        Paragraph::new(format!("Close {name}? Its content will be lost."))
            .block(block)
            .style(style)
            .render(frame, buffer);
        put_str(
            buffer,
            layout.accept,
            layout.accept.x as i64,
            layout.accept.y as i64,
            ACCEPT_LABEL,
            theme::button_style(true),
        );
        put_str(
            buffer,
            layout.cancel,
            layout.cancel.x as i64,
            layout.cancel.y as i64,
            CANCEL_LABEL,
            theme::button_style(false),
        );
    }
}

fn viewport_for(screen: Rect, touch: bool) -> Viewport {
    Viewport::new(
        screen.width as u32,
        screen.height.saturating_sub(1) as u32,
    )
    .with_touch(touch)
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}

fn rect_hit(rect: Rect, point: Position) -> bool {
    point.x >= 0
        && point.y >= 0
        && rect.contains(ratatui::layout::Position::new(point.x as u16, point.y as u16))
}

/// Paint one app's content into its window body, clipped to `clip`.
fn render_app(
    buffer: &mut Buffer,
    app: &AppState,
    content: FloatRect,
    clip: Rect,
    focused: bool,
    registry: &CommandRegistry,
) {
    let plain = Style::default();
    let mut lines: Vec<(String, Style)> = Vec::new();
    let bottom_aligned = match app {
        AppState::Terminal(term) => {
            let system = registry.system();
            let prompt = format!("{}@{}:~$ ", system.user, system.host);
            let prompt_style = plain.fg(theme::prompt_fg());
            for entry in term.transcript() {
                if let Some(command) = &entry.command {
                    lines.push((format!("{prompt}{command}"), prompt_style));
                }
                let style = match entry.kind {
                    EntryKind::Error => plain.fg(theme::error_fg()),
                    EntryKind::Banner => plain.add_modifier(Modifier::BOLD),
                    EntryKind::Output => plain,
                };
                lines.extend(entry.lines.iter().map(|line| (line.clone(), style)));
            }
            let cursor = if focused { "_" } else { "" };
            lines.push((format!("{prompt}{}{cursor}", term.input()), prompt_style));
            true
        }
        AppState::Pdf(doc) => {
            lines.push((doc.status_line(), plain.add_modifier(Modifier::BOLD)));
            lines.push((String::new(), plain));
            match doc.source() {
                Some(path) => lines.push((path.display().to_string(), plain)),
                None => lines.push(("Start with --document <path> to attach a file.".to_string(), plain)),
            }
            lines.push((String::new(), plain));
            lines.push((
                format!("Page {} of {}", doc.page(), doc.page_count()),
                plain,
            ));
            lines.push((String::new(), plain));
            lines.push((
                "Left/Right, PgUp/PgDn, n/p: turn pages  Home/End: first/last".to_string(),
                plain.fg(theme::hint_fg()),
            ));
            false
        }
        AppState::Chat(chat) => {
            match chat.status() {
                ChatStatus::Ready => {
                    lines.push(("● ready".to_string(), plain.fg(theme::status_ok_fg())))
                }
                ChatStatus::Unavailable(reason) => lines.push((
                    format!("○ {reason}"),
                    plain.fg(theme::status_warn_fg()),
                )),
            }
            for message in chat.messages() {
                let (prefix, style) = match message.role {
                    Role::User => ("you> ", plain.add_modifier(Modifier::BOLD)),
                    Role::Assistant => ("ai> ", plain),
                    Role::System => ("sys> ", plain.fg(theme::hint_fg())),
                };
                for (idx, line) in message.content.lines().enumerate() {
                    let lead = if idx == 0 { prefix } else { "     " };
                    lines.push((format!("{lead}{line}"), style));
                }
            }
            let cursor = if focused { "_" } else { "" };
            lines.push((format!("> {}{cursor}", chat.input()), plain.fg(theme::prompt_fg())));
            true
        }
    };

    let height = content.height as usize;
    let skip = if bottom_aligned {
        lines.len().saturating_sub(height)
    } else {
        0
    };
    for (row, (text, style)) in lines.iter().skip(skip).take(height).enumerate() {
        put_str(
            buffer,
            clip,
            content.x as i64,
            content.y as i64 + row as i64,
            text,
            *style,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::SystemInfo;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn system() -> SystemInfo {
        SystemInfo {
            user: "ada".to_string(),
            host: "engine".to_string(),
            os: "linux",
        }
    }

    fn desktop(width: u16, height: u16) -> Desktop {
        Desktop::new(
            WmConfig::terminal(),
            Rect::new(0, 0, width, height),
            CommandRegistry::with_defaults(system()),
            DesktopOptions::default(),
        )
    }

    fn mouse(kind: MouseEventKind, x: u16, y: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn click(d: &mut Desktop, x: u16, y: u16, now: Instant) {
        d.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), x, y), now);
        d.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Left), x, y), now);
    }

    fn key(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    fn type_line(d: &mut Desktop, line: &str, now: Instant) {
        for ch in line.chars() {
            d.handle_key(&key(KeyCode::Char(ch), KeyModifiers::NONE), now);
        }
        d.handle_key(&key(KeyCode::Enter, KeyModifiers::NONE), now);
    }

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn first_window_spawns_at_the_anchor() {
        let mut d = desktop(100, 30);
        let id = d.open_app(AppKind::Terminal);
        assert_eq!(id, "terminal");
        // 20% of 100, 15% of the 29 rows above the taskbar
        assert_eq!(
            d.wm().window_rect(id.as_str()),
            Some(FloatRect::new(Position::new(20, 4), Size::new(64, 18)))
        );
        assert_eq!(d.router().focused(), Some(&id));
        assert_eq!(d.open_app(AppKind::Terminal), "terminal-2");
    }

    #[test]
    fn icons_open_on_double_click() {
        let mut d = desktop(100, 30);
        let t0 = Instant::now();
        click(&mut d, 2, 1, t0);
        assert!(d.wm().instances().is_empty());
        click(&mut d, 2, 1, t0 + Duration::from_millis(200));
        assert_eq!(d.wm().instances().len(), 1);
        // too slow for a double-click
        click(&mut d, 2, 4, t0 + Duration::from_secs(2));
        click(&mut d, 2, 4, t0 + Duration::from_secs(3));
        assert_eq!(d.wm().instances().len(), 1);
    }

    #[test]
    fn title_bar_buttons_and_taskbar() {
        let mut d = desktop(100, 30);
        let t0 = Instant::now();
        let id = d.open_app(AppKind::Terminal);

        // top border on row 4, header row 5 with minimize at 74..77
        click(&mut d, 75, 5, t0);
        assert!(d.wm().instance(id.as_str()).unwrap().state().is_minimized());
        assert_eq!(d.router().focused(), None);

        // taskbar entry follows the label
        click(&mut d, 10, 29, t0);
        assert!(!d.wm().instance(id.as_str()).unwrap().state().is_minimized());
        assert_eq!(d.router().focused(), Some(&id));

        click(&mut d, 78, 5, t0);
        assert!(d.wm().instance(id.as_str()).unwrap().state().is_maximized());
        // maximized: header sits under the top border, close at 96..99
        click(&mut d, 97, 1, t0);
        assert!(d.wm().instance(id.as_str()).unwrap().state().is_closing());
        d.tick(t0 + Duration::from_secs(1));
        assert!(d.wm().instance(id.as_str()).unwrap().state().is_closed());
        assert!(d.wm().should_show_desktop_hint());
    }

    #[test]
    fn double_click_on_title_toggles_maximize() {
        let mut d = desktop(100, 30);
        let t0 = Instant::now();
        let id = d.open_app(AppKind::PdfViewer);
        click(&mut d, 30, 5, t0);
        click(&mut d, 30, 5, t0 + Duration::from_millis(100));
        assert!(d.wm().instance(id.as_str()).unwrap().state().is_maximized());
        click(&mut d, 30, 1, t0 + Duration::from_millis(1000));
        click(&mut d, 30, 1, t0 + Duration::from_millis(1100));
        assert!(!d.wm().instance(id.as_str()).unwrap().state().is_maximized());
    }

    #[test]
    fn dragging_the_title_bar_moves_the_window() {
        let mut d = desktop(100, 30);
        let t0 = Instant::now();
        let id = d.open_app(AppKind::Terminal);
        d.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 30, 5), t0);
        d.handle_mouse(&mouse(MouseEventKind::Drag(MouseButton::Left), 40, 11), t0);
        d.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Left), 40, 11), t0);
        assert!(d.interaction().is_idle());
        assert_eq!(
            d.wm().instance(id.as_str()).unwrap().state().position,
            Position::new(30, 10)
        );
    }

    #[test]
    fn resize_commits_on_release() {
        let mut d = desktop(100, 30);
        let t0 = Instant::now();
        let id = d.open_app(AppKind::Terminal);
        // right border column is x = 83
        d.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 83, 10), t0);
        d.handle_mouse(&mouse(MouseEventKind::Drag(MouseButton::Left), 90, 10), t0);
        assert_eq!(d.wm().window_rect(id.as_str()).unwrap().width, 64);
        assert_eq!(d.interaction().resize_preview().unwrap().1.width, 71);
        d.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Left), 90, 10), t0);
        assert_eq!(d.wm().window_rect(id.as_str()).unwrap().width, 71);
    }

    fn drag_from(d: &mut Desktop, from: (u16, u16), to: (u16, u16), t0: Instant) {
        d.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), from.0, from.1), t0);
        d.handle_mouse(&mouse(MouseEventKind::Drag(MouseButton::Left), to.0, to.1), t0);
        d.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Left), to.0, to.1), t0);
    }

    #[test]
    fn top_left_corner_resizes_north_west() {
        let mut d = desktop(100, 30);
        let id = d.open_app(AppKind::Terminal);
        d.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 20, 4), Instant::now());
        assert!(matches!(d.interaction(), Interaction::Resizing(_)));
        d.handle_mouse(&mouse(MouseEventKind::Drag(MouseButton::Left), 18, 2), Instant::now());
        d.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Left), 18, 2), Instant::now());
        assert_eq!(
            d.wm().window_rect(id.as_str()),
            Some(FloatRect::new(Position::new(18, 2), Size::new(66, 20)))
        );
    }

    #[test]
    fn top_right_corner_resizes_north_east() {
        let mut d = desktop(100, 30);
        let id = d.open_app(AppKind::Terminal);
        drag_from(&mut d, (83, 4), (85, 3), Instant::now());
        assert_eq!(
            d.wm().window_rect(id.as_str()),
            Some(FloatRect::new(Position::new(20, 3), Size::new(66, 19)))
        );
    }

    #[test]
    fn top_border_resizes_north() {
        let mut d = desktop(100, 30);
        let id = d.open_app(AppKind::Terminal);
        drag_from(&mut d, (40, 4), (40, 2), Instant::now());
        assert_eq!(
            d.wm().window_rect(id.as_str()),
            Some(FloatRect::new(Position::new(20, 2), Size::new(64, 20)))
        );
    }

    #[test]
    fn maximized_borders_do_not_resize() {
        let mut d = desktop(100, 30);
        let id = d.open_app(AppKind::Terminal);
        d.wm.maximize(id.as_str());
        d.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 40, 0), Instant::now());
        assert!(d.interaction().is_idle());
        assert_eq!(d.wm().window_rect(id.as_str()), Some(d.wm().viewport().bounds()));
    }

    #[test]
    fn touch_opens_icons_on_a_single_tap() {
        let mut d = Desktop::new(
            WmConfig::terminal(),
            Rect::new(0, 0, 100, 30),
            CommandRegistry::with_defaults(system()),
            DesktopOptions {
                touch: true,
                ..DesktopOptions::default()
            },
        );
        let mut buffer = Buffer::empty(Rect::new(0, 0, 100, 30));
        d.render(&mut buffer);
        assert!(row_text(&buffer, 14).contains("Tap an icon"));
        click(&mut d, 2, 1, Instant::now());
        assert_eq!(d.wm().instances().len(), 1);
        d.resize(120, 40);
        assert!(d.wm().viewport().touch);
    }

    #[test]
    fn taller_title_bar_moves_the_content_down() {
        let mut config = WmConfig::terminal();
        config.titlebar_height = 2;
        let mut d = Desktop::new(
            config,
            Rect::new(0, 0, 100, 30),
            CommandRegistry::with_defaults(system()),
            DesktopOptions::default(),
        );
        let id = d.open_app(AppKind::Terminal);
        let mut buffer = Buffer::empty(Rect::new(0, 0, 100, 30));
        d.render(&mut buffer);
        assert!(row_text(&buffer, 5).contains("Terminal"));
        assert!(!row_text(&buffer, 6).contains("folio-wm"));
        assert!(row_text(&buffer, 7).contains("folio-wm"));
        // the second header row still drags
        drag_from(&mut d, (30, 6), (31, 6), Instant::now());
        assert_eq!(
            d.wm().instance(id.as_str()).unwrap().state().position,
            Position::new(21, 4)
        );
    }

    #[test]
    fn chat_windows_read_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.txt");
        std::fs::write(&path, "Ada wrote programs.\nShe liked engines.").unwrap();
        let mut d = Desktop::new(
            WmConfig::terminal(),
            Rect::new(0, 0, 100, 30),
            CommandRegistry::with_defaults(system()),
            DesktopOptions {
                document: Some(path),
                ..DesktopOptions::default()
            },
        );
        let t0 = Instant::now();
        let id = d.open_app(AppKind::AiChat);
        type_line(&mut d, "engines", t0);
        let Some(AppState::Chat(chat)) = d.wm().instance(id.as_str()).map(|i| i.handle()) else {
            panic!("chat window expected");
        };
        assert_eq!(chat.messages().last().unwrap().content, "She liked engines.");
    }

    #[test]
    fn chat_close_needs_confirmation() {
        let mut d = desktop(100, 30);
        let t0 = Instant::now();
        let id = d.open_app(AppKind::AiChat);
        let ctrl_w = key(KeyCode::Char('w'), KeyModifiers::CONTROL);

        d.handle_key(&ctrl_w, t0);
        assert_eq!(d.pending_confirm(), Some(&id));
        d.handle_key(&key(KeyCode::Esc, KeyModifiers::NONE), t0);
        assert_eq!(d.pending_confirm(), None);
        assert!(d.wm().instance(id.as_str()).unwrap().state().is_open());

        d.handle_key(&ctrl_w, t0);
        d.handle_key(&key(KeyCode::Enter, KeyModifiers::NONE), t0);
        assert!(d.wm().instance(id.as_str()).unwrap().state().is_closing());
        d.tick(t0 + Duration::from_millis(300));
        assert!(d.wm().instance(id.as_str()).unwrap().state().is_closed());
    }

    #[test]
    fn terminal_commands_drive_the_window() {
        let mut d = desktop(100, 30);
        let t0 = Instant::now();
        let term = d.open_app(AppKind::Terminal);
        type_line(&mut d, "ai", t0);
        let chat = InstanceId::new("ai-chat");
        assert!(d.wm().instance(chat.as_str()).is_some());
        assert_eq!(d.router().focused(), Some(&chat));

        // the chat spawned on top of the terminal; get it out of the way
        d.handle_key(&key(KeyCode::Char('m'), KeyModifiers::CONTROL), t0);
        assert_eq!(d.router().focused(), None);
        d.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 21, 8), t0);
        assert_eq!(d.router().focused(), Some(&term));
        type_line(&mut d, "window minimize", t0);
        assert!(d.wm().instance(term.as_str()).unwrap().state().is_minimized());
    }

    #[test]
    fn space_opens_terminal_only_from_empty_desktop() {
        let mut d = desktop(100, 30);
        let t0 = Instant::now();
        let space = key(KeyCode::Char(' '), KeyModifiers::NONE);
        d.handle_key(&space, t0);
        assert_eq!(d.wm().instances().len(), 1);
        d.handle_key(&space, t0);
        assert_eq!(d.wm().instances().len(), 1);
        d.handle_key(&key(KeyCode::Char('q'), KeyModifiers::CONTROL), t0);
        assert!(d.should_quit());
    }

    #[test]
    fn narrow_screens_open_maximized() {
        let mut d = desktop(50, 20);
        let id = d.open_app(AppKind::Terminal);
        assert!(d.wm().instance(id.as_str()).unwrap().state().is_maximized());
        assert_eq!(
            d.wm().window_rect(id.as_str()),
            Some(d.wm().viewport().bounds())
        );
    }

    #[test]
    fn render_shows_hint_then_windows() {
        let mut d = desktop(100, 30);
        let mut buffer = Buffer::empty(Rect::new(0, 0, 100, 30));
        d.render(&mut buffer);
        assert!(row_text(&buffer, 14).contains("press Space / Enter"));
        assert!(row_text(&buffer, 29).starts_with(TASKBAR_LABEL));

        d.open_app(AppKind::Terminal);
        let mut buffer = Buffer::empty(Rect::new(0, 0, 100, 30));
        d.render(&mut buffer);
        assert!(row_text(&buffer, 5).contains("Terminal"));
        assert!(row_text(&buffer, 6).contains("folio-wm"));
        assert!(!row_text(&buffer, 14).contains("press Space"));
    }

    #[test]
    fn resize_event_updates_viewport() {
        let mut d = desktop(100, 30);
        d.handle_event(&Event::Resize(120, 40), Instant::now());
        assert_eq!(d.wm().viewport(), Viewport::new(120, 39));
    }
}
