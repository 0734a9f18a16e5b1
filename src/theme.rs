use ratatui::style::{Color, Modifier, Style};

// Centralized desktop colors. Small helpers so the palette lives in one
// place and the renderer only asks for roles.

// Desktop
pub fn desktop_bg() -> Color {
    Color::Black
}
pub fn desktop_fg() -> Color {
    Color::Gray
}
pub fn hint_fg() -> Color {
    Color::DarkGray
}
pub fn icon_fg() -> Color {
    Color::Cyan
}

// Taskbar
pub fn taskbar_bg() -> Color {
    Color::DarkGray
}
pub fn taskbar_fg() -> Color {
    Color::White
}
pub fn taskbar_entry_bg() -> Color {
    Color::Gray
}
pub fn taskbar_entry_fg() -> Color {
    Color::Black
}

// Window content
pub fn prompt_fg() -> Color {
    Color::Green
}
pub fn error_fg() -> Color {
    Color::Red
}
pub fn status_ok_fg() -> Color {
    Color::Green
}
pub fn status_warn_fg() -> Color {
    Color::Yellow
}

// Dialog
pub fn dialog_bg() -> Color {
    Color::Black
}
pub fn dialog_fg() -> Color {
    Color::White
}
pub fn dialog_border() -> Color {
    Color::Yellow
}

pub fn desktop_style() -> Style {
    Style::default().bg(desktop_bg()).fg(desktop_fg())
}

pub fn taskbar_style() -> Style {
    Style::default().bg(taskbar_bg()).fg(taskbar_fg())
}

pub fn taskbar_entry_style() -> Style {
    Style::default()
        .bg(taskbar_entry_bg())
        .fg(taskbar_entry_fg())
}

pub fn button_style(selected: bool) -> Style {
    let style = Style::default().bg(dialog_bg()).fg(dialog_fg());
    if selected {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}
