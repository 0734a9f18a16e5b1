use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use super::InputDriver;

/// Reads crossterm events, dropping key releases and repeated Esc presses
/// that some platforms report.
#[derive(Debug, Default)]
pub struct ConsoleInputDriver {
    esc_down: bool,
}

impl ConsoleInputDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(&mut self, evt: Event) -> Option<Event> {
        let Event::Key(key) = evt else {
            return Some(evt);
        };
        match key.kind {
            KeyEventKind::Release => {
                if key.code == KeyCode::Esc {
                    self.esc_down = false;
                }
                return None;
            }
            KeyEventKind::Repeat if key.code == KeyCode::Esc => return None,
            KeyEventKind::Repeat | KeyEventKind::Press => {}
        }
        if key.code == KeyCode::Esc {
            if self.esc_down && cfg!(windows) {
                return None;
            }
            self.esc_down = true;
        } else {
            self.esc_down = false;
        }
        Some(Event::Key(key))
    }
}

impl InputDriver for ConsoleInputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        loop {
            let evt = crossterm::event::read()?;
            if let Some(normalized) = self.normalize(evt) {
                return Ok(normalized);
            }
        }
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        if enabled {
            execute!(io::stdout(), EnableMouseCapture)
        } else {
            execute!(io::stdout(), DisableMouseCapture)
        }
    }
}

/// Raw-mode alternate-screen terminal. Restores the console on drop.
pub struct ConsoleSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    entered: bool,
}

impl ConsoleSession {
    pub fn enter() -> io::Result<Self> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            entered: true,
        })
    }

    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }

    pub fn exit(&mut self) -> io::Result<()> {
        if !self.entered {
            return Ok(());
        }
        terminal::disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        self.entered = false;
        Ok(())
    }
}

impl Drop for ConsoleSession {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}
