use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::Event;

use super::InputDriver;

/// Replays a fixed list of events; used for headless runs and tests.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInputDriver {
    events: VecDeque<Event>,
    mouse_capture: bool,
}

impl ScriptedInputDriver {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
            mouse_capture: false,
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn is_drained(&self) -> bool {
        self.events.is_empty()
    }

    pub fn mouse_capture(&self) -> bool {
        self.mouse_capture
    }
}

impl InputDriver for ScriptedInputDriver {
    fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
        Ok(!self.events.is_empty())
    }

    fn read(&mut self) -> io::Result<Event> {
        self.events
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        self.mouse_capture = enabled;
        Ok(())
    }
}
