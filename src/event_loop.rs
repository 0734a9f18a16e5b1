use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

pub enum ControlFlow {
    Continue,
    Quit,
}

/// State driven by the [`EventLoop`].
pub trait LoopHandler<D> {
    /// Earliest pending timer; the loop wakes up no later than this.
    fn next_deadline(&self) -> Option<Instant>;

    /// Called with `None` once per iteration (fire timers, redraw) and with
    /// `Some(event)` for every input event.
    fn handle(&mut self, driver: &mut D, event: Option<Event>, now: Instant)
    -> io::Result<ControlFlow>;
}

/// A centralized event loop that drives the main UI thread.
///
/// Each iteration first lets the handler fire due timers and draw, then waits
/// for input for at most one frame interval, or less when a timer (such as a
/// window's close animation) expires sooner.
pub struct EventLoop<D> {
    driver: D,
    frame_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, frame_interval: Duration) -> Self {
        Self {
            driver,
            frame_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// How long to wait for input at `now`.
    pub fn poll_timeout(&self, now: Instant, deadline: Option<Instant>) -> Duration {
        match deadline {
            Some(deadline) => deadline
                .saturating_duration_since(now)
                .min(self.frame_interval),
            None => self.frame_interval,
        }
    }

    /// Runs the application loop, taking control of the current thread.
    pub fn run<H>(&mut self, handler: &mut H) -> io::Result<()>
    where
        H: LoopHandler<D>,
    {
        loop {
            let now = Instant::now();
            if let ControlFlow::Quit = handler.handle(&mut self.driver, None, now)? {
                break;
            }

            let timeout = self.poll_timeout(now, handler.next_deadline());
            if self.driver.poll(timeout)? {
                // Drain bursts (mouse drags) before the next redraw.
                loop {
                    let event = self.driver.read()?;
                    let flow = handler.handle(&mut self.driver, Some(event), Instant::now())?;
                    if let ControlFlow::Quit = flow {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::scripted::ScriptedInputDriver;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[derive(Default)]
    struct Counter {
        ticks: usize,
        keys: Vec<KeyCode>,
    }

    impl LoopHandler<ScriptedInputDriver> for Counter {
        fn next_deadline(&self) -> Option<Instant> {
            None
        }

        fn handle(
            &mut self,
            driver: &mut ScriptedInputDriver,
            event: Option<Event>,
            _now: Instant,
        ) -> io::Result<ControlFlow> {
            match event {
                Some(Event::Key(key)) => self.keys.push(key.code),
                Some(_) => {}
                None => {
                    self.ticks += 1;
                    if driver.is_drained() {
                        return Ok(ControlFlow::Quit);
                    }
                }
            }
            Ok(ControlFlow::Continue)
        }
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn drains_bursts_between_ticks() {
        let driver = ScriptedInputDriver::new([key('a'), key('b'), key('c')]);
        let mut event_loop = EventLoop::new(driver, Duration::from_millis(16));
        let mut counter = Counter::default();
        event_loop.run(&mut counter).unwrap();
        assert_eq!(
            counter.keys,
            [KeyCode::Char('a'), KeyCode::Char('b'), KeyCode::Char('c')]
        );
        assert_eq!(counter.ticks, 2);
    }

    #[test]
    fn timeout_shrinks_to_next_deadline() {
        let event_loop = EventLoop::new(ScriptedInputDriver::default(), Duration::from_millis(16));
        let now = Instant::now();
        assert_eq!(event_loop.poll_timeout(now, None), Duration::from_millis(16));
        assert_eq!(
            event_loop.poll_timeout(now, Some(now + Duration::from_millis(5))),
            Duration::from_millis(5)
        );
        assert_eq!(
            event_loop.poll_timeout(now + Duration::from_secs(1), Some(now)),
            Duration::ZERO
        );
    }
}
