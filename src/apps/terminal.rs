use std::time::SystemTime;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::AppRequest;
use super::commands::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Banner,
    Output,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub command: Option<String>,
    pub lines: Vec<String>,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Completion {
    candidates: Vec<&'static str>,
    index: usize,
}

/// One terminal window: transcript, input line and command history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalSession {
    transcript: Vec<TranscriptEntry>,
    input: String,
    history: Vec<String>,
    history_cursor: Option<usize>,
    completion: Option<Completion>,
}

impl Default for TerminalSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalSession {
    pub fn new() -> Self {
        Self {
            transcript: vec![TranscriptEntry {
                command: None,
                lines: vec![
                    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
                    "Type 'help' to see available commands.".to_string(),
                ],
                kind: EntryKind::Banner,
            }],
            input: String::new(),
            history: Vec::new(),
            history_cursor: None,
            completion: None,
        }
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn insert_char(&mut self, ch: char) {
        self.completion = None;
        self.input.push(ch);
    }

    pub fn backspace(&mut self) {
        self.completion = None;
        self.input.pop();
    }

    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let idx = match self.history_cursor {
            None => self.history.len() - 1,
            Some(idx) => idx.saturating_sub(1),
        };
        self.history_cursor = Some(idx);
        self.input = self.history[idx].clone();
    }

    pub fn history_next(&mut self) {
        let Some(idx) = self.history_cursor else {
            return;
        };
        if idx + 1 >= self.history.len() {
            self.history_cursor = None;
            self.input.clear();
        } else {
            self.history_cursor = Some(idx + 1);
            self.input = self.history[idx + 1].clone();
        }
    }

    /// Complete the command name. Repeated presses cycle the candidates.
    pub fn complete(&mut self, registry: &CommandRegistry) {
        if self.input.trim().contains(' ') {
            return;
        }
        let completion = match self.completion.take() {
            Some(mut completion) => {
                completion.index = (completion.index + 1) % completion.candidates.len();
                completion
            }
            None => {
                let candidates = registry.completions(self.input.trim());
                if candidates.is_empty() {
                    return;
                }
                Completion {
                    candidates,
                    index: 0,
                }
            }
        };
        self.input = format!("{} ", completion.candidates[completion.index]);
        self.completion = Some(completion);
    }

    /// Run the input line and record it. Returns what the command asks of
    /// the surrounding window, if anything.
    pub fn submit(&mut self, registry: &CommandRegistry, now: SystemTime) -> Option<AppRequest> {
        let line = std::mem::take(&mut self.input).trim().to_string();
        self.history_cursor = None;
        self.completion = None;
        if line.is_empty() {
            return None;
        }
        let result = registry.execute(&line, &self.history, now);
        let request = match result {
            Ok(output) if output.clear => {
                self.transcript.clear();
                return None;
            }
            Ok(output) => {
                self.transcript.push(TranscriptEntry {
                    command: Some(line.clone()),
                    lines: output.lines,
                    kind: EntryKind::Output,
                });
                output.request
            }
            Err(err) => {
                tracing::debug!(error = %err, "terminal command failed");
                self.transcript.push(TranscriptEntry {
                    command: Some(line.clone()),
                    lines: err.to_lines(),
                    kind: EntryKind::Error,
                });
                None
            }
        };
        self.history.push(line);
        request
    }

    /// Line-editor key handling. Returns `Some` when a submitted command
    /// asks for a window-level request.
    pub fn handle_key(
        &mut self,
        key: &KeyEvent,
        registry: &CommandRegistry,
        now: SystemTime,
    ) -> Option<AppRequest> {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return None;
        }
        match key.code {
            KeyCode::Enter => return self.submit(registry, now),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Up => self.history_prev(),
            KeyCode::Down => self.history_next(),
            KeyCode::Tab => self.complete(registry),
            KeyCode::Char(ch) => self.insert_char(ch),
            _ => {}
        }
        None
    }
}
