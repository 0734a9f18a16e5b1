use std::collections::BTreeSet;

use clap::ValueEnum;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

/// Characters counted as one page by `analyze`.
const CHARS_PER_PAGE: usize = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("no inference engine is available")]
    Unavailable,
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Source of assistant replies.
pub trait ChatEngine: std::fmt::Debug {
    fn name(&self) -> &str;
    fn reply(&mut self, prompt: &str, context: Option<&str>) -> Result<String, ChatError>;

    /// Short overview of `document` for the `analyze` command.
    fn summarize(&mut self, document: &str) -> Result<String, ChatError> {
        self.reply("Summarize the attached document.", Some(document))
    }

    /// Drop whatever the engine has loaded and initialise it again.
    fn restart(&mut self) -> Result<(), ChatError> {
        Ok(())
    }
}

/// Engines selectable from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ChatEngineKind {
    /// Answer from the attached document.
    #[default]
    Local,
    /// No engine; chat windows report themselves unavailable.
    Off,
}

impl ChatEngineKind {
    pub fn build(self) -> Option<Box<dyn ChatEngine>> {
        match self {
            ChatEngineKind::Local => Some(Box::new(DocumentResponder::default())),
            ChatEngineKind::Off => None,
        }
    }
}

const REPLY_SENTENCES: usize = 2;
const SUMMARY_SENTENCES: usize = 3;
const STOP_WORDS: &[&str] = &[
    "about", "and", "are", "can", "did", "does", "for", "from", "has", "have", "how", "tell",
    "that", "the", "their", "this", "was", "what", "when", "where", "which", "who", "why",
    "with", "you", "your",
];

/// Built-in engine that answers with the document sentences sharing the
/// most keywords with the question.
#[derive(Debug, Default)]
pub struct DocumentResponder {
    /// Sentences of the last document seen, with the text they came from.
    index: Option<(String, Vec<String>)>,
}

impl DocumentResponder {
    fn sentences(&mut self, document: &str) -> &[String] {
        if self.index.as_ref().is_none_or(|(text, _)| text != document) {
            let sentences = split_sentences(document);
            tracing::debug!(sentences = sentences.len(), "indexed chat document");
            self.index = Some((document.to_string(), sentences));
        }
        self.index
            .as_ref()
            .map(|(_, sentences)| sentences.as_slice())
            .unwrap_or_default()
    }
}

impl ChatEngine for DocumentResponder {
    fn name(&self) -> &str {
        "document-responder"
    }

    fn reply(&mut self, prompt: &str, context: Option<&str>) -> Result<String, ChatError> {
        let Some(document) = context else {
            return Ok("No document is attached. Start with --document <path> to ask about one."
                .to_string());
        };
        let wanted = keywords(prompt);
        if wanted.is_empty() {
            return Ok("Ask me something about the attached document.".to_string());
        }
        let sentences = self.sentences(document);
        let mut scored: Vec<(usize, usize)> = sentences
            .iter()
            .enumerate()
            .map(|(idx, sentence)| (keywords(sentence).intersection(&wanted).count(), idx))
            .filter(|(score, _)| *score > 0)
            .collect();
        if scored.is_empty() {
            return Ok("I could not find anything about that in the document.".to_string());
        }
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.truncate(REPLY_SENTENCES);
        scored.sort_by_key(|(_, idx)| *idx);
        Ok(scored
            .iter()
            .map(|(_, idx)| sentences[*idx].as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }

    fn summarize(&mut self, document: &str) -> Result<String, ChatError> {
        let sentences = self.sentences(document);
        if sentences.is_empty() {
            return Ok("The document has no text to summarize.".to_string());
        }
        Ok(sentences
            .iter()
            .take(SUMMARY_SENTENCES)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" "))
    }

    fn restart(&mut self) -> Result<(), ChatError> {
        self.index = None;
        Ok(())
    }
}

/// Split on sentence terminators and line breaks.
fn split_sentences(text: &str) -> Vec<String> {
    fn flush(current: &mut String, out: &mut Vec<String>) {
        let sentence = current.trim();
        if !sentence.is_empty() {
            out.push(sentence.to_string());
        }
        current.clear();
    }
    let mut out = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch == '\n' {
            flush(&mut current, &mut out);
            continue;
        }
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            flush(&mut current, &mut out);
        }
    }
    flush(&mut current, &mut out);
    out
}

fn keywords(text: &str) -> BTreeSet<String> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| word.chars().count() >= 3)
        .map(str::to_lowercase)
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatStatus {
    Ready,
    /// Shown in the widget; the window itself is unaffected.
    Unavailable(String),
}

/// Chat window state. Failures are reported as transcript messages and
/// status, never as window state changes.
#[derive(Debug)]
pub struct ChatSession {
    engine: Option<Box<dyn ChatEngine>>,
    messages: Vec<ChatMessage>,
    input: String,
    status: ChatStatus,
    context: Option<String>,
}

impl ChatSession {
    pub fn new(engine: Option<Box<dyn ChatEngine>>) -> Self {
        let status = match &engine {
            Some(_) => ChatStatus::Ready,
            None => ChatStatus::Unavailable(ChatError::Unavailable.to_string()),
        };
        Self {
            engine,
            messages: Vec::new(),
            input: String::new(),
            status,
            context: None,
        }
    }

    /// Attach document text that `analyze` and replies can draw on.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn status(&self) -> &ChatStatus {
        &self.status
    }

    fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
        });
    }

    fn status_report(&self) -> String {
        let model = self
            .engine
            .as_ref()
            .map(|e| e.name().to_string())
            .unwrap_or_else(|| "none".to_string());
        let document = if self.context.is_some() {
            "Loaded"
        } else {
            "No document"
        };
        format!(
            "Model: {model}\nDocument: {document}\n\nCommands:\n  status  - Show this info\n  analyze - Summarize the attached document\n  clear   - Clear chat\n  restart - Restart the AI engine"
        )
    }

    fn report_failure(&mut self, err: ChatError) {
        tracing::warn!(error = %err, "chat reply failed");
        self.status = ChatStatus::Unavailable(err.to_string());
        self.push(
            Role::System,
            format!("Sorry, I could not answer: {err}. Type 'restart' to reload the engine."),
        );
    }

    /// Re-initialise the engine. The transcript starts over and the outcome
    /// is reported in it.
    pub fn restart(&mut self) {
        self.messages.clear();
        self.push(Role::System, "Restarting AI engine...");
        let outcome = match self.engine.as_mut() {
            Some(engine) => engine.restart().map(|()| engine.name().to_string()),
            None => Err(ChatError::Unavailable),
        };
        match outcome {
            Ok(name) => {
                tracing::info!(engine = %name, "chat engine restarted");
                self.status = ChatStatus::Ready;
                self.push(Role::System, format!("{name} is ready."));
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat engine restart failed");
                self.status = ChatStatus::Unavailable(err.to_string());
                self.push(Role::System, format!("Restart failed: {err}"));
            }
        }
    }

    fn analyze(&mut self) {
        let Some(document) = self.context.clone() else {
            self.push(Role::System, "No document attached.");
            return;
        };
        let chars = document.chars().count();
        let words = document.split_whitespace().count();
        let pages = chars.div_ceil(CHARS_PER_PAGE);
        let result = match self.engine.as_mut() {
            Some(engine) => engine.summarize(&document),
            None => Err(ChatError::Unavailable),
        };
        match result {
            Ok(summary) => {
                self.status = ChatStatus::Ready;
                self.push(
                    Role::Assistant,
                    format!("Characters: {chars} | Words: {words} | Pages: ~{pages}\n\n{summary}"),
                );
            }
            Err(err) => self.report_failure(err),
        }
    }

    pub fn submit(&mut self) {
        let prompt = std::mem::take(&mut self.input).trim().to_string();
        if prompt.is_empty() {
            return;
        }
        match prompt.to_lowercase().as_str() {
            "clear" => self.messages.clear(),
            "restart" => self.restart(),
            "status" => {
                self.push(Role::User, prompt);
                let report = self.status_report();
                self.push(Role::System, report);
            }
            "analyze" => {
                self.push(Role::User, prompt);
                self.analyze();
            }
            _ => {
                self.push(Role::User, prompt.clone());
                let context = self.context.clone();
                let result = match self.engine.as_mut() {
                    Some(engine) => engine.reply(&prompt, context.as_deref()),
                    None => Err(ChatError::Unavailable),
                };
                match result {
                    Ok(reply) => {
                        self.status = ChatStatus::Ready;
                        self.push(Role::Assistant, reply);
                    }
                    Err(err) => self.report_failure(err),
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return;
        }
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(ch) => self.input.push(ch),
            _ => {}
        }
    }
}
