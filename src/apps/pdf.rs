use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent};

/// A document reference plus the reader's page cursor. Rendering the
/// document itself is left to an external viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfDocument {
    source: Option<PathBuf>,
    title: String,
    page: usize,
    page_count: usize,
}

impl PdfDocument {
    pub fn new(source: Option<PathBuf>, page_count: usize) -> Self {
        let title = source
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "No document".to_string());
        Self {
            source,
            title,
            page: 1,
            page_count: page_count.max(1),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 1-based.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn next_page(&mut self) {
        self.page = (self.page + 1).min(self.page_count);
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count);
    }

    pub fn handle_key(&mut self, key: &KeyEvent) {
        match key.code {
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') => self.next_page(),
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('p') => self.prev_page(),
            KeyCode::Home => self.go_to(1),
            KeyCode::End => self.go_to(self.page_count),
            _ => {}
        }
    }

    pub fn status_line(&self) -> String {
        format!("{}  page {}/{}", self.title, self.page, self.page_count)
    }
}
