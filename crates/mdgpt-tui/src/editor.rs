// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Editor state: the markdown buffer, the preview mode, and section
//! pagination.
//!
//! The buffer is replaced wholesale on every mutation (edit, import, paste,
//! clear); persistence is the caller's concern.

use std::path::Path;

use crate::input::InputBuffer;

/// How the preview pane presents the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewMode {
    /// One continuous render of the whole buffer.
    #[default]
    Full,
    /// One section at a time, split on the delimiter line.
    Paginated,
}

impl PreviewMode {
    pub fn toggled(self) -> Self {
        match self {
            PreviewMode::Full => PreviewMode::Paginated,
            PreviewMode::Paginated => PreviewMode::Full,
        }
    }
}

/// File types accepted by [`EditorState::import_file`], by declared extension.
const TEXT_EXTENSIONS: &[&str] = &["md", "markdown", "txt", "text"];

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("not a plain-text file: {0}")]
    UnsupportedType(String),
    #[error("reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub struct EditorState {
    buffer: InputBuffer,
    pub mode: PreviewMode,
    page: usize,
    delimiter: String,
}

impl EditorState {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            buffer: InputBuffer::new(),
            mode: PreviewMode::Full,
            page: 0,
            delimiter: delimiter.into(),
        }
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    /// Mutable access for keystroke editing.  Callers re-clamp the page
    /// afterwards via [`EditorState::clamp_page`].
    pub fn buffer_mut(&mut self) -> &mut InputBuffer {
        &mut self.buffer
    }

    /// Replace the buffer wholesale (load, import, paste, clear all funnel
    /// through here).
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer.set_text(text);
        self.clamp_page();
    }

    pub fn clear(&mut self) {
        self.set_text("");
    }

    /// Replace the buffer with the contents of a plain-text file.
    ///
    /// Files whose declared type (extension) is not plain text are rejected
    /// and the buffer is left unchanged.
    pub fn import_file(&mut self, path: &Path) -> Result<(), ImportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
            let shown = if ext.is_empty() { "(none)".to_string() } else { ext };
            return Err(ImportError::UnsupportedType(shown));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ImportError::Read {
            path: path.display().to_string(),
            source,
        })?;
        self.set_text(text);
        Ok(())
    }

    // ── Sections ──────────────────────────────────────────────────────────────

    /// Split the buffer on delimiter lines and trim each section.
    ///
    /// A buffer with no delimiter is a single section; the result is never
    /// empty.
    pub fn sections(&self) -> Vec<String> {
        let mut sections = Vec::new();
        let mut current = String::new();
        for line in self.buffer.text().lines() {
            if line.trim() == self.delimiter {
                sections.push(std::mem::take(&mut current));
            } else {
                current.push_str(line);
                current.push('\n');
            }
        }
        sections.push(current);
        sections.into_iter().map(|s| s.trim().to_string()).collect()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.sections().len()
    }

    pub fn current_section(&self) -> String {
        let sections = self.sections();
        let idx = self.page.min(sections.len() - 1);
        sections[idx].clone()
    }

    pub fn can_prev(&self) -> bool {
        self.page > 0
    }

    pub fn can_next(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    /// Move to the previous section; inert on the first.
    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Move to the next section; inert on the last.
    pub fn next_page(&mut self) {
        if self.can_next() {
            self.page += 1;
        }
    }

    /// Keep the current page valid after the buffer shrank.
    pub fn clamp_page(&mut self) {
        self.page = self.page.min(self.page_count() - 1);
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
