// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! A plain editable text buffer with a byte-offset cursor.
//!
//! Shared by the chat draft, the editor buffer, and the command bar; all
//! cursor movement respects UTF-8 character boundaries.

#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    text: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the whole value; the cursor moves to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    /// Take the current value, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Append text at the end without moving an interior cursor backwards.
    pub fn append(&mut self, s: &str) {
        self.text.push_str(s);
        self.cursor = self.text.len();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = prev_char_boundary(&self.text, self.cursor);
            self.text.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = prev_char_boundary(&self.text, self.cursor);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.len() {
            let ch = self.text[self.cursor..]
                .chars()
                .next()
                .map(|c| c.len_utf8())
                .unwrap_or(1);
            self.cursor += ch;
        }
    }

    pub fn move_word_left(&mut self) {
        self.cursor = prev_word_boundary(&self.text, self.cursor);
    }

    pub fn move_word_right(&mut self) {
        self.cursor = next_word_boundary(&self.text, self.cursor);
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn delete_to_end(&mut self) {
        self.text.truncate(self.cursor);
    }

    pub fn delete_to_start(&mut self) {
        self.text = self.text[self.cursor..].to_string();
        self.cursor = 0;
    }
}

// ── Character boundary helpers ────────────────────────────────────────────────

fn prev_char_boundary(s: &str, pos: usize) -> usize {
    if pos == 0 { return 0; }
    let mut p = pos - 1;
    while p > 0 && !s.is_char_boundary(p) { p -= 1; }
    p
}

fn prev_word_boundary(s: &str, pos: usize) -> usize {
    let bytes = &s.as_bytes()[..pos];
    let trimmed = bytes.iter().rposition(|&b| b != b' ').map(|i| i + 1).unwrap_or(0);
    bytes[..trimmed].iter().rposition(|&b| b == b' ').map(|i| i + 1).unwrap_or(0)
}

fn next_word_boundary(s: &str, pos: usize) -> usize {
    let bytes = &s.as_bytes()[pos..];
    let start = bytes.iter().position(|&b| b != b' ').unwrap_or(0);
    let end = bytes[start..].iter().position(|&b| b == b' ').unwrap_or(bytes.len() - start);
    pos + start + end
}

// ─── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_take() {
        let mut b = InputBuffer::new();
        b.insert_char('h');
        b.insert_char('i');
        assert_eq!(b.text(), "hi");
        assert_eq!(b.take(), "hi");
        assert_eq!(b.text(), "");
        assert_eq!(b.cursor(), 0);
    }

    #[test]
    fn backspace_respects_multibyte_chars() {
        let mut b = InputBuffer::with_text("aé");
        b.backspace();
        assert_eq!(b.text(), "a");
        b.backspace();
        assert_eq!(b.text(), "");
        b.backspace(); // no-op at start
        assert_eq!(b.cursor(), 0);
    }

    #[test]
    fn move_left_right_over_multibyte() {
        let mut b = InputBuffer::with_text("é");
        assert_eq!(b.cursor(), 2);
        b.move_left();
        assert_eq!(b.cursor(), 0);
        b.move_right();
        assert_eq!(b.cursor(), 2);
        b.move_right(); // clamped at end
        assert_eq!(b.cursor(), 2);
    }

    #[test]
    fn insert_at_interior_cursor() {
        let mut b = InputBuffer::with_text("ac");
        b.move_left();
        b.insert_char('b');
        assert_eq!(b.text(), "abc");
    }

    #[test]
    fn word_movement() {
        let mut b = InputBuffer::with_text("one two three");
        b.move_word_left();
        assert_eq!(&b.text()[b.cursor()..], "three");
        b.move_word_left();
        assert_eq!(&b.text()[b.cursor()..], "two three");
        b.move_start();
        b.move_word_right();
        assert_eq!(&b.text()[..b.cursor()], "one");
    }

    #[test]
    fn delete_to_start_and_end() {
        let mut b = InputBuffer::with_text("hello world");
        b.move_word_left();
        b.delete_to_start();
        assert_eq!(b.text(), "world");
        b.move_end();
        b.move_word_left();
        b.delete_to_end();
        assert_eq!(b.text(), "");
    }

    #[test]
    fn append_moves_cursor_to_end() {
        let mut b = InputBuffer::with_text("a");
        b.move_start();
        b.append("bc");
        assert_eq!(b.text(), "abc");
        assert_eq!(b.cursor(), 3);
    }
}
