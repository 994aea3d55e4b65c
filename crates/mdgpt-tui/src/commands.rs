// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Slash command parser.
//!
//! Commands are entered in the chat input (`/open notes.md`) or through the
//! command bar.  Syntax:
//!   /command
//!   /command arg1 arg2
//!   /command "arg with spaces"

use std::path::PathBuf;

/// A fully resolved command ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Import a file into the editor buffer.
    Open(PathBuf),
    /// Persist the editor buffer now.
    Save,
    /// Empty the buffer and its persisted counterpart.
    Clear,
    /// Copy view-dependent content to the clipboard.
    Copy,
    /// Append clipboard text to the editor buffer.
    Paste,
    /// Switch between the editor and chat views.
    View,
    /// Toggle full / paginated preview.
    Mode,
    Help,
    Quit,
}

/// Outcome of parsing an input string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Input does not start with `/` — not a command at all.
    NotCommand,
    /// A recognised command with its arguments resolved.
    Command(Command),
    /// Started with `/` but could not be resolved; the string is a
    /// user-facing explanation.
    Invalid(String),
}

/// Parse an input string into a command.
pub fn parse(input: &str) -> Parsed {
    let input = input.trim();
    if !input.starts_with('/') {
        return Parsed::NotCommand;
    }

    let tokens = tokenise(&input[1..]);
    let Some(name) = tokens.first() else {
        return Parsed::Invalid("empty command".into());
    };
    let args = &tokens[1..];

    let cmd = match name.as_str() {
        "open" => match args.first() {
            Some(path) => Command::Open(PathBuf::from(path)),
            None => return Parsed::Invalid("usage: /open <path>".into()),
        },
        "save" => Command::Save,
        "clear" => Command::Clear,
        "copy" => Command::Copy,
        "paste" => Command::Paste,
        "view" => Command::View,
        "mode" => Command::Mode,
        "help" => Command::Help,
        "quit" | "q" => Command::Quit,
        other => return Parsed::Invalid(format!("unknown command: /{other}")),
    };
    Parsed::Command(cmd)
}

/// Tokenise a command body: splits on whitespace, respects double-quoted
/// strings, collapses multiple spaces.
///
/// Returns owned tokens; quoted strings have their quotes stripped.
fn tokenise(s: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in s.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// One help line per command, shown by the help overlay.
pub fn help_lines() -> &'static [&'static str] {
    &[
        "/open <path>   Import a markdown or plain-text file into the buffer",
        "/save          Persist the buffer now",
        "/clear         Empty the buffer and its persisted copy",
        "/copy          Copy the current section / last code block",
        "/paste         Append clipboard text to the buffer",
        "/view          Switch between editor and chat",
        "/mode          Toggle full / paginated preview",
        "/help          Show this help",
        "/quit          Exit",
    ]
}

// ─── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse("hello world"), Parsed::NotCommand);
        assert_eq!(parse(""), Parsed::NotCommand);
    }

    #[test]
    fn simple_commands_parse() {
        assert_eq!(parse("/save"), Parsed::Command(Command::Save));
        assert_eq!(parse("/quit"), Parsed::Command(Command::Quit));
        assert_eq!(parse("/q"), Parsed::Command(Command::Quit));
        assert_eq!(parse("  /mode  "), Parsed::Command(Command::Mode));
    }

    #[test]
    fn open_takes_a_path() {
        assert_eq!(
            parse("/open notes.md"),
            Parsed::Command(Command::Open(PathBuf::from("notes.md")))
        );
    }

    #[test]
    fn open_quoted_path_with_spaces() {
        assert_eq!(
            parse(r#"/open "my notes.md""#),
            Parsed::Command(Command::Open(PathBuf::from("my notes.md")))
        );
    }

    #[test]
    fn open_without_arg_is_invalid() {
        assert!(matches!(parse("/open"), Parsed::Invalid(msg) if msg.contains("usage")));
    }

    #[test]
    fn unknown_command_is_invalid() {
        assert!(matches!(parse("/frobnicate"), Parsed::Invalid(msg) if msg.contains("frobnicate")));
    }

    #[test]
    fn bare_slash_is_invalid() {
        assert!(matches!(parse("/"), Parsed::Invalid(_)));
    }

    #[test]
    fn tokenise_collapses_spaces() {
        assert_eq!(tokenise("a   b  c"), vec!["a", "b", "c"]);
    }
}
