// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Chat domain: the conversation of chunked messages, the bridge between a
//! streaming provider and the UI, and conversation → markdown conversion.

use std::collections::HashSet;

use futures::StreamExt;
use mdgpt_client::{
    ChatMessage, ChatProvider, Chunk, CompletionRequest, ResponseEvent, Role, WireMessage,
};
use tokio::sync::mpsc;
use tracing::warn;

/// Shown as the synthetic final chunk when the stream fails.
pub const STREAM_FAILURE_APOLOGY: &str = "Sorry, something went wrong.";

/// One event from the streaming task to the UI loop.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A fragment of assistant output arrived.
    Chunk(Chunk),
    /// The transport failed mid-turn; the UI appends the apology chunk.
    StreamError(String),
    /// The turn ended (normally or after a failure).
    TurnComplete,
}

/// Run one request against the provider and forward the streamed events.
///
/// Malformed payloads were already dropped by the provider; anything that
/// reaches this loop as an error is a transport-level failure and ends the
/// turn.  A `TurnComplete` is always sent, so the UI's busy gate clears no
/// matter how the turn ended.
pub async fn run_turn(
    provider: &dyn ChatProvider,
    messages: Vec<WireMessage>,
    tx: &mpsc::Sender<ChatEvent>,
) {
    let req = CompletionRequest { messages, stream: true };
    match provider.complete(req).await {
        Err(e) => {
            warn!(error = %e, "completion request failed");
            let _ = tx.send(ChatEvent::StreamError(e.to_string())).await;
        }
        Ok(mut stream) => {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(ResponseEvent::Delta { text, is_final }) => {
                        let _ = tx.send(ChatEvent::Chunk(Chunk::new(text, is_final))).await;
                    }
                    Ok(ResponseEvent::Done) => break,
                    Ok(ResponseEvent::Error(msg)) => {
                        warn!(error = %msg, "stream reported an error");
                        let _ = tx.send(ChatEvent::StreamError(msg)).await;
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "stream failed");
                        let _ = tx.send(ChatEvent::StreamError(e.to_string())).await;
                        break;
                    }
                }
            }
        }
    }
    let _ = tx.send(ChatEvent::TurnComplete).await;
}

// ── Conversation ──────────────────────────────────────────────────────────────

/// The in-memory transcript.  Discarded on exit; nothing is persisted.
#[derive(Debug, Default)]
pub struct Conversation {
    pub messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::user(text));
    }

    /// Open the assistant message the next streamed chunks will fill.
    pub fn begin_assistant(&mut self) {
        self.messages.push(ChatMessage::assistant());
    }

    /// Append a chunk to the in-progress assistant message.  Chunks arriving
    /// when the last message is not an assistant reply are dropped.
    pub fn append_chunk(&mut self, chunk: Chunk) {
        match self.messages.last_mut() {
            Some(m) if m.role == Role::Assistant => m.push(chunk),
            _ => warn!("dropping chunk with no assistant message in progress"),
        }
    }

    /// Append the synthetic apology chunk after a stream-level failure.
    pub fn append_stream_failure(&mut self) {
        self.append_chunk(Chunk::new(STREAM_FAILURE_APOLOGY, true));
    }

    /// Translate the conversation into the wire message list.  The leading
    /// system prompt is followed by every message that has content; the
    /// still-empty in-progress assistant entry is skipped.
    pub fn to_wire(&self, system_prompt: &str) -> Vec<WireMessage> {
        let mut wire = vec![WireMessage::system(system_prompt)];
        wire.extend(
            self.messages
                .iter()
                .filter(|m| !m.chunks.is_empty())
                .map(|m| m.to_wire()),
        );
        wire
    }

    /// Index of the most recent assistant message that has thinking chunks.
    pub fn last_thinking_index(&self) -> Option<usize> {
        self.messages
            .iter()
            .rposition(|m| m.role == Role::Assistant && m.chunks.iter().any(|c| !c.is_final))
    }

    /// Serialise the conversation to display markdown.
    ///
    /// `expanded` holds the message indices whose thinking part is unfolded;
    /// `dots` is the animated suffix for in-progress replies.
    pub fn transcript_markdown(&self, expanded: &HashSet<usize>, dots: &str) -> String {
        let mut out = String::new();
        for (i, m) in self.messages.iter().enumerate() {
            match m.role {
                Role::User => {
                    out.push_str(&format!("\n**You:** {}\n", m.joined_text()));
                }
                Role::Assistant => {
                    out.push_str(&assistant_markdown(m, expanded.contains(&i), dots));
                }
                Role::System => {}
            }
        }
        out
    }
}

/// Format one assistant message: a collapsible thinking part followed by the
/// plainly rendered final reply.
fn assistant_markdown(m: &ChatMessage, expanded: bool, dots: &str) -> String {
    let thinking = m.thinking_text();
    let final_text = m.final_text();
    let has_thinking = m.chunks.iter().any(|c| !c.is_final);
    let has_final = m.chunks.iter().any(|c| c.is_final);

    let mut out = String::from("\n**Assistant:**\n");

    if has_thinking {
        let label = if m.is_settled() {
            "AI completed thinking".to_string()
        } else {
            format!("AI is thinking{dots}")
        };
        if expanded {
            out.push_str(&format!("\n▾ {label}\n\n"));
            for line in thinking.lines() {
                out.push_str(&format!("> {line}\n"));
            }
            out.push('\n');
        } else {
            out.push_str(&format!("\n▸ {label}\n"));
        }
    }

    if has_final && !final_text.is_empty() {
        out.push('\n');
        out.push_str(&crate::markdown::preprocess(&final_text));
        out.push('\n');
    }

    if !has_thinking && !has_final {
        out.push_str("\n*No content*\n");
    }

    out
}

/// Return the body of the last complete fenced code block in `text`.
/// Used by the copy action in the chat view.
pub fn extract_last_code_block(text: &str) -> Option<String> {
    let mut last: Option<String> = None;
    let mut current: Option<String> = None;
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            match current.take() {
                Some(block) => last = Some(block),
                None => current = Some(String::new()),
            }
        } else if let Some(block) = current.as_mut() {
            block.push_str(line);
            block.push('\n');
        }
    }
    last.map(|b| b.trim_end().to_string())
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
