use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in the request body sent to the chat completions API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl WireMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, content: text.into() }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: text.into() }
    }
}

/// Request sent to a chat provider.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<WireMessage>,
    pub stream: bool,
}

// ─── Streamed response ────────────────────────────────────────────────────────

/// A single streamed event from the model.
#[derive(Debug, Clone)]
pub enum ResponseEvent {
    /// A delta of assistant output.  `is_final` is set when the payload that
    /// carried it also carried the stop marker, i.e. the fragment belongs to
    /// the concluding reply rather than intermediate thinking output.
    Delta { text: String, is_final: bool },
    /// The stream finished normally (`[DONE]` sentinel).
    Done,
    /// A recoverable error (non-fatal warning)
    Error(String),
}

// ─── Display chunks ───────────────────────────────────────────────────────────

/// One fragment of streamed assistant output.
///
/// Chunks are immutable once created; a message's chunk list grows
/// monotonically while a response streams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub time: DateTime<Utc>,
    /// True when this fragment is part of the final reply, as opposed to
    /// intermediate "thinking" text.
    pub is_final: bool,
}

impl Chunk {
    pub fn new(text: impl Into<String>, is_final: bool) -> Self {
        Self { text: text.into(), time: Utc::now(), is_final }
    }
}

/// A single conversation entry: a role plus the ordered chunks received for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub chunks: Vec<Chunk>,
}

impl ChatMessage {
    /// A user message always consists of one final chunk.
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, chunks: vec![Chunk::new(text, true)] }
    }

    /// An assistant message starts empty and is filled as chunks arrive.
    pub fn assistant() -> Self {
        Self { role: Role::Assistant, chunks: Vec::new() }
    }

    pub fn push(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    /// Joined text of the non-final ("thinking") chunks, in arrival order.
    pub fn thinking_text(&self) -> String {
        self.chunks
            .iter()
            .filter(|c| !c.is_final)
            .map(|c| c.text.as_str())
            .collect()
    }

    /// Joined text of the final-reply chunks, in arrival order.
    pub fn final_text(&self) -> String {
        self.chunks
            .iter()
            .filter(|c| c.is_final)
            .map(|c| c.text.as_str())
            .collect()
    }

    /// Full text regardless of partition; used for wire translation.
    pub fn joined_text(&self) -> String {
        self.chunks.iter().map(|c| c.text.as_str()).collect()
    }

    /// True once the last received chunk carries the final flag.
    pub fn is_settled(&self) -> bool {
        self.chunks.last().map(|c| c.is_final).unwrap_or(false)
    }

    pub fn to_wire(&self) -> WireMessage {
        WireMessage { role: self.role, content: self.joined_text() }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_is_one_final_chunk() {
        let m = ChatMessage::user("hello");
        assert_eq!(m.chunks.len(), 1);
        assert!(m.chunks[0].is_final);
        assert!(m.is_settled());
        assert_eq!(m.final_text(), "hello");
    }

    #[test]
    fn assistant_message_starts_empty_and_unsettled() {
        let m = ChatMessage::assistant();
        assert!(m.chunks.is_empty());
        assert!(!m.is_settled());
    }

    #[test]
    fn partition_preserves_arrival_order_within_each_side() {
        let mut m = ChatMessage::assistant();
        m.push(Chunk::new("let me ", false));
        m.push(Chunk::new("think", false));
        m.push(Chunk::new("The ", true));
        m.push(Chunk::new("answer", true));
        assert_eq!(m.thinking_text(), "let me think");
        assert_eq!(m.final_text(), "The answer");
        assert_eq!(m.joined_text(), "let me thinkThe answer");
    }

    #[test]
    fn settled_only_when_last_chunk_is_final() {
        let mut m = ChatMessage::assistant();
        m.push(Chunk::new("a", true));
        m.push(Chunk::new("b", false));
        assert!(!m.is_settled());
        m.push(Chunk::new("", true));
        assert!(m.is_settled());
    }

    #[test]
    fn wire_message_joins_all_chunks() {
        let mut m = ChatMessage::assistant();
        m.push(Chunk::new("Hi ", false));
        m.push(Chunk::new("there", true));
        let w = m.to_wire();
        assert_eq!(w.role, Role::Assistant);
        assert_eq!(w.content, "Hi there");
    }

    #[test]
    fn wire_message_serialises_lowercase_role() {
        let w = WireMessage::user("hi");
        let json = serde_json::to_string(&w).unwrap();
        assert!(json.contains(r#""role":"user""#), "got: {json}");
    }
}
