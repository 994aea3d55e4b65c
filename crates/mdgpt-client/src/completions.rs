// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Streaming driver for the `/chat/completions` SSE wire format.
//!
//! The response body arrives as `data: <json>` lines terminated by a
//! `data: [DONE]` sentinel.  Each payload carries a delta text fragment at
//! `choices[0].delta.content` and, on the concluding payload, a
//! `finish_reason` marker.

use anyhow::{bail, Context};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::debug;

use crate::{provider::ResponseStream, CompletionRequest, ResponseEvent};

/// Chat completions provider speaking the standard SSE streaming format.
pub struct CompletionsProvider {
    /// Model id forwarded to the API.
    model: String,
    /// API key (pre-resolved from config or env).  `None` for local servers.
    api_key: Option<String>,
    /// Full chat completions URL, derived from the configured base URL.
    chat_url: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl CompletionsProvider {
    /// Construct a provider from its endpoint and auth configuration.
    ///
    /// `base_url` ends **before** `/chat/completions`, e.g.
    /// `https://api.openai.com/v1`.
    pub fn new(
        model: String,
        api_key: Option<String>,
        base_url: &str,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            model,
            api_key,
            chat_url: format!("{base}/chat/completions"),
            max_tokens,
            temperature,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl crate::ChatProvider for CompletionsProvider {
    fn name(&self) -> &str {
        "completions"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ResponseStream> {
        let mut body = json!({
            "model": self.model,
            "stream": req.stream,
            "messages": req.messages,
        });
        if let Some(mt) = self.max_tokens {
            body["max_tokens"] = json!(mt);
        }
        if let Some(t) = self.temperature {
            body["temperature"] = json!(t);
        }

        debug!(
            model = %self.model,
            message_count = req.messages.len(),
            "sending completion request"
        );

        let mut http_req = self.client.post(&self.chat_url).json(&body);
        if let Some(key) = self.api_key.as_deref() {
            http_req = http_req.bearer_auth(key);
        }

        let resp = http_req
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.chat_url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("chat completions error {status}: {text}");
        }

        let byte_stream = resp.bytes_stream();
        // SSE events can be split across multiple TCP packets.  Maintain a
        // line buffer across chunks; emit events only for complete lines.
        let event_stream = byte_stream
            .scan(String::new(), |buf, chunk| {
                let events: Vec<anyhow::Result<ResponseEvent>> = match chunk {
                    Ok(b) => {
                        buf.push_str(&String::from_utf8_lossy(&b));
                        drain_complete_sse_lines(buf)
                    }
                    Err(e) => vec![Err(anyhow::anyhow!(e))],
                };
                std::future::ready(Some(events))
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(event_stream))
    }
}

/// Parse a single complete SSE `data:` line into a [`ResponseEvent`].
///
/// Returns `None` for empty payloads, non-data lines, payloads that carry
/// neither a text fragment nor a stop marker, and unparseable data (which is
/// logged and skipped — never fatal).
fn parse_sse_data_line(line: &str) -> Option<ResponseEvent> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() {
        return None;
    }
    if data == "[DONE]" {
        return Some(ResponseEvent::Done);
    }
    let v: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => {
            debug!(payload = %data, error = %e, "skipping unparseable stream payload");
            return None;
        }
    };
    parse_sse_chunk(&v)
}

/// Drain all complete `\n`-terminated SSE lines from `buf`.
///
/// Any trailing incomplete line (bytes not yet terminated by `\n`) is left
/// in `buf` so it can be extended by the next TCP chunk.  This is necessary
/// because a single SSE event may be split across multiple TCP packets.
pub(crate) fn drain_complete_sse_lines(buf: &mut String) -> Vec<anyhow::Result<ResponseEvent>> {
    let mut events = Vec::new();
    while let Some(nl_pos) = buf.find('\n') {
        // Strip the optional Windows-style \r before \n.
        let line = buf[..nl_pos].trim_end_matches('\r').to_string();
        // Advance buffer past the consumed line including the \n.
        *buf = buf[nl_pos + 1..].to_string();
        if let Some(ev) = parse_sse_data_line(line.trim()) {
            events.push(Ok(ev));
        }
    }
    events
}

/// Convert one decoded payload into a delta event.
///
/// The fragment is `choices[0].delta.content` (empty when absent); the
/// final-reply flag is set when `finish_reason` is `"stop"`.  A payload with
/// no fragment and no finish_reason at all produces nothing — it carries no
/// displayable content.
fn parse_sse_chunk(v: &Value) -> Option<ResponseEvent> {
    let choice = &v["choices"][0];
    let delta_text = choice["delta"]["content"].as_str().unwrap_or("");
    let finish_reason = choice.get("finish_reason").and_then(|r| r.as_str());

    if delta_text.is_empty() && finish_reason.is_none() {
        return None;
    }

    Some(ResponseEvent::Delta {
        text: delta_text.to_string(),
        is_final: finish_reason == Some("stop"),
    })
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
