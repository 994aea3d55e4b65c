/// Integration tests for mdgpt's streaming and persistence logic using the
/// mock providers.
use std::collections::HashSet;

use mdgpt_client::{ResponseEvent, ScriptedMockProvider, WireMessage};
use mdgpt_tui::chat::{run_turn, ChatEvent, Conversation, STREAM_FAILURE_APOLOGY};
use mdgpt_tui::BufferStore;
use tokio::sync::mpsc;

/// Drive one scripted turn and fold the events into a conversation, the way
/// the UI loop does.
async fn play_turn(provider: ScriptedMockProvider, prompt: &str) -> Conversation {
    let mut conv = Conversation::default();
    conv.push_user(prompt);
    conv.begin_assistant();

    let (tx, mut rx) = mpsc::channel(64);
    run_turn(&provider, conv.to_wire("You are a helpful AI assistant."), &tx).await;

    while let Ok(ev) = rx.try_recv() {
        match ev {
            ChatEvent::Chunk(c) => conv.append_chunk(c),
            ChatEvent::StreamError(_) => conv.append_stream_failure(),
            ChatEvent::TurnComplete => break,
        }
    }
    conv
}

#[tokio::test]
async fn streamed_chunks_reconstruct_text_partitioned_by_final_flag() {
    let provider = ScriptedMockProvider::new(vec![vec![
        ResponseEvent::Delta { text: "consider ".into(), is_final: false },
        ResponseEvent::Delta { text: "the question".into(), is_final: false },
        ResponseEvent::Delta { text: "It is ".into(), is_final: true },
        ResponseEvent::Delta { text: "42.".into(), is_final: true },
        ResponseEvent::Done,
    ]]);
    let conv = play_turn(provider, "meaning of life?").await;

    let reply = conv.messages.last().unwrap();
    assert_eq!(reply.thinking_text(), "consider the question");
    assert_eq!(reply.final_text(), "It is 42.");
    assert_eq!(reply.chunks.len(), 4);
    assert!(reply.is_settled());
}

#[tokio::test]
async fn wire_contract_example_yields_one_thinking_and_one_empty_final_chunk() {
    // The event shape produced by:
    //   data: {"choices":[{"delta":{"content":"Hi"}}]}
    //   data: {"choices":[{"delta":{},"finish_reason":"stop"}]}
    //   data: [DONE]
    let provider = ScriptedMockProvider::new(vec![vec![
        ResponseEvent::Delta { text: "Hi".into(), is_final: false },
        ResponseEvent::Delta { text: "".into(), is_final: true },
        ResponseEvent::Done,
    ]]);
    let conv = play_turn(provider, "hello").await;

    let reply = conv.messages.last().unwrap();
    assert_eq!(reply.chunks.len(), 2, "the [DONE] terminator must produce no chunk");
    assert_eq!(reply.chunks[0].text, "Hi");
    assert!(!reply.chunks[0].is_final);
    assert_eq!(reply.chunks[1].text, "");
    assert!(reply.chunks[1].is_final);
}

#[tokio::test]
async fn stream_failure_appends_one_final_apology_chunk() {
    let provider = ScriptedMockProvider::new(vec![vec![
        ResponseEvent::Delta { text: "part".into(), is_final: false },
        ResponseEvent::Error("connection reset by peer".into()),
    ]]);
    let conv = play_turn(provider, "hello").await;

    let reply = conv.messages.last().unwrap();
    let finals: Vec<_> = reply.chunks.iter().filter(|c| c.is_final).collect();
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].text, STREAM_FAILURE_APOLOGY);
    assert!(reply.is_settled(), "loading state must be able to clear");
}

#[tokio::test]
async fn conversation_history_is_sent_on_the_next_turn() {
    let provider = ScriptedMockProvider::always_text("first reply");
    let mut conv = play_turn(provider, "first question").await;

    conv.push_user("second question");
    conv.begin_assistant();

    let provider2 = ScriptedMockProvider::always_text("second reply");
    let (tx, _rx) = mpsc::channel(64);
    run_turn(&provider2, conv.to_wire("sys"), &tx).await;

    let seen = provider2.last_request.lock().unwrap();
    let req = seen.as_ref().unwrap();
    let contents: Vec<&str> = req.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        contents,
        vec!["sys", "first question", "first reply", "second question"]
    );
}

#[tokio::test]
async fn transcript_renders_both_sides_of_the_partition() {
    let provider = ScriptedMockProvider::thinking_then_text("working on it", "done now");
    let conv = play_turn(provider, "go").await;

    let expanded: HashSet<usize> = [1].into_iter().collect();
    let md = conv.transcript_markdown(&expanded, "");
    assert!(md.contains("**You:** go"));
    assert!(md.contains("AI completed thinking"));
    assert!(md.contains("> working on it"));
    assert!(md.contains("done now"));
}

#[test]
fn buffer_round_trips_across_store_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("buffer.md");

    let store = BufferStore::new(&path);
    store.save("# persisted\n\nacross instances").unwrap();

    // A fresh component initialisation sees the same string.
    let reopened = BufferStore::new(&path);
    assert_eq!(reopened.load().unwrap(), "# persisted\n\nacross instances");

    reopened.clear().unwrap();
    assert_eq!(BufferStore::new(&path).load().unwrap(), "");
}

#[test]
fn config_defaults_are_valid() {
    let cfg = mdgpt_config::Config::default();
    assert_eq!(cfg.editor.section_delimiter, "---");
    assert!(cfg.model.api_key.is_none(), "no credential ships in source");
    assert!(!cfg.chat.system_prompt.is_empty());
    assert!(cfg.model.base_url.starts_with("https://"));
}
