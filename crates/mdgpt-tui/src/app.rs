use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEventKind, MouseEventKind};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::{debug, error};

use mdgpt_client::{Role, WireMessage};
use mdgpt_config::Config;

use crate::{
    chat::{run_turn, ChatEvent, Conversation},
    clipboard,
    commands::{parse, Command, Parsed},
    editor::{EditorState, PreviewMode},
    highlight::SyntectHighlighter,
    input::InputBuffer,
    keys::{map_command_key, map_key, Action, View},
    layout::AppLayout,
    markdown::{preprocess, render_markdown, RenderOptions, StyledLines},
    notice::Notice,
    storage::BufferStore,
    widgets::{
        draw_command_bar, draw_help, draw_input, draw_notice, draw_preview, draw_status,
        draw_transcript,
    },
};

/// Options passed when constructing the TUI app.
pub struct AppOptions {
    pub view: mdgpt_config::StartView,
    pub initial_prompt: Option<String>,
    pub import_file: Option<std::path::PathBuf>,
}

/// Which pane currently holds keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusPane {
    View,
    Input,
}

const THINKING_TICK: Duration = Duration::from_millis(500);

/// The top-level TUI application state.
pub struct App {
    config: Arc<Config>,
    view: View,
    focus: FocusPane,
    highlighter: SyntectHighlighter,

    // ── Chat ──────────────────────────────────────────────────────────────────
    conversation: Conversation,
    transcript_lines: StyledLines,
    chat_scroll: u16,
    chat_draft: InputBuffer,
    /// Message indices whose thinking part is unfolded.
    expanded: HashSet<usize>,
    /// Animated suffix for the in-progress reply label.
    dots: String,
    dot_count: u8,
    busy: bool,
    queued: VecDeque<String>,
    submit_tx: Option<mpsc::Sender<Vec<WireMessage>>>,
    event_rx: Option<mpsc::Receiver<ChatEvent>>,

    // ── Editor ────────────────────────────────────────────────────────────────
    editor: EditorState,
    store: BufferStore,
    preview_lines: StyledLines,
    preview_scroll: u16,

    // ── Chrome ────────────────────────────────────────────────────────────────
    command_bar: Option<InputBuffer>,
    notice: Option<Notice>,
    show_help: bool,
    pending_nav: bool,
    view_height: u16,
}

impl App {
    pub fn new(config: Arc<Config>, opts: AppOptions) -> Self {
        let store = BufferStore::new(config.editor.buffer_path());
        let highlighter = SyntectHighlighter::new(&config.tui.theme);
        let mut editor = EditorState::new(config.editor.section_delimiter.clone());

        let mut notice = None;
        match store.load() {
            Ok(text) => editor.set_text(text),
            Err(e) => {
                error!(error = %e, "loading persisted buffer failed");
                notice = Some(Notice::error(format!("could not load buffer: {e}")));
            }
        }

        let mut app = Self {
            config,
            view: opts.view.into(),
            focus: FocusPane::Input,
            highlighter,
            conversation: Conversation::default(),
            transcript_lines: Vec::new(),
            chat_scroll: 0,
            chat_draft: InputBuffer::new(),
            expanded: HashSet::new(),
            dots: String::new(),
            dot_count: 0,
            busy: false,
            queued: VecDeque::new(),
            submit_tx: None,
            event_rx: None,
            editor,
            store,
            preview_lines: Vec::new(),
            preview_scroll: 0,
            command_bar: None,
            notice,
            show_help: false,
            pending_nav: false,
            view_height: 24,
        };

        if let Some(path) = opts.import_file {
            match app.editor.import_file(&path) {
                Ok(()) => app.persist_buffer(),
                Err(e) => app.notice = Some(Notice::warn(e.to_string())),
            }
        }
        if let Some(prompt) = opts.initial_prompt {
            app.queued.push_back(prompt);
        }

        app.rerender_preview();
        app.rerender_transcript();
        app
    }

    /// Run the TUI event loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> anyhow::Result<()> {
        let (submit_tx, submit_rx) = mpsc::channel::<Vec<WireMessage>>(16);
        let (event_tx, event_rx) = mpsc::channel::<ChatEvent>(512);

        self.submit_tx = Some(submit_tx);
        self.event_rx = Some(event_rx);

        let cfg = self.config.clone();
        tokio::spawn(async move {
            chat_task(cfg, submit_rx, event_tx).await;
        });

        if let Some(p) = self.queued.pop_front() {
            self.view = View::Chat;
            self.submit_chat(p).await;
        }

        let mut crossterm_events = EventStream::new();
        let mut ticker = tokio::time::interval(THINKING_TICK);

        loop {
            if let Some(n) = &self.notice {
                if n.is_expired() {
                    self.notice = None;
                }
            }

            // Pre-compute layout so scroll helpers have correct heights.
            if let Ok(size) = terminal.size() {
                let layout = AppLayout::compute(
                    ratatui::layout::Rect::new(0, 0, size.width, size.height),
                    self.input_height(),
                    self.bottom_visible(),
                );
                self.view_height = layout.view_inner_height().max(1);
            }

            let ascii = self.ascii();

            terminal.draw(|frame| {
                let layout = AppLayout::new(frame, self.input_height(), self.bottom_visible());

                draw_status(
                    frame,
                    layout.status_bar,
                    &self.config.model.name,
                    self.view,
                    self.editor.mode,
                    self.busy,
                    &self.dots,
                    ascii,
                );

                match self.view {
                    View::Chat => draw_transcript(
                        frame,
                        layout.view_pane,
                        &self.transcript_lines,
                        self.chat_scroll,
                        self.focus == FocusPane::View,
                        ascii,
                    ),
                    View::Editor => draw_preview(
                        frame,
                        layout.view_pane,
                        &self.preview_lines,
                        self.preview_scroll,
                        self.focus == FocusPane::View,
                        ascii,
                        match self.editor.mode {
                            PreviewMode::Paginated => {
                                Some((self.editor.page(), self.editor.page_count()))
                            }
                            PreviewMode::Full => None,
                        },
                    ),
                }

                let (content, cursor) = match self.view {
                    View::Chat => (self.chat_draft.text(), self.chat_draft.cursor()),
                    View::Editor => (self.editor.text(), self.editor.cursor()),
                };
                draw_input(
                    frame,
                    layout.input_pane,
                    content,
                    cursor,
                    self.focus == FocusPane::Input,
                    self.view,
                    self.queued.len(),
                    ascii,
                );

                if let Some(bar) = &self.command_bar {
                    draw_command_bar(frame, layout.bottom_bar, bar.text());
                } else if let Some(n) = &self.notice {
                    draw_notice(frame, layout.bottom_bar, n);
                }

                if self.show_help {
                    draw_help(frame, ascii);
                }
            })?;

            tokio::select! {
                Some(chat_event) = self.recv_chat_event() => {
                    self.handle_chat_event(chat_event);
                }
                Some(Ok(term_event)) = crossterm_events.next() => {
                    if self.handle_term_event(term_event).await { break; }
                }
                _ = ticker.tick() => {
                    self.tick();
                }
            }
        }

        // Persist the buffer on the way out regardless of autosave.
        if let Err(e) = self.store.save(self.editor.text()) {
            error!(error = %e, "saving buffer on exit failed");
        }

        Ok(())
    }

    async fn recv_chat_event(&mut self) -> Option<ChatEvent> {
        if let Some(rx) = &mut self.event_rx { rx.recv().await } else { None }
    }

    /// Advance the "AI is thinking..." animation while a response streams.
    fn tick(&mut self) {
        if self.busy {
            self.dot_count = (self.dot_count % 3) + 1;
            self.dots = ".".repeat(self.dot_count as usize);
            self.rerender_transcript();
        } else if !self.dots.is_empty() {
            self.dot_count = 0;
            self.dots.clear();
            self.rerender_transcript();
        }
    }

    // ── Chat event handler ────────────────────────────────────────────────────

    fn handle_chat_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Chunk(chunk) => {
                self.conversation.append_chunk(chunk);
                self.rerender_transcript();
                self.scroll_chat_to_bottom();
            }
            ChatEvent::StreamError(msg) => {
                error!(error = %msg, "stream failed");
                self.conversation.append_stream_failure();
                self.notice = Some(Notice::error("stream failed, see the transcript"));
                self.rerender_transcript();
                self.scroll_chat_to_bottom();
            }
            ChatEvent::TurnComplete => {
                self.busy = false;
                if let Some(next) = self.queued.pop_front() {
                    let tx = self.submit_tx.clone();
                    self.conversation.push_user(next);
                    self.conversation.begin_assistant();
                    let wire = self.conversation.to_wire(&self.config.chat.system_prompt);
                    if let Some(tx) = tx {
                        tokio::spawn(async move { let _ = tx.send(wire).await; });
                        self.busy = true;
                    }
                    self.rerender_transcript();
                    self.scroll_chat_to_bottom();
                }
            }
        }
    }

    // ── Terminal event handler ────────────────────────────────────────────────

    async fn handle_term_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(k) if k.kind == KeyEventKind::Press => {
                // Help overlay: dismiss on any key
                if self.show_help {
                    self.show_help = false;
                    return false;
                }

                // ── Command bar takes priority ────────────────────────────────
                if self.command_bar.is_some() {
                    if let Some(action) = map_command_key(k) {
                        return self.dispatch(action).await;
                    }
                    return false;
                }

                // ── Normal mode ───────────────────────────────────────────────
                let in_input = self.focus == FocusPane::Input;
                if let Some(action) = map_key(k, self.view, in_input, self.pending_nav) {
                    if action == Action::NavPrefix {
                        self.pending_nav = true;
                        return false;
                    }
                    self.pending_nav = false;
                    return self.dispatch(action).await;
                }
                self.pending_nav = false;
                false
            }

            Event::Mouse(mouse) => {
                match mouse.kind {
                    MouseEventKind::ScrollUp => self.scroll_up(3),
                    MouseEventKind::ScrollDown => self.scroll_down(3),
                    _ => {}
                }
                false
            }

            Event::Resize(_, _) => {
                self.rerender_transcript();
                self.rerender_preview();
                false
            }

            _ => false,
        }
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,

            Action::FocusView => self.focus = FocusPane::View,
            Action::FocusInput => self.focus = FocusPane::Input,

            Action::ScrollUp => self.scroll_up(1),
            Action::ScrollDown => self.scroll_down(1),
            Action::ScrollPageUp => self.scroll_up(self.view_height / 2),
            Action::ScrollPageDown => self.scroll_down(self.view_height / 2),
            Action::ScrollTop => *self.active_scroll() = 0,
            Action::ScrollBottom => {
                let max = self.max_scroll();
                *self.active_scroll() = max;
            }

            Action::PrevSection => {
                self.editor.prev_page();
                self.preview_scroll = 0;
                self.rerender_preview();
            }
            Action::NextSection => {
                self.editor.next_page();
                self.preview_scroll = 0;
                self.rerender_preview();
            }

            Action::ToggleThinking => {
                if let Some(i) = self.conversation.last_thinking_index() {
                    if !self.expanded.remove(&i) {
                        self.expanded.insert(i);
                    }
                    self.rerender_transcript();
                }
            }

            Action::CommandOpen => self.command_bar = Some(InputBuffer::new()),
            Action::CommandClose => self.command_bar = None,
            Action::CommandInput(c) => {
                if let Some(bar) = &mut self.command_bar {
                    bar.insert_char(c);
                }
            }
            Action::CommandBackspace => {
                if let Some(bar) = &mut self.command_bar {
                    bar.backspace();
                }
            }
            Action::CommandExecute => {
                if let Some(mut bar) = self.command_bar.take() {
                    let text = bar.take();
                    let text = text.trim();
                    if !text.is_empty() {
                        let line = if text.starts_with('/') {
                            text.to_string()
                        } else {
                            format!("/{text}")
                        };
                        if self.run_command_line(&line).await {
                            return true;
                        }
                    }
                }
            }

            Action::Submit => {
                let text = self.chat_draft.take().trim().to_string();
                if text.starts_with('/') {
                    if self.run_command_line(&text).await {
                        return true;
                    }
                } else if !text.is_empty() {
                    if self.busy {
                        self.queued.push_back(text);
                    } else {
                        self.submit_chat(text).await;
                    }
                }
            }

            Action::SwitchView => self.view = self.view.toggled(),
            Action::TogglePreview => {
                self.editor.mode = self.editor.mode.toggled();
                self.preview_scroll = 0;
                self.rerender_preview();
            }

            Action::Help => self.show_help = !self.show_help,

            Action::InputChar(_)
            | Action::InputNewline
            | Action::InputBackspace
            | Action::InputDelete
            | Action::InputMoveCursorLeft
            | Action::InputMoveCursorRight
            | Action::InputMoveWordLeft
            | Action::InputMoveWordRight
            | Action::InputMoveLineStart
            | Action::InputMoveLineEnd
            | Action::InputDeleteToEnd
            | Action::InputDeleteToStart => self.apply_input_action(action),

            Action::NavPrefix => {}
        }
        false
    }

    /// Apply an editing action to the active input: the chat draft or, in the
    /// editor view, the markdown buffer itself.
    fn apply_input_action(&mut self, action: Action) {
        let editing_buffer = self.view == View::Editor;
        let input = if editing_buffer {
            self.editor.buffer_mut()
        } else {
            &mut self.chat_draft
        };

        let mutated = matches!(
            action,
            Action::InputChar(_)
                | Action::InputNewline
                | Action::InputBackspace
                | Action::InputDelete
                | Action::InputDeleteToEnd
                | Action::InputDeleteToStart
        );

        match action {
            Action::InputChar(c) => input.insert_char(c),
            Action::InputNewline => input.insert_newline(),
            Action::InputBackspace => input.backspace(),
            Action::InputDelete => input.delete(),
            Action::InputMoveCursorLeft => input.move_left(),
            Action::InputMoveCursorRight => input.move_right(),
            Action::InputMoveWordLeft => input.move_word_left(),
            Action::InputMoveWordRight => input.move_word_right(),
            Action::InputMoveLineStart => input.move_start(),
            Action::InputMoveLineEnd => input.move_end(),
            Action::InputDeleteToEnd => input.delete_to_end(),
            Action::InputDeleteToStart => input.delete_to_start(),
            _ => {}
        }

        if editing_buffer && mutated {
            self.editor.clamp_page();
            if self.config.editor.autosave {
                self.persist_buffer();
            }
            self.rerender_preview();
        }
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    /// Parse and execute one command line.  Returns `true` to quit.
    async fn run_command_line(&mut self, line: &str) -> bool {
        match parse(line) {
            Parsed::Command(cmd) => self.execute_command(cmd).await,
            Parsed::Invalid(msg) => {
                self.notice = Some(Notice::warn(msg));
                false
            }
            Parsed::NotCommand => false,
        }
    }

    async fn execute_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Open(path) => match self.editor.import_file(&path) {
                Ok(()) => {
                    self.persist_buffer();
                    self.preview_scroll = 0;
                    self.rerender_preview();
                    self.view = View::Editor;
                    self.notice = Some(Notice::info(format!("imported {}", path.display())));
                }
                Err(e) => self.notice = Some(Notice::warn(e.to_string())),
            },
            Command::Save => match self.store.save(self.editor.text()) {
                Ok(()) => self.notice = Some(Notice::info("buffer saved")),
                Err(e) => self.notice = Some(Notice::error(format!("save failed: {e}"))),
            },
            Command::Clear => {
                self.editor.clear();
                self.preview_scroll = 0;
                self.rerender_preview();
                match self.store.clear() {
                    Ok(()) => self.notice = Some(Notice::info("buffer cleared")),
                    Err(e) => self.notice = Some(Notice::error(format!("clear failed: {e}"))),
                }
            }
            Command::Copy => {
                if let Some(text) = self.copy_payload() {
                    match clipboard::write_clipboard_text(&text).await {
                        Ok(()) => self.notice = Some(Notice::info("copied to clipboard")),
                        Err(e) => {
                            error!(error = %e, "clipboard write failed");
                            self.notice = Some(Notice::error("could not copy to clipboard"));
                        }
                    }
                } else {
                    self.notice = Some(Notice::warn("nothing to copy"));
                }
            }
            Command::Paste => match clipboard::read_clipboard_text().await {
                Ok(text) if text.is_empty() => {
                    self.notice = Some(Notice::warn("clipboard is empty"));
                }
                Ok(text) => {
                    self.editor.buffer_mut().append(&text);
                    self.editor.clamp_page();
                    self.persist_buffer();
                    self.rerender_preview();
                    self.view = View::Editor;
                    self.notice = Some(Notice::info("pasted from clipboard"));
                }
                Err(e) => {
                    error!(error = %e, "clipboard read failed");
                    self.notice = Some(Notice::error("could not read the clipboard"));
                }
            },
            Command::View => self.view = self.view.toggled(),
            Command::Mode => {
                self.editor.mode = self.editor.mode.toggled();
                self.preview_scroll = 0;
                self.rerender_preview();
            }
            Command::Help => self.show_help = true,
            Command::Quit => return true,
        }
        false
    }

    /// What `/copy` puts on the clipboard: the current section (or the whole
    /// buffer) in the editor, the last fenced code block of the most recent
    /// assistant reply in the chat.
    fn copy_payload(&self) -> Option<String> {
        match self.view {
            View::Editor => {
                let text = match self.editor.mode {
                    PreviewMode::Paginated => self.editor.current_section(),
                    PreviewMode::Full => self.editor.text().to_string(),
                };
                if text.is_empty() { None } else { Some(text) }
            }
            View::Chat => {
                let last = self
                    .conversation
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::Assistant && !m.chunks.is_empty())?;
                crate::chat::extract_last_code_block(&preprocess(&last.joined_text()))
            }
        }
    }

    // ── Chat submission ───────────────────────────────────────────────────────

    async fn submit_chat(&mut self, text: String) {
        self.conversation.push_user(text);
        self.conversation.begin_assistant();
        let wire = self.conversation.to_wire(&self.config.chat.system_prompt);
        self.rerender_transcript();
        self.scroll_chat_to_bottom();
        if let Some(tx) = &self.submit_tx {
            let _ = tx.send(wire).await;
            self.busy = true;
        }
    }

    // ── Rendering helpers ─────────────────────────────────────────────────────

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            wrap_width: self.config.tui.wrap_width,
            ascii: self.ascii(),
            code_line_numbers: self.config.tui.code_line_numbers,
        }
    }

    fn rerender_transcript(&mut self) {
        let md = self.conversation.transcript_markdown(&self.expanded, &self.dots);
        self.transcript_lines = render_markdown(&md, &self.render_options(), &self.highlighter);
    }

    fn rerender_preview(&mut self) {
        let src = match self.editor.mode {
            PreviewMode::Full => self.editor.text().to_string(),
            PreviewMode::Paginated => self.editor.current_section(),
        };
        self.preview_lines = render_markdown(&src, &self.render_options(), &self.highlighter);
    }

    fn persist_buffer(&mut self) {
        if let Err(e) = self.store.save(self.editor.text()) {
            error!(error = %e, "persisting buffer failed");
            self.notice = Some(Notice::error(format!("save failed: {e}")));
        }
    }

    fn ascii(&self) -> bool {
        if std::env::var("MDGPT_ASCII_BORDERS").as_deref() == Ok("1") {
            return true;
        }
        self.config.tui.ascii_borders
    }

    fn input_height(&self) -> u16 {
        match self.view {
            View::Editor => 10,
            View::Chat => 5,
        }
    }

    fn bottom_visible(&self) -> bool {
        self.command_bar.is_some() || self.notice.is_some()
    }

    // ── Scrolling ─────────────────────────────────────────────────────────────

    fn active_scroll(&mut self) -> &mut u16 {
        match self.view {
            View::Chat => &mut self.chat_scroll,
            View::Editor => &mut self.preview_scroll,
        }
    }

    fn max_scroll(&self) -> u16 {
        let len = match self.view {
            View::Chat => self.transcript_lines.len(),
            View::Editor => self.preview_lines.len(),
        };
        (len as u16).saturating_sub(self.view_height)
    }

    fn scroll_up(&mut self, n: u16) {
        let s = self.active_scroll();
        *s = s.saturating_sub(n);
    }

    fn scroll_down(&mut self, n: u16) {
        let max = self.max_scroll();
        let s = self.active_scroll();
        *s = (*s + n).min(max);
    }

    fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = (self.transcript_lines.len() as u16).saturating_sub(self.view_height);
    }
}

// ── Background streaming task ─────────────────────────────────────────────────

async fn chat_task(
    config: Arc<Config>,
    mut rx: mpsc::Receiver<Vec<WireMessage>>,
    tx: mpsc::Sender<ChatEvent>,
) {
    let provider = match mdgpt_client::from_config(&config.model) {
        Ok(p) => p,
        Err(e) => {
            let _ = tx.send(ChatEvent::StreamError(format!("client init: {e}"))).await;
            let _ = tx.send(ChatEvent::TurnComplete).await;
            return;
        }
    };

    while let Some(messages) = rx.recv().await {
        debug!(message_count = messages.len(), "chat task received submission");
        run_turn(provider.as_ref(), messages, &tx).await;
    }
}
