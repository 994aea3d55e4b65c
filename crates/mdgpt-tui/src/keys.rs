use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which top-level view the application is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Editor,
    Chat,
}

impl View {
    pub fn toggled(self) -> Self {
        match self {
            View::Editor => View::Chat,
            View::Chat => View::Editor,
        }
    }
}

impl From<mdgpt_config::StartView> for View {
    fn from(v: mdgpt_config::StartView) -> Self {
        match v {
            mdgpt_config::StartView::Editor => View::Editor,
            mdgpt_config::StartView::Chat => View::Chat,
        }
    }
}

/// All logical actions the TUI can perform, independent of key binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Navigation
    FocusView,
    FocusInput,
    /// First key of the Ctrl+w nav chord (vim-style window navigation).
    /// The App will watch for a follow-up key to decide the target pane.
    NavPrefix,

    // Scrolling (view pane)
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    ScrollTop,
    ScrollBottom,

    // Section pagination (editor view)
    PrevSection,
    NextSection,

    // Thinking fold (chat view)
    ToggleThinking,

    // Command bar
    CommandOpen,
    CommandClose,
    CommandExecute,
    CommandInput(char),
    CommandBackspace,

    // Input
    InputChar(char),
    InputNewline,
    InputBackspace,
    InputDelete,
    InputMoveCursorLeft,
    InputMoveCursorRight,
    InputMoveWordLeft,
    InputMoveWordRight,
    InputMoveLineStart,
    InputMoveLineEnd,
    InputDeleteToEnd,
    InputDeleteToStart,
    Submit,

    // App
    SwitchView,
    TogglePreview,
    Quit,
    Help,
}

/// Map a raw key event to an [`Action`], depending on the active view and
/// which pane has focus.
///
/// `pending_nav` — true when a Ctrl+w prefix has been received but not yet
/// resolved.  In that state only j/k (and arrows) are meaningful.
pub fn map_key(event: KeyEvent, view: View, in_input: bool, pending_nav: bool) -> Option<Action> {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = event.modifiers.contains(KeyModifiers::ALT);
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);
    // "plain" = no modifier that would make a char a control sequence
    let plain = !ctrl && !alt;

    // ── Pending Ctrl+w chord ──────────────────────────────────────────────────
    // After a Ctrl+w prefix, we only look for j/k to pick a pane.  Any other
    // key cancels the prefix (returning None causes the App to clear the flag
    // without acting).
    if pending_nav {
        return match event.code {
            KeyCode::Char('k') | KeyCode::Up => Some(Action::FocusView),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::FocusInput),
            _ => None, // cancel without action
        };
    }

    match event.code {
        // ── Input-pane overrides come FIRST so they shadow global bindings ────
        // Ctrl+u — delete to line start
        KeyCode::Char('u') if ctrl && in_input => Some(Action::InputDeleteToStart),
        // Ctrl+k — delete to line end
        KeyCode::Char('k') if ctrl && in_input => Some(Action::InputDeleteToEnd),

        // ── Global bindings ───────────────────────────────────────────────────
        KeyCode::Char('q') if ctrl => Some(Action::Quit),
        KeyCode::Char('c') if ctrl => Some(Action::Quit),

        // Ctrl+w → start the nav-prefix chord (works from any pane)
        KeyCode::Char('w') if ctrl => Some(Action::NavPrefix),

        KeyCode::F(1) => Some(Action::Help),
        KeyCode::F(2) => Some(Action::SwitchView),
        KeyCode::F(3) => Some(Action::TogglePreview),

        // ── Rest of input pane ────────────────────────────────────────────────
        // Enter submits a chat message; in the editor it edits the buffer.
        KeyCode::Enter if in_input && view == View::Chat && !shift => Some(Action::Submit),
        KeyCode::Enter if in_input => Some(Action::InputNewline),
        KeyCode::Backspace if in_input => Some(Action::InputBackspace),
        KeyCode::Delete if in_input => Some(Action::InputDelete),
        KeyCode::Left if in_input && ctrl => Some(Action::InputMoveWordLeft),
        KeyCode::Right if in_input && ctrl => Some(Action::InputMoveWordRight),
        KeyCode::Left if in_input => Some(Action::InputMoveCursorLeft),
        KeyCode::Right if in_input => Some(Action::InputMoveCursorRight),
        KeyCode::Home if in_input => Some(Action::InputMoveLineStart),
        KeyCode::End if in_input => Some(Action::InputMoveLineEnd),
        // Printable characters — only when no ctrl/alt modifier
        KeyCode::Char(c) if in_input && plain => Some(Action::InputChar(c)),

        // ── View pane ─────────────────────────────────────────────────────────
        KeyCode::Char(':') if !in_input && plain => Some(Action::CommandOpen),

        // Section pagination, editor view only.  Inert inside the text input.
        KeyCode::Left if !in_input && view == View::Editor => Some(Action::PrevSection),
        KeyCode::Char('p') if !in_input && plain && view == View::Editor => {
            Some(Action::PrevSection)
        }
        KeyCode::Right if !in_input && view == View::Editor => Some(Action::NextSection),
        KeyCode::Char('n') if !in_input && plain && view == View::Editor => {
            Some(Action::NextSection)
        }

        // Thinking fold, chat view only.
        KeyCode::Char('t') if !in_input && plain && view == View::Chat => {
            Some(Action::ToggleThinking)
        }

        KeyCode::Up | KeyCode::Char('k') if !in_input && plain => Some(Action::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') if !in_input && plain => Some(Action::ScrollDown),
        KeyCode::Char('u') if ctrl && !in_input => Some(Action::ScrollPageUp),
        KeyCode::Char('d') if ctrl && !in_input => Some(Action::ScrollPageDown),
        KeyCode::PageUp if !in_input => Some(Action::ScrollPageUp),
        KeyCode::PageDown if !in_input => Some(Action::ScrollPageDown),
        KeyCode::Char('g') if !in_input && plain => Some(Action::ScrollTop),
        KeyCode::Char('G') if !in_input => Some(Action::ScrollBottom),

        _ => None,
    }
}

/// Key mapping while the command bar is open.
pub fn map_command_key(event: KeyEvent) -> Option<Action> {
    match event.code {
        KeyCode::Esc => Some(Action::CommandClose),
        KeyCode::Enter => Some(Action::CommandExecute),
        KeyCode::Backspace => Some(Action::CommandBackspace),
        KeyCode::Char(c) => Some(Action::CommandInput(c)),
        _ => None,
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

    use super::*;

    fn key(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: mods,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    fn plain_key(c: char) -> KeyEvent { key(KeyCode::Char(c), KeyModifiers::NONE) }
    fn ctrl_key(c: char) -> KeyEvent { key(KeyCode::Char(c), KeyModifiers::CONTROL) }

    // ── Ctrl+w chord ─────────────────────────────────────────────────────────

    #[test]
    fn ctrl_w_returns_nav_prefix() {
        let ev = ctrl_key('w');
        assert_eq!(map_key(ev, View::Chat, false, false), Some(Action::NavPrefix));
        assert_eq!(map_key(ev, View::Editor, true, false), Some(Action::NavPrefix));
    }

    #[test]
    fn pending_nav_k_focuses_view_pane() {
        let ev = plain_key('k');
        assert_eq!(map_key(ev, View::Chat, false, true), Some(Action::FocusView));
        assert_eq!(map_key(ev, View::Chat, true, true), Some(Action::FocusView));
    }

    #[test]
    fn pending_nav_j_focuses_input() {
        let ev = plain_key('j');
        assert_eq!(map_key(ev, View::Editor, false, true), Some(Action::FocusInput));
    }

    #[test]
    fn pending_nav_other_key_cancels() {
        let ev = plain_key('x');
        assert_eq!(map_key(ev, View::Chat, false, true), None);
    }

    // ── Ctrl modifier should NOT type a character ─────────────────────────────

    #[test]
    fn ctrl_w_in_input_does_not_type_w() {
        let ev = ctrl_key('w');
        let action = map_key(ev, View::Chat, true, false);
        assert_ne!(action, Some(Action::InputChar('w')));
        assert_eq!(action, Some(Action::NavPrefix));
    }

    #[test]
    fn ctrl_x_unbound_does_not_type_x() {
        let ev = ctrl_key('x');
        assert_eq!(map_key(ev, View::Chat, true, false), None);
    }

    #[test]
    fn alt_char_in_input_does_not_type() {
        let ev = key(KeyCode::Char('a'), KeyModifiers::ALT);
        assert_eq!(map_key(ev, View::Chat, true, false), None);
    }

    // ── Normal typing ─────────────────────────────────────────────────────────

    #[test]
    fn plain_char_in_input_types() {
        let ev = plain_key('h');
        assert_eq!(map_key(ev, View::Chat, true, false), Some(Action::InputChar('h')));
    }

    #[test]
    fn plain_char_not_in_input_does_not_type() {
        let ev = plain_key('x');
        assert_eq!(map_key(ev, View::Chat, false, false), None);
    }

    // ── Enter semantics differ by view ────────────────────────────────────────

    #[test]
    fn enter_submits_in_chat_input() {
        let ev = key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(map_key(ev, View::Chat, true, false), Some(Action::Submit));
    }

    #[test]
    fn shift_enter_inserts_newline_in_chat_input() {
        let ev = key(KeyCode::Enter, KeyModifiers::SHIFT);
        assert_eq!(map_key(ev, View::Chat, true, false), Some(Action::InputNewline));
    }

    #[test]
    fn enter_inserts_newline_in_editor_input() {
        let ev = key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(map_key(ev, View::Editor, true, false), Some(Action::InputNewline));
    }

    // ── Section pagination ────────────────────────────────────────────────────

    #[test]
    fn arrows_page_sections_in_editor_view_pane() {
        let left = key(KeyCode::Left, KeyModifiers::NONE);
        let right = key(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(map_key(left, View::Editor, false, false), Some(Action::PrevSection));
        assert_eq!(map_key(right, View::Editor, false, false), Some(Action::NextSection));
    }

    #[test]
    fn pagination_keys_inert_inside_text_input() {
        let left = key(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(
            map_key(left, View::Editor, true, false),
            Some(Action::InputMoveCursorLeft),
            "inside the input, Left moves the cursor instead of paging"
        );
        let n = plain_key('n');
        assert_eq!(map_key(n, View::Editor, true, false), Some(Action::InputChar('n')));
    }

    #[test]
    fn pagination_keys_do_not_fire_in_chat_view() {
        let left = key(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(map_key(left, View::Chat, false, false), None);
        let n = plain_key('n');
        assert_eq!(map_key(n, View::Chat, false, false), None);
    }

    // ── Misc bindings ─────────────────────────────────────────────────────────

    #[test]
    fn colon_opens_command_bar_from_view_pane_only() {
        let ev = plain_key(':');
        assert_eq!(map_key(ev, View::Chat, false, false), Some(Action::CommandOpen));
        assert_eq!(map_key(ev, View::Chat, true, false), Some(Action::InputChar(':')));
    }

    #[test]
    fn t_toggles_thinking_in_chat_view_pane() {
        let ev = plain_key('t');
        assert_eq!(map_key(ev, View::Chat, false, false), Some(Action::ToggleThinking));
        assert_eq!(map_key(ev, View::Editor, false, false), None);
    }

    #[test]
    fn ctrl_c_quits() {
        let ev = ctrl_key('c');
        assert_eq!(map_key(ev, View::Chat, false, false), Some(Action::Quit));
        assert_eq!(map_key(ev, View::Editor, true, false), Some(Action::Quit));
    }

    #[test]
    fn ctrl_k_in_input_deletes_to_end() {
        let ev = ctrl_key('k');
        assert_eq!(map_key(ev, View::Chat, true, false), Some(Action::InputDeleteToEnd));
    }

    #[test]
    fn j_in_view_pane_scrolls_down() {
        let ev = plain_key('j');
        assert_eq!(map_key(ev, View::Chat, false, false), Some(Action::ScrollDown));
    }

    #[test]
    fn ctrl_u_in_view_pane_pages_up() {
        let ev = ctrl_key('u');
        assert_eq!(map_key(ev, View::Editor, false, false), Some(Action::ScrollPageUp));
    }

    #[test]
    fn f2_switches_view_anywhere() {
        let ev = key(KeyCode::F(2), KeyModifiers::NONE);
        assert_eq!(map_key(ev, View::Chat, true, false), Some(Action::SwitchView));
        assert_eq!(map_key(ev, View::Editor, false, false), Some(Action::SwitchView));
    }

    #[test]
    fn command_bar_keys() {
        assert_eq!(map_command_key(key(KeyCode::Esc, KeyModifiers::NONE)), Some(Action::CommandClose));
        assert_eq!(map_command_key(key(KeyCode::Enter, KeyModifiers::NONE)), Some(Action::CommandExecute));
        assert_eq!(map_command_key(plain_key('o')), Some(Action::CommandInput('o')));
    }
}
