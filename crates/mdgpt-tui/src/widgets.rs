// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::editor::PreviewMode;
use crate::keys::View;
use crate::markdown::StyledLines;
use crate::notice::{Notice, NoticeLevel};

// ── Character sets ────────────────────────────────────────────────────────────

fn sep(ascii: bool) -> &'static str {
    if ascii { "|" } else { "│" }
}
fn busy_char(ascii: bool) -> &'static str {
    if ascii { "* " } else { "⠿ " }
}
fn rule_char(ascii: bool) -> char {
    if ascii { '-' } else { '─' }
}
fn blockquote_prefix(ascii: bool) -> &'static str {
    if ascii { "> " } else { "▌ " }
}
fn bullet(ascii: bool) -> &'static str {
    if ascii { "- " } else { "• " }
}
fn border_type(ascii: bool) -> BorderType {
    if ascii { BorderType::Plain } else { BorderType::Rounded }
}
fn arrow_left(ascii: bool) -> &'static str {
    if ascii { "<" } else { "‹" }
}
fn arrow_right(ascii: bool) -> &'static str {
    if ascii { ">" } else { "›" }
}

// ── Draw functions ────────────────────────────────────────────────────────────

/// Draw the status bar at the top.
#[allow(clippy::too_many_arguments)]
pub fn draw_status(
    frame: &mut Frame,
    area: Rect,
    model_name: &str,
    view: View,
    preview_mode: PreviewMode,
    busy: bool,
    dots: &str,
    ascii: bool,
) {
    let busy_indicator = if busy { busy_char(ascii) } else { "  " };
    let separator = sep(ascii);

    let view_str = match view {
        View::Editor => match preview_mode {
            PreviewMode::Full => "editor · full",
            PreviewMode::Paginated => "editor · paginated",
        },
        View::Chat => "chat",
    };

    let busy_span: Span<'static> = if busy {
        Span::styled(
            format!(" thinking{dots} "),
            Style::default().fg(Color::Yellow),
        )
    } else {
        Span::raw("")
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {busy_indicator}"),
            Style::default().fg(if busy { Color::Yellow } else { Color::DarkGray }),
        ),
        Span::styled(format!(" {model_name} "), Style::default().fg(Color::LightCyan)),
        Span::styled(separator, Style::default().fg(Color::DarkGray)),
        Span::styled(format!(" {view_str} "), view_style(view)),
        busy_span,
        Span::styled(
            "  F1:help  F2:view  F3:preview  ^w k:↑pane  ^w j:↓input  ::command  ^c:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let para = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}

/// Draw the chat transcript pane.
pub fn draw_transcript(
    frame: &mut Frame,
    area: Rect,
    lines: &StyledLines,
    scroll_offset: u16,
    focused: bool,
    ascii: bool,
) {
    let block = pane_block("Chat", focused, ascii);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible: Vec<Line<'static>> = lines
        .iter()
        .skip(scroll_offset as usize)
        .take(inner.height as usize)
        .cloned()
        .collect();

    let para = Paragraph::new(visible).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}

/// Draw the markdown preview pane.  In paginated mode the last row carries
/// the navigation footer; ends that cannot move further are dimmed.
#[allow(clippy::too_many_arguments)]
pub fn draw_preview(
    frame: &mut Frame,
    area: Rect,
    lines: &StyledLines,
    scroll_offset: u16,
    focused: bool,
    ascii: bool,
    pagination: Option<(usize, usize)>,
) {
    let title = match pagination {
        Some((page, count)) => format!("Preview {}/{count}", page + 1),
        None => "Preview".to_string(),
    };
    let block = pane_block(&title, focused, ascii);
    let mut inner = block.inner(area);
    frame.render_widget(block, area);

    let footer = pagination.map(|(page, count)| {
        let prev_enabled = page > 0;
        let next_enabled = page + 1 < count;
        let on = Style::default().fg(Color::Gray);
        let off = Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM);
        Line::from(vec![
            Span::styled(
                format!("{} prev", arrow_left(ascii)),
                if prev_enabled { on } else { off },
            ),
            Span::styled(
                format!("   page {} of {count}   ", page + 1),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("next {}", arrow_right(ascii)),
                if next_enabled { on } else { off },
            ),
        ])
    });

    if let Some(footer_line) = footer {
        if inner.height > 1 {
            let footer_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
            inner.height -= 1;
            frame.render_widget(Paragraph::new(footer_line).centered(), footer_area);
        }
    }

    let visible: Vec<Line<'static>> = lines
        .iter()
        .skip(scroll_offset as usize)
        .take(inner.height as usize)
        .cloned()
        .collect();

    let para = Paragraph::new(visible).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}

/// Draw the input box at the bottom.
#[allow(clippy::too_many_arguments)]
pub fn draw_input(
    frame: &mut Frame,
    area: Rect,
    content: &str,
    cursor_pos: usize,
    focused: bool,
    view: View,
    queued: usize,
    ascii: bool,
) {
    let title = match view {
        View::Editor => "Markdown  [F3:preview mode  ^w k:↑preview]".to_string(),
        View::Chat if queued > 0 => format!("Message  [{queued} queued]"),
        View::Chat => "Message  [Enter:send  Shift+Enter:newline  /help:commands]".to_string(),
    };

    let block = pane_block(&title, focused, ascii);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let para = Paragraph::new(content).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);

    if focused && inner.width > 0 {
        // Cursor row/col derived from the text before the cursor; long lines
        // wrap at the pane width.
        let before = &content[..cursor_pos.min(content.len())];
        let mut row = 0u16;
        let mut col = 0u16;
        for c in before.chars() {
            if c == '\n' {
                row += 1;
                col = 0;
            } else {
                col += 1;
                if col >= inner.width {
                    row += 1;
                    col = 0;
                }
            }
        }
        if row < inner.height {
            frame.set_cursor_position((inner.x + col, inner.y + row));
        }
    }
}

/// Draw the command bar on the shared bottom row.
pub fn draw_command_bar(frame: &mut Frame, area: Rect, input: &str) {
    let text = format!(":{input}  (Enter:run  Esc:close)");
    let para = Paragraph::new(text).style(Style::default().fg(Color::Yellow).bg(Color::Black));
    frame.render_widget(para, area);
}

/// Draw a transient notice on the shared bottom row.
pub fn draw_notice(frame: &mut Frame, area: Rect, notice: &Notice) {
    let style = match notice.level {
        NoticeLevel::Info => Style::default().fg(Color::Black).bg(Color::Green),
        NoticeLevel::Warn => Style::default().fg(Color::Black).bg(Color::Yellow),
        NoticeLevel::Error => Style::default().fg(Color::White).bg(Color::Red),
    };
    let para = Paragraph::new(format!(" {} ", notice.text)).style(style);
    frame.render_widget(para, area);
}

/// Draw the help overlay.
pub fn draw_help(frame: &mut Frame, ascii: bool) {
    let area = frame.area();
    let bt = border_type(ascii);

    let mut help_text = vec![
        Line::from(Span::styled(
            "  mdgpt Key Bindings",
            Style::default().add_modifier(Modifier::BOLD).fg(Color::LightBlue),
        )),
        Line::default(),
        Line::from(" F2       Switch editor / chat view"),
        Line::from(" F3       Toggle full / paginated preview"),
        Line::from(" ^w k     Focus the view pane"),
        Line::from(" ^w j     Focus the input pane"),
        Line::from(" j/k      Scroll the view pane"),
        Line::from(" ^u/^d    Half-page up/down"),
        Line::from(" g / G    Jump to top/bottom"),
        Line::from(" ←/→ p/n  Previous / next section (paginated preview)"),
        Line::from(" t        Fold/unfold the thinking part (chat)"),
        Line::from(" Enter    Send message (chat input)"),
        Line::from(" S+Enter  Insert newline (chat input)"),
        Line::from(" :        Open the command bar"),
        Line::from(" ^c       Quit"),
        Line::default(),
    ];
    for l in crate::commands::help_lines() {
        help_text.push(Line::from(format!(" {l}")));
    }
    help_text.push(Line::default());
    help_text.push(Line::from(Span::styled(
        " Press any key to close",
        Style::default().fg(Color::DarkGray),
    )));

    let width = 68u16.min(area.width);
    let height = (help_text.len() as u16 + 2).min(area.height);
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    let overlay = Rect::new(x, y, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(bt)
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(overlay);
    frame.render_widget(Clear, overlay);
    frame.render_widget(block, overlay);
    frame.render_widget(Paragraph::new(help_text), inner);
}

// ── Internal helpers ──────────────────────────────────────────────────────────

pub(crate) fn pane_block(title: &str, focused: bool, ascii: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::LightBlue)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(Span::styled(
            format!(" {title} "),
            if focused {
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(Color::LightBlue)
            } else {
                Style::default().fg(Color::Gray)
            },
        ))
        .borders(Borders::ALL)
        .border_type(border_type(ascii))
        .border_style(border_style)
}

pub(crate) fn md_rule_char(ascii: bool) -> char { rule_char(ascii) }
pub(crate) fn md_blockquote(ascii: bool) -> &'static str { blockquote_prefix(ascii) }
pub(crate) fn md_bullet(ascii: bool) -> &'static str { bullet(ascii) }

fn view_style(view: View) -> Style {
    match view {
        View::Editor => Style::default().fg(Color::LightGreen),
        View::Chat => Style::default().fg(Color::LightMagenta),
    }
}
