use std::sync::OnceLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;
use unicode_width::UnicodeWidthStr;

use crate::highlight::SyntectHighlighter;
use crate::widgets::{md_blockquote, md_bullet, md_rule_char};

/// A styled line ready for Ratatui rendering.
pub type StyledLines = Vec<Line<'static>>;

/// Rewrite recognised text patterns into fenced code blocks before the text
/// is handed to the renderer.
///
/// - `valid query: <rest>` becomes a ` ```sql ` fence around the rest.
/// - Opening fences with no language tag are retagged as ` ```json `.
pub fn preprocess(raw: &str) -> String {
    let step1 = match query_regex() {
        Some(re) => re
            .replace_all(raw, |caps: &regex::Captures| {
                format!("```sql\n{}\n```", caps[1].trim())
            })
            .into_owned(),
        None => raw.to_string(),
    };
    retag_untagged_fences(&step1)
}

fn query_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)valid query:\s*(.*)").ok()).as_ref()
}

/// Retag opening fences that carry no language as json.  Closing fences are
/// left alone — a closing fence must not carry an info string.
fn retag_untagged_fences(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_fence = false;
    for line in text.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("```") {
            if !in_fence && rest.trim().is_empty() {
                out.push(line.replacen("```", "```json", 1));
            } else {
                out.push(line.to_string());
            }
            in_fence = !in_fence;
        } else {
            out.push(line.to_string());
        }
    }
    let mut joined = out.join("\n");
    if text.ends_with('\n') {
        joined.push('\n');
    }
    joined
}

/// How the renderer presents fenced code and text.
pub struct RenderOptions {
    /// Width used for paragraph wrapping (0 = default 80).
    pub wrap_width: u16,
    /// Plain ASCII characters instead of Unicode box-drawing glyphs.
    pub ascii: bool,
    /// Prefix code block lines with line numbers.
    pub code_line_numbers: bool,
}

/// Convert a markdown string into a list of styled [`Line`]s for Ratatui.
///
/// Headings, emphasis, lists, block quotes, and rules follow the configured
/// styles; fenced code blocks get a header line carrying the language label
/// and a copy hint, with the body highlighted through syntect.
pub fn render_markdown(md: &str, opts: &RenderOptions, hl: &SyntectHighlighter) -> StyledLines {
    let width = if opts.wrap_width == 0 { 80 } else { opts.wrap_width as usize };
    let mut lines: StyledLines = Vec::new();
    let mut current_spans: Vec<Span<'static>> = Vec::new();
    let mut style_stack: Vec<Style> = vec![Style::default()];
    // Fenced code is collected verbatim and emitted on the closing fence.
    let mut code_lang: Option<String> = None;
    let mut code_buf = String::new();
    let mut in_code = false;
    // One entry per open list: `Some(next_index)` for ordered lists.
    let mut list_stack: Vec<Option<u64>> = Vec::new();

    let push_line = |lines: &mut StyledLines, spans: &mut Vec<Span<'static>>| {
        if spans.is_empty() {
            lines.push(Line::default());
        } else {
            lines.push(Line::from(std::mem::take(spans)));
        }
    };

    let mut parser_opts = Options::empty();
    parser_opts.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(md, parser_opts);

    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                push_line(&mut lines, &mut current_spans);
                style_stack.push(heading_style(level));
            }
            Event::End(TagEnd::Heading(_)) => {
                style_stack.pop();
                push_line(&mut lines, &mut current_spans);
                lines.push(Line::default());
            }
            Event::Start(Tag::Strong) => {
                let base = *style_stack.last().unwrap_or(&Style::default());
                style_stack.push(base.add_modifier(Modifier::BOLD));
            }
            Event::End(TagEnd::Strong) => { style_stack.pop(); }
            Event::Start(Tag::Emphasis) => {
                let base = *style_stack.last().unwrap_or(&Style::default());
                style_stack.push(base.add_modifier(Modifier::ITALIC));
            }
            Event::End(TagEnd::Emphasis) => { style_stack.pop(); }
            Event::Start(Tag::Strikethrough) => {
                let base = *style_stack.last().unwrap_or(&Style::default());
                style_stack.push(base.add_modifier(Modifier::CROSSED_OUT));
            }
            Event::End(TagEnd::Strikethrough) => { style_stack.pop(); }
            Event::Start(Tag::CodeBlock(kind)) => {
                push_line(&mut lines, &mut current_spans);
                in_code = true;
                code_buf.clear();
                code_lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        let lang = info.split_whitespace().next().unwrap_or("");
                        if lang.is_empty() { None } else { Some(lang.to_string()) }
                    }
                    CodeBlockKind::Indented => None,
                };
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code = false;
                emit_code_block(
                    &mut lines,
                    code_lang.take(),
                    &code_buf,
                    width,
                    opts,
                    hl,
                );
                lines.push(Line::default());
            }
            Event::Start(Tag::List(start)) => {
                push_line(&mut lines, &mut current_spans);
                list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                list_stack.pop();
            }
            Event::Start(Tag::Item) => {
                match list_stack.last_mut() {
                    Some(Some(n)) => {
                        current_spans.push(Span::raw(format!("  {n}. ")));
                        *n += 1;
                    }
                    _ => current_spans.push(Span::raw(format!("  {}", md_bullet(opts.ascii)))),
                }
            }
            Event::End(TagEnd::Item) => {
                push_line(&mut lines, &mut current_spans);
            }
            Event::Start(Tag::BlockQuote(_)) => {
                let base = *style_stack.last().unwrap_or(&Style::default());
                style_stack.push(base.fg(Color::DarkGray));
                current_spans.push(Span::raw(md_blockquote(opts.ascii).to_string()));
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                push_line(&mut lines, &mut current_spans);
                style_stack.pop();
                lines.push(Line::default());
            }
            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => {
                push_line(&mut lines, &mut current_spans);
                lines.push(Line::default());
            }
            Event::Text(t) if in_code => {
                code_buf.push_str(&t);
            }
            Event::Text(t) => {
                let style = *style_stack.last().unwrap_or(&Style::default());
                let words = t.split_inclusive(' ');
                let mut col = current_col(&current_spans);
                let mut buf = String::new();
                for word in words {
                    if col + word.width() > width && !buf.is_empty() {
                        current_spans.push(Span::styled(buf.clone(), style));
                        buf.clear();
                        push_line(&mut lines, &mut current_spans);
                        col = 0;
                    }
                    buf.push_str(word);
                    col += word.width();
                }
                if !buf.is_empty() {
                    current_spans.push(Span::styled(buf, style));
                }
            }
            Event::Code(t) => {
                let style = Style::default().fg(Color::Yellow).bg(Color::DarkGray);
                current_spans.push(Span::styled(format!("`{t}`"), style));
            }
            Event::SoftBreak => {
                current_spans.push(Span::raw(" "));
            }
            Event::HardBreak => {
                push_line(&mut lines, &mut current_spans);
            }
            Event::Rule => {
                push_line(&mut lines, &mut current_spans);
                lines.push(Line::from(Span::styled(
                    md_rule_char(opts.ascii).to_string().repeat(width),
                    Style::default().fg(Color::DarkGray),
                )));
                lines.push(Line::default());
            }
            _ => {}
        }
    }

    if !current_spans.is_empty() {
        lines.push(Line::from(current_spans));
    }

    lines
}

/// Emit a fenced code block: header line with the language label and a copy
/// hint, then the highlighted body.
fn emit_code_block(
    lines: &mut StyledLines,
    lang: Option<String>,
    code: &str,
    width: usize,
    opts: &RenderOptions,
    hl: &SyntectHighlighter,
) {
    let dash = md_rule_char(opts.ascii).to_string();
    let label = lang.as_deref().unwrap_or("text");
    let hint = "copy: /copy";
    let used = label.width() + hint.width() + 6;
    let fill = dash.repeat(width.saturating_sub(used).max(1));
    lines.push(Line::from(vec![
        Span::styled(format!("{dash}{dash} "), Style::default().fg(Color::DarkGray)),
        Span::styled(
            label.to_string(),
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {fill} "), Style::default().fg(Color::DarkGray)),
        Span::styled(hint.to_string(), Style::default().fg(Color::DarkGray)),
    ]));

    let code = code.strip_suffix('\n').unwrap_or(code);
    let code_lines: Vec<&str> = code.lines().collect();
    let highlighted = hl.highlight_lines(lang.as_deref(), &code_lines);
    for (i, mut spans) in highlighted.into_iter().enumerate() {
        if opts.code_line_numbers {
            spans.insert(
                0,
                Span::styled(
                    format!("{:>3} {} ", i + 1, md_gutter(opts.ascii)),
                    Style::default().fg(Color::DarkGray),
                ),
            );
        }
        lines.push(Line::from(spans));
    }
}

fn md_gutter(ascii: bool) -> &'static str {
    if ascii { "|" } else { "│" }
}

fn heading_style(level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD),
        HeadingLevel::H2 => Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        HeadingLevel::H3 => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        _ => Style::default().add_modifier(Modifier::BOLD),
    }
}

fn current_col(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|s| s.content.as_ref().width()).sum()
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
