//! Syntax highlighting for fenced code blocks, delegated to syntect.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SynStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    /// Build a highlighter for the configured theme name ("dark" | "light").
    /// Unknown names fall back to the dark theme.
    pub fn new(theme_name: &str) -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        let key = match theme_name {
            "light" => "InspiredGitHub",
            _ => "base16-ocean.dark",
        };
        let theme = theme_set
            .themes
            .get(key)
            .cloned()
            .or_else(|| theme_set.themes.values().next().cloned())
            .unwrap_or_default();
        Self { syntax_set, theme }
    }

    fn syntax_for(&self, language: Option<&str>) -> &SyntaxReference {
        if let Some(lang) = language {
            if let Some(syntax) = self.syntax_set.find_syntax_by_extension(lang) {
                return syntax;
            }
            if let Some(syntax) = self.syntax_set.find_syntax_by_token(lang) {
                return syntax;
            }
        }
        self.syntax_set.find_syntax_plain_text()
    }

    /// Highlight a code block line-by-line into ratatui spans.
    /// Returns one span vector per input line; an unknown language degrades
    /// to plain text rather than failing.
    pub fn highlight_lines(&self, language: Option<&str>, lines: &[&str]) -> Vec<Vec<Span<'static>>> {
        let syntax = self.syntax_for(language);
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        let mut out: Vec<Vec<Span<'static>>> = Vec::with_capacity(lines.len());
        for line in lines {
            let mut spans: Vec<Span<'static>> = Vec::new();
            for l in LinesWithEndings::from(line) {
                let regions = highlighter
                    .highlight_line(l, &self.syntax_set)
                    .unwrap_or_default();
                for (style, s) in regions {
                    let s = s.trim_end_matches('\n');
                    if s.is_empty() {
                        continue;
                    }
                    spans.push(Span::styled(s.to_string(), syn_style_to_ratatui(style)));
                }
            }
            if spans.is_empty() {
                spans.push(Span::raw((*line).to_string()));
            }
            out.push(spans);
        }
        out
    }
}

fn syn_style_to_ratatui(s: SynStyle) -> Style {
    let mut out = Style::default().fg(Color::Rgb(s.foreground.r, s.foreground.g, s.foreground.b));

    if s.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if s.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if s.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }

    out
}
