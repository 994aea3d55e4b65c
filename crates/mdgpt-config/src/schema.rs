// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

/// Serde default helper — returns `true`.
///
/// `#[serde(default)]` on a `bool` always falls back to `bool::default()`
/// (i.e. `false`), so fields that should be enabled unless explicitly turned
/// off need a named function.
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name forwarded to the chat completions API
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Environment variable that holds the API key (read at runtime)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    /// Explicit API key; prefer api_key_env in config files to avoid secrets
    /// in version-controlled files
    pub api_key: Option<String>,
    /// API base URL, up to but not including `/chat/completions`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Maximum tokens to request in a single completion
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0–2.0)
    pub temperature: Option<f32>,
}

fn default_model_name() -> String {
    "gpt-4o-mini".into()
}

// api_key_env rather than api_key: the key never lives in a checked-in file
// or in source.
fn default_api_key_env() -> Option<String> {
    Some("MDGPT_API_KEY".into())
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            api_key_env: default_api_key_env(),
            api_key: None,
            base_url: default_base_url(),
            max_tokens: None,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// System prompt sent as the first wire message of every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_system_prompt() -> String {
    "You are a helpful AI assistant.".into()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Line that separates sections in the paginated preview.
    /// A buffer line whose trimmed content equals this string starts a new
    /// section.
    #[serde(default = "default_section_delimiter")]
    pub section_delimiter: String,
    /// Path of the persisted buffer file.  `~` is expanded.  When unset the
    /// buffer lives under the platform data directory.
    pub buffer_file: Option<String>,
    /// Persist the buffer after every mutation (edit, import, paste, clear).
    /// When false the buffer is only written on /save and on exit.
    #[serde(default = "default_true")]
    pub autosave: bool,
}

fn default_section_delimiter() -> String {
    "---".into()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            section_delimiter: default_section_delimiter(),
            buffer_file: None,
            autosave: true,
        }
    }
}

/// Which view the application starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StartView {
    /// Markdown editor with live preview
    Editor,
    /// Streaming chat transcript
    Chat,
}

impl std::fmt::Display for StartView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartView::Editor => write!(f, "editor"),
            StartView::Chat => write!(f, "chat"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Colour theme for highlighted code blocks: "dark" | "light"
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Show line numbers in code blocks
    #[serde(default)]
    pub code_line_numbers: bool,
    /// Width used for markdown wrapping (0 = auto)
    #[serde(default)]
    pub wrap_width: u16,
    /// Use plain ASCII borders/indicators instead of Unicode box-drawing
    /// characters.  Enable this when the terminal font lacks wide Unicode
    /// support.  Can also be forced with the MDGPT_ASCII_BORDERS=1
    /// environment variable.
    #[serde(default)]
    pub ascii_borders: bool,
}

fn default_theme() -> String {
    "dark".into()
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            code_line_numbers: false,
            wrap_width: 0,
            ascii_borders: false,
        }
    }
}

impl EditorConfig {
    /// Resolve the persisted-buffer path: the configured override (with `~`
    /// expansion) or `<data_dir>/mdgpt/buffer.md`.
    pub fn buffer_path(&self) -> std::path::PathBuf {
        if let Some(p) = &self.buffer_file {
            return std::path::PathBuf::from(shellexpand::tilde(p).into_owned());
        }
        dirs::data_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("mdgpt")
            .join("buffer.md")
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
