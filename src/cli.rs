// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;
use mdgpt_config::StartView;

#[derive(Parser, Debug)]
#[command(
    name = "mdgpt",
    about = "A terminal markdown editor and streaming chat client",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional initial chat prompt; when given, the app starts in the chat
    /// view and sends it immediately
    #[arg(value_name = "PROMPT")]
    pub prompt: Option<String>,

    /// View to start in
    #[arg(long, value_enum, default_value = "editor")]
    pub view: StartView,

    /// Model to use, e.g. "gpt-4o-mini"
    #[arg(long, short = 'M', env = "MDGPT_MODEL")]
    pub model: Option<String>,

    /// Markdown file to import into the editor buffer at startup
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Path to config file (overrides auto-discovery)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print the effective configuration and exit
    ShowConfig,
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "mdgpt", &mut std::io::stdout());
}
