//! CLI argument definitions for the lair client.

use clap::{Parser, ValueEnum};

/// When to print prompts before reading operator input.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum PromptMode {
    /// Prompt only when stdin is a terminal.
    #[default]
    Auto,
    /// Always prompt.
    Always,
    /// Never prompt, for piped input.
    Never,
}

impl PromptMode {
    /// Resolves `auto` against the terminal status of stdin.
    #[must_use]
    pub const fn resolve(self, stdin_is_terminal: bool) -> bool {
        match self {
            Self::Auto => stdin_is_terminal,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Interactive client for a lair collection server.
#[derive(Parser, Debug)]
#[command(name = "lair", version)]
pub(crate) struct Cli {
    /// Controls whether prompts are printed before each read.
    #[arg(long, value_enum, default_value_t = PromptMode::Auto)]
    pub(crate) prompt: PromptMode,
}
