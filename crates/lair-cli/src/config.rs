//! Configuration loading helpers for the lair client.
//!
//! The logic here filters CLI arguments destined for `ortho_config` so the
//! loader only receives supported flags while the client parses the rest.

use std::ffi::{OsStr, OsString};

use lair_config::Config;

use crate::errors::AppError;

/// CLI flags recognised by the configuration loader.
///
/// Keep in sync with the fields of [`Config`].
pub(crate) const CONFIG_CLI_FLAGS: &[&str] =
    &["--config-path", "--server", "--log-filter", "--log-format"];

pub(crate) trait ConfigLoader {
    /// Loads configuration for the client.
    ///
    /// Configuration flags must appear before any client flags; later
    /// occurrences are handed to the client parser instead.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_args(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn process_config_flag(argument: &OsStr) -> FlagAction {
    let argument_text = argument.to_string_lossy();
    if !argument_text.starts_with("--") {
        return FlagAction::Skip;
    }

    match argument_text.split_once('=') {
        Some((flag, _)) if CONFIG_CLI_FLAGS.contains(&flag) => {
            FlagAction::Include { needs_value: false }
        }
        None if CONFIG_CLI_FLAGS.contains(&&*argument_text) => {
            FlagAction::Include { needs_value: true }
        }
        _ => FlagAction::Skip,
    }
}

#[derive(Debug, Default)]
pub(crate) struct ConfigArgumentSplit {
    /// Program name followed by the configuration flags.
    pub(crate) config_arguments: Vec<OsString>,
    /// Program name followed by everything else.
    pub(crate) cli_arguments: Vec<OsString>,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit::default();
    };

    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter();
    let mut cli_arguments = vec![program.clone()];

    while let Some(argument) = remaining.next() {
        match process_config_flag(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                if needs_value && let Some(value) = remaining.next() {
                    config_arguments.push(value.clone());
                }
            }
            FlagAction::Skip => {
                cli_arguments.push(argument.clone());
                cli_arguments.extend(remaining.by_ref().cloned());
                break;
            }
        }
    }

    ConfigArgumentSplit {
        config_arguments,
        cli_arguments,
    }
}
