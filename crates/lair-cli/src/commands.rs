//! The closed set of client commands and the dispatcher that resolves them.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use lair_protocol::{Argument, CommandRef};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::input::{self, InputError, InputSource};

/// Every command the client understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum Command {
    Help,
    Info,
    Show,
    Add,
    Update,
    RemoveById,
    RemoveAnyByKiller,
    RemoveFirst,
    RemoveGreater,
    Clear,
    History,
    PrintDescending,
    PrintFieldDescendingAge,
    ExecuteScript,
    Exit,
}

/// Outcome of a command's local phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Invocation {
    /// Send the command to the server with these arguments.
    Remote(Vec<Argument>),
    /// Run the script at this canonical path locally.
    Script(PathBuf),
}

impl Command {
    pub(crate) fn name(self) -> &'static str {
        self.into()
    }

    /// Collects and validates the command's arguments without contacting the
    /// server.
    pub(crate) fn gather_arguments(
        self,
        input: &mut dyn InputSource,
        out: &mut dyn Write,
    ) -> Result<Invocation, InputError> {
        let arguments = match self {
            Self::Add | Self::RemoveGreater => {
                vec![Argument::Record(input::input_record(input, out)?)]
            }
            Self::Update => {
                let id = input::input_id(input, out)?;
                let draft = input::input_record(input, out)?;
                vec![Argument::Integer(id), Argument::Record(draft)]
            }
            Self::RemoveById => vec![Argument::Integer(input::input_id(input, out)?)],
            Self::RemoveAnyByKiller => vec![Argument::Text(input::input_killer(input, out)?)],
            Self::ExecuteScript => {
                return input::input_file_path(input, out).map(Invocation::Script);
            }
            Self::Help
            | Self::Info
            | Self::Show
            | Self::RemoveFirst
            | Self::Clear
            | Self::History
            | Self::PrintDescending
            | Self::PrintFieldDescendingAge
            | Self::Exit => Vec::new(),
        };
        Ok(Invocation::Remote(arguments))
    }

    pub(crate) fn to_wire(self, arguments: Vec<Argument>) -> CommandRef {
        CommandRef::new(self.name(), arguments)
    }
}

/// Maps command names to commands. Built once and shared by every session
/// loop, nested or not.
#[derive(Debug)]
pub(crate) struct Dispatcher {
    commands: HashMap<&'static str, Command>,
}

impl Dispatcher {
    pub(crate) fn new() -> Self {
        Self {
            commands: Command::iter()
                .map(|command| (command.name(), command))
                .collect(),
        }
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<Command> {
        self.commands.get(name).copied()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
