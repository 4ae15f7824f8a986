//! Commands the server understands, with their help text.

use strum::{EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum ServerCommand {
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

impl ServerCommand {
    pub(crate) fn name(self) -> &'static str {
        self.into()
    }

    const fn synopsis(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Info => "info",
            Self::Show => "show",
            Self::Add => "add {dragon}",
            Self::Update => "update <id> {dragon}",
            Self::RemoveById => "remove_by_id <id>",
            Self::RemoveAnyByKiller => "remove_any_by_killer <killer>",
            Self::RemoveFirst => "remove_first",
            Self::RemoveGreater => "remove_greater {dragon}",
            Self::Clear => "clear",
            Self::History => "history",
            Self::PrintDescending => "print_descending",
            Self::PrintFieldDescendingAge => "print_field_descending_age",
            Self::ExecuteScript => "execute_script <file>",
            Self::Exit => "exit",
        }
    }

    const fn description(self) -> &'static str {
        match self {
            Self::Help => "list the available commands",
            Self::Info => "print information about the collection",
            Self::Show => "print every dragon in the collection",
            Self::Add => "add a new dragon owned by you",
            Self::Update => "replace the fields of one of your dragons",
            Self::RemoveById => "remove one of your dragons by id",
            Self::RemoveAnyByKiller => "remove one of your dragons slain by the given killer",
            Self::RemoveFirst => "remove the first dragon if it is yours",
            Self::RemoveGreater => "remove your dragons that outrank the given one",
            Self::Clear => "remove all of your dragons",
            Self::History => "print your last 12 commands",
            Self::PrintDescending => "print the collection from the highest rank down",
            Self::PrintFieldDescendingAge => "print every dragon's age, highest first",
            Self::ExecuteScript => "read and run commands from a file",
            Self::Exit => "end the session",
        }
    }

    pub(crate) fn help_line(self) -> String {
        format!("{} - {}", self.synopsis(), self.description())
    }
}
