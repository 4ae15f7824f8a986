//! Shared server state and command execution.

use std::str::FromStr;

use lair_protocol::{CommandRef, RecordDraft, Response};
use strum::IntoEnumIterator;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::accounts::AccountRegistry;
use crate::history::CommandHistory;
use crate::store::RecordStore;

use super::catalogue::ServerCommand;
use super::errors::DispatchError;
use super::router::DISPATCH_TARGET;

/// Everything a request can read or change.
#[derive(Debug, Default)]
pub(crate) struct Lair {
    pub(crate) accounts: AccountRegistry,
    pub(crate) records: RecordStore,
    pub(crate) history: CommandHistory,
}

impl Lair {
    /// Runs one command on behalf of an already verified login.
    pub(crate) fn execute(
        &mut self,
        login: &str,
        command: &CommandRef,
    ) -> Result<Response, DispatchError> {
        let kind = ServerCommand::from_str(&command.name)
            .map_err(|_| DispatchError::unknown_command(&command.name))?;
        self.history.record(login, kind.name());
        debug!(target: DISPATCH_TARGET, login, command = kind.name(), "executing command");

        match kind {
            ServerCommand::Help => Ok(Response::records(
                ServerCommand::iter().map(ServerCommand::help_line).collect(),
            )),
            ServerCommand::Info => self.info(login).map(Response::message),
            ServerCommand::Show => Ok(Response::records(
                self.records.iter().map(ToString::to_string).collect(),
            )),
            ServerCommand::Add => {
                let draft = draft_argument(command, 0)?;
                let id = self.records.insert(login, draft);
                Ok(Response::message(format!("Added dragon {id}")))
            }
            ServerCommand::Update => {
                let id = id_argument(command, 0)?;
                let draft = draft_argument(command, 1)?;
                self.records.update(login, id, draft)?;
                Ok(Response::message(format!("Updated dragon {id}")))
            }
            ServerCommand::RemoveById => {
                let id = id_argument(command, 0)?;
                let removed = self.records.remove(login, id)?;
                Ok(Response::message(format!("Removed dragon {}", removed.id())))
            }
            ServerCommand::RemoveAnyByKiller => {
                let killer = killer_argument(command, 0)?;
                let removed = self.records.remove_any_by_killer(login, killer)?;
                Ok(Response::message(format!("Removed dragon {}", removed.id())))
            }
            ServerCommand::RemoveFirst => Ok(Response::message(
                match self.records.remove_first(login)? {
                    Some(removed) => format!("Removed dragon {}", removed.id()),
                    None => String::from("The collection is empty"),
                },
            )),
            ServerCommand::RemoveGreater => {
                let draft = draft_argument(command, 0)?;
                let removed = self.records.remove_greater(login, &draft);
                Ok(Response::message(format!("Removed {removed} of your dragons")))
            }
            ServerCommand::Clear => {
                let removed = self.records.clear(login);
                Ok(Response::message(format!("Removed {removed} of your dragons")))
            }
            ServerCommand::History => Ok(Response::records(self.history.recent(login))),
            ServerCommand::PrintDescending => Ok(Response::records(
                self.records
                    .descending()
                    .into_iter()
                    .map(ToString::to_string)
                    .collect(),
            )),
            ServerCommand::PrintFieldDescendingAge => Ok(Response::records(
                self.records
                    .ages_descending()
                    .into_iter()
                    .map(|age| age.to_string())
                    .collect(),
            )),
            ServerCommand::ExecuteScript => Err(DispatchError::client_only(kind.name())),
            ServerCommand::Exit => Ok(Response::exit()),
        }
    }

    fn info(&self, login: &str) -> Result<String, DispatchError> {
        let created = self
            .records
            .created_at()
            .format(&Rfc3339)
            .map_err(|error| DispatchError::internal(error.to_string()))?;
        Ok(format!(
            "Dragon collection created {created}: {} dragons, {} owned by {login}, {} registered users",
            self.records.len(),
            self.records.owned_by(login),
            self.accounts.len(),
        ))
    }
}

fn id_argument(command: &CommandRef, index: usize) -> Result<i64, DispatchError> {
    match command.integer(index) {
        Some(id) if id > 0 => Ok(id),
        _ => Err(DispatchError::invalid_arguments(format!(
            "argument {} of '{}' must be a positive id",
            index + 1,
            command.name
        ))),
    }
}

fn killer_argument(command: &CommandRef, index: usize) -> Result<&str, DispatchError> {
    match command.text(index).map(str::trim) {
        Some(killer) if !killer.is_empty() => Ok(killer),
        _ => Err(DispatchError::invalid_arguments(format!(
            "argument {} of '{}' must be a killer's name",
            index + 1,
            command.name
        ))),
    }
}

fn draft_argument(command: &CommandRef, index: usize) -> Result<RecordDraft, DispatchError> {
    let draft = command.record(index).ok_or_else(|| {
        DispatchError::invalid_arguments(format!(
            "argument {} of '{}' must be a dragon",
            index + 1,
            command.name
        ))
    })?;
    if draft.name.trim().is_empty() {
        return Err(DispatchError::invalid_arguments("dragon name must not be empty"));
    }
    if draft.age == 0 {
        return Err(DispatchError::invalid_arguments("dragon age must be positive"));
    }
    Ok(draft.clone())
}
