//! Per-login record of recently executed commands.

use std::collections::{HashMap, VecDeque};

/// Number of command names kept for each login.
pub(crate) const HISTORY_LIMIT: usize = 12;

#[derive(Debug, Default)]
pub(crate) struct CommandHistory {
    entries: HashMap<String, VecDeque<&'static str>>,
}

impl CommandHistory {
    pub(crate) fn record(&mut self, login: &str, command: &'static str) {
        let entries = self.entries.entry(login.to_owned()).or_default();
        if entries.len() == HISTORY_LIMIT {
            entries.pop_front();
        }
        entries.push_back(command);
    }

    /// Oldest first.
    pub(crate) fn recent(&self, login: &str) -> Vec<String> {
        self.entries
            .get(login)
            .map(|entries| entries.iter().map(|name| (*name).to_owned()).collect())
            .unwrap_or_default()
    }
}
