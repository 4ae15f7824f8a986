//! Command payloads carried inside command requests.

use serde::{Deserialize, Serialize};

/// A named command plus the arguments its client-side handler gathered.
///
/// Built once per invocation and never modified after it is sent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CommandRef {
    /// Command name as typed by the operator, for example `show`.
    pub name: String,
    /// Arguments in the order the handler collected them.
    #[serde(default)]
    pub arguments: Vec<Argument>,
    /// Opaque handler-local data. The server never interprets it.
    #[serde(default)]
    pub client_state: serde_json::Value,
}

impl CommandRef {
    /// Creates a command reference without client state.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            arguments,
            client_state: serde_json::Value::Null,
        }
    }

    /// Attaches opaque handler-local data.
    #[must_use]
    pub fn with_client_state(mut self, state: serde_json::Value) -> Self {
        self.client_state = state;
        self
    }

    /// Returns the argument at `index` when it is an integer.
    #[must_use]
    pub fn integer(&self, index: usize) -> Option<i64> {
        match self.arguments.get(index) {
            Some(Argument::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns the argument at `index` when it is text.
    #[must_use]
    pub fn text(&self, index: usize) -> Option<&str> {
        match self.arguments.get(index) {
            Some(Argument::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the argument at `index` when it is a record draft.
    #[must_use]
    pub fn record(&self, index: usize) -> Option<&RecordDraft> {
        match self.arguments.get(index) {
            Some(Argument::Record(draft)) => Some(draft),
            _ => None,
        }
    }
}

/// A typed argument value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Argument {
    /// Whole number, typically a record identifier.
    Integer(i64),
    /// Free-form text.
    Text(String),
    /// Field values for a new or replacement record.
    Record(RecordDraft),
}

/// Field values supplied by the operator for a record.
///
/// The server assigns the identifier, owner, and creation time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecordDraft {
    /// Display name; never empty.
    pub name: String,
    /// Age in years; always positive.
    pub age: u32,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Name of whoever slew the dragon, if anyone did.
    #[serde(default)]
    pub killer: Option<String>,
}
