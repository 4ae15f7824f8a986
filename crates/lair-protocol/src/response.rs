//! Server-to-client response envelope.

use serde::{Deserialize, Serialize};

/// Answer to a single [`Request`](crate::Request).
///
/// Exactly one payload is meaningful per response: the exit flag, the result
/// records, or the message. `successful_connect` only matters while the
/// client is authenticating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Response {
    /// Whether an authentication request was accepted.
    pub successful_connect: bool,
    /// Human-readable outcome or error.
    pub message: String,
    /// Ordered result lines. `None` and an empty list are distinct.
    pub result_records: Option<Vec<String>>,
    /// Whether the client should terminate.
    pub to_exit: bool,
}

impl Response {
    /// A plain message, used for command outcomes and domain errors.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// An ordered list of result lines.
    #[must_use]
    pub fn records(records: Vec<String>) -> Self {
        Self {
            result_records: Some(records),
            ..Self::default()
        }
    }

    /// Instructs the client to terminate.
    #[must_use]
    pub fn exit() -> Self {
        Self {
            to_exit: true,
            ..Self::default()
        }
    }

    /// Accepts an authentication attempt.
    #[must_use]
    pub fn connected(message: impl Into<String>) -> Self {
        Self {
            successful_connect: true,
            message: message.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_records_serialise_differently() {
        let absent = serde_json::to_string(&Response::message("ok")).expect("serialise");
        let empty = serde_json::to_string(&Response::records(Vec::new())).expect("serialise");
        assert!(absent.contains(r#""result_records":null"#));
        assert!(empty.contains(r#""result_records":[]"#));
    }

    #[test]
    fn constructors_set_a_single_payload() {
        let exit = Response::exit();
        assert!(exit.to_exit);
        assert!(!exit.successful_connect);
        assert!(exit.result_records.is_none());

        let connected = Response::connected("welcome");
        assert!(connected.successful_connect);
        assert!(!connected.to_exit);
    }
}
