//! Domain errors raised while serving a request.

use lair_protocol::Response;
use thiserror::Error;

/// Reasons a request could not be carried out.
///
/// Every variant is reported to the client as a message-only [`Response`];
/// none of them ends the connection.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Registration used a login that is already taken.
    #[error("user '{login}' already exists")]
    UserAlreadyExists {
        /// Requested login.
        login: String,
    },

    /// Sign-in or command used a login nobody registered.
    #[error("user '{login}' does not exist")]
    UnknownUser {
        /// Offered login.
        login: String,
    },

    /// The credential hash does not match the stored one.
    #[error("wrong password")]
    WrongPassword,

    /// The command name is not part of the catalogue.
    #[error("unknown command '{name}'")]
    UnknownCommand {
        /// Offered command name.
        name: String,
    },

    /// Arguments were missing, mistyped, or out of range.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        /// What was wrong.
        message: String,
    },

    /// No record carries the requested id.
    #[error("no dragon with id {id}")]
    NoSuchId {
        /// Requested id.
        id: i64,
    },

    /// No record names this killer.
    #[error("nobody named '{killer}' has slain a dragon")]
    NoSuchKiller {
        /// Requested killer name.
        killer: String,
    },

    /// The record belongs to a different account.
    #[error("dragon {id} belongs to another user")]
    NoRights {
        /// Requested id.
        id: i64,
    },

    /// The command only makes sense on the client side.
    #[error("'{name}' runs on the client and is never sent to the server")]
    ClientOnly {
        /// Command name.
        name: String,
    },

    /// Internal failure, for example a poisoned lock.
    #[error("internal error: {message}")]
    Internal {
        /// Failure description.
        message: String,
    },
}

impl DispatchError {
    /// Creates a duplicate registration error.
    pub fn user_already_exists(login: impl Into<String>) -> Self {
        Self::UserAlreadyExists {
            login: login.into(),
        }
    }

    /// Creates an unknown user error.
    pub fn unknown_user(login: impl Into<String>) -> Self {
        Self::UnknownUser {
            login: login.into(),
        }
    }

    /// Creates an unknown command error.
    pub fn unknown_command(name: impl Into<String>) -> Self {
        Self::UnknownCommand { name: name.into() }
    }

    /// Creates an invalid arguments error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }

    /// Creates a missing killer error.
    pub fn no_such_killer(killer: impl Into<String>) -> Self {
        Self::NoSuchKiller {
            killer: killer.into(),
        }
    }

    /// Creates a client-only command error.
    pub fn client_only(name: impl Into<String>) -> Self {
        Self::ClientOnly { name: name.into() }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Response reporting this error; both flags stay false.
    #[must_use]
    pub fn to_response(&self) -> Response {
        Response::message(self.to_string())
    }
}
