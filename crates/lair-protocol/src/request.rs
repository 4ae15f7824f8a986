//! Client-to-server request envelope.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::CommandRef;

/// One-way hash of the operator's password.
///
/// The raw password never leaves the client; only these bytes travel.
#[derive(Clone, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CredentialHash(Vec<u8>);

impl CredentialHash {
    /// Wraps digest bytes produced by the client.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "CredentialHash(<{} bytes>)", self.0.len())
    }
}

/// Request sent from the client for every authentication attempt and command.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Request {
    /// Login the request is made on behalf of.
    pub login: String,
    /// Hash of the login's password.
    pub credential_hash: CredentialHash,
    /// Either the authentication intent or the command to run.
    pub body: RequestBody,
}

/// Payload distinguishing authentication requests from command requests.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestBody {
    /// Sign in, or register a new account when `registering` is set.
    Auth {
        /// Whether the login should be created rather than checked.
        registering: bool,
    },
    /// Run a command as an already registered login.
    Command {
        /// The command and its arguments.
        command: CommandRef,
    },
}

impl Request {
    /// Builds an authentication request.
    #[must_use]
    pub fn auth(login: impl Into<String>, credential_hash: CredentialHash, registering: bool) -> Self {
        Self {
            login: login.into(),
            credential_hash,
            body: RequestBody::Auth { registering },
        }
    }

    /// Builds a command request.
    #[must_use]
    pub fn command(
        login: impl Into<String>,
        credential_hash: CredentialHash,
        command: CommandRef,
    ) -> Self {
        Self {
            login: login.into(),
            credential_hash,
            body: RequestBody::Command { command },
        }
    }

    /// Returns the command when this is a command request.
    #[must_use]
    pub const fn command_ref(&self) -> Option<&CommandRef> {
        match &self.body {
            RequestBody::Command { command } => Some(command),
            RequestBody::Auth { .. } => None,
        }
    }
}
