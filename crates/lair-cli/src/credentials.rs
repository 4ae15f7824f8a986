//! Credential hashing and the authenticated session.

use lair_protocol::{CommandRef, CredentialHash, Request};
use sha2::{Digest, Sha512};

/// Hashes a raw password with SHA-512.
pub(crate) fn hash_password(password: &str) -> CredentialHash {
    CredentialHash::new(Sha512::digest(password.as_bytes()).to_vec())
}

/// Credentials accepted by the server, fixed for the rest of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    login: String,
    credential_hash: CredentialHash,
}

impl Session {
    pub(crate) const fn new(login: String, credential_hash: CredentialHash) -> Self {
        Self {
            login,
            credential_hash,
        }
    }

    pub(crate) fn login(&self) -> &str {
        &self.login
    }

    /// Wraps `command` in a request carrying this session's credentials.
    pub(crate) fn request(&self, command: CommandRef) -> Request {
        Request::command(self.login.clone(), self.credential_hash.clone(), command)
    }
}
