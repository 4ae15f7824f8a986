//! Registered accounts and credential checks.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use lair_protocol::CredentialHash;

use crate::dispatch::DispatchError;

/// Logins mapped to the credential hash supplied at registration.
#[derive(Debug, Default)]
pub(crate) struct AccountRegistry {
    accounts: HashMap<String, CredentialHash>,
}

impl AccountRegistry {
    /// Creates an account, refusing logins that are already taken.
    pub(crate) fn register(
        &mut self,
        login: &str,
        credential_hash: &CredentialHash,
    ) -> Result<(), DispatchError> {
        if login.trim().is_empty() {
            return Err(DispatchError::invalid_arguments("login must not be empty"));
        }
        match self.accounts.entry(login.to_owned()) {
            Entry::Occupied(_) => Err(DispatchError::user_already_exists(login)),
            Entry::Vacant(slot) => {
                slot.insert(credential_hash.clone());
                Ok(())
            }
        }
    }

    /// Checks a login against its stored hash.
    pub(crate) fn verify(
        &self,
        login: &str,
        credential_hash: &CredentialHash,
    ) -> Result<(), DispatchError> {
        match self.accounts.get(login) {
            None => Err(DispatchError::unknown_user(login)),
            Some(stored) if stored == credential_hash => Ok(()),
            Some(_) => Err(DispatchError::WrongPassword),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.accounts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> CredentialHash {
        CredentialHash::new(vec![byte; 64])
    }

    #[test]
    fn registered_accounts_verify_with_the_same_hash() {
        let mut registry = AccountRegistry::default();
        registry.register("alice", &hash(1)).expect("register alice");

        assert!(registry.verify("alice", &hash(1)).is_ok());
        assert!(matches!(
            registry.verify("alice", &hash(2)),
            Err(DispatchError::WrongPassword)
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_logins_are_refused() {
        let mut registry = AccountRegistry::default();
        registry.register("alice", &hash(1)).expect("register alice");

        let error = registry
            .register("alice", &hash(2))
            .expect_err("second registration");
        assert!(matches!(error, DispatchError::UserAlreadyExists { .. }));
        assert!(registry.verify("alice", &hash(1)).is_ok());
    }

    #[test]
    fn unknown_logins_are_reported() {
        let registry = AccountRegistry::default();
        assert!(matches!(
            registry.verify("mallory", &hash(1)),
            Err(DispatchError::UnknownUser { .. })
        ));
    }

    #[test]
    fn blank_logins_cannot_register() {
        let mut registry = AccountRegistry::default();
        assert!(matches!(
            registry.register("  ", &hash(1)),
            Err(DispatchError::InvalidArguments { .. })
        ));
    }
}
