//! Routes requests to authentication or command execution.

use std::sync::{Mutex, MutexGuard};

use lair_protocol::{Request, RequestBody, Response};
use tracing::{debug, info};

use super::errors::DispatchError;
use super::executor::Lair;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Serialises access to the shared [`Lair`] across connection threads.
#[derive(Debug, Default)]
pub(crate) struct RequestRouter {
    lair: Mutex<Lair>,
}

impl RequestRouter {
    /// Answers a request. Failures become message-only responses.
    pub(crate) fn route(&self, request: &Request) -> Response {
        self.try_route(request).unwrap_or_else(|error| {
            debug!(
                target: DISPATCH_TARGET,
                login = %request.login,
                %error,
                "request refused"
            );
            error.to_response()
        })
    }

    fn try_route(&self, request: &Request) -> Result<Response, DispatchError> {
        let mut lair = self.lock()?;
        match &request.body {
            RequestBody::Auth { registering: true } => {
                lair.accounts
                    .register(&request.login, &request.credential_hash)?;
                info!(target: DISPATCH_TARGET, login = %request.login, "account registered");
                Ok(Response::connected(format!(
                    "Registered and signed in as {}",
                    request.login
                )))
            }
            RequestBody::Auth { registering: false } => {
                lair.accounts
                    .verify(&request.login, &request.credential_hash)?;
                info!(target: DISPATCH_TARGET, login = %request.login, "signed in");
                Ok(Response::connected(format!("Welcome, {}", request.login)))
            }
            RequestBody::Command { command } => {
                lair.accounts
                    .verify(&request.login, &request.credential_hash)?;
                lair.execute(&request.login, command)
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Lair>, DispatchError> {
        self.lair
            .lock()
            .map_err(|_| DispatchError::internal("collection lock poisoned"))
    }
}
