//! Sign-in and registration handshake.

use std::fmt::Display;
use std::io::Write;

use lair_protocol::Request;
use tracing::debug;

use crate::connection::ConnectionManager;
use crate::credentials::{Session, hash_password};
use crate::input::{self, InputError, InputSource};

const AUTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::auth");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthState {
    AwaitingCredentials,
    Connecting,
    AwaitingResponse,
    Authenticated,
    Retrying,
}

/// Notified of every state the [`Authenticator`] enters.
pub(crate) trait TransitionObserver {
    fn entered(&mut self, state: AuthState);
}

/// Observer used outside tests; transitions still reach the debug log.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Quiet;

impl TransitionObserver for Quiet {
    fn entered(&mut self, _state: AuthState) {}
}

impl<T: TransitionObserver + ?Sized> TransitionObserver for &mut T {
    fn entered(&mut self, state: AuthState) {
        (**self).entered(state);
    }
}

/// Drives the handshake until the server accepts a set of credentials.
///
/// There is no attempt limit; only exhausting the input source ends the loop
/// without a [`Session`].
#[derive(Debug)]
pub(crate) struct Authenticator<O = Quiet> {
    state: AuthState,
    observer: O,
}

impl Authenticator<Quiet> {
    pub(crate) const fn new() -> Self {
        Self::with_observer(Quiet)
    }
}

impl<O: TransitionObserver> Authenticator<O> {
    pub(crate) const fn with_observer(observer: O) -> Self {
        Self {
            state: AuthState::AwaitingCredentials,
            observer,
        }
    }

    fn enter(&mut self, next: AuthState) {
        debug!(target: AUTH_TARGET, from = ?self.state, to = ?next, "auth transition");
        self.state = next;
        self.observer.entered(next);
    }

    pub(crate) fn run(
        &mut self,
        input: &mut dyn InputSource,
        connection: &mut ConnectionManager,
        out: &mut dyn Write,
    ) -> Result<Session, InputError> {
        loop {
            self.enter(AuthState::AwaitingCredentials);
            let (registering, login, password) = match gather_credentials(input, out) {
                Ok(credentials) => credentials,
                Err(InputError::Format(message)) => {
                    report(out, message)?;
                    continue;
                }
                Err(error) => return Err(error),
            };
            let credential_hash = hash_password(&password);

            self.enter(AuthState::Connecting);
            let request = Request::auth(login.clone(), credential_hash.clone(), registering);
            if let Err(error) = connection.connect().and_then(|()| connection.send(&request)) {
                report(out, error)?;
                self.enter(AuthState::Retrying);
                continue;
            }

            self.enter(AuthState::AwaitingResponse);
            let response = match connection.receive() {
                Ok(response) => response,
                Err(error) => {
                    report(out, error)?;
                    self.enter(AuthState::Retrying);
                    continue;
                }
            };

            if !response.message.is_empty() {
                report(out, &response.message)?;
            }
            if response.successful_connect {
                self.enter(AuthState::Authenticated);
                return Ok(Session::new(login, credential_hash));
            }
        }
    }
}

impl Default for Authenticator<Quiet> {
    fn default() -> Self {
        Self::new()
    }
}

fn report(out: &mut dyn Write, message: impl Display) -> Result<(), InputError> {
    writeln!(out, "{message}").map_err(InputError::Io)
}

fn gather_credentials(
    input: &mut dyn InputSource,
    out: &mut dyn Write,
) -> Result<(bool, String, String), InputError> {
    let registering = input::need_registration(input, out)?;
    let login = input::input_login(input, out)?;
    let password = input::input_password(input, out)?;
    Ok((registering, login, password))
}
