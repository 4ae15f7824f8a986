//! Authenticator scenarios against a fake server.

use std::io::Cursor;

use anyhow::Result;
use lair_protocol::{RequestBody, Response};

use super::support::{FakeServer, Reply, cooperative, unused_endpoint};
use crate::auth::AuthState::{
    AwaitingCredentials, AwaitingResponse, Authenticated, Connecting, Retrying,
};
use crate::auth::{AuthState, Authenticator, TransitionObserver};
use crate::connection::ConnectionManager;
use crate::credentials::hash_password;
use crate::input::{InputError, LineInput};

/// Keeps every state the authenticator passes through.
#[derive(Default)]
struct Recorded(Vec<AuthState>);

impl TransitionObserver for Recorded {
    fn entered(&mut self, state: AuthState) {
        self.0.push(state);
    }
}

fn operator(text: &str) -> LineInput<Cursor<Vec<u8>>> {
    LineInput::interactive(Cursor::new(text.as_bytes().to_vec()), false)
}

#[test]
fn wrong_password_returns_to_credentials_until_accepted() -> Result<()> {
    let accepted = hash_password("right");
    let server = FakeServer::spawn(move |request| {
        Reply::Respond(if request.credential_hash == accepted {
            Response::connected("Welcome, alice")
        } else {
            Response::message("Wrong password")
        })
    })?;
    let mut connection = ConnectionManager::new(server.endpoint());
    let mut input = operator("no\nalice\nwrong\nno\nalice\nright\n");
    let mut out = Vec::new();
    let mut seen = Recorded::default();

    let session = Authenticator::with_observer(&mut seen).run(&mut input, &mut connection, &mut out)?;

    assert_eq!(session.login(), "alice");
    assert_eq!(
        seen.0,
        [
            AwaitingCredentials,
            Connecting,
            AwaitingResponse,
            AwaitingCredentials,
            Connecting,
            AwaitingResponse,
            Authenticated,
        ]
    );
    let printed = String::from_utf8(out)?;
    assert!(printed.contains("Wrong password"));
    assert!(printed.contains("Welcome, alice"));
    assert_eq!(server.requests()?.len(), 2);
    Ok(())
}

#[test]
fn unavailable_server_retries_until_input_runs_out() -> Result<()> {
    let mut connection = ConnectionManager::new(unused_endpoint()?);
    let mut input = operator("no\nalice\nsecret\n");
    let mut out = Vec::new();
    let mut seen = Recorded::default();

    let result = Authenticator::with_observer(&mut seen).run(&mut input, &mut connection, &mut out);

    assert!(matches!(result, Err(InputError::Exhausted)));
    assert_eq!(
        seen.0,
        [AwaitingCredentials, Connecting, Retrying, AwaitingCredentials]
    );
    assert!(String::from_utf8(out)?.contains("Server is temporarily unavailable"));
    Ok(())
}

#[test]
fn dropped_response_restarts_from_credentials() -> Result<()> {
    let mut attempts = 0;
    let server = FakeServer::spawn(move |request| {
        attempts += 1;
        if attempts == 1 {
            Reply::Hangup
        } else {
            cooperative(request)
        }
    })?;
    let mut connection = ConnectionManager::new(server.endpoint());
    let mut input = operator("no\nalice\nsecret\nno\nalice\nsecret\n");
    let mut out = Vec::new();
    let mut seen = Recorded::default();

    Authenticator::with_observer(&mut seen).run(&mut input, &mut connection, &mut out)?;

    assert_eq!(
        seen.0,
        [
            AwaitingCredentials,
            Connecting,
            AwaitingResponse,
            Retrying,
            AwaitingCredentials,
            Connecting,
            AwaitingResponse,
            Authenticated,
        ]
    );
    assert!(connection.is_connected());
    Ok(())
}

#[test]
fn half_written_response_drops_the_channel_before_retrying() -> Result<()> {
    let mut attempts = 0;
    let server = FakeServer::spawn(move |request| {
        attempts += 1;
        if attempts == 1 {
            Reply::Truncated(String::from("{\"successful_connect\":true,\"mess"))
        } else {
            cooperative(request)
        }
    })?;
    let mut connection = ConnectionManager::new(server.endpoint());
    let mut input = operator("no\nalice\nsecret\nno\nalice\nsecret\n");
    let mut out = Vec::new();
    let mut seen = Recorded::default();

    let session =
        Authenticator::with_observer(&mut seen).run(&mut input, &mut connection, &mut out)?;

    assert_eq!(session.login(), "alice");
    assert_eq!(seen.0.iter().filter(|state| **state == Retrying).count(), 1);
    let printed = String::from_utf8(out)?;
    assert!(printed.contains("connection to the server was lost"));
    assert!(!printed.contains("malformed"));
    assert_eq!(server.requests()?.len(), 2);
    Ok(())
}

#[test]
fn registration_intent_and_hash_travel_with_the_request() -> Result<()> {
    let server = FakeServer::spawn(cooperative)?;
    let mut connection = ConnectionManager::new(server.endpoint());
    let mut input = operator("yes\nbob\nhoard\n");
    let mut out = Vec::new();

    Authenticator::new().run(&mut input, &mut connection, &mut out)?;

    let requests = server.requests()?;
    let request = requests.first().expect("one auth request");
    assert_eq!(request.login, "bob");
    assert_eq!(request.credential_hash, hash_password("hoard"));
    assert_eq!(request.body, RequestBody::Auth { registering: true });
    Ok(())
}
