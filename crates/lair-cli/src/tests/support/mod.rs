//! Test support utilities for lair client behavioural coverage.
//!
//! Supplies a fake server, a static configuration loader, and a harness that
//! runs session loops against in-memory input so the scenarios stay focused
//! on their assertions.

mod fake_server;

use std::ffi::OsString;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lair_config::Config;
use lair_protocol::{Request, Response};

use crate::commands::Dispatcher;
use crate::config::ConfigLoader;
use crate::connection::ConnectionManager;
use crate::credentials::{Session, hash_password};
use crate::errors::AppError;
use crate::input::LineInput;
use crate::session::{LoopExit, SessionLoop};

pub(super) use fake_server::{FakeServer, Reply, unused_endpoint};

/// A config loader that returns a fixed configuration for tests.
pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Accepts every sign-in and answers commands predictably.
pub(super) fn cooperative(request: &Request) -> Reply {
    let Some(command) = request.command_ref() else {
        return Reply::Respond(Response::connected(format!("Welcome, {}", request.login)));
    };
    Reply::Respond(match command.name.as_str() {
        "show" => Response::records(vec![
            String::from("1 Smaug (171)"),
            String::from("2 Glaurung (250)"),
        ]),
        "exit" => Response::exit(),
        other => Response::message(format!("{other} done")),
    })
}

/// Runs session loops for an already authenticated operator.
pub(super) struct Harness {
    pub(super) server: Option<FakeServer>,
    pub(super) connection: ConnectionManager,
    pub(super) dispatcher: Dispatcher,
    pub(super) session: Session,
    pub(super) output: Vec<u8>,
}

impl Harness {
    pub(super) fn with_server<F>(responder: F) -> Result<Self>
    where
        F: FnMut(&Request) -> Reply + Send + 'static,
    {
        let server = FakeServer::spawn(responder)?;
        let connection = ConnectionManager::new(server.endpoint());
        Ok(Self::assemble(Some(server), connection))
    }

    pub(super) fn without_server() -> Result<Self> {
        let connection = ConnectionManager::new(unused_endpoint()?);
        Ok(Self::assemble(None, connection))
    }

    fn assemble(server: Option<FakeServer>, connection: ConnectionManager) -> Self {
        Self {
            server,
            connection,
            dispatcher: Dispatcher::new(),
            session: Session::new(String::from("alice"), hash_password("secret")),
            output: Vec::new(),
        }
    }

    pub(super) fn run_interactive(&mut self, text: &str) -> Result<LoopExit> {
        let mut input = LineInput::interactive(Cursor::new(text.as_bytes().to_vec()), false);
        SessionLoop::new(
            &mut self.connection,
            &self.dispatcher,
            &self.session,
            &mut input,
            &mut self.output,
        )
        .run()
        .context("interactive session loop")
    }

    pub(super) fn run_script(&mut self, text: &str) -> Result<LoopExit> {
        let mut input = LineInput::script(Cursor::new(text.as_bytes().to_vec()));
        SessionLoop::new(
            &mut self.connection,
            &self.dispatcher,
            &self.session,
            &mut input,
            &mut self.output,
        )
        .run()
        .context("script session loop")
    }

    pub(super) fn output(&self) -> Result<String> {
        String::from_utf8(self.output.clone()).context("output utf8")
    }

    pub(super) fn requests(&self) -> Result<Vec<Request>> {
        match &self.server {
            Some(server) => server.requests(),
            None => Ok(Vec::new()),
        }
    }

    pub(super) fn command_names(&self) -> Result<Vec<String>> {
        match &self.server {
            Some(server) => server.command_names(),
            None => Ok(Vec::new()),
        }
    }
}

/// Writes a script file and returns its canonical path.
pub(super) fn write_script(dir: &Path, name: &str, lines: &[String]) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(&path, contents).with_context(|| format!("write {name}"))?;
    fs::canonicalize(&path).with_context(|| format!("canonicalise {name}"))
}
