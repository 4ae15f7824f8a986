//! The command loop shared by operator input and script files.

use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use lair_protocol::{Argument, Response};
use tracing::debug;

use crate::commands::{Command, Dispatcher, Invocation};
use crate::connection::{ConnectionError, ConnectionManager};
use crate::credentials::Session;
use crate::input::{InputError, InputMode, InputSource, LineInput};

const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// Why a session loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopExit {
    /// The input source ran out of lines.
    InputExhausted,
    /// The server asked the client to terminate, or `exit` could not reach it.
    ExitRequested,
    /// The channel to the server broke and this loop cannot carry on.
    TransportLost,
    /// A script named a command that does not exist.
    UnknownCommand,
}

pub(crate) struct SessionLoop<'a> {
    connection: &'a mut ConnectionManager,
    dispatcher: &'a Dispatcher,
    session: &'a Session,
    input: &'a mut dyn InputSource,
    out: &'a mut dyn Write,
    completed: usize,
}

impl<'a> SessionLoop<'a> {
    pub(crate) fn new(
        connection: &'a mut ConnectionManager,
        dispatcher: &'a Dispatcher,
        session: &'a Session,
        input: &'a mut dyn InputSource,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            connection,
            dispatcher,
            session,
            input,
            out,
            completed: 0,
        }
    }

    /// Reads and executes commands until the source is exhausted or a
    /// terminal condition is reached.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Io`] when the input or output stream fails.
    pub(crate) fn run(&mut self) -> Result<LoopExit, InputError> {
        loop {
            match self.step() {
                Ok(None) => {}
                Ok(Some(exit)) => return Ok(exit),
                Err(InputError::Exhausted) => return Ok(LoopExit::InputExhausted),
                Err(error) => return Err(error),
            }
        }
    }

    fn step(&mut self) -> Result<Option<LoopExit>, InputError> {
        let name = self.input.next_command(&mut *self.out)?;
        let Some(command) = self.dispatcher.resolve(&name) else {
            self.say(format_args!(
                "Unknown command '{name}'. Type help for the list of commands"
            ))?;
            return Ok(match self.input.mode() {
                InputMode::Interactive => None,
                InputMode::Script => Some(LoopExit::UnknownCommand),
            });
        };

        let invocation = match command.gather_arguments(&mut *self.input, &mut *self.out) {
            Ok(invocation) => invocation,
            Err(InputError::Format(message)) => {
                self.say(message)?;
                return Ok(None);
            }
            Err(error) => return Err(error),
        };

        match invocation {
            Invocation::Script(path) => self.include_script(&path),
            Invocation::Remote(arguments) => self.round_trip(command, arguments),
        }
    }

    fn round_trip(
        &mut self,
        command: Command,
        arguments: Vec<Argument>,
    ) -> Result<Option<LoopExit>, InputError> {
        let request = self.session.request(command.to_wire(arguments));
        debug!(
            target: SESSION_TARGET,
            command = command.name(),
            login = self.session.login(),
            "dispatching command"
        );

        if let Err(error) = self.connection.connect() {
            self.say(error)?;
            return Ok((command == Command::Exit).then_some(LoopExit::ExitRequested));
        }

        let response = match self
            .connection
            .send(&request)
            .and_then(|()| self.connection.receive())
        {
            Ok(response) => response,
            Err(error) => {
                self.say(&error)?;
                return Ok(self.after_failure(command, &error));
            }
        };

        self.completed += 1;
        self.render(&response)?;
        Ok(response.to_exit.then_some(LoopExit::ExitRequested))
    }

    /// Decides whether a failed round trip ends this loop.
    fn after_failure(&self, command: Command, error: &ConnectionError) -> Option<LoopExit> {
        if command == Command::Exit {
            return Some(LoopExit::ExitRequested);
        }
        if !error.is_transport() {
            return None;
        }
        // The root loop survives a broken channel once it has talked to the
        // server; the next command reconnects.
        let nested = self.connection.active_script_depth() > 0;
        (nested || self.completed == 0).then_some(LoopExit::TransportLost)
    }

    fn include_script(&mut self, path: &Path) -> Result<Option<LoopExit>, InputError> {
        let dispatcher = self.dispatcher;
        let session = self.session;
        let out = &mut *self.out;
        let outcome = self.connection.enter_script(path, |connection| {
            let mut script = LineInput::open_script(path)?;
            SessionLoop::new(connection, dispatcher, session, &mut script, &mut *out).run()
        });

        match outcome {
            Err(prevented) => {
                self.say(prevented)?;
                Ok(None)
            }
            Ok(Ok(LoopExit::ExitRequested)) => Ok(Some(LoopExit::ExitRequested)),
            Ok(Ok(exit)) => {
                debug!(target: SESSION_TARGET, script = %path.display(), ?exit, "script finished");
                Ok(None)
            }
            Ok(Err(error)) => {
                self.say(format_args!("Script '{}' stopped: {error}", path.display()))?;
                Ok(None)
            }
        }
    }

    fn render(&mut self, response: &Response) -> Result<(), InputError> {
        match &response.result_records {
            Some(records) => {
                for record in records {
                    self.say(record)?;
                }
                Ok(())
            }
            None if response.message.is_empty() => Ok(()),
            None => self.say(&response.message),
        }
    }

    fn say(&mut self, message: impl Display) -> Result<(), InputError> {
        writeln!(self.out, "{message}").map_err(InputError::Io)
    }
}
