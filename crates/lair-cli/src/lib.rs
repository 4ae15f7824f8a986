//! Interactive client runtime for a lair collection server.
//!
//! The runtime loads configuration, signs the operator in, and then reads
//! commands from stdin (or from script files named by `execute_script`),
//! sending each one to the server and printing the response. IO streams and
//! the configuration loader can be substituted so tests drive the whole flow
//! against a fake server.

use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use lair_config::telemetry;
use tracing::debug;

mod auth;
mod cli;
mod commands;
mod config;
mod connection;
mod credentials;
mod errors;
mod input;
mod session;
mod transport;

pub use cli::PromptMode;

use auth::Authenticator;
use cli::Cli;
use commands::Dispatcher;
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use connection::ConnectionManager;
use errors::AppError;
use input::{InputError, LineInput};
use session::{LoopExit, SessionLoop};

const RUNTIME_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::runtime");

/// Bundles the IO streams handed to the client runtime.
pub(crate) struct IoStreams<'a, R, W, E> {
    pub(crate) stdin: R,
    pub(crate) stdin_is_terminal: bool,
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

/// Runs the client with the provided arguments and IO handles.
///
/// Returns success when the operator exits or input runs out, and failure
/// for configuration problems or when the server connection is lost before
/// any command completed.
#[must_use]
pub fn run<I, R, W, E>(
    args: I,
    stdin: R,
    stdout: &mut W,
    stderr: &mut E,
    stdin_is_terminal: bool,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write,
    E: Write,
{
    let io = IoStreams {
        stdin,
        stdin_is_terminal,
        stdout,
        stderr,
    };
    run_with_loader(args, io, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, R, W, E, L>(
    args: I,
    io: IoStreams<'_, R, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let IoStreams {
        stdin,
        stdin_is_terminal,
        stdout,
        stderr,
    } = io;
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let cli = match Cli::try_parse_from(&split.cli_arguments) {
        Ok(cli) => cli,
        // Help and version output are not errors.
        Err(error) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => return report(stderr, &AppError::CliUsage(error)),
    };

    let result = loader.load(&split.config_arguments).and_then(|config| {
        telemetry::initialise(&config)?;
        let prompts = cli.prompt.resolve(stdin_is_terminal);
        let mut input = LineInput::interactive(stdin, prompts);
        let mut connection = ConnectionManager::new(config.server().clone());
        debug!(target: RUNTIME_TARGET, endpoint = %connection.endpoint(), "client starting");
        session(&mut input, &mut connection, &mut *stdout)
    });

    match result {
        Ok(exit) => {
            debug!(target: RUNTIME_TARGET, ?exit, "client finished");
            let _ = stdout.flush();
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = stdout.flush();
            report(stderr, &error)
        }
    }
}

/// Authenticates and runs the root session loop.
fn session<R: BufRead>(
    input: &mut LineInput<R>,
    connection: &mut ConnectionManager,
    out: &mut dyn Write,
) -> Result<LoopExit, AppError> {
    let session = match Authenticator::new().run(input, connection, out) {
        Ok(session) => session,
        Err(InputError::Exhausted) => return Ok(LoopExit::InputExhausted),
        Err(error) => return Err(AppError::Input(error)),
    };
    let dispatcher = Dispatcher::new();
    let exit = SessionLoop::new(connection, &dispatcher, &session, input, out)
        .run()
        .map_err(AppError::Input)?;
    connection.disconnect();
    match exit {
        LoopExit::TransportLost => Err(AppError::TransportLost),
        other => Ok(other),
    }
}

fn report<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    let _ = writeln!(stderr, "{error}");
    ExitCode::FAILURE
}
