//! CLI entrypoint for the lair client.
//!
//! The binary delegates to [`lair_cli::run`], which loads configuration,
//! signs the operator in, and relays commands to the configured server.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

fn main() -> ExitCode {
    let stdin_is_terminal = io::stdin().is_terminal();
    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    lair_cli::run(
        std::env::args_os(),
        stdin,
        &mut stdout,
        &mut stderr,
        stdin_is_terminal,
    )
}
