//! Integration tests for the `lair` binary entry point.
//!
//! Verifies help output and that an unreachable server is reported without
//! failing the process when the operator's input simply runs out.

use std::net::TcpListener;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

fn unused_server() -> String {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind probe listener");
    let port = listener.local_addr().expect("probe addr").port();
    drop(listener);
    format!("tcp://127.0.0.1:{port}")
}

#[test]
fn help_lists_the_prompt_flag() {
    let mut command = cargo_bin_cmd!("lair");
    command.arg("--help");
    command.assert().success().stdout(contains("--prompt"));
}

#[test]
fn unreachable_server_is_reported_until_input_ends() {
    let mut command = cargo_bin_cmd!("lair");
    command
        .args(["--server", &unused_server(), "--prompt", "never"])
        .write_stdin("no\nalice\nsecret\n");
    command
        .assert()
        .success()
        .stdout(contains("Server is temporarily unavailable"));
}
