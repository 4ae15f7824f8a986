use std::process::ExitCode;

fn main() -> ExitCode {
    match laird::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("laird: {error}");
            ExitCode::FAILURE
        }
    }
}
