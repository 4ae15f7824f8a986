//! Orchestrates the server from configuration to shutdown.

use std::sync::Arc;

use lair_config::telemetry;
use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader};
use crate::dispatch::DispatchConnectionHandler;
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Runs the server with the process configuration until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns [`LaunchError`] when configuration, telemetry, or the listener
/// cannot be set up.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(&SystemConfigLoader, &SystemShutdownSignal)
}

/// Runs the server with injected collaborators.
///
/// # Errors
///
/// Returns [`LaunchError`] when configuration, telemetry, or the listener
/// cannot be set up, or when waiting for shutdown fails.
pub fn run_daemon_with(
    loader: &dyn ConfigLoader,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let config = loader.load()?;
    telemetry::initialise(&config)?;
    info!(
        target: PROCESS_TARGET,
        endpoint = %config.server(),
        "starting lair server"
    );
    config.server().prepare_filesystem()?;

    let listener = SocketListener::bind(config.server())?;
    if let Some(addr) = listener.local_addr() {
        info!(target: PROCESS_TARGET, %addr, "bound tcp listener");
    }
    let handler = Arc::new(DispatchConnectionHandler::new());
    let serving = listener.start(handler)?;

    let waited = shutdown.wait();
    serving.stop()?;
    waited?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use lair_config::{Config, SocketEndpoint};

    use super::*;
    use crate::bootstrap::StaticConfigLoader;
    use crate::process::ShutdownError;

    struct Immediate;

    impl ShutdownSignal for Immediate {
        fn wait(&self) -> Result<(), ShutdownError> {
            Ok(())
        }
    }

    fn config(server: SocketEndpoint) -> Config {
        Config {
            server,
            ..Config::default()
        }
    }

    #[test]
    fn serves_until_shutdown_is_signalled() {
        let loader = StaticConfigLoader::new(config(SocketEndpoint::tcp("127.0.0.1", 0)));
        run_daemon_with(&loader, &Immediate).expect("clean shutdown");
    }

    #[cfg(unix)]
    #[test]
    fn unix_endpoints_get_their_directory_and_are_cleaned_up() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("run").join("laird.sock");
        let endpoint = SocketEndpoint::unix(path.to_str().expect("utf8 path"));

        run_daemon_with(&StaticConfigLoader::new(config(endpoint)), &Immediate)
            .expect("clean shutdown");

        assert!(path.parent().is_some_and(std::path::Path::is_dir));
        assert!(!path.exists());
    }

    #[test]
    fn occupied_ports_fail_the_launch() {
        let taken = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind probe");
        let port = taken.local_addr().expect("probe address").port();
        let loader = StaticConfigLoader::new(config(SocketEndpoint::tcp("127.0.0.1", port)));

        let error = run_daemon_with(&loader, &Immediate).expect_err("port in use");
        assert!(matches!(error, LaunchError::Listener(_)));
    }
}
