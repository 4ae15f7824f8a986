//! Connection manager owning the server channel and the script guard.
//!
//! `connect`, `send`, and `receive` are deliberately separate calls: the
//! authenticator and the session loop retry `connect` on their own terms and a
//! single channel is reused for any number of round trips. Any failure that
//! leaves the channel in an unknown state drops it, so the next `connect`
//! dials the server again.

mod scripts;

use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use lair_config::SocketEndpoint;
use lair_protocol::{EnvelopeError, Request, Response, read_envelope, write_envelope};
use thiserror::Error;
use tracing::debug;

use crate::transport::{self, Connection};

pub(crate) use scripts::{ActiveScriptPaths, RecursionPrevented};

const CONNECTION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::connection");

/// Failures raised while talking to the server.
#[derive(Debug, Error)]
pub(crate) enum ConnectionError {
    #[error("Server is temporarily unavailable ({endpoint}): {source}")]
    ServerUnavailable {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    #[error("connection to the server was lost: {0}")]
    Transport(#[source] EnvelopeError),
    #[error("the server closed the connection")]
    Closed,
    #[error("not connected to the server")]
    NotConnected,
    #[error("the server sent a malformed response: {0}")]
    MalformedEnvelope(#[source] EnvelopeError),
}

impl ConnectionError {
    /// Whether the channel is gone and must be re-established.
    pub(crate) const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Closed | Self::NotConnected)
    }
}

pub(crate) struct ConnectionManager {
    endpoint: SocketEndpoint,
    channel: Option<BufReader<Connection>>,
    scripts: ActiveScriptPaths,
}

impl ConnectionManager {
    pub(crate) fn new(endpoint: SocketEndpoint) -> Self {
        Self {
            endpoint,
            channel: None,
            scripts: ActiveScriptPaths::default(),
        }
    }

    pub(crate) const fn endpoint(&self) -> &SocketEndpoint {
        &self.endpoint
    }

    pub(crate) const fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Opens the channel unless it is already open.
    pub(crate) fn connect(&mut self) -> Result<(), ConnectionError> {
        if self.is_connected() {
            return Ok(());
        }
        debug!(target: CONNECTION_TARGET, endpoint = %self.endpoint, "connecting to server");
        let connection = transport::connect(&self.endpoint).map_err(|source| {
            ConnectionError::ServerUnavailable {
                endpoint: self.endpoint.to_string(),
                source,
            }
        })?;
        self.channel = Some(BufReader::new(connection));
        Ok(())
    }

    pub(crate) fn disconnect(&mut self) {
        if self.channel.take().is_some() {
            debug!(target: CONNECTION_TARGET, "connection closed");
        }
    }

    pub(crate) fn send(&mut self, request: &Request) -> Result<(), ConnectionError> {
        let channel = self.channel.as_mut().ok_or(ConnectionError::NotConnected)?;
        match write_envelope(channel.get_mut(), request) {
            Ok(()) => {
                debug!(target: CONNECTION_TARGET, login = %request.login, "request sent");
                Ok(())
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Blocks until the next response arrives.
    pub(crate) fn receive(&mut self) -> Result<Response, ConnectionError> {
        let channel = self.channel.as_mut().ok_or(ConnectionError::NotConnected)?;
        match read_envelope(channel) {
            Ok(Some(response)) => {
                debug!(target: CONNECTION_TARGET, "response received");
                Ok(response)
            }
            Ok(None) => {
                self.disconnect();
                Err(ConnectionError::Closed)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    fn fail(&mut self, error: EnvelopeError) -> ConnectionError {
        match error {
            EnvelopeError::Read(_) | EnvelopeError::Write(_) => {
                self.disconnect();
                ConnectionError::Transport(error)
            }
            EnvelopeError::Serialise(_) | EnvelopeError::Malformed(_) => {
                ConnectionError::MalformedEnvelope(error)
            }
            // The stream position is unknown after these.
            EnvelopeError::TooLarge { .. } | EnvelopeError::EmptyLines { .. } => {
                self.disconnect();
                ConnectionError::MalformedEnvelope(error)
            }
        }
    }

    /// Marks `path` as active. Returns `false` when it already was.
    pub(crate) fn add_to_paths(&mut self, path: PathBuf) -> bool {
        self.scripts.insert(path)
    }

    pub(crate) fn remove_from_paths(&mut self, path: &Path) -> bool {
        self.scripts.remove(path)
    }

    pub(crate) fn contains_path(&self, path: &Path) -> bool {
        self.scripts.contains(path)
    }

    /// Number of scripts currently running, which is also the nesting depth.
    pub(crate) fn active_script_depth(&self) -> usize {
        self.scripts.len()
    }

    /// Runs `run` with `path` marked active, removing it again afterwards
    /// whatever `run` returns.
    pub(crate) fn enter_script<T>(
        &mut self,
        path: &Path,
        run: impl FnOnce(&mut Self) -> T,
    ) -> Result<T, RecursionPrevented> {
        if self.contains_path(path) {
            return Err(RecursionPrevented {
                path: path.to_path_buf(),
            });
        }
        self.add_to_paths(path.to_path_buf());
        debug!(
            target: CONNECTION_TARGET,
            script = %path.display(),
            depth = self.active_script_depth(),
            "entering script"
        );
        let outcome = run(self);
        self.remove_from_paths(path);
        debug!(target: CONNECTION_TARGET, script = %path.display(), "leaving script");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn unused_endpoint() -> SocketEndpoint {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind probe listener");
        let port = listener.local_addr().expect("probe addr").port();
        drop(listener);
        SocketEndpoint::tcp("127.0.0.1", port)
    }

    #[test]
    fn unreachable_server_is_reported_as_unavailable() {
        let mut manager = ConnectionManager::new(unused_endpoint());
        let error = manager.connect().expect_err("nobody is listening");
        assert!(matches!(error, ConnectionError::ServerUnavailable { .. }));
        assert!(error.to_string().starts_with("Server is temporarily unavailable"));
        assert!(!manager.is_connected());
    }

    #[test]
    fn sending_without_a_channel_is_a_transport_error() {
        let mut manager = ConnectionManager::new(unused_endpoint());
        let request = Request::auth("alice", lair_protocol::CredentialHash::default(), false);
        let error = manager.send(&request).expect_err("no channel");
        assert!(error.is_transport());
    }

    #[test]
    fn nested_scripts_track_depth_and_unwind() {
        let mut manager = ConnectionManager::new(unused_endpoint());
        let outer = Path::new("/scripts/a.txt");
        let inner = Path::new("/scripts/b.txt");

        let result = manager.enter_script(outer, |manager| {
            assert_eq!(manager.active_script_depth(), 1);
            let nested = manager.enter_script(inner, |manager| {
                assert_eq!(manager.active_script_depth(), 2);
                manager.enter_script(outer, |_| ()).is_err()
            });
            assert_eq!(manager.active_script_depth(), 1);
            nested
        });

        assert!(matches!(result, Ok(Ok(true))));
        assert_eq!(manager.active_script_depth(), 0);
        assert!(!manager.contains_path(outer));
    }

    #[test]
    fn failing_scripts_still_leave_the_guard() {
        let mut manager = ConnectionManager::new(unused_endpoint());
        let path = Path::new("/scripts/broken.txt");
        let result: Result<Result<(), &str>, _> =
            manager.enter_script(path, |_| Err("script failed"));
        assert!(matches!(result, Ok(Err("script failed"))));
        assert_eq!(manager.active_script_depth(), 0);
    }
}
