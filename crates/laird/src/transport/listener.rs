//! Accept loop for the server endpoint.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use lair_config::SocketEndpoint;
use tracing::{debug, info, warn};

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

#[cfg(unix)]
use std::os::unix::net::UnixListener;

/// Pause between polls when no client is waiting.
const IDLE_POLL: Duration = Duration::from_millis(25);
/// Pause after a failed `accept` before trying again.
const FAILURE_PAUSE: Duration = Duration::from_millis(150);

#[derive(Debug)]
enum BoundSocket {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl BoundSocket {
    fn set_nonblocking(&self) -> io::Result<()> {
        match self {
            Self::Tcp(socket) => socket.set_nonblocking(true),
            #[cfg(unix)]
            Self::Unix(socket) => socket.set_nonblocking(true),
        }
    }

    /// Accepts one pending client, if any. Accepted streams block.
    fn poll(&self) -> io::Result<Option<ConnectionStream>> {
        let accepted = match self {
            Self::Tcp(socket) => socket.accept().and_then(|(stream, _)| {
                stream.set_nonblocking(false)?;
                Ok(ConnectionStream::Tcp(stream))
            }),
            #[cfg(unix)]
            Self::Unix(socket) => socket.accept().and_then(|(stream, _)| {
                stream.set_nonblocking(false)?;
                Ok(ConnectionStream::Unix(stream))
            }),
        };
        match accepted {
            Ok(stream) => Ok(Some(stream)),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(error),
        }
    }
}

/// Socket bound to the configured endpoint, not yet accepting.
#[derive(Debug)]
pub(crate) struct SocketListener {
    endpoint: SocketEndpoint,
    socket: BoundSocket,
}

impl SocketListener {
    pub(crate) fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let socket = match endpoint {
            SocketEndpoint::Tcp { host, port } => BoundSocket::Tcp(bind_tcp(host, *port)?),
            #[cfg(unix)]
            SocketEndpoint::Unix { path } => {
                BoundSocket::Unix(unix::bind(path.as_std_path())?)
            }
            #[cfg(not(unix))]
            SocketEndpoint::Unix { .. } => {
                return Err(ListenerError::UnsupportedUnix {
                    endpoint: endpoint.to_string(),
                });
            }
        };
        Ok(Self {
            endpoint: endpoint.clone(),
            socket,
        })
    }

    /// Bound TCP address; differs from the configured one when port 0 was
    /// requested.
    pub(crate) fn local_addr(&self) -> Option<SocketAddr> {
        match &self.socket {
            BoundSocket::Tcp(socket) => socket.local_addr().ok(),
            #[cfg(unix)]
            BoundSocket::Unix(_) => None,
        }
    }

    /// Moves the socket onto a background thread that hands every accepted
    /// client to `handler` on a thread of its own.
    pub(crate) fn start(self, handler: Arc<dyn ConnectionHandler>) -> Result<Serving, ListenerError> {
        if let Err(source) = self.socket.set_nonblocking() {
            self.release();
            return Err(ListenerError::NonBlocking { source });
        }
        let stop = Arc::new(AtomicBool::new(false));
        let worker = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || self.accept_until(&stop, &handler))
        };
        Ok(Serving {
            stop,
            worker: Some(worker),
        })
    }

    fn accept_until(self, stop: &AtomicBool, handler: &Arc<dyn ConnectionHandler>) {
        info!(target: LISTENER_TARGET, endpoint = %self.endpoint, "lair server listening");
        let mut reported = None::<io::ErrorKind>;
        while !stop.load(Ordering::SeqCst) {
            match self.socket.poll() {
                Ok(Some(stream)) => {
                    reported = None;
                    debug!(target: LISTENER_TARGET, peer = %stream.peer(), "client connected");
                    let handler = Arc::clone(handler);
                    thread::spawn(move || handler.handle(stream));
                }
                Ok(None) => thread::sleep(IDLE_POLL),
                Err(error) => {
                    // Repeated failures of one kind are logged once.
                    if reported.replace(error.kind()) != Some(error.kind()) {
                        warn!(target: LISTENER_TARGET, %error, "socket accept error");
                    }
                    thread::sleep(FAILURE_PAUSE);
                }
            }
        }
        self.release();
        info!(target: LISTENER_TARGET, "lair server stopped accepting");
    }

    fn release(&self) {
        #[cfg(unix)]
        if let Some(path) = self.endpoint.unix_path() {
            unix::remove_socket_file(path.as_std_path());
        }
    }
}

/// Handle to a running accept loop. Dropping it stops the loop without
/// waiting for it.
pub(crate) struct Serving {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Serving {
    /// Stops accepting and waits for the accept thread. Connections already
    /// handed to the handler are left to finish on their own.
    pub(crate) fn stop(mut self) -> Result<(), ListenerError> {
        self.stop.store(true, Ordering::SeqCst);
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| ListenerError::ThreadPanic),
            None => Ok(()),
        }
    }
}

impl Drop for Serving {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?
        .next()
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}

#[cfg(unix)]
mod unix {
    use std::fs;
    use std::io;
    use std::os::unix::fs::FileTypeExt;
    use std::os::unix::net::{UnixListener, UnixStream};
    use std::path::Path;

    use tracing::warn;

    use super::{LISTENER_TARGET, ListenerError};

    pub(super) fn bind(path: &Path) -> Result<UnixListener, ListenerError> {
        if path.exists() {
            reclaim_stale_socket(path)?;
        }
        UnixListener::bind(path).map_err(|source| ListenerError::BindUnix {
            path: path.display().to_string(),
            source,
        })
    }

    /// Removes a socket file left behind by a server that is no longer
    /// running. Live sockets and non-socket files are refused.
    fn reclaim_stale_socket(path: &Path) -> Result<(), ListenerError> {
        let shown = path.display().to_string();
        let file_type = fs::symlink_metadata(path)
            .map_err(|source| ListenerError::UnixMetadata {
                path: shown.clone(),
                source,
            })?
            .file_type();
        if !file_type.is_socket() {
            return Err(ListenerError::UnixNotSocket { path: shown });
        }
        match UnixStream::connect(path) {
            Ok(_) => Err(ListenerError::UnixInUse { path: shown }),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
                ) =>
            {
                fs::remove_file(path)
                    .map_err(|source| ListenerError::UnixCleanup { path: shown, source })
            }
            Err(source) => Err(ListenerError::UnixConnect { path: shown, source }),
        }
    }

    pub(super) fn remove_socket_file(path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => warn!(
                target: LISTENER_TARGET,
                %error,
                path = %path.display(),
                "could not remove unix socket file"
            ),
        }
    }
}
