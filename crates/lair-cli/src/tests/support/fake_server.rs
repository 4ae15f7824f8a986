//! Fake server for behavioural tests.
//!
//! Accepts one connection at a time, records every request it reads, and
//! answers each through a caller-supplied responder. The responder can also
//! hang up to simulate a broken channel.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use lair_config::SocketEndpoint;
use lair_protocol::{Request, Response, write_envelope};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// What the fake server does with a request.
pub(in crate::tests) enum Reply {
    Respond(Response),
    /// Writes the line verbatim, followed by a newline.
    Raw(String),
    /// Writes the text without a line terminator, then hangs up.
    Truncated(String),
    Hangup,
}

type Responder = Box<dyn FnMut(&Request) -> Reply + Send>;

pub(in crate::tests) struct FakeServer {
    port: u16,
    requests: Arc<Mutex<Vec<Request>>>,
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<Result<()>>>,
}

impl FakeServer {
    /// Spawns a fake server on an ephemeral TCP port.
    pub(in crate::tests) fn spawn<F>(responder: F) -> Result<Self>
    where
        F: FnMut(&Request) -> Reply + Send + 'static,
    {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake server")?;
        listener
            .set_nonblocking(true)
            .context("fake server nonblocking")?;
        let port = listener.local_addr().context("local addr")?.port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));
        let state = ServeState {
            requests: Arc::clone(&requests),
            shutdown: Arc::clone(&shutdown),
            responder: Box::new(responder),
        };
        let handle = thread::spawn(move || state.serve(&listener));
        Ok(Self {
            port,
            requests,
            shutdown,
            handle: Some(handle),
        })
    }

    pub(in crate::tests) fn endpoint(&self) -> SocketEndpoint {
        SocketEndpoint::tcp("127.0.0.1", self.port)
    }

    /// Requests received so far, in arrival order.
    pub(in crate::tests) fn requests(&self) -> Result<Vec<Request>> {
        let guard = self
            .requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?;
        Ok(guard.clone())
    }

    /// Names of the command requests received so far.
    pub(in crate::tests) fn command_names(&self) -> Result<Vec<String>> {
        Ok(self
            .requests()?
            .iter()
            .filter_map(Request::command_ref)
            .map(|command| command.name.clone())
            .collect())
    }

    /// Stops the server and surfaces any failure from its thread.
    pub(in crate::tests) fn stop(&mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow!("fake server thread panicked"))?,
            None => Ok(()),
        }
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

struct ServeState {
    requests: Arc<Mutex<Vec<Request>>>,
    shutdown: Arc<AtomicBool>,
    responder: Responder,
}

impl ServeState {
    fn serve(mut self, listener: &TcpListener) -> Result<()> {
        while !self.shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, _)) => self.serve_connection(stream)?,
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(POLL_INTERVAL);
                }
                Err(error) => return Err(error).context("accept connection"),
            }
        }
        Ok(())
    }

    fn serve_connection(&mut self, stream: TcpStream) -> Result<()> {
        stream
            .set_nonblocking(false)
            .context("blocking connection")?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .context("read timeout")?;
        let mut writer = stream.try_clone().context("clone stream")?;
        let mut reader = BufReader::new(stream);
        let mut line = String::new();

        loop {
            match reader.read_line(&mut line) {
                Ok(0) => return Ok(()),
                Ok(_) => {}
                Err(error)
                    if matches!(
                        error.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    if self.shutdown.load(Ordering::SeqCst) {
                        return Ok(());
                    }
                    continue;
                }
                // The client may reset the socket when it exits.
                Err(_) => return Ok(()),
            }

            let request: Request = serde_json::from_str(line.trim()).context("parse request")?;
            line.clear();
            self.requests
                .lock()
                .map_err(|error| anyhow!("lock requests: {error}"))?
                .push(request.clone());

            match (self.responder)(&request) {
                Reply::Respond(response) => {
                    write_envelope(&mut writer, &response).context("write response")?;
                }
                Reply::Raw(text) => {
                    writeln!(writer, "{text}").context("write raw line")?;
                }
                Reply::Truncated(text) => {
                    writer
                        .write_all(text.as_bytes())
                        .context("write truncated line")?;
                    writer.flush().context("flush truncated line")?;
                    return Ok(());
                }
                Reply::Hangup => return Ok(()),
            }
        }
    }
}

/// An endpoint nothing is listening on.
pub(in crate::tests) fn unused_endpoint() -> Result<SocketEndpoint> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind probe listener")?;
    let port = listener.local_addr().context("probe addr")?.port();
    drop(listener);
    Ok(SocketEndpoint::tcp("127.0.0.1", port))
}
