//! Connection handler serving sequential JSONL round trips.

use std::io::BufReader;

use lair_protocol::{EnvelopeError, Request, Response, read_envelope, write_envelope};
use tracing::{debug, warn};

use crate::transport::{ConnectionHandler, ConnectionStream};

use super::router::{DISPATCH_TARGET, RequestRouter};

/// Reads requests until the client closes the stream, answering each one.
///
/// A line that is not a valid request is answered with a message and the
/// connection stays open. Oversized input, a flood of blank lines, or an IO
/// failure leave the stream position unknown, so the connection is dropped.
#[derive(Debug, Default)]
pub(crate) struct DispatchConnectionHandler {
    router: RequestRouter,
}

impl DispatchConnectionHandler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn serve(&self, stream: ConnectionStream) {
        let peer = stream.peer();
        let mut reader = BufReader::new(stream);
        let mut served = 0_usize;
        loop {
            let response = match read_envelope::<_, Request>(&mut reader) {
                Ok(Some(request)) => self.router.route(&request),
                Ok(None) => {
                    debug!(target: DISPATCH_TARGET, %peer, served, "client disconnected");
                    return;
                }
                Err(EnvelopeError::Malformed(error)) => {
                    warn!(target: DISPATCH_TARGET, %peer, %error, "malformed request");
                    Response::message(format!("malformed request: {error}"))
                }
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, %peer, %error, "dropping connection");
                    return;
                }
            };

            if let Err(error) = write_envelope(reader.get_mut(), &response) {
                warn!(target: DISPATCH_TARGET, %peer, %error, "failed to write response");
                return;
            }
            served += 1;
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        self.serve(stream);
    }
}
