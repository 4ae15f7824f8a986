//! JSON Lines framing for requests and responses.

use std::io::{self, BufRead, Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Largest accepted envelope, excluding the line terminator.
pub const MAX_ENVELOPE_BYTES: usize = 1024 * 1024;

/// Consecutive blank lines tolerated before a reader gives up on the peer.
pub const EMPTY_LINE_LIMIT: usize = 10;

/// Failures raised while framing or parsing envelopes.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The message could not be encoded as JSON.
    #[error("failed to serialise envelope: {0}")]
    Serialise(#[source] serde_json::Error),
    /// Writing to the channel failed.
    #[error("failed to write envelope: {0}")]
    Write(#[source] io::Error),
    /// Reading from the channel failed.
    #[error("failed to read envelope: {0}")]
    Read(#[source] io::Error),
    /// A complete line arrived but was not a valid envelope.
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The peer sent a line longer than [`MAX_ENVELOPE_BYTES`].
    #[error("envelope exceeds {limit} bytes")]
    TooLarge {
        /// Byte limit that was exceeded.
        limit: usize,
    },
    /// The peer sent only blank lines.
    #[error("received {limit} consecutive empty lines")]
    EmptyLines {
        /// Number of blank lines tolerated.
        limit: usize,
    },
}

impl EnvelopeError {
    /// Whether the failure came from the underlying channel rather than the
    /// envelope contents.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Write(_) | Self::Read(_))
    }
}

/// Serialises `message` as one JSON line and flushes the writer.
///
/// # Errors
///
/// Returns [`EnvelopeError::Serialise`] when encoding fails and
/// [`EnvelopeError::Write`] when the channel rejects the bytes.
pub fn write_envelope<W, T>(writer: &mut W, message: &T) -> Result<(), EnvelopeError>
where
    W: Write,
    T: Serialize,
{
    let mut line = serde_json::to_vec(message).map_err(EnvelopeError::Serialise)?;
    line.push(b'\n');
    writer.write_all(&line).map_err(EnvelopeError::Write)?;
    writer.flush().map_err(EnvelopeError::Write)
}

/// Reads the next envelope, blocking until a full line arrives.
///
/// Returns `Ok(None)` when the peer closed the channel before sending any
/// bytes of a new envelope. Blank lines between envelopes are skipped.
///
/// # Errors
///
/// Returns [`EnvelopeError::Read`] on channel failure, including a channel
/// that closes before the line terminator,
/// [`EnvelopeError::Malformed`] when the line is not a valid envelope, and
/// the size or blank-line guards when the peer misbehaves.
pub fn read_envelope<R, T>(reader: &mut R) -> Result<Option<T>, EnvelopeError>
where
    R: BufRead,
    T: DeserializeOwned,
{
    let mut consecutive_empty_lines = 0;
    loop {
        let mut line = Vec::new();
        let limit = u64::try_from(MAX_ENVELOPE_BYTES + 1).unwrap_or(u64::MAX);
        let read = Read::take(&mut *reader, limit)
            .read_until(b'\n', &mut line)
            .map_err(EnvelopeError::Read)?;
        if read == 0 {
            return Ok(None);
        }
        if line.len() > MAX_ENVELOPE_BYTES && line.last() != Some(&b'\n') {
            return Err(EnvelopeError::TooLarge {
                limit: MAX_ENVELOPE_BYTES,
            });
        }
        if line.last() != Some(&b'\n') {
            return Err(EnvelopeError::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "channel closed part way through an envelope",
            )));
        }

        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            consecutive_empty_lines += 1;
            if consecutive_empty_lines >= EMPTY_LINE_LIMIT {
                return Err(EnvelopeError::EmptyLines {
                    limit: EMPTY_LINE_LIMIT,
                });
            }
            continue;
        }

        return serde_json::from_slice(trimmed)
            .map(Some)
            .map_err(EnvelopeError::Malformed);
    }
}
