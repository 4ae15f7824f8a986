//! Wire types shared by the lair client and server.
//!
//! Every exchange is a single [`Request`] answered by a single [`Response`].
//! Both travel as JSON Lines: one JSON document per `\n`-terminated line.
//!
//! ```json
//! {"login":"alice","credential_hash":[12,34],"body":{"kind":"auth","registering":false}}
//! {"successful_connect":true,"message":"Welcome, alice","result_records":null,"to_exit":false}
//! ```
//!
//! A request either carries an authentication intent or a command, never
//! both; [`RequestBody`] makes the other combinations unrepresentable.

mod codec;
mod command;
mod request;
mod response;

pub use codec::{EMPTY_LINE_LIMIT, EnvelopeError, MAX_ENVELOPE_BYTES, read_envelope, write_envelope};
pub use command::{Argument, CommandRef, RecordDraft};
pub use request::{CredentialHash, Request, RequestBody};
pub use response::Response;
