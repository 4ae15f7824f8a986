//! JSONL request dispatch for client connections.
//!
//! Each accepted connection carries any number of sequential requests. A
//! request is one [`lair_protocol::Request`] line and is answered by exactly
//! one [`lair_protocol::Response`] line:
//!
//! ```json
//! {"login":"alice","credential_hash":[...],"body":{"kind":"command","command":{"name":"show"}}}
//! {"successful_connect":false,"message":"","result_records":["1 Smaug (171) [owner alice]"],"to_exit":false}
//! ```
//!
//! Authentication requests register or sign in. Command requests are checked
//! against the account registry before they run. Domain failures never close
//! the connection; they become message-only responses.

mod catalogue;
mod errors;
mod executor;
mod handler;
mod router;

pub use self::errors::DispatchError;
pub(crate) use self::handler::DispatchConnectionHandler;
