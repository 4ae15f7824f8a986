//! Socket listener for the server endpoint.
//!
//! The listener binds the configured endpoint and polls for clients on a
//! background thread, handing each stream to a [`ConnectionHandler`] on a
//! thread of its own.

mod errors;
mod handler;
mod listener;

pub use self::errors::ListenerError;
pub(crate) use self::handler::{ConnectionHandler, ConnectionStream};
pub(crate) use self::listener::SocketListener;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
