//! The lair server.
//!
//! `laird` binds the endpoint resolved by [`lair_config`], accepts client
//! connections on a background thread, and serves each connection's sequence
//! of JSONL requests on its own thread. Every request carries the caller's
//! login and credential hash: authentication requests register or sign in,
//! and command requests are re-authenticated before they touch the shared
//! dragon collection.
//!
//! Records live in memory for the lifetime of the process. Each record is
//! owned by the account that added it, and only that account may update or
//! remove it. The server also keeps the last few command names per login for
//! the `history` command.

mod accounts;
mod bootstrap;
mod dispatch;
mod history;
mod process;
mod store;
mod transport;

pub use bootstrap::{ConfigLoader, StaticConfigLoader, SystemConfigLoader};
pub use dispatch::DispatchError;
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon, run_daemon_with,
};
pub use transport::ListenerError;
