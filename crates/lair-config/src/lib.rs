//! Shared configuration and telemetry for the lair client and server.
//!
//! Both binaries resolve the same [`Config`] through `ortho_config`, layering
//! built-in defaults, an optional TOML file, `LAIR_*` environment variables,
//! and command-line flags (in increasing order of precedence). Keeping the
//! server endpoint in one place guarantees the client dials exactly the
//! address the server binds.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod socket;
pub mod telemetry;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, default_log_filter,
    default_log_filter_string, default_log_format, default_server_endpoint,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved configuration shared by `lair` and `laird`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "LAIR")]
pub struct Config {
    /// Endpoint the server listens on and the client connects to.
    #[serde(default = "default_server_endpoint")]
    pub server: SocketEndpoint,
    /// `tracing` filter expression, for example `info` or `lair_cli=debug`.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for structured logs.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns the aggregated loader error when any layer fails to parse.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first element is treated as the program name, mirroring
    /// [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns the aggregated loader error when any layer fails to parse.
    pub fn load_from_args<I>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = OsString>,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Endpoint shared by the client and the server.
    #[must_use]
    pub const fn server(&self) -> &SocketEndpoint {
        &self.server
    }

    /// Log filter expression applied to the `tracing` subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Format used when emitting structured logs.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
