use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Host the server binds to when nothing else is configured.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Port the server binds to when nothing else is configured.
pub const DEFAULT_SERVER_PORT: u16 = 7878;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Computes the default server endpoint.
#[must_use]
pub fn default_server_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT)
}
