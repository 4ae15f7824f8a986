use std::fmt;
use std::fs::DirBuilder;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Address of the lair server.
///
/// TCP is the default transport. Unix domain sockets are accepted for local
/// deployments where the server and client share a host.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum SocketEndpoint {
    /// TCP socket endpoint.
    Tcp {
        /// Host name or IP literal.
        host: String,
        /// TCP port.
        port: u16,
    },
    /// Unix domain socket endpoint.
    Unix {
        /// Filesystem path of the socket.
        path: Utf8PathBuf,
    },
}

impl SocketEndpoint {
    /// Builds a TCP socket endpoint.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Builds a Unix domain socket endpoint.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// Returns the Unix socket path when the endpoint uses the Unix transport.
    #[must_use]
    pub fn unix_path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Unix { path } => Some(path.as_ref()),
            Self::Tcp { .. } => None,
        }
    }

    /// Ensures a Unix socket's parent directory exists with owner-only access.
    ///
    /// TCP endpoints need no filesystem preparation and always succeed.
    ///
    /// # Errors
    ///
    /// Returns [`SocketPreparationError`] when the socket path has no parent
    /// or the directory cannot be created.
    pub fn prepare_filesystem(&self) -> Result<(), SocketPreparationError> {
        let Some(path) = self.unix_path() else {
            return Ok(());
        };
        let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
            return Err(SocketPreparationError::MissingParent {
                path: path.to_path_buf(),
            });
        };

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }

        builder
            .create(parent.as_std_path())
            .map_err(|source| SocketPreparationError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })
    }
}

impl fmt::Display for SocketEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
            Self::Unix { path } => write!(formatter, "unix://{path}"),
        }
    }
}

impl FromStr for SocketEndpoint {
    type Err = SocketParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input)?;
        match url.scheme() {
            "tcp" => tcp_from_url(&url, input),
            "unix" => unix_from_url(&url, input),
            scheme => Err(SocketParseError::UnsupportedScheme {
                scheme: scheme.to_owned(),
            }),
        }
    }
}

fn tcp_from_url(url: &Url, input: &str) -> Result<SocketEndpoint, SocketParseError> {
    let incomplete = |part| SocketParseError::Incomplete {
        part,
        input: input.to_owned(),
    };
    let host = url.host_str().ok_or_else(|| incomplete("host"))?;
    let port = url.port().ok_or_else(|| incomplete("port"))?;
    Ok(SocketEndpoint::tcp(host, port))
}

fn unix_from_url(url: &Url, input: &str) -> Result<SocketEndpoint, SocketParseError> {
    match url.path() {
        "" | "/" => Err(SocketParseError::Incomplete {
            part: "socket path",
            input: input.to_owned(),
        }),
        path => Ok(SocketEndpoint::unix(path)),
    }
}

/// Reasons an endpoint string was rejected.
#[derive(Debug, Error)]
pub enum SocketParseError {
    /// Only `tcp://` and `unix://` are understood.
    #[error("unsupported endpoint scheme '{scheme}', expected tcp or unix")]
    UnsupportedScheme {
        /// Scheme found in the input.
        scheme: String,
    },
    /// A required part of the endpoint was absent.
    #[error("endpoint '{input}' is missing its {part}")]
    Incomplete {
        /// Missing component: host, port, or socket path.
        part: &'static str,
        /// Text that was parsed.
        input: String,
    },
    /// The text is not a URL at all.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Errors raised when preparing socket directories.
#[derive(Debug, Error)]
pub enum SocketPreparationError {
    /// Parent directory is missing when creating a Unix socket path.
    #[error("socket path '{path}' has no parent directory")]
    MissingParent {
        /// Socket path without a usable parent.
        path: Utf8PathBuf,
    },
    /// Failed to create the socket directory.
    #[error("failed to create socket directory '{path}': {source}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
