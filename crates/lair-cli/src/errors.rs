//! Error types for the client runtime.

use std::sync::Arc;

use lair_config::telemetry::TelemetryError;
use thiserror::Error;

use crate::input::InputError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("terminal input failed: {0}")]
    Input(#[source] InputError),
    #[error("lost the connection to the server before any command completed")]
    TransportLost,
}
