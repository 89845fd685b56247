// ABOUTME: Error types for hosting gateway calls.
// ABOUTME: Transport failures use SNAFU context; GatewayError classifies them for the orchestrator.

use snafu::Snafu;
use std::time::Duration;

/// Low-level HTTP failures, tagged with the endpoint that produced them.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TransportError {
    #[snafu(display("request to {endpoint} failed: {source}"))]
    Request {
        endpoint: String,
        source: reqwest::Error,
    },

    #[snafu(display("{endpoint} returned HTTP {status}: {body}"))]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[snafu(display("could not decode response from {endpoint}: {source}"))]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
}

/// Errors from hosting gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("remote error: {0}")]
    Rejected(String),

    #[error("deploy {deploy} did not become ready within {}s", .after.as_secs())]
    Timeout { deploy: String, after: Duration },

    #[error("operation cancelled")]
    Cancelled,

    #[error("failed to read upload body: {0}")]
    Body(#[from] std::io::Error),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, GatewayError::Cancelled)
    }
}
