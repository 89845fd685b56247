// ABOUTME: Application-wide error types for netlify-upload.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::deploy::RunFailure;
use crate::gateway::GatewayError;
use crate::types::SitePathError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("input {0} is required but was not given")]
    MissingInput(String),

    #[error("got {sources} source file(s) but {destinations} destination path(s)")]
    InputMismatch { sources: usize, destinations: usize },

    #[error("error in destination path {path}: {source}")]
    InvalidDestination {
        path: String,
        #[source]
        source: SitePathError,
    },

    #[error("error opening source file {}: {source}", .path.display())]
    OpenSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("could not create hosting client: {0}")]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    Deploy(#[from] Box<RunFailure>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Failures the orchestrator has already reported through the output.
    pub fn is_reported(&self) -> bool {
        matches!(self, Error::Deploy(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
