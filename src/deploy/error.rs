// ABOUTME: Error types for deployment operations.
// ABOUTME: Classifies gateway failures by the step that produced them.

use std::fmt;

use crate::gateway::GatewayError;
use crate::manifest::FingerprintError;
use crate::types::SitePath;

use super::upload::UploadFailures;

/// The orchestrator step a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ResolveSite,
    LatestDeploy,
    SettleLatestDeploy,
    FetchFiles,
    BuildManifest,
    OpenDeploy,
    UploadFiles,
    SettleNewDeploy,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Stage::ResolveSite => "getting details for site",
            Stage::LatestDeploy => "getting latest deploy",
            Stage::SettleLatestDeploy => "waiting for latest deploy to complete",
            Stage::FetchFiles => "getting files for site",
            Stage::BuildManifest => "preparing files",
            Stage::OpenDeploy => "initiating new deployment",
            Stage::UploadFiles => "uploading files",
            Stage::SettleNewDeploy => "waiting for new deploy to complete",
        };
        f.write_str(text)
    }
}

/// Errors that can occur during deployment state transitions.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Site or deploy lookup came back empty.
    #[error("error {stage}: {source}")]
    NotFound {
        stage: Stage,
        #[source]
        source: GatewayError,
    },

    /// A local file could not be read or hashed.
    #[error("error preparing {path} for upload: {source}")]
    Fingerprint {
        path: SitePath,
        #[source]
        source: FingerprintError,
    },

    /// Any other gateway failure.
    #[error("error {stage}: {source}")]
    Remote {
        stage: Stage,
        #[source]
        source: GatewayError,
    },

    /// A wait for readiness ran out of time.
    #[error("error {stage}: {source}")]
    Timeout {
        stage: Stage,
        #[source]
        source: GatewayError,
    },

    #[error("cancelled while {stage}")]
    Cancelled { stage: Stage },

    /// One or more files failed to upload.
    #[error("could not upload {} file(s): {}", .0.len(), .0)]
    Upload(UploadFailures),
}

/// Error category for programmatic checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployErrorKind {
    NotFound,
    Fingerprint,
    Remote,
    Timeout,
    Cancelled,
    Upload,
}

impl DeployError {
    /// Classify a gateway failure raised while in `stage`.
    pub fn from_gateway(stage: Stage, source: GatewayError) -> Self {
        if source.is_cancelled() {
            DeployError::Cancelled { stage }
        } else if source.is_not_found() {
            DeployError::NotFound { stage, source }
        } else if source.is_timeout() {
            DeployError::Timeout { stage, source }
        } else {
            DeployError::Remote { stage, source }
        }
    }

    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::NotFound { .. } => DeployErrorKind::NotFound,
            DeployError::Fingerprint { .. } => DeployErrorKind::Fingerprint,
            DeployError::Remote { .. } => DeployErrorKind::Remote,
            DeployError::Timeout { .. } => DeployErrorKind::Timeout,
            DeployError::Cancelled { .. } => DeployErrorKind::Cancelled,
            DeployError::Upload(_) => DeployErrorKind::Upload,
        }
    }

    /// The step that failed, when known.
    pub fn stage(&self) -> Stage {
        match self {
            DeployError::NotFound { stage, .. }
            | DeployError::Remote { stage, .. }
            | DeployError::Timeout { stage, .. }
            | DeployError::Cancelled { stage } => *stage,
            DeployError::Fingerprint { .. } => Stage::BuildManifest,
            DeployError::Upload(_) => Stage::UploadFiles,
        }
    }
}
