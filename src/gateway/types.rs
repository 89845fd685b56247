// ABOUTME: Data types exchanged with the hosting service.
// ABOUTME: Sites, deploys with their lifecycle state, and deployed file records.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

use crate::types::{DeployId, SiteId};

/// A hosted site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A deploy of a site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Deploy {
    pub id: DeployId,
    pub site_id: SiteId,
    #[serde(default)]
    pub branch: Option<String>,
    pub state: DeployState,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Digests the remote side still wants uploaded.
    #[serde(default)]
    pub required: Vec<String>,
}

/// Lifecycle state of a deploy.
///
/// Only `Ready` and `Error` matter to the orchestrator; every other state
/// means the deploy has not settled yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployState {
    New,
    Uploading,
    Uploaded,
    Preparing,
    Prepared,
    Processing,
    Processed,
    Enqueued,
    Building,
    Ready,
    Error,
    #[serde(other)]
    Other,
}

impl DeployState {
    pub fn is_ready(self) -> bool {
        self == DeployState::Ready
    }

    pub fn is_failed(self) -> bool {
        self == DeployState::Error
    }
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeployState::New => "new",
            DeployState::Uploading => "uploading",
            DeployState::Uploaded => "uploaded",
            DeployState::Preparing => "preparing",
            DeployState::Prepared => "prepared",
            DeployState::Processing => "processing",
            DeployState::Processed => "processed",
            DeployState::Enqueued => "enqueued",
            DeployState::Building => "building",
            DeployState::Ready => "ready",
            DeployState::Error => "error",
            DeployState::Other => "unknown",
        };
        f.write_str(s)
    }
}

/// A file as the hosting service reports it.
///
/// `id` is the rooted site path (`/index.html`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileRecord {
    pub id: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}
