// ABOUTME: Capability trait for the hosting service consumed by the orchestrator.
// ABOUTME: Site lookup, file listing, deploy lifecycle, and per-file upload.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::error::GatewayError;
use super::types::{Deploy, FileRecord, Site};
use crate::manifest::DeployManifest;
use crate::source::SourceStream;
use crate::types::{DeployId, SiteId, SitePath};

/// Network operations against the hosting service.
///
/// Implementations do not retry. The orchestrator races every call
/// against its cancellation token, so only `wait_until_ready`, which
/// polls, receives the token directly.
#[async_trait]
pub trait HostingGateway: Send + Sync {
    /// Find a site whose name matches `name` exactly.
    async fn find_site_by_name(&self, name: &str) -> Result<Site, GatewayError>;

    /// List the files currently deployed on a site.
    async fn list_files(&self, site: &SiteId) -> Result<Vec<FileRecord>, GatewayError>;

    /// Most recent deploy of a site on the given branch.
    async fn latest_deploy(&self, site: &SiteId, branch: &str) -> Result<Deploy, GatewayError>;

    /// Block until the deploy reaches the ready state.
    ///
    /// Returns `GatewayError::Cancelled` as soon as `cancel` fires.
    async fn wait_until_ready(
        &self,
        deploy: &Deploy,
        cancel: &CancellationToken,
    ) -> Result<Deploy, GatewayError>;

    /// Open a new deploy carrying the full manifest.
    async fn create_deploy(&self, manifest: &DeployManifest) -> Result<Deploy, GatewayError>;

    /// Upload one file's content into an open deploy.
    ///
    /// The stream is read from its start regardless of its position.
    /// Implementations may buffer the whole file before sending it.
    async fn upload_file(
        &self,
        deploy: &DeployId,
        path: &SitePath,
        content: &mut dyn SourceStream,
    ) -> Result<FileRecord, GatewayError>;

    /// Cancel a deploy that has not finished processing.
    async fn cancel_deploy(&self, deploy: &DeployId) -> Result<(), GatewayError>;

    /// Delete a deploy.
    async fn delete_deploy(&self, deploy: &DeployId) -> Result<(), GatewayError>;
}
