// ABOUTME: Generic deployment struct parameterized by state.
// ABOUTME: Holds the run configuration and cancellation token shared by every transition.

use tokio_util::sync::CancellationToken;

use crate::config::RunConfig;
use crate::gateway::{Deploy, FileRecord, Site};
use crate::manifest::DeployManifest;
use crate::types::DeployId;

use super::state::{
    ExistingFilesFetched, Initialized, LatestDeploySettled, ManifestBuilt, NewDeploySettled,
    OwnsDeploy, SiteState,
};

/// A deploy run in progress, parameterized by its current state.
///
/// The state type carries what earlier steps produced, so a transition
/// can only be called once its inputs exist. Rollback is only available
/// on states that own a newly created deploy.
#[derive(Debug)]
pub struct Deployment<'c, S> {
    pub(crate) config: &'c RunConfig,
    pub(crate) cancel: CancellationToken,
    pub(crate) state: S,
}

impl<'c> Deployment<'c, Initialized> {
    pub fn new(config: &'c RunConfig, cancel: CancellationToken) -> Self {
        Deployment {
            config,
            cancel,
            state: Initialized,
        }
    }
}

impl<'c, S> Deployment<'c, S> {
    pub fn config(&self) -> &'c RunConfig {
        self.config
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}

impl<S: SiteState> Deployment<'_, S> {
    /// The site being deployed to.
    pub fn site(&self) -> &Site {
        self.state.site()
    }
}

impl<S: OwnsDeploy> Deployment<'_, S> {
    /// ID of the deploy created by this run.
    pub fn deploy_id(&self) -> &DeployId {
        self.state.owned_deploy()
    }
}

impl Deployment<'_, LatestDeploySettled> {
    /// The pre-existing deploy that was waited on.
    pub fn latest_deploy(&self) -> &Deploy {
        &self.state.latest
    }
}

impl Deployment<'_, ExistingFilesFetched> {
    pub fn existing_files(&self) -> &[FileRecord] {
        &self.state.files
    }
}

impl Deployment<'_, ManifestBuilt> {
    pub fn manifest(&self) -> &DeployManifest {
        &self.state.manifest
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub site: Site,
    pub deploy: Deploy,
    pub uploaded: Vec<FileRecord>,
}

impl Deployment<'_, NewDeploySettled> {
    /// Consume the deployment and return its outcome.
    pub fn finish(self) -> DeployOutcome {
        DeployOutcome {
            site: self.state.site,
            deploy: self.state.deploy,
            uploaded: self.state.uploaded,
        }
    }
}
