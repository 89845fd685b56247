// ABOUTME: State transition methods for deployment orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use std::future::Future;

use crate::diagnostics::{Diagnostics, Warning};
use crate::gateway::{GatewayError, HostingGateway};
use crate::manifest::DeployManifest;
use crate::source::SourceFile;

use super::Deployment;
use super::error::{DeployError, Stage};
use super::state::{
    ExistingFilesFetched, FilesUploaded, Initialized, LatestDeploySettled, ManifestBuilt,
    NewDeployOpened, NewDeploySettled, SiteResolved,
};
use super::upload::upload_all;

/// Result type for transitions that may need rollback on failure.
///
/// On error the deployment is handed back so the caller can tear down
/// the deploy it owns.
pub type TransitionResult<'c, T, S> =
    Result<Deployment<'c, T>, (Deployment<'c, S>, DeployError)>;

// =============================================================================
// Internal Helpers
// =============================================================================

impl<'c, S> Deployment<'c, S> {
    fn transition<T>(self, state: T) -> Deployment<'c, T> {
        Deployment {
            config: self.config,
            cancel: self.cancel,
            state,
        }
    }

    /// Run a gateway call unless the run is cancelled first.
    async fn guarded<T, F>(&self, stage: Stage, call: F) -> Result<T, DeployError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DeployError::Cancelled { stage }),
            result = call => result.map_err(|e| DeployError::from_gateway(stage, e)),
        }
    }
}

// =============================================================================
// State Transitions
// =============================================================================

impl<'c> Deployment<'c, Initialized> {
    /// Look up the target site by exact name.
    pub async fn resolve_site<G>(self, gateway: &G) -> Result<Deployment<'c, SiteResolved>, DeployError>
    where
        G: HostingGateway + ?Sized,
    {
        let site = self
            .guarded(
                Stage::ResolveSite,
                gateway.find_site_by_name(&self.config.site_name),
            )
            .await?;
        tracing::debug!(site = %site.name, id = %site.id, "resolved site");
        Ok(self.transition(SiteResolved { site }))
    }
}

impl<'c> Deployment<'c, SiteResolved> {
    /// Fetch the latest deploy on the configured branch and wait for it.
    ///
    /// The file listing is only meaningful once that deploy has settled.
    pub async fn settle_latest_deploy<G>(
        self,
        gateway: &G,
    ) -> Result<Deployment<'c, LatestDeploySettled>, DeployError>
    where
        G: HostingGateway + ?Sized,
    {
        let site_id = &self.state.site.id;
        let latest = self
            .guarded(
                Stage::LatestDeploy,
                gateway.latest_deploy(site_id, self.config.branch()),
            )
            .await?;
        tracing::debug!(deploy = %latest.id, state = %latest.state, "found latest deploy");

        let latest = self
            .guarded(
                Stage::SettleLatestDeploy,
                gateway.wait_until_ready(&latest, &self.cancel),
            )
            .await?;

        let site = self.state.site.clone();
        Ok(self.transition(LatestDeploySettled { site, latest }))
    }
}

impl<'c> Deployment<'c, LatestDeploySettled> {
    pub async fn fetch_existing_files<G>(
        self,
        gateway: &G,
    ) -> Result<Deployment<'c, ExistingFilesFetched>, DeployError>
    where
        G: HostingGateway + ?Sized,
    {
        let files = self
            .guarded(Stage::FetchFiles, gateway.list_files(&self.state.site.id))
            .await?;
        tracing::debug!(count = files.len(), "listed existing files");

        let site = self.state.site.clone();
        Ok(self.transition(ExistingFilesFetched { site, files }))
    }
}

impl<'c> Deployment<'c, ExistingFilesFetched> {
    /// Seed a manifest with the site's files and overlay every source.
    ///
    /// Sources are registered in order, so a later source wins over an
    /// earlier one with the same destination. Each stream is left rewound.
    pub async fn build_manifest(
        self,
        sources: &mut [SourceFile],
        diagnostics: &mut Diagnostics,
    ) -> Result<Deployment<'c, ManifestBuilt>, DeployError> {
        let mut manifest = DeployManifest::from_existing(
            self.state.site.id.clone(),
            self.config.branch(),
            &self.state.files,
        );

        for source in sources.iter_mut() {
            if self.cancel.is_cancelled() {
                return Err(DeployError::Cancelled {
                    stage: Stage::BuildManifest,
                });
            }
            let registration = manifest
                .register_file(source.destination.clone(), source.stream.as_mut())
                .await
                .map_err(|e| DeployError::Fingerprint {
                    path: source.destination.clone(),
                    source: e,
                })?;
            if registration.is_unchanged() {
                diagnostics.warn(Warning::unchanged_content(&source.destination));
            }
            tracing::debug!(path = %source.destination, sha = %registration.hash, "registered file");
        }

        let site = self.state.site.clone();
        Ok(self.transition(ManifestBuilt { site, manifest }))
    }
}

impl<'c> Deployment<'c, ManifestBuilt> {
    /// Create the new deploy from the manifest.
    ///
    /// From here on the run owns a deploy and failures roll it back. The
    /// create call is never abandoned on cancellation, since the deploy may
    /// already exist remotely; a cancel seen once it returns hands the new
    /// deploy back for teardown.
    pub async fn open_deploy<G>(
        self,
        gateway: &G,
    ) -> Result<TransitionResult<'c, NewDeployOpened, NewDeployOpened>, DeployError>
    where
        G: HostingGateway + ?Sized,
    {
        if self.cancel.is_cancelled() {
            return Err(DeployError::Cancelled {
                stage: Stage::OpenDeploy,
            });
        }

        let deploy = gateway
            .create_deploy(&self.state.manifest)
            .await
            .map_err(|e| DeployError::from_gateway(Stage::OpenDeploy, e))?;
        tracing::debug!(deploy = %deploy.id, required = deploy.required.len(), "opened deploy");

        let site = self.state.site.clone();
        let opened = self.transition(NewDeployOpened { site, deploy });
        if opened.cancel.is_cancelled() {
            return Ok(Err((
                opened,
                DeployError::Cancelled {
                    stage: Stage::OpenDeploy,
                },
            )));
        }
        Ok(Ok(opened))
    }
}

impl<'c> Deployment<'c, NewDeployOpened> {
    /// Upload every source into the new deploy.
    ///
    /// All uploads are attempted before any failure is returned.
    pub async fn upload_files<G>(
        self,
        gateway: &G,
        sources: &mut [SourceFile],
    ) -> TransitionResult<'c, FilesUploaded, NewDeployOpened>
    where
        G: HostingGateway + ?Sized,
    {
        let report = upload_all(
            gateway,
            &self.state.deploy.id,
            sources,
            self.config.settings.upload_concurrency,
            &self.cancel,
        )
        .await;

        if self.cancel.is_cancelled() {
            return Err((
                self,
                DeployError::Cancelled {
                    stage: Stage::UploadFiles,
                },
            ));
        }

        match report.into_result() {
            Ok(uploaded) => {
                let NewDeployOpened { site, deploy } = self.state.clone();
                Ok(self.transition(FilesUploaded {
                    site,
                    deploy,
                    uploaded,
                }))
            }
            Err(failures) => Err((self, DeployError::Upload(failures))),
        }
    }
}

impl<'c> Deployment<'c, FilesUploaded> {
    /// Wait for the new deploy to finish processing.
    pub async fn settle_new_deploy<G>(
        self,
        gateway: &G,
    ) -> TransitionResult<'c, NewDeploySettled, FilesUploaded>
    where
        G: HostingGateway + ?Sized,
    {
        let result = self
            .guarded(
                Stage::SettleNewDeploy,
                gateway.wait_until_ready(&self.state.deploy, &self.cancel),
            )
            .await;

        match result {
            Ok(deploy) => {
                let site = self.state.site.clone();
                let uploaded = self.state.uploaded.clone();
                Ok(self.transition(NewDeploySettled {
                    site,
                    deploy,
                    uploaded,
                }))
            }
            Err(e) => Err((self, e)),
        }
    }
}
