// ABOUTME: Drives a deployment through every state and reports progress.
// ABOUTME: Rolls back the new deploy when a step after its creation fails.

use tokio_util::sync::CancellationToken;

use crate::config::RunConfig;
use crate::diagnostics::Diagnostics;
use crate::gateway::HostingGateway;
use crate::output::Output;
use crate::source::SourceFile;

use super::deployment::{DeployOutcome, Deployment};
use super::error::{DeployError, DeployErrorKind};
use super::rollback::RollbackOutcome;
use super::state::OwnsDeploy;

/// A failed run: the error that stopped it and, when a deploy had been
/// created, the result of tearing it down.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct RunFailure {
    pub error: DeployError,
    pub rollback: Option<RollbackOutcome>,
}

impl RunFailure {
    pub fn kind(&self) -> DeployErrorKind {
        self.error.kind()
    }

    /// Whether a created deploy was torn down without errors.
    pub fn rolled_back(&self) -> bool {
        self.rollback.as_ref().is_some_and(RollbackOutcome::succeeded)
    }
}

/// Layer `sources` onto the latest deploy of the configured site.
///
/// Every fatal error is reported through `output` before returning, and
/// each failed upload is reported on its own line.
pub async fn run_deploy<G>(
    config: &RunConfig,
    gateway: &G,
    sources: &mut [SourceFile],
    cancel: CancellationToken,
    output: &Output,
    diagnostics: &mut Diagnostics,
) -> Result<DeployOutcome, RunFailure>
where
    G: HostingGateway + ?Sized,
{
    let deployment = Deployment::new(config, cancel);

    let deployment = deployment
        .resolve_site(gateway)
        .await
        .map_err(|e| fail(output, e))?;
    output.debug(&format!(
        "Got site ID for {} (ID: {})",
        deployment.site().name,
        deployment.site().id
    ));

    let deployment = deployment
        .settle_latest_deploy(gateway)
        .await
        .map_err(|e| fail(output, e))?;
    output.debug(&format!(
        "Latest deploy {} for site ID {} is ready",
        deployment.latest_deploy().id,
        deployment.site().id
    ));

    let deployment = deployment
        .fetch_existing_files(gateway)
        .await
        .map_err(|e| fail(output, e))?;
    output.debug(&format!(
        "Got {} preexisting files from site ID {}",
        deployment.existing_files().len(),
        deployment.site().id
    ));

    let deployment = deployment
        .build_manifest(sources, diagnostics)
        .await
        .map_err(|e| fail(output, e))?;
    let locals: Vec<String> = sources
        .iter()
        .map(|s| s.local().display().to_string())
        .collect();
    output.info(&format!(
        "Beginning upload of the following files: {}.",
        locals.join(", ")
    ));

    let deployment = match deployment
        .open_deploy(gateway)
        .await
        .map_err(|e| fail(output, e))?
    {
        Ok(d) => d,
        Err((owned, error)) => return Err(abort(owned, gateway, error, output).await),
    };
    output.debug(&format!("Started new deploy with ID {}", deployment.deploy_id()));

    let deployment = match deployment.upload_files(gateway, sources).await {
        Ok(d) => d,
        Err((owned, error)) => return Err(abort(owned, gateway, error, output).await),
    };
    output.debug(&format!(
        "Uploaded {} file(s) to deploy with ID {}",
        deployment.state().uploaded.len(),
        deployment.deploy_id()
    ));

    let deployment = match deployment.settle_new_deploy(gateway).await {
        Ok(d) => d,
        Err((owned, error)) => return Err(abort(owned, gateway, error, output).await),
    };
    output.debug(&format!("Deploy {} is ready", deployment.deploy_id()));

    Ok(deployment.finish())
}

fn fail(output: &Output, error: DeployError) -> RunFailure {
    report_error(output, &error);
    RunFailure {
        error,
        rollback: None,
    }
}

async fn abort<S, G>(
    deployment: Deployment<'_, S>,
    gateway: &G,
    error: DeployError,
    output: &Output,
) -> RunFailure
where
    S: OwnsDeploy,
    G: HostingGateway + ?Sized,
{
    report_error(output, &error);

    output.info(&format!("Rolling back deploy {}", deployment.deploy_id()));
    let outcome = deployment.rollback(gateway).await;
    if outcome.succeeded() {
        output.info(&format!("Deploy {} was cancelled and deleted", outcome.deploy));
    } else {
        for (action, e) in outcome.failures() {
            output.error(&format!(
                "error while trying to {} deploy {}: {}",
                action, outcome.deploy, e
            ));
        }
    }

    RunFailure {
        error,
        rollback: Some(outcome),
    }
}

fn report_error(output: &Output, error: &DeployError) {
    match error {
        DeployError::Upload(failures) => {
            for (path, e) in failures.iter() {
                output.error(&format!("error uploading {}: {}", path, e));
            }
            output.error("could not upload files due to the above errors");
        }
        other => output.error(&other.to_string()),
    }
}
