// ABOUTME: Teardown of a deploy created by a failed run.
// ABOUTME: Cancels then deletes, each step bounded by a timeout, reporting both results.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::gateway::{GatewayError, HostingGateway};
use crate::types::DeployId;

use super::Deployment;
use super::state::OwnsDeploy;

/// What happened when tearing down a deploy.
///
/// Both steps are always attempted, so a failed cancel does not hide
/// whether the delete went through.
#[derive(Debug)]
pub struct RollbackOutcome {
    pub deploy: DeployId,
    pub cancelled: Result<(), GatewayError>,
    pub deleted: Result<(), GatewayError>,
}

impl RollbackOutcome {
    pub fn succeeded(&self) -> bool {
        self.cancelled.is_ok() && self.deleted.is_ok()
    }

    /// Failed steps, named by the action that failed.
    pub fn failures(&self) -> Vec<(&'static str, &GatewayError)> {
        let mut failures = Vec::new();
        if let Err(e) = &self.cancelled {
            failures.push(("cancel", e));
        }
        if let Err(e) = &self.deleted {
            failures.push(("delete", e));
        }
        failures
    }
}

impl fmt::Display for RollbackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.succeeded() {
            return write!(f, "deploy {} was cancelled and deleted", self.deploy);
        }
        for (i, (action, error)) in self.failures().into_iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "failed to {} deploy {}: {}", action, self.deploy, error)?;
        }
        Ok(())
    }
}

/// Cancel and then delete `deploy`.
///
/// Not tied to any cancellation token: rollback runs to completion even
/// after the run itself was cancelled, bounded only by `timeout` per step.
pub async fn destroy_deploy<G>(gateway: &G, deploy: &DeployId, timeout: Duration) -> RollbackOutcome
where
    G: HostingGateway + ?Sized,
{
    tracing::debug!(deploy = %deploy, "rolling back deploy");

    let cancelled = bounded(deploy, timeout, gateway.cancel_deploy(deploy)).await;
    if let Err(e) = &cancelled {
        tracing::warn!(deploy = %deploy, error = %e, "failed to cancel deploy");
    }

    let deleted = bounded(deploy, timeout, gateway.delete_deploy(deploy)).await;
    if let Err(e) = &deleted {
        tracing::warn!(deploy = %deploy, error = %e, "failed to delete deploy");
    }

    RollbackOutcome {
        deploy: deploy.clone(),
        cancelled,
        deleted,
    }
}

async fn bounded<F>(deploy: &DeployId, timeout: Duration, call: F) -> Result<(), GatewayError>
where
    F: Future<Output = Result<(), GatewayError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or_else(|_| {
            Err(GatewayError::Timeout {
                deploy: deploy.to_string(),
                after: timeout,
            })
        })
}

impl<S: OwnsDeploy> Deployment<'_, S> {
    /// Tear down the deploy this run created.
    pub async fn rollback<G>(self, gateway: &G) -> RollbackOutcome
    where
        G: HostingGateway + ?Sized,
    {
        destroy_deploy(
            gateway,
            self.state.owned_deploy(),
            self.config.settings.rollback_timeout,
        )
        .await
    }
}
