// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Exports state markers, the Deployment struct, upload aggregation and rollback.

mod deployment;
mod error;
mod rollback;
mod runner;
mod state;
mod transitions;
mod upload;

pub use deployment::{DeployOutcome, Deployment};
pub use error::{DeployError, DeployErrorKind, Stage};
pub use rollback::{RollbackOutcome, destroy_deploy};
pub use runner::{RunFailure, run_deploy};
pub use state::{
    ExistingFilesFetched, FilesUploaded, Initialized, LatestDeploySettled, ManifestBuilt,
    NewDeployOpened, NewDeploySettled, OwnsDeploy, SiteResolved, SiteState,
};
pub use transitions::TransitionResult;
pub use upload::{UploadFailures, UploadReport, upload_all};
