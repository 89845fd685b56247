// ABOUTME: Deployment state types for the type state pattern.
// ABOUTME: Each state carries the data gathered so far; later states own the new deploy.

use crate::gateway::{Deploy, FileRecord, Site};
use crate::manifest::DeployManifest;
use crate::types::DeployId;

/// Initial state: nothing resolved yet.
/// Available actions: `resolve_site()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialized;

/// Site found by exact name.
/// Available actions: `settle_latest_deploy()`
#[derive(Debug, Clone)]
pub struct SiteResolved {
    pub(crate) site: Site,
}

/// The site's latest deploy exists and is ready.
/// Available actions: `fetch_existing_files()`
#[derive(Debug, Clone)]
pub struct LatestDeploySettled {
    pub(crate) site: Site,
    pub(crate) latest: Deploy,
}

/// Current site files listed.
/// Available actions: `build_manifest()`
#[derive(Debug, Clone)]
pub struct ExistingFilesFetched {
    pub(crate) site: Site,
    pub(crate) files: Vec<FileRecord>,
}

/// Manifest seeded from the site and overlaid with local files.
/// Available actions: `open_deploy()`
#[derive(Debug, Clone)]
pub struct ManifestBuilt {
    pub(crate) site: Site,
    pub(crate) manifest: DeployManifest,
}

/// New deploy created; it is now the rollback target.
/// Available actions: `upload_files()`, `rollback()`
#[derive(Debug, Clone)]
pub struct NewDeployOpened {
    pub(crate) site: Site,
    pub(crate) deploy: Deploy,
}

/// Every local file uploaded into the new deploy.
/// Available actions: `settle_new_deploy()`, `rollback()`
#[derive(Debug, Clone)]
pub struct FilesUploaded {
    pub(crate) site: Site,
    pub(crate) deploy: Deploy,
    pub(crate) uploaded: Vec<FileRecord>,
}

/// New deploy is ready.
/// Available actions: `finish()`, `rollback()`
#[derive(Debug, Clone)]
pub struct NewDeploySettled {
    pub(crate) site: Site,
    pub(crate) deploy: Deploy,
    pub(crate) uploaded: Vec<FileRecord>,
}

pub(crate) mod sealed {
    /// Prevents states from being declared outside this module.
    pub trait Sealed {}
}

/// States that know which site is being deployed.
pub trait SiteState: sealed::Sealed {
    fn site(&self) -> &Site;
}

/// States in which this run owns a deploy that must be torn down on failure.
pub trait OwnsDeploy: sealed::Sealed {
    fn owned_deploy(&self) -> &DeployId;
}

macro_rules! site_state {
    ($($state:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $state {}

            impl SiteState for $state {
                fn site(&self) -> &Site {
                    &self.site
                }
            }
        )*
    };
}

site_state!(
    SiteResolved,
    LatestDeploySettled,
    ExistingFilesFetched,
    ManifestBuilt,
    NewDeployOpened,
    FilesUploaded,
    NewDeploySettled,
);

macro_rules! owns_deploy {
    ($($state:ty),* $(,)?) => {
        $(
            impl OwnsDeploy for $state {
                fn owned_deploy(&self) -> &DeployId {
                    &self.deploy.id
                }
            }
        )*
    };
}

owns_deploy!(NewDeployOpened, FilesUploaded, NewDeploySettled);
