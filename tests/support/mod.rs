// ABOUTME: Test support utilities.
// ABOUTME: Provides an in-memory hosting gateway that records every call.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;

use async_trait::async_trait;
use netlify_upload::config::{ApiToken, RunConfig, Settings, SourceSpec};
use netlify_upload::gateway::{Deploy, DeployState, FileRecord, GatewayError, HostingGateway, Site};
use netlify_upload::manifest::DeployManifest;
use netlify_upload::source::{SourceFile, SourceStream};
use netlify_upload::types::{DeployId, SiteId, SitePath};
use nonempty::NonEmpty;
use parking_lot::Mutex;
use std::io::SeekFrom;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, ReadBuf};
use tokio_util::sync::CancellationToken;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("netlify_upload=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const SITE_ID: &str = "site-1";
pub const LATEST_DEPLOY_ID: &str = "d0";
pub const NEW_DEPLOY_ID: &str = "new-1";

/// How the fake answers a wait on the newly created deploy.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum Settle {
    Ready,
    Error,
    Timeout,
    /// Block until the run is cancelled.
    Hang,
}

/// In-memory gateway with a single site named "demo".
pub struct FakeGateway {
    sites: Vec<Site>,
    files: Vec<FileRecord>,
    has_latest: bool,
    settle_new: Settle,
    failing_uploads: HashSet<String>,
    cancel_on_upload: Option<CancellationToken>,
    cancel_on_create: Option<CancellationToken>,
    fail_cancel: bool,
    fail_delete: bool,
    calls: Mutex<Vec<String>>,
    manifest: Mutex<Option<BTreeMap<String, String>>>,
    uploads: Mutex<BTreeMap<String, Vec<u8>>>,
}

#[allow(dead_code)]
impl FakeGateway {
    pub fn new() -> Self {
        Self {
            sites: vec![site("demo-staging", "site-0"), site("demo", SITE_ID)],
            files: Vec::new(),
            has_latest: true,
            settle_new: Settle::Ready,
            failing_uploads: HashSet::new(),
            cancel_on_upload: None,
            cancel_on_create: None,
            fail_cancel: false,
            fail_delete: false,
            calls: Mutex::new(Vec::new()),
            manifest: Mutex::new(None),
            uploads: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn with_sites(mut self, names: &[&str]) -> Self {
        self.sites = names
            .iter()
            .enumerate()
            .map(|(i, name)| site(name, &format!("site-{i}")))
            .collect();
        self
    }

    pub fn with_file(mut self, path: &str, sha: &str) -> Self {
        self.files.push(FileRecord {
            id: path.to_string(),
            path: Some(path.trim_start_matches('/').to_string()),
            sha: sha.to_string(),
            mime_type: None,
            size: None,
        });
        self
    }

    pub fn without_deploys(mut self) -> Self {
        self.has_latest = false;
        self
    }

    pub fn settle_new(mut self, settle: Settle) -> Self {
        self.settle_new = settle;
        self
    }

    pub fn failing_upload(mut self, rooted_path: &str) -> Self {
        self.failing_uploads.insert(rooted_path.to_string());
        self
    }

    /// Cancel `token` when the first upload starts, then hang that upload.
    pub fn cancel_on_upload(mut self, token: CancellationToken) -> Self {
        self.cancel_on_upload = Some(token);
        self
    }

    /// Cancel `token` while the create request is in flight; the deploy is still created.
    pub fn cancel_on_create(mut self, token: CancellationToken) -> Self {
        self.cancel_on_create = Some(token);
        self
    }

    pub fn failing_cancel(mut self) -> Self {
        self.fail_cancel = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls.lock().iter().any(|c| c.starts_with(prefix))
    }

    /// Manifest sent with `create_deploy`, rooted path to digest.
    pub fn created_manifest(&self) -> Option<BTreeMap<String, String>> {
        self.manifest.lock().clone()
    }

    pub fn uploaded(&self) -> BTreeMap<String, Vec<u8>> {
        self.uploads.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn deploy(&self, id: &str, state: DeployState) -> Deploy {
        Deploy {
            id: DeployId::new(id),
            site_id: SiteId::new(SITE_ID),
            branch: Some("master".to_string()),
            state,
            error_message: None,
            created_at: None,
            required: Vec::new(),
        }
    }
}

fn site(name: &str, id: &str) -> Site {
    Site {
        id: SiteId::new(id),
        name: name.to_string(),
        url: None,
    }
}

#[async_trait]
impl HostingGateway for FakeGateway {
    async fn find_site_by_name(&self, name: &str) -> Result<Site, GatewayError> {
        self.record(format!("find_site {name}"));
        self.sites
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("could not find site with exact name {name}")))
    }

    async fn list_files(&self, site: &SiteId) -> Result<Vec<FileRecord>, GatewayError> {
        self.record(format!("list_files {site}"));
        Ok(self.files.clone())
    }

    async fn latest_deploy(&self, site: &SiteId, branch: &str) -> Result<Deploy, GatewayError> {
        self.record(format!("latest_deploy {site} {branch}"));
        if self.has_latest {
            Ok(self.deploy(LATEST_DEPLOY_ID, DeployState::Processing))
        } else {
            Err(GatewayError::NotFound(format!(
                "could not get deploy for site_id:{site} branch:{branch}"
            )))
        }
    }

    async fn wait_until_ready(
        &self,
        deploy: &Deploy,
        cancel: &CancellationToken,
    ) -> Result<Deploy, GatewayError> {
        self.record(format!("wait {}", deploy.id));
        if deploy.id.as_str() == LATEST_DEPLOY_ID {
            return Ok(self.deploy(LATEST_DEPLOY_ID, DeployState::Ready));
        }
        match self.settle_new {
            Settle::Ready => Ok(self.deploy(deploy.id.as_str(), DeployState::Ready)),
            Settle::Error => Err(GatewayError::Rejected("deploy failed to process".into())),
            Settle::Timeout => Err(GatewayError::Timeout {
                deploy: deploy.id.to_string(),
                after: Duration::from_secs(1),
            }),
            Settle::Hang => {
                cancel.cancelled().await;
                Err(GatewayError::Cancelled)
            }
        }
    }

    async fn create_deploy(&self, manifest: &DeployManifest) -> Result<Deploy, GatewayError> {
        self.record(format!("create_deploy {}", manifest.site_id()));
        if let Some(token) = &self.cancel_on_create {
            token.cancel();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        *self.manifest.lock() = Some(manifest.to_rooted_files());
        Ok(self.deploy(NEW_DEPLOY_ID, DeployState::Uploading))
    }

    async fn upload_file(
        &self,
        deploy: &DeployId,
        path: &SitePath,
        content: &mut dyn SourceStream,
    ) -> Result<FileRecord, GatewayError> {
        let rooted = path.to_rooted();
        self.record(format!("upload {deploy} {rooted}"));

        if let Some(token) = &self.cancel_on_upload {
            token.cancel();
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing_uploads.contains(&rooted) {
            return Err(GatewayError::Rejected(format!("upload of {rooted} refused")));
        }

        let mut body = Vec::new();
        content.read_to_end(&mut body).await?;
        let size = body.len() as u64;
        self.uploads.lock().insert(rooted.clone(), body);
        Ok(FileRecord {
            id: rooted.clone(),
            path: Some(path.as_str().to_string()),
            sha: String::new(),
            mime_type: None,
            size: Some(size),
        })
    }

    async fn cancel_deploy(&self, deploy: &DeployId) -> Result<(), GatewayError> {
        self.record(format!("cancel {deploy}"));
        if self.fail_cancel {
            return Err(GatewayError::Rejected("cannot cancel".into()));
        }
        Ok(())
    }

    async fn delete_deploy(&self, deploy: &DeployId) -> Result<(), GatewayError> {
        self.record(format!("delete {deploy}"));
        if self.fail_delete {
            return Err(GatewayError::Rejected("cannot delete".into()));
        }
        Ok(())
    }
}

/// A stream whose reads always fail.
#[allow(dead_code)]
pub struct UnreadableStream;

impl AsyncRead for UnreadableStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Poll::Ready(Err(std::io::Error::other("disk went away")))
    }
}

impl AsyncSeek for UnreadableStream {
    fn start_seek(self: Pin<&mut Self>, _position: SeekFrom) -> std::io::Result<()> {
        Ok(())
    }

    fn poll_complete(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<u64>> {
        Poll::Ready(Ok(0))
    }
}

/// Build in-memory sources from `(destination, content)` pairs.
#[allow(dead_code)]
pub fn sources(files: &[(&str, &str)]) -> Vec<SourceFile> {
    files
        .iter()
        .map(|(dest, content)| {
            SourceFile::new(
                PathBuf::from(format!("local/{}", dest.trim_start_matches('/'))),
                SitePath::new(dest).unwrap(),
                std::io::Cursor::new(content.as_bytes().to_vec()),
            )
        })
        .collect()
}

/// Run configuration for site "demo" matching `files`.
#[allow(dead_code)]
pub fn run_config(files: &[(&str, &str)]) -> RunConfig {
    let specs: Vec<SourceSpec> = files
        .iter()
        .map(|(dest, _)| SourceSpec {
            local: PathBuf::from(format!("local/{}", dest.trim_start_matches('/'))),
            destination: SitePath::new(dest).unwrap(),
        })
        .collect();
    RunConfig {
        token: ApiToken::new("secret-token"),
        site_name: "demo".to_string(),
        sources: NonEmpty::from_vec(specs).unwrap(),
        settings: Settings {
            rollback_timeout: Duration::from_secs(1),
            ..Settings::default()
        },
    }
}
