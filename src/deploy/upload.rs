// ABOUTME: Concurrent file upload that collects every failure instead of stopping at the first.
// ABOUTME: Failures are keyed by destination so each can be reported individually.

use std::collections::BTreeMap;
use std::fmt;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::gateway::{FileRecord, GatewayError, HostingGateway};
use crate::source::SourceFile;
use crate::types::{DeployId, SitePath};

/// Per-file upload failures, ordered by destination path.
#[derive(Debug, Default)]
pub struct UploadFailures(BTreeMap<SitePath, GatewayError>);

impl UploadFailures {
    pub(crate) fn insert(&mut self, path: SitePath, error: GatewayError) {
        self.0.insert(path, error);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, path: &SitePath) -> Option<&GatewayError> {
        self.0.get(path)
    }

    pub fn contains(&self, path: &SitePath) -> bool {
        self.0.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &SitePath> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SitePath, &GatewayError)> {
        self.0.iter()
    }
}

impl fmt::Display for UploadFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.paths().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", path)?;
        }
        Ok(())
    }
}

/// Outcome of uploading a batch of files.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<FileRecord>,
    pub failed: UploadFailures,
}

impl UploadReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// The uploaded records when nothing failed, otherwise every failure.
    pub fn into_result(self) -> Result<Vec<FileRecord>, UploadFailures> {
        if self.failed.is_empty() {
            Ok(self.uploaded)
        } else {
            Err(self.failed)
        }
    }
}

/// Upload every source into `deploy`, at most `concurrency` at a time.
///
/// Every file is attempted; one failure never stops the others. Uploads
/// still running when `cancel` fires are recorded as cancelled.
pub async fn upload_all<G>(
    gateway: &G,
    deploy: &DeployId,
    sources: &mut [SourceFile],
    concurrency: usize,
    cancel: &CancellationToken,
) -> UploadReport
where
    G: HostingGateway + ?Sized,
{
    let results: Vec<(SitePath, Result<FileRecord, GatewayError>)> =
        stream::iter(sources.iter_mut())
            .map(move |source| async move {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(GatewayError::Cancelled),
                    result = gateway.upload_file(deploy, &source.destination, source.stream.as_mut()) => result,
                };
                (source.destination.clone(), result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

    let mut report = UploadReport::default();
    for (path, result) in results {
        match result {
            Ok(record) => {
                tracing::debug!(path = %path, "uploaded file");
                report.uploaded.push(record);
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "upload failed");
                report.failed.insert(path, e);
            }
        }
    }
    report
}
