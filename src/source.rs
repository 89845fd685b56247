// ABOUTME: Local source files paired with their site destinations.
// ABOUTME: Streams must be rewindable so they can be hashed and then uploaded.

use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncSeek};

use crate::config::SourceSpec;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::types::SitePath;

/// A readable, rewindable byte stream.
pub trait SourceStream: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> SourceStream for T {}

/// A local file registered for upload.
pub struct SourceFile {
    pub local: PathBuf,
    pub destination: SitePath,
    pub stream: Box<dyn SourceStream>,
}

impl SourceFile {
    pub fn new(
        local: impl Into<PathBuf>,
        destination: SitePath,
        stream: impl SourceStream + 'static,
    ) -> Self {
        Self {
            local: local.into(),
            destination,
            stream: Box::new(stream),
        }
    }

    /// Open the local file named by `spec`.
    pub async fn open(spec: &SourceSpec) -> Result<Self> {
        let file = tokio::fs::File::open(&spec.local)
            .await
            .map_err(|source| Error::OpenSource {
                path: spec.local.clone(),
                source,
            })?;
        Ok(Self::new(spec.local.clone(), spec.destination.clone(), file))
    }

    pub fn local(&self) -> &Path {
        &self.local
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("local", &self.local)
            .field("destination", &self.destination)
            .finish_non_exhaustive()
    }
}

/// Open every source, keeping one file per destination.
///
/// When two specs share a destination the later one wins and a warning
/// is recorded, matching how the manifest treats repeated paths.
pub async fn open_sources<'a>(
    specs: impl IntoIterator<Item = &'a SourceSpec>,
    diag: &mut Diagnostics,
) -> Result<Vec<SourceFile>> {
    let mut sources: Vec<SourceFile> = Vec::new();

    for spec in specs {
        let file = SourceFile::open(spec).await?;
        match sources
            .iter()
            .position(|existing| existing.destination == file.destination)
        {
            Some(index) => {
                diag.warn(Warning::duplicate_destination(
                    &file.destination,
                    &file.local.display().to_string(),
                    &sources[index].local.display().to_string(),
                ));
                sources[index] = file;
            }
            None => sources.push(file),
        }
    }

    Ok(sources)
}
