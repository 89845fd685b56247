// ABOUTME: Content fingerprinting for deploy manifests.
// ABOUTME: Hashes a seekable stream with SHA-1 and rewinds it for the upload pass.

use sha1::{Digest, Sha1};
use std::fmt;
use std::io::SeekFrom;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

const CHUNK_SIZE: usize = 64 * 1024;

/// Errors from fingerprinting a source stream.
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    #[error("failed to read content: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to rewind content after hashing: {0}")]
    Rewind(#[source] std::io::Error),
}

/// Hex-encoded SHA-1 digest of a file's contents.
///
/// The hosting API keys deploy manifests by this digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    /// Wrap a digest reported by the remote side.
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fingerprint an in-memory buffer.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha1::digest(bytes)))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash the full contents of `stream`, then seek it back to the start.
///
/// Reading always begins at offset zero regardless of the current position.
/// Any read error fails the whole fingerprint; a digest is only produced
/// after end-of-stream is reached.
pub async fn fingerprint<R>(stream: &mut R) -> Result<ContentHash, FingerprintError>
where
    R: AsyncRead + AsyncSeek + Unpin + ?Sized,
{
    stream
        .seek(SeekFrom::Start(0))
        .await
        .map_err(FingerprintError::Read)?;

    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = stream.read(&mut buf).await.map_err(FingerprintError::Read)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    stream.rewind().await.map_err(FingerprintError::Rewind)?;

    Ok(ContentHash(hex::encode(hasher.finalize())))
}
