// ABOUTME: Deploy manifest construction from remote and local files.
// ABOUTME: Seeds from the site's current files, then overlays fingerprinted local files.

mod fingerprint;

pub use fingerprint::{ContentHash, FingerprintError, fingerprint};

use std::collections::BTreeMap;
use tokio::io::{AsyncRead, AsyncSeek};

use crate::gateway::FileRecord;
use crate::types::{SiteId, SitePath};

/// The full file set of a deploy to be opened: site-relative path to digest.
///
/// Keys are unique; registering a path that is already present replaces
/// its digest, so local files override stale remote entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployManifest {
    site_id: SiteId,
    branch: String,
    files: BTreeMap<SitePath, ContentHash>,
}

/// Result of registering one local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub hash: ContentHash,
    /// Digest previously recorded for the same path, if any.
    pub previous: Option<ContentHash>,
}

impl Registration {
    /// True when the local content matches what the site already serves.
    pub fn is_unchanged(&self) -> bool {
        self.previous.as_ref() == Some(&self.hash)
    }
}

impl DeployManifest {
    /// Create an empty manifest.
    pub fn new(site_id: SiteId, branch: impl Into<String>) -> Self {
        Self {
            site_id,
            branch: branch.into(),
            files: BTreeMap::new(),
        }
    }

    /// Seed a manifest from the files currently deployed on the site.
    ///
    /// Remote paths are normalized the same way local destinations are.
    /// Records whose path cannot be normalized are skipped.
    pub fn from_existing(site_id: SiteId, branch: impl Into<String>, existing: &[FileRecord]) -> Self {
        let mut manifest = Self::new(site_id, branch);
        for record in existing {
            match SitePath::new(&record.id) {
                Ok(path) => {
                    manifest.files.insert(path, ContentHash::new(&record.sha));
                }
                Err(e) => {
                    tracing::warn!(path = %record.id, error = %e, "skipping remote file with unusable path");
                }
            }
        }
        manifest
    }

    /// Fingerprint `content` and record it under `path`.
    ///
    /// The stream is left positioned at its start. On failure the manifest
    /// is unchanged.
    pub async fn register_file<R>(
        &mut self,
        path: SitePath,
        content: &mut R,
    ) -> Result<Registration, FingerprintError>
    where
        R: AsyncRead + AsyncSeek + Unpin + ?Sized,
    {
        let hash = fingerprint(content).await?;
        let previous = self.files.insert(path, hash.clone());
        Ok(Registration { hash, previous })
    }

    /// Insert a known digest directly.
    pub fn insert(&mut self, path: SitePath, hash: ContentHash) -> Option<ContentHash> {
        self.files.insert(path, hash)
    }

    pub fn get(&self, path: &SitePath) -> Option<&ContentHash> {
        self.files.get(path)
    }

    pub fn site_id(&self) -> &SiteId {
        &self.site_id
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SitePath, &ContentHash)> {
        self.files.iter()
    }

    /// The `files` map as the hosting API expects it: rooted path to digest.
    pub fn to_rooted_files(&self) -> BTreeMap<String, String> {
        self.files
            .iter()
            .map(|(path, hash)| (path.to_rooted(), hash.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record(id: &str, sha: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            path: Some(id.to_string()),
            sha: sha.to_string(),
            mime_type: None,
            size: None,
        }
    }

    #[test]
    fn seeds_from_existing_files() {
        let manifest = DeployManifest::from_existing(
            SiteId::new("site"),
            "master",
            &[record("/index.html", "aaa"), record("/css/site.css", "bbb")],
        );

        assert_eq!(manifest.len(), 2);
        assert_eq!(
            manifest.get(&SitePath::new("index.html").unwrap()),
            Some(&ContentHash::new("aaa"))
        );
    }

    #[test]
    fn skips_remote_files_with_bad_paths() {
        let manifest = DeployManifest::from_existing(
            SiteId::new("site"),
            "master",
            &[record("/ok.txt", "aaa"), record("/bad?.txt", "bbb")],
        );
        assert_eq!(manifest.len(), 1);
    }

    #[tokio::test]
    async fn local_file_overrides_remote_entry() {
        let mut manifest =
            DeployManifest::from_existing(SiteId::new("site"), "master", &[record("/a.txt", "h1")]);

        let mut content = Cursor::new(b"new content".to_vec());
        let path = SitePath::new("/a.txt").unwrap();
        let registration = manifest.register_file(path.clone(), &mut content).await.unwrap();

        assert_eq!(registration.previous, Some(ContentHash::new("h1")));
        assert!(!registration.is_unchanged());
        assert_eq!(manifest.get(&path), Some(&ContentHash::of_bytes(b"new content")));
        assert_eq!(manifest.len(), 1);
    }

    #[tokio::test]
    async fn unchanged_content_is_detected() {
        let existing = ContentHash::of_bytes(b"same");
        let mut manifest = DeployManifest::from_existing(
            SiteId::new("site"),
            "master",
            &[record("/same.txt", existing.as_str())],
        );

        let mut content = Cursor::new(b"same".to_vec());
        let registration = manifest
            .register_file(SitePath::new("same.txt").unwrap(), &mut content)
            .await
            .unwrap();
        assert!(registration.is_unchanged());
    }

    #[test]
    fn rooted_files_carry_leading_slash() {
        let mut manifest = DeployManifest::new(SiteId::new("site"), "master");
        manifest.insert(SitePath::new("b/c.txt").unwrap(), ContentHash::new("ccc"));

        let files = manifest.to_rooted_files();
        assert_eq!(files.get("/b/c.txt").map(String::as_str), Some("ccc"));
    }
}
