// ABOUTME: Validated site-relative destination paths.
// ABOUTME: Rejects reserved URL characters and normalizes away the leading slash.

use std::fmt;
use thiserror::Error;

/// Characters that cannot appear in a deployed file path.
const RESERVED_CHARS: [char; 2] = ['#', '?'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SitePathError {
    #[error("path cannot be empty")]
    Empty,

    #[error("path {path} contains one of the following illegal characters: #, ?")]
    IllegalChars { path: String },

    #[error("path {path} contains an empty segment")]
    EmptySegment { path: String },
}

/// Normalize a destination path for storage in a deploy manifest.
///
/// At most one leading `/` is stripped. The result never starts with `/`,
/// so cleaning an already clean path returns it unchanged.
pub fn clean_path(path: &str) -> Result<String, SitePathError> {
    if path.contains(RESERVED_CHARS) {
        return Err(SitePathError::IllegalChars {
            path: path.to_string(),
        });
    }

    let cleaned = path.strip_prefix('/').unwrap_or(path);
    if cleaned.is_empty() {
        return Err(SitePathError::Empty);
    }

    if cleaned.split('/').any(str::is_empty) {
        return Err(SitePathError::EmptySegment {
            path: path.to_string(),
        });
    }

    Ok(cleaned.to_string())
}

/// A site-relative file path, stored without its leading slash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SitePath(String);

impl SitePath {
    pub fn new(path: &str) -> Result<Self, SitePathError> {
        clean_path(path).map(Self)
    }

    /// The normalized form, without a leading slash.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The rooted form the hosting API expects (`/a/b.txt`).
    pub fn to_rooted(&self) -> String {
        format!("/{}", self.0)
    }

    /// Path segments, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for SitePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl std::str::FromStr for SitePath {
    type Err = SitePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_single_leading_slash() {
        assert_eq!(clean_path("/a.txt").unwrap(), "a.txt");
        assert_eq!(clean_path("b/c.txt").unwrap(), "b/c.txt");
    }

    #[test]
    fn rejects_reserved_characters() {
        assert!(matches!(
            clean_path("/a#b"),
            Err(SitePathError::IllegalChars { .. })
        ));
        assert!(matches!(
            clean_path("index.html?v=1"),
            Err(SitePathError::IllegalChars { .. })
        ));
    }

    #[test]
    fn rejects_empty_and_root() {
        assert_eq!(clean_path(""), Err(SitePathError::Empty));
        assert_eq!(clean_path("/"), Err(SitePathError::Empty));
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(matches!(
            clean_path("//a"),
            Err(SitePathError::EmptySegment { .. })
        ));
        assert!(matches!(
            clean_path("a//b"),
            Err(SitePathError::EmptySegment { .. })
        ));
        assert!(matches!(
            clean_path("dir/"),
            Err(SitePathError::EmptySegment { .. })
        ));
    }

    #[test]
    fn rooted_form_and_display_agree() {
        let path = SitePath::new("b/c.txt").unwrap();
        assert_eq!(path.to_rooted(), "/b/c.txt");
        assert_eq!(path.to_string(), "/b/c.txt");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["b", "c.txt"]);
    }
}
