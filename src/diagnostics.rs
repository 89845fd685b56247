// ABOUTME: Diagnostics accumulator for non-fatal warnings during a run.
// ABOUTME: Collects issues that should not fail a deploy but should be shown to users.

use crate::types::SitePath;

/// Collects non-fatal warnings during a run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Two source files were given the same destination; the later one wins.
    pub fn duplicate_destination(path: &SitePath, kept: &str, dropped: &str) -> Self {
        Self {
            kind: WarningKind::DuplicateDestination,
            message: format!(
                "destination {path} is given more than once; uploading {kept} and ignoring {dropped}"
            ),
        }
    }

    /// A local file is byte-identical to what the site already serves.
    pub fn unchanged_content(path: &SitePath) -> Self {
        Self {
            kind: WarningKind::UnchangedContent,
            message: format!("{path} is unchanged from the deployed version"),
        }
    }
}

/// Categories of warnings that can occur during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    DuplicateDestination,
    UnchangedContent,
}
