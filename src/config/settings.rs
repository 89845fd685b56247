// ABOUTME: Optional tuning settings loaded from YAML.
// ABOUTME: Branch, readiness timeouts, upload concurrency, and API endpoint.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::gateway::DEFAULT_API_URL;

pub const SETTINGS_FILENAME: &str = "netlify-upload.yml";
pub const SETTINGS_FILENAME_ALT: &str = "netlify-upload.yaml";
pub const SETTINGS_FILENAME_DIR: &str = ".github/netlify-upload.yml";

/// Branch deploys are read from and created on when none is configured.
pub const DEFAULT_BRANCH: &str = "master";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_deploy_timeout", with = "humantime_serde")]
    pub deploy_timeout: Duration,

    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(default = "default_rollback_timeout", with = "humantime_serde")]
    pub rollback_timeout: Duration,

    #[serde(default = "default_upload_concurrency")]
    pub upload_concurrency: usize,

    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_deploy_timeout() -> Duration {
    Duration::from_secs(20 * 60)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_rollback_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_upload_concurrency() -> usize {
    4
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            branch: default_branch(),
            deploy_timeout: default_deploy_timeout(),
            poll_interval: default_poll_interval(),
            rollback_timeout: default_rollback_timeout(),
            upload_concurrency: default_upload_concurrency(),
            api_url: default_api_url(),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Settings::default());
        }
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the first settings file found in `dir`, or defaults if none exists.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(SETTINGS_FILENAME),
            dir.join(SETTINGS_FILENAME_ALT),
            dir.join(SETTINGS_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading settings");
                return Self::load(path);
            }
        }

        Ok(Settings::default())
    }

    fn validate(&self) -> Result<()> {
        if self.branch.trim().is_empty() {
            return Err(Error::InvalidSettings("branch cannot be empty".into()));
        }
        if self.upload_concurrency == 0 {
            return Err(Error::InvalidSettings(
                "upload_concurrency must be at least 1".into(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidSettings(
                "poll_interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
