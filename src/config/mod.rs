// ABOUTME: Run configuration assembled once at startup.
// ABOUTME: Combines action inputs and tuning settings into an immutable RunConfig.

pub mod inputs;
mod settings;

pub use inputs::{ActionInputs, InputOptions, get_input, get_multiline_input};
pub use settings::{
    DEFAULT_BRANCH, SETTINGS_FILENAME, SETTINGS_FILENAME_ALT, SETTINGS_FILENAME_DIR, Settings,
};

use nonempty::NonEmpty;
use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::types::SitePath;

/// API token for the hosting service. Never printed by `Debug`.
#[derive(Clone)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token, for building the authorization header and masking.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// A local file and the site path it is published to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub local: PathBuf,
    pub destination: SitePath,
}

/// Everything one run needs, fixed before the first network call.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub token: ApiToken,
    pub site_name: String,
    pub sources: NonEmpty<SourceSpec>,
    pub settings: Settings,
}

impl RunConfig {
    /// Pair source files with destination paths by position and validate them.
    pub fn new(inputs: ActionInputs, settings: Settings) -> Result<Self> {
        let ActionInputs {
            token,
            site_name,
            source_files,
            destination_paths,
        } = inputs;

        if source_files.len() != destination_paths.len() {
            return Err(Error::InputMismatch {
                sources: source_files.len(),
                destinations: destination_paths.len(),
            });
        }

        let specs = source_files
            .into_iter()
            .zip(destination_paths)
            .map(|(local, destination)| {
                let destination =
                    SitePath::new(&destination).map_err(|source| Error::InvalidDestination {
                        path: destination.clone(),
                        source,
                    })?;
                Ok(SourceSpec {
                    local: PathBuf::from(local),
                    destination,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let sources = NonEmpty::from_vec(specs)
            .ok_or_else(|| Error::MissingInput(self::inputs::SOURCE_FILE_INPUT.to_string()))?;

        Ok(Self {
            token,
            site_name,
            sources,
            settings,
        })
    }

    pub fn branch(&self) -> &str {
        &self.settings.branch
    }
}
