//! Configuration loading and validation for backend selection.
//!
//! Values are read from `SIV_`-prefixed environment variables the first time
//! a cipher is built without an explicit backend:
//!
//! | Variable      | Values                                                         | Default |
//! |---------------|----------------------------------------------------------------|---------|
//! | `SIV_BACKEND` | `auto`, `generic` (or `portable`), `accelerated` (or `asm`)    | `auto`  |
//!
//! Values are matched case-insensitively.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::backend::BackendPreference;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SIV";

/// Backend configuration as read from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Requested backend, parsed case-insensitively by [`BackendConfig::preference`].
    #[serde(default = "default_backend")]
    pub backend: String,
}

fn default_backend() -> String {
    "auto".into()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

impl BackendConfig {
    /// Load and validate configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be built or names an
    /// unknown backend.
    pub fn from_env() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load and validate configuration from an explicit environment source.
    ///
    /// # Errors
    ///
    /// Same as [`BackendConfig::from_env`].
    pub fn from_source(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build SIV configuration from environment")?;

        let c: BackendConfig = cfg
            .try_deserialize()
            .context("failed to deserialise SIV configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The parsed backend preference.
    ///
    /// # Errors
    ///
    /// Returns an error if `SIV_BACKEND` names an unknown backend.
    pub fn preference(&self) -> Result<BackendPreference> {
        self.backend
            .parse()
            .map_err(|e: String| anyhow::anyhow!("SIV_BACKEND: {e}"))
    }

    fn validate(&self) -> Result<()> {
        self.preference().map(|_| ())
    }
}
