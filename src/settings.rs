//! Tool settings.
//!
//! Settings come from built-in defaults, then a `.env` file, then
//! `ENVFORGE_*` environment variables. Command-line flags are applied last by
//! the caller.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, SettingsError};
use crate::service::{ConfigServiceClient, DEFAULT_API_URL};

/// Environment variable overriding the service base URL.
pub const API_URL_VAR: &str = "ENVFORGE_API_URL";

/// Environment variable setting a request timeout in seconds.
pub const TIMEOUT_VAR: &str = "ENVFORGE_TIMEOUT_SECS";

/// Environment variable setting where downloads are written.
pub const OUTPUT_DIR_VAR: &str = "ENVFORGE_OUTPUT_DIR";

/// Resolved tool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Configuration service base URL.
    pub api_url: String,
    /// Request timeout. `None` leaves the transport default in place.
    pub timeout_secs: Option<u64>,
    /// Directory downloaded artifacts are saved in.
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: String::from(DEFAULT_API_URL),
            timeout_secs: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Loads `.env` from `base_dir` (or the working directory) and reads the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `.env` exists but cannot be loaded, or a variable
    /// holds an unusable value.
    pub fn load(base_dir: Option<&Path>) -> Result<Self> {
        Self::load_dotenv(base_dir)?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads a `.env` file into the process environment if one exists.
    ///
    /// Variables already set in the environment are not overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn load_dotenv(base_dir: Option<&Path>) -> Result<()> {
        let env_path = base_dir.map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| SettingsError::Dotenv {
                path: env_path.clone(),
                message: e.to_string(),
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    /// Builds settings from a variable lookup, starting from the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not a positive whole number of
    /// seconds.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(url) = lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            settings.api_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| SettingsError::InvalidValue {
                    key: String::from(TIMEOUT_VAR),
                    value: raw.clone(),
                })?;
            settings.timeout_secs = Some(secs);
        }

        if let Some(dir) = lookup(OUTPUT_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            settings.output_dir = PathBuf::from(dir);
        }

        Ok(settings)
    }

    /// Overrides the service URL when one is given.
    #[must_use]
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        self
    }

    /// Overrides the output directory when one is given.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        self
    }

    /// Creates a service client for these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn client(&self) -> Result<ConfigServiceClient> {
        debug!("Using configuration service at {}", self.api_url);
        match self.timeout_secs {
            Some(secs) => ConfigServiceClient::with_timeout(&self.api_url, secs),
            None => ConfigServiceClient::new(&self.api_url),
        }
    }
}
