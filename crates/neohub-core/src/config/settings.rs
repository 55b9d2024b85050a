use crate::{Error, Result};
use neohub_rpc::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT, HubAddress, RequestOptions};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::Directories;

/// Where the hub lives and how hard to try reaching it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT.as_secs_f64()
}
fn default_max_attempts() -> u32 {
    1
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl HubConfig {
    /// Load config from file, falling back to defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid JSON,
    /// or holds values that fail validation.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_existing(path)
    }

    /// Load config from a file that must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable, contains
    /// invalid JSON, or holds values that fail validation.
    pub fn load_existing(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        super::validation::warn_unknown_fields(&content, &path.display().to_string());
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.json` from the per-user config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn load_default() -> Result<Self> {
        match Directories::new() {
            Some(dirs) => Self::load(&dirs.config_file),
            None => Ok(Self::default()),
        }
    }

    /// Save config to file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save `config.json` into `dirs`, creating the directory first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the file cannot be written.
    pub fn save_in(&self, dirs: &Directories) -> Result<()> {
        dirs.ensure_exists()?;
        self.save(&dirs.config_file)
    }

    /// Save to the per-user config directory and return the file written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no home directory can be found, or an
    /// I/O error if the file cannot be written.
    pub fn save_default(&self) -> Result<PathBuf> {
        let dirs = Directories::new()
            .ok_or_else(|| Error::Config("no home directory for the config file".to_string()))?;
        self.save_in(&dirs)?;
        Ok(dirs.config_file)
    }

    /// Check value ranges the deserializer cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the timeout is not a positive finite
    /// number of seconds or if no attempts are allowed.
    pub fn validate(&self) -> Result<()> {
        if !self.timeout_secs.is_finite() || self.timeout_secs <= 0.0 {
            return Err(Error::Config(format!(
                "timeoutSecs must be a positive number, got {}",
                self.timeout_secs
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::Config("maxAttempts must be at least 1".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn address(&self) -> HubAddress {
        HubAddress::new(self.host.clone(), self.port)
    }

    /// Request options for the engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] under the same conditions as [`Self::validate`].
    pub fn options(&self) -> Result<RequestOptions> {
        self.validate()?;
        let max_attempts = NonZeroU32::new(self.max_attempts)
            .ok_or_else(|| Error::Config("maxAttempts must be at least 1".to_string()))?;
        let timeout = Duration::try_from_secs_f64(self.timeout_secs)
            .map_err(|e| Error::Config(format!("timeoutSecs out of range: {e}")))?;
        Ok(RequestOptions::new(timeout, max_attempts))
    }
}
