//! Configuration management infrastructure.
//!
//! This module provides configuration file support, allowing users to save
//! and load signing preferences: default hash algorithm, the headers stamped
//! onto signed parts, and HTML body wrapping.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::infra::error::{SmimeError, SmimeResult};
use crate::services::mime_envelope::MimeHeaders;
use crate::HashAlgorithm;

/// Application configuration with all signing preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmimeConfiguration {
    /// Default hash algorithm ("sha256", "sha384", "sha512")
    pub default_hash_algorithm: String,

    /// From address stamped onto signed parts
    pub from_address: String,

    /// To address stamped onto signed parts
    pub to_address: String,

    /// Subject stamped onto signed parts
    pub subject: String,

    /// Whether to wrap signed output in `<pre>` markers by default
    pub wrap_html_body: bool,

    /// Whether to show verbose output
    pub verbose: bool,
}

impl Default for SmimeConfiguration {
    fn default() -> Self {
        let headers = MimeHeaders::default();
        Self {
            default_hash_algorithm: HashAlgorithm::Sha256.as_str().to_string(),
            from_address: headers.from,
            to_address: headers.to,
            subject: headers.subject,
            wrap_html_body: false,
            verbose: false,
        }
    }
}

impl SmimeConfiguration {
    /// Resolve the configured hash algorithm.
    pub fn hash_algorithm(&self) -> SmimeResult<HashAlgorithm> {
        self.default_hash_algorithm.parse()
    }

    /// Headers derived from the configured addresses.
    #[must_use]
    pub fn headers(&self) -> MimeHeaders {
        MimeHeaders {
            from: self.from_address.clone(),
            to: self.to_address.clone(),
            subject: self.subject.clone(),
        }
    }
}

/// Loads and persists the configuration file.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for the default configuration location
    /// (`$HOME/.config/smime-signer/config.toml`, falling back to the
    /// working directory).
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Manager for an explicit configuration path.
    #[must_use]
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn default_config_path() -> PathBuf {
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home)
                .join(".config")
                .join("smime-signer")
                .join("config.toml"),
            None => PathBuf::from("smime-signer-config.toml"),
        }
    }

    /// Load the configuration, creating and saving defaults when the file
    /// does not exist yet.
    pub fn load_or_create_default(&self) -> SmimeResult<SmimeConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            let default_config = SmimeConfiguration::default();
            self.save(&default_config)?;
            Ok(default_config)
        }
    }

    /// Load the configuration from disk.
    pub fn load(&self) -> SmimeResult<SmimeConfiguration> {
        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            SmimeError::ConfigurationError(format!(
                "failed to read {}: {e}",
                self.config_path.display()
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            SmimeError::ConfigurationError(format!(
                "failed to parse {}: {e}",
                self.config_path.display()
            ))
        })
    }

    /// Save the configuration to disk, creating parent directories.
    pub fn save(&self, config: &SmimeConfiguration) -> SmimeResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SmimeError::ConfigurationError(format!(
                    "failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let content = toml::to_string_pretty(config).map_err(|e| {
            SmimeError::ConfigurationError(format!("failed to serialize configuration: {e}"))
        })?;
        fs::write(&self.config_path, content).map_err(|e| {
            SmimeError::ConfigurationError(format!(
                "failed to write {}: {e}",
                self.config_path.display()
            ))
        })?;
        log::info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_consistent() {
        let config = SmimeConfiguration::default();
        assert_eq!(config.hash_algorithm().unwrap(), HashAlgorithm::Sha256);
        assert_eq!(config.headers().from, "sender@example.com");
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let manager = ConfigManager::with_path(&path);

        let mut config = SmimeConfiguration::default();
        config.default_hash_algorithm = "sha384".to_string();
        config.from_address = "alice@example.com".to_string();
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.default_hash_algorithm, "sha384");
        assert_eq!(loaded.from_address, "alice@example.com");
        assert_eq!(loaded.hash_algorithm().unwrap(), HashAlgorithm::Sha384);
    }

    #[test]
    fn load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let manager = ConfigManager::with_path(&path);
        let config = manager.load_or_create_default().unwrap();
        assert!(path.exists());
        assert_eq!(config.default_hash_algorithm, "sha256");
    }
}
