//! JSON Configuration Management
//!
//! Handles reading and writing the application configuration file in the
//! shared container.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::stack::StoreConfiguration;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_shared_container_dir};

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Copy the bundled seed store into place on first run
    #[serde(default)]
    pub prepopulate_store: bool,
    /// Rewrite the shared cache after every persisted mutation, keeping
    /// the extension's view converged with the primary store
    #[serde(default = "default_mirror")]
    pub mirror_to_shared_cache: bool,
    /// Override for the store directory; the shared container when unset
    #[serde(default)]
    pub store_directory: Option<PathBuf>,
    /// Seed store used when prepopulation is enabled
    #[serde(default)]
    pub seed_store: Option<PathBuf>,
}

fn default_mirror() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            prepopulate_store: false,
            mirror_to_shared_cache: true,
            store_directory: None,
            seed_store: None,
        }
    }
}

impl AppConfig {
    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<(), String> {
        if self.prepopulate_store && self.seed_store.is_none() {
            return Err("prepopulate_store requires seed_store to be set".to_string());
        }
        Ok(())
    }

    /// Store configuration derived from these settings
    pub fn store_configuration(&self) -> StoreConfiguration {
        let mut configuration = StoreConfiguration::default_store_configuration();
        configuration.directory = self.store_directory.clone();
        configuration.seed_store = self.seed_store.clone();
        configuration
    }
}

/// Configuration service for managing app settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigService {
    /// Create a new config service, loading existing config or creating defaults
    pub fn new() -> AppResult<Self> {
        // Ensure the shared container exists
        ensure_shared_container_dir()?;

        let config_path = config_path()?;
        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let default_config = AppConfig::default();
            Self::save_to_file(&config_path, &default_config)?;
            default_config
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<AppConfig> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::config)?;
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    fn save_to_file(path: &Path, config: &AppConfig) -> AppResult<()> {
        config.validate().map_err(AppError::config)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a clone of the current configuration
    pub fn get_config_clone(&self) -> AppConfig {
        self.config.clone()
    }

    /// Save the current configuration to disk
    pub fn save(&self) -> AppResult<()> {
        Self::save_to_file(&self.config_path, &self.config)
    }

    /// Reload configuration from disk
    pub fn reload(&mut self) -> AppResult<()> {
        self.config = Self::load_from_file(&self.config_path)?;
        Ok(())
    }

    /// Reset configuration to defaults
    pub fn reset(&mut self) -> AppResult<()> {
        self.config = AppConfig::default();
        self.save()
    }
}
