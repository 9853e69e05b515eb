//! Configuration management
//!
//! This module handles loading, validation, and merging of the engine and
//! admin binary configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{RbacError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// RBAC configuration
    #[serde(default)]
    pub rbac: RbacConfig,
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RbacError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| RbacError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();

        if let Some(realm_id) = env_var("RBAC_REALM_ID") {
            config.rbac.realm_id = realm_id
                .parse()
                .map_err(|e| RbacError::Config(format!("Invalid RBAC_REALM_ID: {}", e)))?;
        }
        if let Some(free) = env_var("RBAC_FREE_PERMISSION_MODE") {
            config.rbac.free_permission_mode = parse_bool(&free).ok_or_else(|| {
                RbacError::Config(format!("Invalid RBAC_FREE_PERMISSION_MODE: {}", free))
            })?;
        }
        if let Some(path) = env_var("RBAC_CATALOG_PATH") {
            config.rbac.catalog.path = path;
        }
        if let Some(source) = env_var("RBAC_CATALOG_SOURCE") {
            config.rbac.catalog.source = match source.to_ascii_lowercase().as_str() {
                "file" => CatalogSourceKind::File,
                "database" => CatalogSourceKind::Database,
                other => {
                    return Err(RbacError::Config(format!(
                        "Invalid RBAC_CATALOG_SOURCE: {}",
                        other
                    )));
                }
            };
        }
        if let Some(url) = env_var("DATABASE_URL") {
            config.storage.database.url = url;
            config.storage.database.enabled = true;
        }
        if let Some(level) = env_var("RBAC_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.rbac
            .validate()
            .map_err(|e| RbacError::Config(format!("RBAC config error: {}", e)))?;

        self.storage
            .validate()
            .map_err(|e| RbacError::Config(format!("Storage config error: {}", e)))?;

        self.logging
            .validate()
            .map_err(|e| RbacError::Config(format!("Logging config error: {}", e)))?;

        if self.rbac.catalog.source == CatalogSourceKind::Database && !self.storage.database.enabled
        {
            return Err(RbacError::Config(
                "A database catalog requires storage.database.enabled".to_string(),
            ));
        }

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        self.rbac = self.rbac.merge(other.rbac);
        self.storage = self.storage.merge(other.storage);
        self.logging = self.logging.merge(other.logging);
        self
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| RbacError::Config(format!("Failed to serialize config to JSON: {}", e)))
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| RbacError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
