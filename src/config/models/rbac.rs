//! RBAC configuration

use super::*;
use serde::{Deserialize, Serialize};

/// RBAC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbacConfig {
    /// Realm this process serves; stored rows of other realms are ignored
    #[serde(default = "default_realm_id")]
    pub realm_id: u32,
    /// Every permission check succeeds when set
    #[serde(default)]
    pub free_permission_mode: bool,
    /// Where the permission catalog is loaded from
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            realm_id: default_realm_id(),
            free_permission_mode: false,
            catalog: CatalogConfig::default(),
        }
    }
}

impl RbacConfig {
    /// Merge RBAC configurations
    pub fn merge(mut self, other: Self) -> Self {
        if other.realm_id != default_realm_id() {
            self.realm_id = other.realm_id;
        }
        if other.free_permission_mode {
            self.free_permission_mode = other.free_permission_mode;
        }
        self.catalog = self.catalog.merge(other.catalog);
        self
    }
}

/// Catalog source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSourceKind {
    /// YAML document on disk
    #[default]
    File,
    /// `rbac_*` tables of the configured database
    Database,
}

/// Catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Source kind
    #[serde(default)]
    pub source: CatalogSourceKind,
    /// Catalog file, used when `source` is `file`
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSourceKind::default(),
            path: default_catalog_path(),
        }
    }
}

impl CatalogConfig {
    /// Merge catalog configurations
    pub fn merge(mut self, other: Self) -> Self {
        if other.source != CatalogSourceKind::default() {
            self.source = other.source;
        }
        if !other.path.is_empty() && other.path != default_catalog_path() {
            self.path = other.path;
        }
        self
    }
}
