//! Configuration data models
//!
//! This module defines all configuration structures used by the engine and the
//! admin binary.

pub mod logging;
pub mod rbac;
pub mod storage;

// Re-export all configuration types
pub use logging::*;
pub use rbac::*;
pub use storage::*;

/// Default realm served by this process
pub fn default_realm_id() -> u32 {
    1
}

/// Default catalog file
pub fn default_catalog_path() -> String {
    "config/rbac_catalog.yaml".to_string()
}

/// Default database URL
pub fn default_database_url() -> String {
    "sqlite://data/rbac.db?mode=rwc".to_string()
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_connection_timeout() -> u64 {
    5
}

pub fn default_log_level() -> String {
    "info".to_string()
}
