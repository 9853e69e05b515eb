//! # account-rbac
//!
//! Role-based access control for multi-realm servers: a permission catalog
//! with implied (linked) permissions, default permissions per security level,
//! and per-account explicit grants and denies resolved with deny precedence.
//!
//! ## Features
//!
//! - **Transitive links**: holding a permission implies every permission it
//!   links to, cycles included
//! - **Deny precedence**: anything reachable from a denied permission is
//!   removed from the effective set
//! - **Realm scoping**: explicit rows apply to one realm or to all of them
//! - **Hot reload**: the catalog is swapped atomically and open sessions are
//!   reloaded
//! - **SQL persistence** via SeaORM (SQLite or PostgreSQL), or in memory
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use account_rbac::auth::rbac::{FileCatalogSource, RbacManager, RealmScope, SecurityLevel};
//! use account_rbac::config::Config;
//! use account_rbac::storage::MemoryPermissionStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/rbac.yaml").await?;
//!     let source = FileCatalogSource::new(&config.rbac.catalog.path);
//!     let store = Arc::new(MemoryPermissionStore::new());
//!     let manager = RbacManager::new(&config.rbac, &source, store).await?;
//!
//!     let mut account = manager.account(42, "alice", SecurityLevel::GameMaster).await?;
//!     account.grant(7, Some(RealmScope::Global)).await?;
//!     assert!(account.has_permission(7));
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod storage;
pub mod utils;

// Re-export main types
pub use auth::rbac::{
    AccountPermissions, PermissionOutcome, RbacCommands, RbacManager, RealmScope, SecurityLevel,
};
pub use config::Config;
pub use utils::error::{RbacError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build timestamp (seconds since the epoch)
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("BUILD_TIME"),
            git_hash: env!("GIT_HASH"),
            rust_version: env!("RUST_VERSION"),
        }
    }
}

/// Build
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
