//! Role-Based Access Control (RBAC) engine
//!
//! Permissions are numeric ids that may imply other permissions. Accounts hold
//! explicit grants and denies per realm on top of the defaults of their
//! security level; the effective set is resolved with deny precedence.

mod account;
mod catalog;
mod commands;
mod manager;
mod resolver;
mod store;
mod types;

pub use account::{AccountPermissions, LoadState, RbacContext};
pub use catalog::{
    CatalogDocument, CatalogHandle, CatalogSource, DefaultPermissionTable, FileCatalogSource,
    PermissionCatalog, PermissionEntry, RbacCatalog, RbacCatalogBuilder,
};
pub use commands::{AccountListing, CommandError, PermissionListing, RbacCommands};
pub use manager::{RbacManager, SharedAccountPermissions};
pub use resolver::{expand_transitively, resolve};
pub use store::{PermissionStore, StoredPermission};
pub use types::{
    ALL_REALMS, AccountId, FreePermissionMode, Permission, PermissionId, PermissionOutcome,
    RealmId, RealmScope, SecurityLevel,
};
