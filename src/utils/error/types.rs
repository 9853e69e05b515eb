//! Error types for the RBAC engine

use thiserror::Error;

/// Result type alias for the RBAC engine
pub type Result<T> = std::result::Result<T, RbacError>;

/// Main error type for the RBAC engine
#[derive(Error, Debug)]
pub enum RbacError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Permission catalog could not be built
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A mutation was attempted before the account state was loaded
    #[error("Permissions of account {account_id} are not loaded")]
    NotLoaded { account_id: u32 },

    /// A revoke named a realm scope that holds no stored row for the permission
    #[error("Permission {permission_id} of account {account_id} has no stored row for {scope}")]
    ScopeMismatch {
        account_id: u32,
        permission_id: u32,
        scope: String,
    },

    /// Permission store errors other than database driver failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
