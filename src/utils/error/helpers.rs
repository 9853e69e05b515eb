//! Helper functions for creating specific error types

use super::types::RbacError;

impl RbacError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn catalog<S: Into<String>>(message: S) -> Self {
        Self::Catalog(message.into())
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn not_loaded(account_id: u32) -> Self {
        Self::NotLoaded { account_id }
    }

    pub fn scope_mismatch<S: ToString>(account_id: u32, permission_id: u32, scope: S) -> Self {
        Self::ScopeMismatch {
            account_id,
            permission_id,
            scope: scope.to_string(),
        }
    }

    /// Whether the error came from the backing store rather than the caller
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Storage(_))
    }
}
