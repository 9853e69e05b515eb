//! Test database utilities
//!
//! Provides in-memory SQLite database for testing without external dependencies.
//! Each test gets an isolated database instance using SeaORM.

use account_rbac::config::DatabaseConfig;
use account_rbac::storage::database::Database;
use std::sync::Arc;

/// Test database wrapper providing isolated in-memory SQLite instances
#[derive(Debug, Clone)]
pub struct TestDatabase {
    inner: Arc<Database>,
}

impl TestDatabase {
    /// Create a new in-memory test database with all migrations applied
    pub async fn new() -> Self {
        let db = create_test_db().await;
        Self {
            inner: Arc::new(db),
        }
    }

    /// Create a test database with the fixture catalog imported
    pub async fn with_catalog() -> Self {
        let db = Self::new().await;
        db.db()
            .import_rbac_catalog(
                &super::fixtures::test_catalog(),
                account_rbac::RealmScope::Global,
            )
            .await
            .expect("Failed to import test catalog");
        db
    }

    /// Get reference to the underlying database
    pub fn db(&self) -> &Database {
        &self.inner
    }

    /// Get Arc to the underlying database
    pub fn db_arc(&self) -> Arc<Database> {
        Arc::clone(&self.inner)
    }
}

/// Helper to create a simple test database config
pub fn test_db_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1, // In-memory DB only supports 1 connection
        connection_timeout: 5,
        enabled: true,
    }
}

/// Create a standalone test database (convenience function)
pub async fn create_test_db() -> Database {
    let db = Database::new(&test_db_config())
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_creation() {
        let db = TestDatabase::new().await;
        assert!(db.db().health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_database_with_catalog() {
        let db = TestDatabase::with_catalog().await;
        let stats = db.db().stats().await.unwrap();
        assert_eq!(stats.permissions, 6);
    }
}
