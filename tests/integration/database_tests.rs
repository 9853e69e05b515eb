//! Database integration tests
//!
//! Tests the permission store and the catalog tables on a real in-memory
//! SQLite database.

#[cfg(test)]
mod tests {
    use crate::common::database::{create_test_db, test_db_config};
    use crate::common::{TestDatabase, test_catalog};
    use account_rbac::RealmScope;
    use account_rbac::auth::rbac::{CatalogSource, PermissionStore, SecurityLevel};
    use account_rbac::storage::database::{Database, DatabaseBackendType, DatabaseCatalogSource};

    #[tokio::test]
    async fn test_database_health_check() {
        let db = Database::new(&test_db_config()).await;
        assert!(db.is_ok(), "Failed to create database: {:?}", db.err());

        let db = db.unwrap();
        let migrate_result = db.migrate().await;
        assert!(
            migrate_result.is_ok(),
            "Migration failed: {:?}",
            migrate_result.err()
        );

        let health = db.health_check().await;
        assert!(health.is_ok(), "Health check failed: {:?}", health.err());
        assert_eq!(db.backend_type(), DatabaseBackendType::SQLite);
    }

    #[tokio::test]
    async fn test_migrations_are_repeatable() {
        let db = create_test_db().await;
        assert!(db.migrate().await.is_ok());

        let stats = db.stats().await.unwrap();
        assert_eq!(stats.permissions, 0);
        assert_eq!(stats.account_permissions, 0);
    }

    #[tokio::test]
    async fn test_upsert_and_query() {
        let db = create_test_db().await;

        db.upsert_permission(1, 195, true, RealmScope::Global)
            .await
            .unwrap();
        db.upsert_permission(1, 201, false, RealmScope::Specific(1))
            .await
            .unwrap();

        let rows = db.query_explicit_permissions(1, 1).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].permission_id, 195);
        assert!(rows[0].granted);
        assert_eq!(rows[0].realm, RealmScope::Global);
        assert_eq!(rows[1].permission_id, 201);
        assert!(!rows[1].granted);
        assert_eq!(rows[1].realm, RealmScope::Specific(1));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_existing_row() {
        let db = create_test_db().await;

        db.upsert_permission(2, 200, true, RealmScope::Global)
            .await
            .unwrap();
        db.upsert_permission(2, 200, false, RealmScope::Global)
            .await
            .unwrap();

        let rows = db.list_account_permissions(2).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].granted);
        assert_eq!(rows[0].realm_id, -1);
    }

    #[tokio::test]
    async fn test_query_filters_by_realm() {
        let db = create_test_db().await;

        db.upsert_permission(3, 10, true, RealmScope::Specific(1))
            .await
            .unwrap();
        db.upsert_permission(3, 11, true, RealmScope::Specific(2))
            .await
            .unwrap();
        db.upsert_permission(3, 12, true, RealmScope::Global)
            .await
            .unwrap();
        db.upsert_permission(4, 13, true, RealmScope::Global)
            .await
            .unwrap();

        let realm_one: Vec<_> = db
            .query_explicit_permissions(3, 1)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.permission_id)
            .collect();
        assert_eq!(realm_one, vec![10, 12]);

        let realm_two: Vec<_> = db
            .query_explicit_permissions(3, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.permission_id)
            .collect();
        assert_eq!(realm_two, vec![11, 12]);

        assert_eq!(db.list_account_permissions(3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_same_permission_in_two_scopes() {
        let db = create_test_db().await;

        db.upsert_permission(5, 10, true, RealmScope::Global)
            .await
            .unwrap();
        db.upsert_permission(5, 10, false, RealmScope::Specific(1))
            .await
            .unwrap();

        let rows = db.query_explicit_permissions(5, 1).await.unwrap();
        assert_eq!(rows.len(), 2);
        // Ordered by realm column: -1 before 1
        assert_eq!(rows[0].realm, RealmScope::Global);
        assert_eq!(rows[1].realm, RealmScope::Specific(1));
    }

    #[tokio::test]
    async fn test_delete_permission() {
        let db = create_test_db().await;

        db.upsert_permission(6, 10, true, RealmScope::Global)
            .await
            .unwrap();
        db.upsert_permission(6, 10, true, RealmScope::Specific(1))
            .await
            .unwrap();

        db.delete_permission(6, 10, RealmScope::Specific(1))
            .await
            .unwrap();
        let rows = db.list_account_permissions(6).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].realm_id, -1);

        // Deleting a missing row is not an error
        assert!(db.delete_permission(6, 99, RealmScope::Global).await.is_ok());
    }

    #[tokio::test]
    async fn test_catalog_import_and_load() {
        let db = TestDatabase::with_catalog().await;

        let stats = db.db().stats().await.unwrap();
        assert_eq!(stats.permissions, 6);
        assert_eq!(stats.linked_permissions, 5);
        assert_eq!(stats.default_permissions, 4);

        let catalog = DatabaseCatalogSource::new(db.db_arc(), 1)
            .load()
            .await
            .unwrap();
        let expected = test_catalog();
        assert_eq!(catalog.permissions.len(), expected.permissions.len());
        assert_eq!(
            catalog.permissions.lookup(192).unwrap().sorted_links(),
            vec![193, 200]
        );
        let defaults: Vec<_> = catalog
            .defaults
            .defaults_for(SecurityLevel::GameMaster)
            .collect();
        assert_eq!(defaults, vec![193]);
    }

    #[tokio::test]
    async fn test_catalog_import_replaces_previous_catalog() {
        let db = TestDatabase::with_catalog().await;

        let mut builder = account_rbac::auth::rbac::RbacCatalog::builder();
        builder.permission(1, "Only").unwrap();
        db.db()
            .import_rbac_catalog(&builder.build(), RealmScope::Global)
            .await
            .unwrap();

        let stats = db.db().stats().await.unwrap();
        assert_eq!(stats.permissions, 1);
        assert_eq!(stats.linked_permissions, 0);
        assert_eq!(stats.default_permissions, 0);
    }

    #[tokio::test]
    async fn test_realm_specific_defaults() {
        let db = create_test_db().await;
        db.import_rbac_catalog(&test_catalog(), RealmScope::Specific(2))
            .await
            .unwrap();

        let realm_one = db.load_rbac_catalog(1).await.unwrap();
        assert!(realm_one.defaults.is_empty());
        assert_eq!(realm_one.permissions.len(), 6);

        let realm_two = db.load_rbac_catalog(2).await.unwrap();
        assert_eq!(realm_two.defaults.len(), 4);
    }

    #[tokio::test]
    async fn test_catalog_import_rejects_realm_zero() {
        let db = create_test_db().await;
        let result = db
            .import_rbac_catalog(&test_catalog(), RealmScope::Specific(0))
            .await;
        assert!(result.is_err());
        assert_eq!(db.stats().await.unwrap().permissions, 0);
    }
}
