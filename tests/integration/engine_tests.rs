//! Engine integration tests
//!
//! Runs the manager and the operator commands against the SQL store.

#[cfg(test)]
mod tests {
    use crate::common::{CATALOG_YAML, TestDatabase, test_catalog};
    use crate::{assert_err, assert_ok};
    use account_rbac::auth::rbac::{
        AccountPermissions, CommandError, FileCatalogSource, FreePermissionMode, PermissionStore,
        RbacCommands, RbacManager, RealmScope, SecurityLevel,
    };
    use account_rbac::config::{CatalogSourceKind, RbacConfig};
    use account_rbac::storage::database::DatabaseCatalogSource;
    use account_rbac::utils::error::RbacError;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn ids(values: &[u32]) -> HashSet<u32> {
        values.iter().copied().collect()
    }

    async fn sql_manager(db: &TestDatabase, realm_id: u32) -> RbacManager {
        let store: Arc<dyn PermissionStore> = db.db_arc();
        RbacManager::from_parts(test_catalog(), store, realm_id, FreePermissionMode::default())
    }

    #[tokio::test]
    async fn test_role_chain_defaults() {
        let db = TestDatabase::with_catalog().await;
        let manager = sql_manager(&db, 1).await;

        let admin = assert_ok!(
            manager
                .account(1, "admin", SecurityLevel::Administrator)
                .await
        );
        assert_eq!(admin.permissions(), &ids(&[192, 193, 194, 195, 200, 201]));

        let player = assert_ok!(manager.account(2, "player", SecurityLevel::Player).await);
        assert_eq!(player.permissions(), &ids(&[195]));
    }

    #[tokio::test]
    async fn test_changes_survive_reload() {
        let db = TestDatabase::with_catalog().await;
        let manager = sql_manager(&db, 1).await;

        let mut gm = assert_ok!(manager.account(3, "gm", SecurityLevel::GameMaster).await);
        assert_ok!(gm.deny(201, Some(RealmScope::Global)).await);
        assert_ok!(gm.grant(200, Some(RealmScope::Specific(1))).await);
        assert_eq!(gm.permissions(), &ids(&[193, 194, 195, 200]));

        let reloaded = assert_ok!(manager.account(3, "gm", SecurityLevel::GameMaster).await);
        assert_eq!(reloaded.permissions(), gm.permissions());
        assert_eq!(reloaded.denied_permissions(), &ids(&[201]));

        // Realm 2 sees the global deny but not the realm 1 grant
        let other_realm = sql_manager(&db, 2).await;
        let remote = assert_ok!(
            other_realm
                .account(3, "gm", SecurityLevel::GameMaster)
                .await
        );
        assert_eq!(remote.permissions(), &ids(&[193, 194, 195]));
    }

    #[tokio::test]
    async fn test_revoke_removes_row() {
        let db = TestDatabase::with_catalog().await;
        let manager = sql_manager(&db, 1).await;

        let mut player = assert_ok!(manager.account(4, "player", SecurityLevel::Player).await);
        assert_ok!(player.grant(200, Some(RealmScope::Global)).await);
        assert_eq!(db.db().list_account_permissions(4).await.unwrap().len(), 1);

        assert_ok!(player.revoke(200, Some(RealmScope::Global)).await);
        assert!(db.db().list_account_permissions(4).await.unwrap().is_empty());
        assert_eq!(player.permissions(), &ids(&[195]));
    }

    /// Load the account again and compare it with the live state
    async fn assert_matches_reload(manager: &RbacManager, live: &AccountPermissions) {
        let fresh = assert_ok!(
            manager
                .account(live.id(), live.name(), live.security_level())
                .await
        );
        assert_eq!(fresh.granted_permissions(), live.granted_permissions());
        assert_eq!(fresh.denied_permissions(), live.denied_permissions());
        assert_eq!(fresh.permissions(), live.permissions());
    }

    #[tokio::test]
    async fn test_other_realm_scope_is_not_written() {
        let db = TestDatabase::with_catalog().await;
        let manager = sql_manager(&db, 1).await;

        let mut player = assert_ok!(manager.account(8, "player", SecurityLevel::Player).await);
        let error = assert_err!(player.grant(200, Some(RealmScope::Specific(2))).await);
        assert!(matches!(error, RbacError::Validation(_)));
        let error = assert_err!(player.deny(195, Some(RealmScope::Specific(2))).await);
        assert!(matches!(error, RbacError::Validation(_)));

        assert!(db.db().list_account_permissions(8).await.unwrap().is_empty());
        assert_eq!(player.permissions(), &ids(&[195]));
        assert_matches_reload(&manager, &player).await;
    }

    #[tokio::test]
    async fn test_revoke_needs_the_stored_scope() {
        let db = TestDatabase::with_catalog().await;
        let manager = sql_manager(&db, 1).await;

        let mut player = assert_ok!(manager.account(9, "player", SecurityLevel::Player).await);
        assert_ok!(player.grant(200, Some(RealmScope::Global)).await);

        let error = assert_err!(player.revoke(200, Some(RealmScope::Specific(1))).await);
        assert!(matches!(
            error,
            RbacError::ScopeMismatch {
                account_id: 9,
                permission_id: 200,
                ..
            }
        ));
        let rows = db.db().list_account_permissions(9).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].realm_id, -1);
        assert_eq!(player.permissions(), &ids(&[195, 200]));
        assert_matches_reload(&manager, &player).await;

        assert_ok!(player.revoke(200, Some(RealmScope::Global)).await);
        assert!(db.db().list_account_permissions(9).await.unwrap().is_empty());
        assert_matches_reload(&manager, &player).await;
    }

    #[tokio::test]
    async fn test_revoke_global_row_keeps_realm_row() {
        let db = TestDatabase::with_catalog().await;
        db.db()
            .upsert_permission(10, 200, true, RealmScope::Global)
            .await
            .unwrap();
        db.db()
            .upsert_permission(10, 200, false, RealmScope::Specific(1))
            .await
            .unwrap();
        let manager = sql_manager(&db, 1).await;

        let mut gm = assert_ok!(manager.account(10, "gm", SecurityLevel::GameMaster).await);
        assert!(gm.granted_permissions().contains(&200));

        assert_ok!(gm.revoke(200, Some(RealmScope::Global)).await);
        let rows = db.db().list_account_permissions(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].realm_id, 1);
        assert_eq!(gm.denied_permissions(), &ids(&[200]));
        assert_matches_reload(&manager, &gm).await;

        // Realm 2 never saw the realm 1 deny
        let other_realm = sql_manager(&db, 2).await;
        let remote = assert_ok!(
            other_realm
                .account(10, "gm", SecurityLevel::GameMaster)
                .await
        );
        assert!(remote.denied_permissions().is_empty());
        assert!(!remote.granted_permissions().contains(&200));
    }

    #[tokio::test]
    async fn test_command_revoke_reports_scope_mismatch() {
        let db = TestDatabase::with_catalog().await;
        let commands = RbacCommands::new(Arc::new(sql_manager(&db, 1).await));

        let mut moderator = assert_ok!(
            commands
                .manager()
                .account(11, "mod", SecurityLevel::Moderator)
                .await
        );
        assert_ok!(
            commands
                .account_grant(SecurityLevel::Console, &mut moderator, 200, RealmScope::Global)
                .await
        );
        let error = assert_err!(
            commands
                .account_revoke(
                    SecurityLevel::Console,
                    &mut moderator,
                    200,
                    RealmScope::Specific(1),
                )
                .await
        );
        assert!(matches!(
            error,
            CommandError::Engine(RbacError::ScopeMismatch { .. })
        ));
        assert_eq!(db.db().list_account_permissions(11).await.unwrap().len(), 1);
        assert_matches_reload(commands.manager(), &moderator).await;
    }

    #[tokio::test]
    async fn test_manager_from_database_catalog() {
        let db = TestDatabase::with_catalog().await;
        let config = RbacConfig {
            realm_id: 1,
            ..RbacConfig::default()
        };
        let source = DatabaseCatalogSource::new(db.db_arc(), 1);

        let manager = assert_ok!(RbacManager::new(&config, &source, db.db_arc()).await);
        assert_eq!(manager.catalog().permissions.len(), 6);
        assert!(
            manager
                .has_permission(5, SecurityLevel::Moderator, 195)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_manager_from_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rbac_catalog.yaml");
        tokio::fs::write(&path, CATALOG_YAML).await.unwrap();

        let mut config = RbacConfig::default();
        config.catalog.source = CatalogSourceKind::File;
        config.catalog.path = path.to_string_lossy().to_string();

        let db = TestDatabase::new().await;
        let source = FileCatalogSource::new(&config.catalog.path);
        let manager = assert_ok!(RbacManager::new(&config, &source, db.db_arc()).await);

        let commands = RbacCommands::new(Arc::new(manager));
        let listing = commands.list_permissions(Some(193)).unwrap();
        assert_eq!(listing[0].linked, vec![194, 201]);
    }

    #[tokio::test]
    async fn test_commands_persist_through_sql_store() {
        let db = TestDatabase::with_catalog().await;
        let commands = RbacCommands::new(Arc::new(sql_manager(&db, 1).await));

        let mut moderator = assert_ok!(
            commands
                .manager()
                .account(6, "mod", SecurityLevel::Moderator)
                .await
        );
        let message = assert_ok!(
            commands
                .account_grant(
                    SecurityLevel::GameMaster,
                    &mut moderator,
                    201,
                    RealmScope::Specific(1),
                )
                .await
        );
        assert!(message.contains("Command: gm fly"));

        let error = assert_err!(
            commands
                .account_deny(
                    SecurityLevel::Moderator,
                    &mut moderator,
                    195,
                    RealmScope::Global,
                )
                .await
        );
        assert!(matches!(error, CommandError::InsufficientSecurity { .. }));

        let rows = db.db().list_account_permissions(6).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].permission_id, 201);
        assert_eq!(rows[0].realm_id, 1);
    }

    #[tokio::test]
    async fn test_reload_catalog_from_database() {
        let db = TestDatabase::with_catalog().await;
        let manager = sql_manager(&db, 1).await;
        let session = assert_ok!(
            manager
                .open_session(7, "player", SecurityLevel::Player)
                .await
        );
        assert!(session.lock().await.has_permission(195));

        let mut builder = account_rbac::auth::rbac::RbacCatalog::builder();
        builder.permission(195, "Role: player").unwrap();
        builder.permission(300, "Command: guild").unwrap();
        builder
            .link(195, 300)
            .default_permission(SecurityLevel::Player, 195);
        db.db()
            .import_rbac_catalog(&builder.build(), RealmScope::Global)
            .await
            .unwrap();

        let source = DatabaseCatalogSource::new(db.db_arc(), 1);
        assert_eq!(assert_ok!(manager.reload_catalog(&source).await), 1);
        assert_eq!(session.lock().await.permissions(), &ids(&[195, 300]));
    }
}
