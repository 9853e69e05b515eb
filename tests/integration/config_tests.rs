//! Configuration integration tests

#[cfg(test)]
mod tests {
    use account_rbac::config::{CatalogSourceKind, Config};

    #[tokio::test]
    async fn test_load_full_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rbac.yaml");
        let yaml = r#"
rbac:
  realm_id: 3
  free_permission_mode: false
  catalog:
    source: database
storage:
  database:
    url: "sqlite::memory:"
    max_connections: 1
    enabled: true
logging:
  level: debug
  json: true
"#;
        tokio::fs::write(&path, yaml).await.unwrap();

        let config = Config::from_file(&path).await.unwrap();
        assert_eq!(config.rbac.realm_id, 3);
        assert_eq!(config.rbac.catalog.source, CatalogSourceKind::Database);
        assert!(config.storage.database.enabled);
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_database_catalog_requires_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rbac.yaml");
        tokio::fs::write(&path, "rbac:\n  catalog:\n    source: database\n")
            .await
            .unwrap();

        assert!(Config::from_file(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_shipped_example_config_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/rbac.yaml.example");
        let config = Config::from_file(path).await.unwrap();
        assert!(config.validate().is_ok());
    }
}
