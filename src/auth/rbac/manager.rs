//! Account permission manager
//!
//! Owns the published catalog and hands out loaded account states. Replaces a
//! process-wide accessor: everything it needs is passed in at construction.

use crate::config::RbacConfig;
use crate::utils::error::Result;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::account::{AccountPermissions, RbacContext};
use super::catalog::{CatalogHandle, CatalogSource, RbacCatalog};
use super::store::PermissionStore;
use super::types::{AccountId, FreePermissionMode, PermissionId, RealmId, SecurityLevel};

/// Account state shared between the tasks of one session
pub type SharedAccountPermissions = Arc<Mutex<AccountPermissions>>;

/// Entry point of the RBAC engine
pub struct RbacManager {
    context: RbacContext,
    sessions: DashMap<AccountId, SharedAccountPermissions>,
}

impl RbacManager {
    /// Load the catalog from `source` and build a manager
    ///
    /// A catalog that cannot be loaded is fatal: no manager is returned.
    pub async fn new(
        config: &RbacConfig,
        source: &dyn CatalogSource,
        store: Arc<dyn PermissionStore>,
    ) -> Result<Self> {
        info!(
            "Initializing RBAC for realm {} from {}",
            config.realm_id,
            source.describe()
        );
        let catalog = source.load().await?;

        let manager = Self::from_parts(
            catalog,
            store,
            config.realm_id,
            FreePermissionMode::new(config.free_permission_mode),
        );
        if config.free_permission_mode {
            info!("Free permission mode is enabled: every permission check succeeds");
        }
        Ok(manager)
    }

    /// Build a manager around an already loaded catalog
    pub fn from_parts(
        catalog: RbacCatalog,
        store: Arc<dyn PermissionStore>,
        realm_id: RealmId,
        free_mode: FreePermissionMode,
    ) -> Self {
        Self {
            context: RbacContext {
                catalog: CatalogHandle::new(catalog),
                store,
                realm_id,
                free_mode,
            },
            sessions: DashMap::new(),
        }
    }

    pub fn context(&self) -> &RbacContext {
        &self.context
    }

    /// Snapshot of the current catalog
    pub fn catalog(&self) -> Arc<RbacCatalog> {
        self.context.catalog.snapshot()
    }

    pub fn realm_id(&self) -> RealmId {
        self.context.realm_id
    }

    pub fn free_permission_mode(&self) -> &FreePermissionMode {
        &self.context.free_mode
    }

    /// Loaded permission state for an account, owned by the caller
    pub async fn account(
        &self,
        account_id: AccountId,
        name: &str,
        level: SecurityLevel,
    ) -> Result<AccountPermissions> {
        let mut account = AccountPermissions::new(self.context.clone(), account_id, name, level);
        account.load().await?;
        Ok(account)
    }

    /// Register the account's state for a session, loading it on first use
    pub async fn open_session(
        &self,
        account_id: AccountId,
        name: &str,
        level: SecurityLevel,
    ) -> Result<SharedAccountPermissions> {
        if let Some(existing) = self.session(account_id) {
            return Ok(existing);
        }

        let account = self.account(account_id, name, level).await?;
        let shared = self
            .sessions
            .entry(account_id)
            .or_insert_with(|| Arc::new(Mutex::new(account)))
            .clone();
        debug!("Opened permission session for account {}", account_id);
        Ok(shared)
    }

    pub fn session(&self, account_id: AccountId) -> Option<SharedAccountPermissions> {
        self.sessions.get(&account_id).map(|entry| entry.value().clone())
    }

    /// Drop the session state; returns whether one existed
    pub fn close_session(&self, account_id: AccountId) -> bool {
        let closed = self.sessions.remove(&account_id).is_some();
        if closed {
            debug!("Closed permission session for account {}", account_id);
        }
        closed
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Check a permission without keeping any state around
    ///
    /// Uses the open session if there is one.
    pub async fn has_permission(
        &self,
        account_id: AccountId,
        level: SecurityLevel,
        permission_id: PermissionId,
    ) -> Result<bool> {
        if let Some(session) = self.session(account_id) {
            return Ok(session.lock().await.has_permission(permission_id));
        }
        let account = self.account(account_id, "", level).await?;
        Ok(account.has_permission(permission_id))
    }

    /// Publish a freshly loaded catalog and reload every open session
    ///
    /// Returns the number of sessions reloaded.
    pub async fn reload_catalog(&self, source: &dyn CatalogSource) -> Result<usize> {
        self.context.catalog.reload(source).await?;

        let sessions: Vec<_> = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        for session in &sessions {
            session.lock().await.load().await?;
        }

        info!("Reloaded permissions of {} open sessions", sessions.len());
        Ok(sessions.len())
    }
}
