//! Per-account permission state

use crate::utils::error::{RbacError, Result};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::catalog::{CatalogHandle, RbacCatalog};
use super::resolver::resolve;
use super::store::PermissionStore;
use super::types::{
    AccountId, FreePermissionMode, PermissionId, PermissionOutcome, RealmId, RealmScope,
    SecurityLevel,
};

/// Collaborators every account state is built from
#[derive(Clone)]
pub struct RbacContext {
    /// Published catalog
    pub catalog: CatalogHandle,
    /// Persistence for explicit rows
    pub store: Arc<dyn PermissionStore>,
    /// Current realm
    pub realm_id: RealmId,
    /// Operator escape hatch shared with the manager
    pub free_mode: FreePermissionMode,
}

impl fmt::Debug for RbacContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RbacContext")
            .field("realm_id", &self.realm_id)
            .field("free_mode", &self.free_mode.is_enabled())
            .finish_non_exhaustive()
    }
}

/// Whether the explicit sets have been read from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Grant,
    Deny,
}

/// Explicit grants and denies of one account in one realm, plus the
/// effective set derived from them
///
/// Single owner; wrap it in a lock when several tasks need it (see
/// [`super::RbacManager::open_session`]).
pub struct AccountPermissions {
    id: AccountId,
    name: String,
    security_level: SecurityLevel,
    context: RbacContext,
    state: LoadState,
    granted: HashSet<PermissionId>,
    denied: HashSet<PermissionId>,
    effective: HashSet<PermissionId>,
    /// Scopes of the stored rows behind each explicit entry; defaults and
    /// unpersisted changes have none
    stored: HashMap<PermissionId, BTreeSet<RealmScope>>,
}

impl fmt::Debug for AccountPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountPermissions")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("security_level", &self.security_level)
            .field("realm_id", &self.context.realm_id)
            .field("state", &self.state)
            .field("granted", &self.granted)
            .field("denied", &self.denied)
            .field("effective", &self.effective)
            .field("stored", &self.stored)
            .finish()
    }
}

impl AccountPermissions {
    /// Create an unloaded state; call [`Self::load`] before mutating it
    pub fn new<S: Into<String>>(
        context: RbacContext,
        id: AccountId,
        name: S,
        security_level: SecurityLevel,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            security_level,
            context,
            state: LoadState::Unloaded,
            granted: HashSet::new(),
            denied: HashSet::new(),
            effective: HashSet::new(),
            stored: HashMap::new(),
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn security_level(&self) -> SecurityLevel {
        self.security_level
    }

    pub fn realm_id(&self) -> RealmId {
        self.context.realm_id
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn granted_permissions(&self) -> &HashSet<PermissionId> {
        &self.granted
    }

    pub fn denied_permissions(&self) -> &HashSet<PermissionId> {
        &self.denied
    }

    /// Effective permissions
    pub fn permissions(&self) -> &HashSet<PermissionId> {
        &self.effective
    }

    /// Realm scopes of the stored rows for `id`, global first
    pub fn stored_scopes(&self, id: PermissionId) -> Vec<RealmScope> {
        self.stored
            .get(&id)
            .map(|scopes| scopes.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether `id` is in force; always true in free permission mode
    pub fn has_permission(&self, id: PermissionId) -> bool {
        self.context.free_mode.is_enabled() || self.effective.contains(&id)
    }

    /// Explicitly grant `id`
    ///
    /// With `realm` set the row is persisted first and the effective set is
    /// recomputed; the scope must be visible from the current realm. Without
    /// it nothing is written and the caller recalculates once after a batch.
    pub async fn grant(
        &mut self,
        id: PermissionId,
        realm: Option<RealmScope>,
    ) -> Result<PermissionOutcome> {
        self.ensure_loaded()?;
        let catalog = self.context.catalog.snapshot();
        self.add(&catalog, Kind::Grant, id, realm).await
    }

    /// Explicitly deny `id`; symmetric to [`Self::grant`]
    pub async fn deny(
        &mut self,
        id: PermissionId,
        realm: Option<RealmScope>,
    ) -> Result<PermissionOutcome> {
        self.ensure_loaded()?;
        let catalog = self.context.catalog.snapshot();
        self.add(&catalog, Kind::Deny, id, realm).await
    }

    /// Remove `id` from both explicit sets
    ///
    /// With `realm` set, that scope must hold a stored row for `id`; the row is
    /// deleted. When rows of other visible scopes remain, the state is
    /// reloaded so it matches what the store now holds.
    pub async fn revoke(
        &mut self,
        id: PermissionId,
        realm: Option<RealmScope>,
    ) -> Result<PermissionOutcome> {
        self.ensure_loaded()?;

        if !self.granted.contains(&id) && !self.denied.contains(&id) {
            debug!(
                "Revoke of permission {} for account {} ({}) refused: not in any list",
                id, self.name, self.id
            );
            return Ok(PermissionOutcome::CannotRevokeNotInEitherList);
        }

        let Some(realm) = realm else {
            self.granted.remove(&id);
            self.denied.remove(&id);
            debug!("Revoked permission {} for account {} ({})", id, self.name, self.id);
            return Ok(PermissionOutcome::Ok);
        };

        self.check_realm(realm)?;
        let holds_row = self
            .stored
            .get(&id)
            .is_some_and(|scopes| scopes.contains(&realm));
        if !holds_row {
            return Err(RbacError::scope_mismatch(self.id, id, realm));
        }

        self.context
            .store
            .delete_permission(self.id, id, realm)
            .await?;

        let remaining = self.stored.get_mut(&id).map_or(0, |scopes| {
            scopes.remove(&realm);
            scopes.len()
        });
        debug!(
            "Revoked permission {} for account {} ({}) in {}",
            id, self.name, self.id, realm
        );

        if remaining > 0 {
            info!(
                "Permission {} of account {} ({}) still has stored rows; reloading",
                id, self.name, self.id
            );
            self.load().await?;
        } else {
            self.stored.remove(&id);
            self.granted.remove(&id);
            self.denied.remove(&id);
            self.recalculate();
        }
        Ok(PermissionOutcome::Ok)
    }

    /// Replace the state with the stored rows plus the level's defaults
    ///
    /// The store is read before anything is cleared, so a failed read leaves
    /// the previous state in place. Loading twice yields the same sets. One
    /// catalog snapshot is used for the whole load.
    pub async fn load(&mut self) -> Result<()> {
        let rows = self
            .context
            .store
            .query_explicit_permissions(self.id, self.context.realm_id)
            .await?;
        let catalog = self.context.catalog.snapshot();

        debug!(
            "Loading permissions for account {} ({}) in realm {}: {} stored rows",
            self.name,
            self.id,
            self.context.realm_id,
            rows.len()
        );

        self.granted.clear();
        self.denied.clear();
        self.effective.clear();
        self.stored.clear();

        for row in rows {
            if !row.realm.applies_to(self.context.realm_id) {
                warn!(
                    "Ignoring permission row {} of account {} for {}, not visible from realm {}",
                    row.permission_id, self.id, row.realm, self.context.realm_id
                );
                continue;
            }
            let kind = if row.granted { Kind::Grant } else { Kind::Deny };
            let outcome = self.add(&catalog, kind, row.permission_id, None).await?;
            match outcome {
                PermissionOutcome::PermissionIdDoesNotExist => {
                    debug!(
                        "Stored {:?} of unknown permission {} for account {} skipped",
                        kind, row.permission_id, self.id
                    );
                    continue;
                }
                PermissionOutcome::Ok => {}
                outcome => debug!(
                    "Stored {:?} of permission {} for account {} in {} skipped: {}",
                    kind, row.permission_id, self.id, row.realm, outcome
                ),
            }
            self.stored
                .entry(row.permission_id)
                .or_default()
                .insert(row.realm);
        }

        let defaults: Vec<_> = catalog.defaults.defaults_for(self.security_level).collect();
        for id in defaults {
            match self.add(&catalog, Kind::Grant, id, None).await? {
                PermissionOutcome::PermissionIdDoesNotExist => warn!(
                    "Default permission {} of security level {} does not exist",
                    id, self.security_level
                ),
                PermissionOutcome::Ok | PermissionOutcome::AlreadyAdded => {}
                outcome => debug!(
                    "Default permission {} for account {} skipped: {}",
                    id, self.id, outcome
                ),
            }
        }

        self.state = LoadState::Loaded;
        self.recalculate_with(&catalog);
        info!(
            "Loaded permissions for account {} ({}): {} granted, {} denied, {} effective",
            self.name,
            self.id,
            self.granted.len(),
            self.denied.len(),
            self.effective.len()
        );
        Ok(())
    }

    /// Change the security level and reload if the state was loaded
    pub async fn set_security_level(&mut self, level: SecurityLevel) -> Result<()> {
        if self.security_level == level {
            return Ok(());
        }
        info!(
            "Security level of account {} ({}) changes from {} to {}",
            self.name, self.id, self.security_level, level
        );
        self.security_level = level;
        if self.is_loaded() {
            self.load().await?;
        }
        Ok(())
    }

    /// Recompute the effective set from the explicit sets
    pub fn recalculate(&mut self) {
        let catalog = self.context.catalog.snapshot();
        self.recalculate_with(&catalog);
    }

    fn recalculate_with(&mut self, catalog: &RbacCatalog) {
        self.effective = resolve(&catalog.permissions, &self.granted, &self.denied);
    }

    fn ensure_loaded(&self) -> Result<()> {
        match self.state {
            LoadState::Loaded => Ok(()),
            LoadState::Unloaded => Err(RbacError::not_loaded(self.id)),
        }
    }

    /// Rows written for other realms would never be read back by this state
    fn check_realm(&self, realm: RealmScope) -> Result<()> {
        if !realm.is_valid() {
            return Err(RbacError::validation(format!("Invalid realm scope: {}", realm)));
        }
        if !realm.applies_to(self.context.realm_id) {
            return Err(RbacError::validation(format!(
                "Realm scope {} is not visible from realm {}",
                realm, self.context.realm_id
            )));
        }
        Ok(())
    }

    async fn add(
        &mut self,
        catalog: &RbacCatalog,
        kind: Kind,
        id: PermissionId,
        realm: Option<RealmScope>,
    ) -> Result<PermissionOutcome> {
        if !catalog.permissions.contains(id) {
            return Ok(PermissionOutcome::PermissionIdDoesNotExist);
        }

        let (own, other, conflict) = match kind {
            Kind::Grant => (&self.granted, &self.denied, PermissionOutcome::AlreadyInDeniedList),
            Kind::Deny => (&self.denied, &self.granted, PermissionOutcome::AlreadyInGrantedList),
        };
        if other.contains(&id) {
            return Ok(conflict);
        }
        if own.contains(&id) {
            return Ok(PermissionOutcome::AlreadyAdded);
        }

        if let Some(realm) = realm {
            self.check_realm(realm)?;
            self.context
                .store
                .upsert_permission(self.id, id, kind == Kind::Grant, realm)
                .await?;
        }

        match kind {
            Kind::Grant => self.granted.insert(id),
            Kind::Deny => self.denied.insert(id),
        };

        if let Some(realm) = realm {
            debug!(
                "{:?} permission {} for account {} ({}) saved for {}",
                kind, id, self.name, self.id, realm
            );
            self.stored.entry(id).or_default().insert(realm);
            self.recalculate_with(catalog);
        }
        Ok(PermissionOutcome::Ok)
    }
}
