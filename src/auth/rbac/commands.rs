//! Operator commands on top of the manager

use crate::utils::error::RbacError;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::account::AccountPermissions;
use super::catalog::RbacCatalog;
use super::manager::RbacManager;
use super::types::{PermissionId, PermissionOutcome, RealmScope, SecurityLevel};

/// Why a command did not apply
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Your security level is too low to change permissions of account {account} ({level})")]
    InsufficientSecurity { account: String, level: SecurityLevel },

    #[error("Permission {0} does not exist")]
    UnknownPermission(PermissionId),

    #[error("Cannot {action} permission {permission} for account {account}: {outcome}")]
    Rejected {
        action: &'static str,
        permission: PermissionId,
        account: String,
        outcome: PermissionOutcome,
    },

    #[error(transparent)]
    Engine(#[from] RbacError),
}

/// A permission as shown to operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionListing {
    pub id: PermissionId,
    pub name: String,
    pub linked: Vec<PermissionId>,
}

/// Explicit and effective permissions of an account, sorted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountListing {
    pub account_id: u32,
    pub name: String,
    pub security_level: SecurityLevel,
    pub granted: Vec<PermissionListing>,
    pub denied: Vec<PermissionListing>,
    pub effective: Vec<PermissionListing>,
}

/// Operator command handlers
#[derive(Clone)]
pub struct RbacCommands {
    manager: Arc<RbacManager>,
}

impl RbacCommands {
    pub fn new(manager: Arc<RbacManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<RbacManager> {
        &self.manager
    }

    /// Every permission, or a single one with its direct links
    pub fn list_permissions(
        &self,
        id: Option<PermissionId>,
    ) -> Result<Vec<PermissionListing>, CommandError> {
        let catalog = self.manager.catalog();
        match id {
            Some(id) => {
                let permission = catalog
                    .permissions
                    .lookup(id)
                    .ok_or(CommandError::UnknownPermission(id))?;
                Ok(vec![PermissionListing {
                    id: permission.id,
                    name: permission.name.clone(),
                    linked: permission.sorted_links(),
                }])
            }
            None => Ok(catalog
                .permissions
                .sorted()
                .into_iter()
                .map(|permission| PermissionListing {
                    id: permission.id,
                    name: permission.name.clone(),
                    linked: permission.sorted_links(),
                })
                .collect()),
        }
    }

    pub fn account_list(&self, target: &AccountPermissions) -> AccountListing {
        let catalog = self.manager.catalog();
        AccountListing {
            account_id: target.id(),
            name: target.name().to_string(),
            security_level: target.security_level(),
            granted: listing(&catalog, target.granted_permissions()),
            denied: listing(&catalog, target.denied_permissions()),
            effective: listing(&catalog, target.permissions()),
        }
    }

    pub async fn account_grant(
        &self,
        invoker: SecurityLevel,
        target: &mut AccountPermissions,
        permission: PermissionId,
        realm: RealmScope,
    ) -> Result<String, CommandError> {
        check_security(invoker, target)?;
        let outcome = target.grant(permission, Some(realm)).await?;
        self.report("grant", "granted to", target, permission, realm, outcome)
    }

    pub async fn account_deny(
        &self,
        invoker: SecurityLevel,
        target: &mut AccountPermissions,
        permission: PermissionId,
        realm: RealmScope,
    ) -> Result<String, CommandError> {
        check_security(invoker, target)?;
        let outcome = target.deny(permission, Some(realm)).await?;
        self.report("deny", "denied to", target, permission, realm, outcome)
    }

    pub async fn account_revoke(
        &self,
        invoker: SecurityLevel,
        target: &mut AccountPermissions,
        permission: PermissionId,
        realm: RealmScope,
    ) -> Result<String, CommandError> {
        check_security(invoker, target)?;
        let outcome = target.revoke(permission, Some(realm)).await?;
        self.report("revoke", "revoked from", target, permission, realm, outcome)
    }

    fn report(
        &self,
        action: &'static str,
        verb: &str,
        target: &AccountPermissions,
        permission: PermissionId,
        realm: RealmScope,
        outcome: PermissionOutcome,
    ) -> Result<String, CommandError> {
        if !outcome.is_ok() {
            return Err(CommandError::Rejected {
                action,
                permission,
                account: format!("{} ({})", target.name(), target.id()),
                outcome,
            });
        }

        let catalog = self.manager.catalog();
        let name = catalog
            .permissions
            .lookup(permission)
            .map(|p| p.name.as_str())
            .unwrap_or("unknown");
        info!(
            "Permission {} {} account {} ({}) for {}",
            permission,
            verb,
            target.name(),
            target.id(),
            realm
        );
        Ok(format!(
            "Permission {} ({}) {} account {} ({}) for {}",
            permission,
            name,
            verb,
            target.name(),
            target.id(),
            realm
        ))
    }
}

/// Only the console may change an account of equal or higher level
fn check_security(invoker: SecurityLevel, target: &AccountPermissions) -> Result<(), CommandError> {
    if invoker != SecurityLevel::Console && target.security_level() >= invoker {
        return Err(CommandError::InsufficientSecurity {
            account: format!("{} ({})", target.name(), target.id()),
            level: target.security_level(),
        });
    }
    Ok(())
}

fn listing(catalog: &RbacCatalog, ids: &HashSet<PermissionId>) -> Vec<PermissionListing> {
    let mut ids: Vec<_> = ids.iter().copied().collect();
    ids.sort_unstable();
    ids.into_iter()
        .map(|id| match catalog.permissions.lookup(id) {
            Some(permission) => PermissionListing {
                id,
                name: permission.name.clone(),
                linked: permission.sorted_links(),
            },
            None => PermissionListing {
                id,
                name: "unknown".to_string(),
                linked: Vec::new(),
            },
        })
        .collect()
}
