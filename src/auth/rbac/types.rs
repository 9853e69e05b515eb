//! RBAC type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Numeric permission identifier, stable across restarts
pub type PermissionId = u32;
/// Account identifier
pub type AccountId = u32;
/// Realm (server instance) identifier
pub type RealmId = u32;

/// Storage encoding of a permission row that applies to every realm
pub const ALL_REALMS: i32 = -1;

/// Coarse account role that selects the default permissions
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    #[default]
    Player,
    Moderator,
    GameMaster,
    Administrator,
    Console,
}

impl SecurityLevel {
    /// All levels, lowest first
    pub const ALL: [SecurityLevel; 5] = [
        SecurityLevel::Player,
        SecurityLevel::Moderator,
        SecurityLevel::GameMaster,
        SecurityLevel::Administrator,
        SecurityLevel::Console,
    ];

    pub fn as_u8(self) -> u8 {
        match self {
            SecurityLevel::Player => 0,
            SecurityLevel::Moderator => 1,
            SecurityLevel::GameMaster => 2,
            SecurityLevel::Administrator => 3,
            SecurityLevel::Console => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SecurityLevel::Player => "player",
            SecurityLevel::Moderator => "moderator",
            SecurityLevel::GameMaster => "game_master",
            SecurityLevel::Administrator => "administrator",
            SecurityLevel::Console => "console",
        }
    }
}

impl TryFrom<u8> for SecurityLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SecurityLevel::ALL
            .into_iter()
            .find(|level| level.as_u8() == value)
            .ok_or_else(|| format!("Unknown security level: {}", value))
    }
}

impl FromStr for SecurityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        if let Ok(value) = normalized.parse::<u8>() {
            return SecurityLevel::try_from(value);
        }
        match normalized.as_str() {
            "player" => Ok(SecurityLevel::Player),
            "moderator" => Ok(SecurityLevel::Moderator),
            "game_master" | "gamemaster" | "gm" => Ok(SecurityLevel::GameMaster),
            "administrator" | "admin" => Ok(SecurityLevel::Administrator),
            "console" => Ok(SecurityLevel::Console),
            _ => Err(format!("Unknown security level: {}", s)),
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an explicit permission row applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RealmScope {
    /// Every realm
    Global,
    /// A single realm; the id must be non-zero
    Specific(RealmId),
}

impl RealmScope {
    /// Encode for the `realm_id` column
    pub fn to_storage(self) -> i32 {
        match self {
            RealmScope::Global => ALL_REALMS,
            RealmScope::Specific(id) => i32::try_from(id).unwrap_or(i32::MAX),
        }
    }

    /// Decode a `realm_id` column value; `None` for values no scope maps to
    pub fn from_storage(value: i32) -> Option<Self> {
        match value {
            ALL_REALMS => Some(RealmScope::Global),
            v if v > 0 => Some(RealmScope::Specific(v as RealmId)),
            _ => None,
        }
    }

    /// Whether a row with this scope is visible from `realm_id`
    pub fn applies_to(self, realm_id: RealmId) -> bool {
        match self {
            RealmScope::Global => true,
            RealmScope::Specific(id) => id == realm_id,
        }
    }

    /// Realm 0 and ids beyond the column range cannot be stored
    pub fn is_valid(self) -> bool {
        match self {
            RealmScope::Global => true,
            RealmScope::Specific(id) => id != 0 && i32::try_from(id).is_ok(),
        }
    }
}

impl FromStr for RealmScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("global") || s == "-1" {
            return Ok(RealmScope::Global);
        }
        match s.parse::<RealmId>() {
            Ok(0) => Err("Realm id 0 is not a realm; use 'global' for every realm".to_string()),
            Ok(id) => Ok(RealmScope::Specific(id)),
            Err(_) => Err(format!("Invalid realm: {}", s)),
        }
    }
}

impl fmt::Display for RealmScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RealmScope::Global => f.write_str("global"),
            RealmScope::Specific(id) => write!(f, "realm {}", id),
        }
    }
}

/// Permission definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    /// Permission id
    pub id: PermissionId,
    /// Human readable name, for diagnostics and listings
    pub name: String,
    /// Permissions implied by holding this one (direct links only)
    pub linked: HashSet<PermissionId>,
}

impl Permission {
    pub fn new<S: Into<String>>(id: PermissionId, name: S) -> Self {
        Self {
            id,
            name: name.into(),
            linked: HashSet::new(),
        }
    }

    pub fn with_links<I: IntoIterator<Item = PermissionId>>(mut self, links: I) -> Self {
        self.linked.extend(links);
        self
    }

    /// Direct links, sorted
    pub fn sorted_links(&self) -> Vec<PermissionId> {
        let mut links: Vec<_> = self.linked.iter().copied().collect();
        links.sort_unstable();
        links
    }
}

/// Outcome of a grant, deny or revoke call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Ok,
    PermissionIdDoesNotExist,
    AlreadyInDeniedList,
    AlreadyInGrantedList,
    AlreadyAdded,
    CannotRevokeNotInEitherList,
}

impl PermissionOutcome {
    pub fn is_ok(self) -> bool {
        self == PermissionOutcome::Ok
    }
}

impl fmt::Display for PermissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            PermissionOutcome::Ok => "ok",
            PermissionOutcome::PermissionIdDoesNotExist => "permission does not exist",
            PermissionOutcome::AlreadyInDeniedList => "permission is in the denied list",
            PermissionOutcome::AlreadyInGrantedList => "permission is in the granted list",
            PermissionOutcome::AlreadyAdded => "permission is already added",
            PermissionOutcome::CannotRevokeNotInEitherList => {
                "permission is neither granted nor denied"
            }
        };
        f.write_str(message)
    }
}

/// Operator switch that makes every permission check succeed
///
/// Clones share the same flag, so flipping it on the manager is seen by every
/// account state created from it.
#[derive(Debug, Clone, Default)]
pub struct FreePermissionMode(Arc<AtomicBool>);

impl FreePermissionMode {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }
}
