//! Effective permission resolution
//!
//! The effective set of an account is `expand(granted) \ expand(denied)`,
//! where `expand` follows permission links transitively. Deny always wins,
//! whatever order the explicit sets were built in.

use std::collections::HashSet;
use tracing::debug;

use super::catalog::PermissionCatalog;
use super::types::PermissionId;

/// Transitive closure of `seed` over the catalog's permission links
///
/// Unknown ids are dropped from the frontier and never expanded. A permission
/// already in the result is not queued again, so link cycles terminate.
pub fn expand_transitively<I>(catalog: &PermissionCatalog, seed: I) -> HashSet<PermissionId>
where
    I: IntoIterator<Item = PermissionId>,
{
    let mut to_visit: Vec<PermissionId> = seed.into_iter().collect();
    let mut result = HashSet::with_capacity(to_visit.len());

    while let Some(id) = to_visit.pop() {
        if result.contains(&id) {
            continue;
        }
        if !catalog.contains(id) {
            debug!("Dropping unknown permission {} during expansion", id);
            continue;
        }

        result.insert(id);
        to_visit.extend(
            catalog
                .linked_permissions(id)
                .filter(|linked_id| !result.contains(linked_id)),
        );
    }

    result
}

/// Effective permissions for the given explicit grant and deny sets
pub fn resolve(
    catalog: &PermissionCatalog,
    granted: &HashSet<PermissionId>,
    denied: &HashSet<PermissionId>,
) -> HashSet<PermissionId> {
    let mut effective = expand_transitively(catalog, granted.iter().copied());
    if denied.is_empty() {
        return effective;
    }

    let revoked = expand_transitively(catalog, denied.iter().copied());
    effective.retain(|id| !revoked.contains(id));
    effective
}
