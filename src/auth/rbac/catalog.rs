//! Permission catalog, default permission table and the published catalog handle

use crate::utils::error::{RbacError, Result};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::types::{Permission, PermissionId, SecurityLevel};

/// Registry of every known permission, immutable once built
#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    permissions: HashMap<PermissionId, Permission>,
}

impl PermissionCatalog {
    /// Look up a permission; `None` means it does not (or no longer) exist
    pub fn lookup(&self, id: PermissionId) -> Option<&Permission> {
        self.permissions.get(&id)
    }

    pub fn contains(&self, id: PermissionId) -> bool {
        self.permissions.contains_key(&id)
    }

    /// Direct links of `id`; empty for unknown ids
    pub fn linked_permissions(&self, id: PermissionId) -> impl Iterator<Item = PermissionId> + '_ {
        self.permissions
            .get(&id)
            .into_iter()
            .flat_map(|permission| permission.linked.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// All permissions ordered by id
    pub fn sorted(&self) -> Vec<&Permission> {
        let mut permissions: Vec<_> = self.permissions.values().collect();
        permissions.sort_unstable_by_key(|permission| permission.id);
        permissions
    }
}

/// Permissions granted by default to each security level
#[derive(Debug, Clone, Default)]
pub struct DefaultPermissionTable {
    defaults: HashMap<SecurityLevel, HashSet<PermissionId>>,
}

impl DefaultPermissionTable {
    /// Default permissions of `level`; empty when the level has none
    pub fn defaults_for(&self, level: SecurityLevel) -> impl Iterator<Item = PermissionId> + '_ {
        self.defaults
            .get(&level)
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    pub fn insert(&mut self, level: SecurityLevel, id: PermissionId) -> bool {
        self.defaults.entry(level).or_default().insert(id)
    }

    /// Total number of (level, permission) entries
    pub fn len(&self) -> usize {
        self.defaults.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries grouped by level, both sorted
    pub fn sorted(&self) -> BTreeMap<SecurityLevel, Vec<PermissionId>> {
        self.defaults
            .iter()
            .map(|(level, ids)| {
                let mut ids: Vec<_> = ids.iter().copied().collect();
                ids.sort_unstable();
                (*level, ids)
            })
            .collect()
    }
}

/// Catalog and default table, loaded and replaced together
#[derive(Debug, Clone, Default)]
pub struct RbacCatalog {
    pub permissions: PermissionCatalog,
    pub defaults: DefaultPermissionTable,
}

impl RbacCatalog {
    pub fn builder() -> RbacCatalogBuilder {
        RbacCatalogBuilder::default()
    }
}

/// Collects raw catalog rows and applies the load-time data checks
#[derive(Debug, Default)]
pub struct RbacCatalogBuilder {
    permissions: HashMap<PermissionId, Permission>,
    links: Vec<(PermissionId, PermissionId)>,
    defaults: Vec<(SecurityLevel, PermissionId)>,
}

impl RbacCatalogBuilder {
    /// Register a permission; a duplicate id is a catalog error
    pub fn permission<S: Into<String>>(&mut self, id: PermissionId, name: S) -> Result<&mut Self> {
        if self.permissions.contains_key(&id) {
            return Err(RbacError::catalog(format!("Duplicate permission id {}", id)));
        }
        self.permissions.insert(id, Permission::new(id, name));
        Ok(self)
    }

    pub fn link(&mut self, id: PermissionId, linked_id: PermissionId) -> &mut Self {
        self.links.push((id, linked_id));
        self
    }

    pub fn default_permission(&mut self, level: SecurityLevel, id: PermissionId) -> &mut Self {
        self.defaults.push((level, id));
        self
    }

    pub fn build(self) -> RbacCatalog {
        let started = Instant::now();
        let mut permissions = self.permissions;

        let mut link_count = 0usize;
        for (id, linked_id) in self.links {
            if id == linked_id {
                warn!("Permission {} has itself as linked permission. Ignored", id);
                continue;
            }
            let Some(permission) = permissions.get_mut(&id) else {
                warn!("Linked permission {} references unknown permission {}. Ignored", linked_id, id);
                continue;
            };
            if permission.linked.insert(linked_id) {
                link_count += 1;
            }
        }

        for permission in permissions.values() {
            for linked_id in &permission.linked {
                if !permissions.contains_key(linked_id) {
                    warn!(
                        "Permission {} links to unknown permission {}; the link is dropped during resolution",
                        permission.id, linked_id
                    );
                }
            }
        }

        let mut defaults = DefaultPermissionTable::default();
        for (level, id) in self.defaults {
            if !permissions.contains_key(&id) {
                warn!(
                    "Default permission {} for security level {} does not exist; it is skipped on load",
                    id, level
                );
            }
            defaults.insert(level, id);
        }

        info!(
            "Loaded {} permission definitions, {} linked permissions and {} default permissions in {} ms",
            permissions.len(),
            link_count,
            defaults.len(),
            started.elapsed().as_millis()
        );

        RbacCatalog {
            permissions: PermissionCatalog { permissions },
            defaults,
        }
    }
}

/// Where the catalog comes from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Build a complete catalog; any error is fatal for the caller
    async fn load(&self) -> Result<RbacCatalog>;

    /// Short description for log lines
    fn describe(&self) -> String;
}

/// YAML catalog document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub permissions: Vec<PermissionEntry>,
    #[serde(default)]
    pub defaults: BTreeMap<SecurityLevel, Vec<PermissionId>>,
}

/// One permission in a catalog document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub id: PermissionId,
    pub name: String,
    #[serde(default)]
    pub linked: Vec<PermissionId>,
}

impl CatalogDocument {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn into_catalog(self) -> Result<RbacCatalog> {
        let mut builder = RbacCatalog::builder();
        for entry in &self.permissions {
            builder.permission(entry.id, entry.name.clone())?;
        }
        for entry in &self.permissions {
            for linked_id in &entry.linked {
                builder.link(entry.id, *linked_id);
            }
        }
        for (level, ids) in &self.defaults {
            for id in ids {
                builder.default_permission(*level, *id);
            }
        }
        Ok(builder.build())
    }

    /// Document describing an already built catalog
    pub fn from_catalog(catalog: &RbacCatalog) -> Self {
        Self {
            permissions: catalog
                .permissions
                .sorted()
                .into_iter()
                .map(|permission| PermissionEntry {
                    id: permission.id,
                    name: permission.name.clone(),
                    linked: permission.sorted_links(),
                })
                .collect(),
            defaults: catalog.defaults.sorted(),
        }
    }
}

/// Catalog read from a YAML file
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn load(&self) -> Result<RbacCatalog> {
        debug!("Reading permission catalog from {:?}", self.path);
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            RbacError::catalog(format!("Failed to read catalog file {:?}: {}", self.path, e))
        })?;
        CatalogDocument::parse(&content)?.into_catalog()
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// The single published reference to the current catalog
///
/// Readers take a snapshot per operation. A reload builds the new catalog
/// completely before swapping it in, so nobody observes a partial catalog.
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    inner: Arc<ArcSwap<RbacCatalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: RbacCatalog) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<RbacCatalog> {
        self.inner.load_full()
    }

    pub fn replace(&self, catalog: RbacCatalog) {
        self.inner.store(Arc::new(catalog));
    }

    /// Load from `source` and publish; the old catalog stays on failure
    pub async fn reload(&self, source: &dyn CatalogSource) -> Result<()> {
        info!("Reloading permission catalog from {}", source.describe());
        let catalog = source.load().await?;
        self.replace(catalog);
        Ok(())
    }
}
