//! RBAC configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::{debug, warn};

impl Validate for RbacConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating RBAC configuration");

        if self.realm_id == 0 {
            return Err("realm_id must be greater than 0".to_string());
        }

        if i32::try_from(self.realm_id).is_err() {
            return Err(format!("realm_id must not exceed {}", i32::MAX));
        }

        if self.free_permission_mode {
            warn!("Free permission mode is enabled; every permission check will succeed");
        }

        self.catalog.validate()
    }
}

impl Validate for CatalogConfig {
    fn validate(&self) -> Result<(), String> {
        if self.source == CatalogSourceKind::File && self.path.trim().is_empty() {
            return Err("Catalog path cannot be empty when the catalog source is 'file'".to_string());
        }

        Ok(())
    }
}
