//! Error handling for the RBAC engine
//!
//! This module defines the error type shared by the catalog loaders, the
//! permission store and the account state. Domain outcomes of grant, deny and
//! revoke are not errors; see [`crate::auth::rbac::PermissionOutcome`].

mod helpers;
mod types;

pub use types::{RbacError, Result};
