//! Storage layer
//!
//! SQL persistence for the catalog and explicit account permissions, plus an
//! in-memory permission store for tests and database-less runs.

/// Database storage module
pub mod database;
/// In-memory permission store module
pub mod memory;

pub use memory::MemoryPermissionStore;
