// Module declarations
mod types;
mod connection;
mod catalog_ops;
mod permission_ops;

// Re-export public types
pub use catalog_ops::DatabaseCatalogSource;
pub use types::{DatabaseBackendType, DatabaseStats, SeaOrmDatabase};
