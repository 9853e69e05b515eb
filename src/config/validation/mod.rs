//! Configuration validation
//!
//! The validation is organized into several submodules:
//! - `trait_def`: Core Validate trait definition
//! - `rbac_validators`: RBAC and catalog validators
//! - `storage_validators`: Database validators
//! - `logging_validators`: Logging validators
//! - `tests`: Test suite for all validators

mod logging_validators;
mod rbac_validators;
mod storage_validators;
mod trait_def;

pub use trait_def::Validate;
