//! Utility modules
//!
//! - **error**: the crate error type
//! - **logging**: tracing subscriber setup for binaries

pub mod error;
pub mod logging;

pub use error::{RbacError, Result};
