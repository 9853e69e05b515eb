//! Authorization
//!
//! Account permission resolution lives in [`rbac`].

pub mod rbac;
