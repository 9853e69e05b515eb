//! Integration tests for account-rbac
//!
//! These tests verify the interaction between the engine, the SQL store and
//! the configuration layer without mocking.

pub mod config_tests;
pub mod database_tests;
pub mod engine_tests;
