//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! CRM record toolkit test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built records for common entity types
//! - `builders`: Builder pattern for record construction
//! - `assertions`: Custom assertion helpers for records and attributes
//! - `generators`: Property-based record and value generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
