//! Domain models for the test-plan database.
//!
//! This module contains the core types: the [`Database`] aggregate, its host
//! types, recipe sets and trees, and the suites and cases it schedules.

mod database;
pub use database::{Database, HostType, RecipeSet, Tree};

/// Applicability patterns for suites and cases.
pub mod pattern;
pub use pattern::{Pattern, Subject};

mod suite;
pub use suite::{Case, Suite};
