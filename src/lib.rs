//! Test-plan database loading and job rendering
//!
//! A database is a directory holding an `index.yaml` file that declares trees,
//! host types, recipe sets and architectures, and references suite files.
//! Jobs are rendered by filling a tree's XML template with the cases that
//! apply to a tree and architecture.

pub mod domain;
pub use domain::{Case, Database, HostType, Pattern, RecipeSet, Subject, Suite, Tree};

/// Reading and validating databases from disk.
pub mod storage;
pub use storage::{load, LoadError, SchemaError};

pub mod render;
pub use render::{render, select, RenderError};
