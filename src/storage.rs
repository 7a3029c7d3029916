mod loader;
/// Schema validation for index and suite documents.
pub mod schema;

pub use loader::{load, LoadError, INDEX_FILE_NAME, YAML_ERROR_CLASS};
pub use schema::{validate_index, validate_suite, DocumentKind, Index, SchemaError};
