//! Loading a database from disk
//!
//! Loading happens in one eager pass: the index and every suite file it
//! references are read, parsed and validated. Tree templates are only
//! recorded; they are read when a job is rendered.

use std::{
    any, fs, io,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use serde_yaml::Value;
use tracing::{debug, instrument, trace};

use crate::{
    domain::{Database, Suite, Tree},
    storage::schema::{validate_index, validate_suite, SchemaError},
};

/// Name of the index file inside a database directory.
pub const INDEX_FILE_NAME: &str = "index.yaml";

/// The error type reported for YAML syntax errors, as `crate::Type`.
///
/// It is included verbatim in [`LoadError::Syntax`] messages so that callers
/// can tell parse failures apart from schema failures.
pub static YAML_ERROR_CLASS: LazyLock<String> = LazyLock::new(|| {
    // type_name gives the defining module path (`serde_yaml::error::Error`);
    // report the re-exported name instead.
    let full = any::type_name::<serde_yaml::Error>();
    let krate = full.split("::").next().unwrap_or(full);
    let name = full.rsplit("::").next().unwrap_or(full);
    format!("{krate}::{name}")
});

/// Errors that can occur while loading a database.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A file could not be read.
    #[error("Failed to read {}: {error}", path.display())]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        error: io::Error,
    },

    /// A file is not valid YAML.
    #[error("Failed to parse {}: {}: {error}", path.display(), YAML_ERROR_CLASS.as_str())]
    Syntax {
        /// The malformed file.
        path: PathBuf,
        /// The parser diagnostic.
        error: serde_yaml::Error,
    },

    /// A file is valid YAML but does not match its schema.
    #[error("{}: {error}", path.display())]
    Schema {
        /// The offending file.
        path: PathBuf,
        /// What was wrong with it.
        error: SchemaError,
    },

    /// A suite file referenced from the index does not exist.
    #[error("Suite file not found: {}", path.display())]
    SuiteNotFound {
        /// The resolved path of the missing suite file.
        path: PathBuf,
    },
}

impl Database {
    /// Loads the database stored in the given directory.
    ///
    /// # Errors
    ///
    /// See [`load`].
    pub fn open(directory: &Path) -> Result<Self, LoadError> {
        load(&directory.join(INDEX_FILE_NAME))
    }
}

/// Loads a database from its index file.
///
/// Suite and template references are resolved relative to the directory
/// containing the index. Loading stops at the first error.
///
/// # Errors
///
/// This function fails if:
///
/// - the index or a suite file cannot be read
/// - a file is not valid YAML
/// - a file does not match the schema of its kind
/// - a referenced suite file does not exist
#[instrument(level = "debug")]
pub fn load(index_path: &Path) -> Result<Database, LoadError> {
    let root = index_path.parent().unwrap_or_else(|| Path::new(""));

    let index = validate_index(read_yaml(index_path)?).map_err(|error| LoadError::Schema {
        path: index_path.to_path_buf(),
        error,
    })?;

    let suites = index
        .suites
        .iter()
        .map(|reference| load_suite(&root.join(reference)))
        .collect::<Result<Vec<_>, _>>()?;

    let trees = index
        .trees
        .into_iter()
        .map(|(name, template)| Tree::new(name, root.join(template)));

    let mut database = Database::new()
        .with_host_types(index.host_types)
        .with_recipesets(index.recipesets)
        .with_arches(index.arches)
        .with_trees(trees)
        .with_suites(suites);
    if let Some(regex) = index.host_type_regex {
        database = database.with_host_type_regex(regex);
    }

    debug!(
        host_types = database.host_types().len(),
        recipesets = database.recipesets().len(),
        trees = database.trees().len(),
        suites = database.suites().len(),
        "loaded database"
    );

    Ok(database)
}

fn load_suite(path: &Path) -> Result<Suite, LoadError> {
    let value = read_yaml(path).map_err(|e| match e {
        LoadError::Io { path, error } if error.kind() == io::ErrorKind::NotFound => {
            LoadError::SuiteNotFound { path }
        }
        other => other,
    })?;

    validate_suite(value, path).map_err(|error| LoadError::Schema {
        path: path.to_path_buf(),
        error,
    })
}

fn read_yaml(path: &Path) -> Result<Value, LoadError> {
    trace!(path = %path.display(), "reading");

    let content = fs::read_to_string(path).map_err(|error| LoadError::Io {
        path: path.to_path_buf(),
        error,
    })?;

    serde_yaml::from_str(&content).map_err(|error| LoadError::Syntax {
        path: path.to_path_buf(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, files: &[(&str, &str)]) {
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    const HOSTS: &str = r"
host_type_regex: ^normal
host_types:
  normal: {}
  panicky:
    ignore_panic: true
  multihost_1: {}
recipesets:
  rcs1:
    - normal
    - panicky
  rcs2:
    - multihost_1
    - multihost_2
";

    #[test]
    fn empty_index_loads_an_empty_database() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), &[(INDEX_FILE_NAME, "# Empty but valid database\n{}\n")]);

        let db = Database::open(tmp.path()).unwrap();

        assert!(db.trees().is_empty());
        assert!(db.arches().is_empty());
        assert!(db.suites().is_empty());
    }

    #[test]
    fn references_resolve_relative_to_the_index() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("suites")).unwrap();
        write(
            tmp.path(),
            &[
                (
                    INDEX_FILE_NAME,
                    &format!("{HOSTS}arches: [arch]\ntrees:\n  tree: tree.xml\nsuites:\n  - suites/one.yaml\n"),
                ),
                (
                    "suites/one.yaml",
                    "description: one\nmaintainers: [maint1]\ncases:\n  - name: case1\n    max_duration_seconds: 600\n",
                ),
            ],
        );

        let db = Database::open(tmp.path()).unwrap();

        assert_eq!(db.tree("tree").unwrap().template(), tmp.path().join("tree.xml"));
        assert_eq!(db.suites()[0].path(), tmp.path().join("suites/one.yaml"));
        assert_eq!(db.suites()[0].cases()[0].name(), "case1");
        assert_eq!(db.host_types().len(), 3);
        assert!(db.host_type("panicky").unwrap().ignore_panic());
        assert!(db.host_type_regex().is_some());
    }

    #[test]
    fn templates_are_not_read_at_load_time() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), &[(INDEX_FILE_NAME, "trees:\n  tree: missing.xml\n")]);

        assert!(Database::open(tmp.path()).is_ok());
    }

    #[test]
    fn missing_index_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();

        let error = Database::open(tmp.path()).unwrap_err();
        assert!(matches!(error, LoadError::Io { .. }));
        assert!(error.to_string().contains(INDEX_FILE_NAME));
    }

    #[test]
    fn missing_suite_names_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            &[(INDEX_FILE_NAME, &format!("{HOSTS}trees:\n  tree: tree.xml\nsuites:\n  - missing.yaml\n"))],
        );

        let error = Database::open(tmp.path()).unwrap_err();
        assert!(matches!(error, LoadError::SuiteNotFound { .. }));
        assert!(error.to_string().contains("missing.yaml"));
    }

    #[test]
    fn syntax_errors_name_the_parser_error_type() {
        assert_eq!(YAML_ERROR_CLASS.as_str(), "serde_yaml::Error");
    }

    #[test]
    fn malformed_index_reports_the_parser_error() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), &[(INDEX_FILE_NAME, &format!("{HOSTS}\ntree: {{\n"))]);

        let error = Database::open(tmp.path()).unwrap_err();
        assert!(matches!(error, LoadError::Syntax { .. }));
        assert!(error.to_string().contains(YAML_ERROR_CLASS.as_str()));
    }

    #[test]
    fn malformed_suite_reports_the_parser_error() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            &[
                (INDEX_FILE_NAME, &format!("{HOSTS}suites:\n  - suite.yaml\n")),
                ("suite.yaml", "{\nmaintainers:\n"),
            ],
        );

        let error = Database::open(tmp.path()).unwrap_err();
        assert!(error.to_string().contains(YAML_ERROR_CLASS.as_str()));
        assert!(error.to_string().contains("suite.yaml"));
    }

    #[test]
    fn invalid_index_data_is_a_schema_error() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            &[(INDEX_FILE_NAME, &format!("{HOSTS}trees: {{}}\nunknown_node: True\n"))],
        );

        let error = Database::open(tmp.path()).unwrap_err();
        assert!(error.to_string().contains("Invalid Base data"));
    }

    #[test]
    fn invalid_suite_data_is_a_schema_error() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            &[
                (INDEX_FILE_NAME, &format!("{HOSTS}suites:\n  - suite.yaml\n")),
                ("suite.yaml", "description: Suite data with missing nodes\ncases: []\n"),
            ],
        );

        let error = Database::open(tmp.path()).unwrap_err();
        assert!(error.to_string().contains("Invalid Suite data"));
    }

    #[test]
    fn first_bad_suite_stops_the_load() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            &[
                (INDEX_FILE_NAME, "suites:\n  - first.yaml\n  - second.yaml\n"),
                ("first.yaml", "description: d\n"),
            ],
        );

        let error = Database::open(tmp.path()).unwrap_err();
        assert!(matches!(error, LoadError::Schema { ref path, .. } if path.ends_with("first.yaml")));
    }
}
