//! Schema validation of parsed YAML documents
//!
//! Documents are parsed into a generic [`Value`] tree first. Validation turns
//! that tree into typed data, rejecting unknown fields and checking the rules
//! serde cannot express on its own.

use std::{
    fmt,
    num::NonZeroU64,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;
use regex::Regex;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::domain::{
    pattern::{Constraint, Target},
    Case, HostType, Pattern, RecipeSet, Suite,
};

/// The kinds of document found in a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// The top-level index file.
    Index,
    /// A suite file referenced from the index.
    Suite,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => f.write_str("Base"),
            Self::Suite => f.write_str("Suite"),
        }
    }
}

/// A document did not match the schema of its kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind} data: {message}")]
pub struct SchemaError {
    kind: DocumentKind,
    message: String,
}

impl SchemaError {
    fn new(kind: DocumentKind, message: impl fmt::Display) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }

    fn base(message: impl fmt::Display) -> Self {
        Self::new(DocumentKind::Index, message)
    }

    fn suite(message: impl fmt::Display) -> Self {
        Self::new(DocumentKind::Suite, message)
    }

    /// The kind of document that failed validation.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }
}

/// The validated contents of an index file.
///
/// File references are kept exactly as written; resolving them is up to the
/// loader.
#[derive(Debug, Clone, Default)]
pub struct Index {
    /// Filter for host types that get their own job section.
    pub host_type_regex: Option<Regex>,
    /// Declared host types, in order.
    pub host_types: Vec<HostType>,
    /// Declared recipe sets, in order.
    pub recipesets: Vec<RecipeSet>,
    /// Declared architectures.
    pub arches: Vec<String>,
    /// Tree names and their template paths, in order.
    pub trees: Vec<(String, PathBuf)>,
    /// Suite file references, in order.
    pub suites: Vec<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexDocument {
    #[serde(default)]
    host_type_regex: Option<String>,
    #[serde(default)]
    host_types: IndexMap<String, Option<HostTypeDocument>>,
    #[serde(default)]
    recipesets: IndexMap<String, Vec<String>>,
    #[serde(default)]
    arches: Vec<String>,
    #[serde(default)]
    trees: IndexMap<String, PathBuf>,
    #[serde(default)]
    suites: Vec<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HostTypeDocument {
    #[serde(default)]
    ignore_panic: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteDocument {
    description: String,
    maintainers: Vec<String>,
    #[serde(default)]
    pattern: Option<PatternDocument>,
    #[serde(default)]
    cases: Vec<CaseDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CaseDocument {
    name: String,
    max_duration_seconds: NonZeroU64,
    #[serde(default)]
    waived: bool,
    #[serde(default)]
    pattern: Option<PatternDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatternDocument {
    #[serde(default)]
    trees: Option<OneOrMany>,
    #[serde(default)]
    arches: Option<OneOrMany>,
    #[serde(default)]
    host_types: Option<OneOrMany>,
}

/// A single regex, or a list of alternatives.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(source) => vec![source],
            Self::Many(sources) => sources,
        }
    }
}

/// Validates a parsed index document.
///
/// An empty document (null) is treated as an empty mapping.
///
/// # Errors
///
/// Returns a [`SchemaError`] of kind [`DocumentKind::Index`] if the document
/// has unknown keys, values of the wrong type, or an invalid host type regex.
pub fn validate_index(value: Value) -> Result<Index, SchemaError> {
    let value = if value.is_null() {
        Value::Mapping(Mapping::new())
    } else {
        value
    };

    let document: IndexDocument = serde_yaml::from_value(value).map_err(SchemaError::base)?;

    let host_type_regex = document
        .host_type_regex
        .map(|source| {
            Regex::new(&source)
                .map_err(|e| SchemaError::base(format!("invalid host_type_regex: {e}")))
        })
        .transpose()?;

    let host_types = document
        .host_types
        .into_iter()
        .map(|(name, host_type)| {
            HostType::new(name, host_type.unwrap_or_default().ignore_panic)
        })
        .collect();

    let recipesets = document
        .recipesets
        .into_iter()
        .map(|(name, members)| RecipeSet::new(name, members))
        .collect();

    Ok(Index {
        host_type_regex,
        host_types,
        recipesets,
        arches: document.arches,
        trees: document.trees.into_iter().collect(),
        suites: document.suites,
    })
}

/// Validates a parsed suite document loaded from `path`.
///
/// # Errors
///
/// Returns a [`SchemaError`] of kind [`DocumentKind::Suite`] if required keys
/// are missing, unknown keys are present, `maintainers` is empty, a case has
/// an empty name or a zero duration, or a pattern regex is invalid.
pub fn validate_suite(value: Value, path: &Path) -> Result<Suite, SchemaError> {
    let document: SuiteDocument = serde_yaml::from_value(value).map_err(SchemaError::suite)?;

    let maintainers = NonEmpty::from_vec(document.maintainers)
        .ok_or_else(|| SchemaError::suite("maintainers must not be empty"))?;

    let pattern = document
        .pattern
        .map(compile_pattern)
        .transpose()?
        .unwrap_or_default();

    let cases = document
        .cases
        .into_iter()
        .map(validate_case)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Suite::new(path.to_path_buf(), document.description, maintainers, cases)
        .with_pattern(pattern))
}

fn validate_case(document: CaseDocument) -> Result<Case, SchemaError> {
    let name = NonEmptyString::new(document.name)
        .map_err(|_| SchemaError::suite("case name must not be empty"))?;

    let pattern = document
        .pattern
        .map(compile_pattern)
        .transpose()
        .map_err(|e| SchemaError::suite(format!("case {name}: {}", e.message)))?
        .unwrap_or_default();

    Ok(Case::new(name, document.max_duration_seconds)
        .waived(document.waived)
        .with_pattern(pattern))
}

fn compile_pattern(document: PatternDocument) -> Result<Pattern, SchemaError> {
    let fields = [
        (Target::Tree, document.trees),
        (Target::Arch, document.arches),
        (Target::HostType, document.host_types),
    ];

    let constraints = fields
        .into_iter()
        .filter_map(|(target, sources)| sources.map(|s| (target, s.into_vec())))
        .map(|(target, sources)| {
            Constraint::new(target, &sources)
                .map_err(|e| SchemaError::suite(format!("invalid {target} pattern: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Pattern::from_constraints(constraints))
}
