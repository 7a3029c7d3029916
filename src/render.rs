//! Rendering job XML
//!
//! Rendering is a pure function of the database, the tree, the architecture
//! and an optional template override. The only I/O is reading the template.

use std::{
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use crate::domain::Database;

mod job;
mod select;
mod template;

pub use select::{select, HostSelection, SuiteSelection};
pub use template::Template;

/// Errors that can occur while rendering a job.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The requested architecture is not declared in the database.
    #[error("Architecture \"{0}\" not found")]
    ArchNotFound(String),

    /// No template override was given and the tree is not declared.
    #[error("TemplateNotFound: tree \"{0}\" is not declared")]
    TreeNotFound(String),

    /// The template file does not exist.
    #[error("TemplateNotFound: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// The template file exists but could not be read.
    #[error("Failed to read template {}: {error}", path.display())]
    Io {
        /// The template path.
        path: PathBuf,
        /// The underlying I/O error.
        error: io::Error,
    },

    /// The template has no `job` element to fill.
    #[error("Template {} has no <job> element", .0.display())]
    MissingJobElement(PathBuf),

    /// Filling the template did not produce well-formed XML.
    #[error("Template {} does not produce well-formed XML: {message}", path.display())]
    MalformedTemplate {
        /// The template path.
        path: PathBuf,
        /// The XML reader diagnostic.
        message: String,
    },

    /// The generated job body could not be serialized.
    #[error("Failed to write job XML: {0}")]
    Xml(String),
}

/// Renders the job for a tree and architecture.
///
/// The template is `template_override` if given, otherwise the template of
/// the tree named `tree`. The architecture is checked before the template is
/// looked up.
///
/// # Errors
///
/// This function fails if:
///
/// - the architecture is not declared in the database
/// - there is no override and the tree is not declared
/// - the template file does not exist or cannot be read
/// - the template has no `job` element, or filling it yields malformed XML
#[instrument(level = "debug", skip(database))]
pub fn render(
    database: &Database,
    tree: &str,
    arch: &str,
    template_override: Option<&Path>,
) -> Result<String, RenderError> {
    let hosts = select(database, tree, arch)?;

    let template_path = match template_override {
        Some(path) => path,
        None => database
            .tree(tree)
            .ok_or_else(|| RenderError::TreeNotFound(tree.to_string()))?
            .template(),
    };
    let template = Template::load(template_path)?;

    let body = job::write_hosts(database, &hosts)?;
    let document = template.fill(&body)?;

    debug!(hosts = hosts.len(), "rendered job");
    Ok(document)
}
