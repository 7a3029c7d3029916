//! Choosing which cases run on which hosts

use crate::{
    domain::{Case, Database, HostType, RecipeSet, Subject, Suite},
    render::RenderError,
};

/// The cases of one suite selected for a host.
#[derive(Debug, Clone)]
pub struct SuiteSelection<'db> {
    /// The suite the cases belong to.
    pub suite: &'db Suite,
    /// The selected cases, in declaration order. Never empty.
    pub cases: Vec<&'db Case>,
}

/// Everything selected to run on one host type.
#[derive(Debug, Clone)]
pub struct HostSelection<'db> {
    /// The host type.
    pub host_type: &'db HostType,
    /// Recipe sets the host type belongs to.
    pub recipesets: Vec<&'db RecipeSet>,
    /// Suites with at least one selected case. Never empty.
    pub suites: Vec<SuiteSelection<'db>>,
}

impl HostSelection<'_> {
    /// Iterates over every selected case along with its suite.
    pub fn cases(&self) -> impl Iterator<Item = (&Suite, &Case)> {
        self.suites
            .iter()
            .flat_map(|selection| selection.cases.iter().map(move |case| (selection.suite, *case)))
    }
}

/// Selects the cases to run for a tree and architecture.
///
/// Hosts are the eligible host types of the database, in declaration order.
/// Hosts and suites with nothing selected are left out, so the result is
/// empty when no case applies.
///
/// # Errors
///
/// Returns [`RenderError::ArchNotFound`] if the architecture is not declared
/// in the database. A database without architectures declares none.
pub fn select<'db>(
    database: &'db Database,
    tree: &str,
    arch: &str,
) -> Result<Vec<HostSelection<'db>>, RenderError> {
    if !database.has_arch(arch) {
        return Err(RenderError::ArchNotFound(arch.to_string()));
    }

    let hosts = database
        .eligible_host_types()
        .filter_map(|host_type| {
            let subject = Subject::new(tree, arch, host_type.name());
            let suites: Vec<_> = database
                .suites()
                .iter()
                .filter_map(|suite| {
                    let cases: Vec<_> = suite.cases_for(subject).collect();
                    (!cases.is_empty()).then_some(SuiteSelection { suite, cases })
                })
                .collect();

            (!suites.is_empty()).then(|| HostSelection {
                host_type,
                recipesets: database.recipesets_containing(host_type.name()).collect(),
                suites,
            })
        })
        .collect();

    Ok(hosts)
}
