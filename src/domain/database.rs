//! The in-memory test-plan database
//!
//! The [`Database`] knows nothing about the filesystem layout it was loaded
//! from, apart from the template paths of its trees. It is built once by the
//! loader and only read afterwards.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::domain::Suite;

/// A named category of machine that cases run on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostType {
    name: String,
    ignore_panic: bool,
}

impl HostType {
    /// Creates a host type.
    #[must_use]
    pub const fn new(name: String, ignore_panic: bool) -> Self {
        Self { name, ignore_panic }
    }

    /// The host type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether kernel panics on hosts of this type should be ignored.
    #[must_use]
    pub const fn ignore_panic(&self) -> bool {
        self.ignore_panic
    }
}

/// An ordered group of host types run together in a multihost job.
///
/// Members are names only: they are not required to be declared host types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSet {
    name: String,
    members: Vec<String>,
}

impl RecipeSet {
    /// Creates a recipe set.
    #[must_use]
    pub const fn new(name: String, members: Vec<String>) -> Self {
        Self { name, members }
    }

    /// The recipe set name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member host type names, in declaration order.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Checks whether the named host type is a member.
    #[must_use]
    pub fn contains(&self, host_type: &str) -> bool {
        self.members.iter().any(|member| member == host_type)
    }
}

/// A code branch along with the job template used to test it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    name: String,
    template: PathBuf,
}

impl Tree {
    /// Creates a tree.
    #[must_use]
    pub const fn new(name: String, template: PathBuf) -> Self {
        Self { name, template }
    }

    /// The tree name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path to the job template. The file is not guaranteed to exist.
    #[must_use]
    pub fn template(&self) -> &Path {
        &self.template
    }
}

/// A fully loaded test-plan database.
#[derive(Debug, Clone, Default)]
pub struct Database {
    host_type_regex: Option<Regex>,
    host_types: Vec<HostType>,
    recipesets: Vec<RecipeSet>,
    arches: Vec<String>,
    trees: Vec<Tree>,
    suites: Vec<Suite>,
}

impl Database {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts which host types get their own section in rendered jobs.
    #[must_use]
    pub fn with_host_type_regex(mut self, regex: Regex) -> Self {
        self.host_type_regex = Some(regex);
        self
    }

    /// Adds host types, keeping declaration order.
    #[must_use]
    pub fn with_host_types(mut self, host_types: impl IntoIterator<Item = HostType>) -> Self {
        self.host_types.extend(host_types);
        self
    }

    /// Adds recipe sets, keeping declaration order.
    #[must_use]
    pub fn with_recipesets(mut self, recipesets: impl IntoIterator<Item = RecipeSet>) -> Self {
        self.recipesets.extend(recipesets);
        self
    }

    /// Adds architectures. Repeated names are kept only once.
    #[must_use]
    pub fn with_arches(mut self, arches: impl IntoIterator<Item = String>) -> Self {
        for arch in arches {
            if !self.arches.contains(&arch) {
                self.arches.push(arch);
            }
        }
        self
    }

    /// Adds trees, keeping declaration order.
    #[must_use]
    pub fn with_trees(mut self, trees: impl IntoIterator<Item = Tree>) -> Self {
        self.trees.extend(trees);
        self
    }

    /// Adds suites, keeping declaration order.
    #[must_use]
    pub fn with_suites(mut self, suites: impl IntoIterator<Item = Suite>) -> Self {
        self.suites.extend(suites);
        self
    }

    /// The host type filter, if one is configured.
    #[must_use]
    pub const fn host_type_regex(&self) -> Option<&Regex> {
        self.host_type_regex.as_ref()
    }

    /// All declared host types.
    #[must_use]
    pub fn host_types(&self) -> &[HostType] {
        &self.host_types
    }

    /// Looks up a host type by name.
    #[must_use]
    pub fn host_type(&self, name: &str) -> Option<&HostType> {
        self.host_types.iter().find(|host_type| host_type.name == name)
    }

    /// Host types that get their own section in a rendered job.
    ///
    /// These are the declared host types whose names match the host type
    /// regex, or all of them if no regex is configured.
    pub fn eligible_host_types(&self) -> impl Iterator<Item = &HostType> {
        self.host_types.iter().filter(|host_type| {
            self.host_type_regex
                .as_ref()
                .is_none_or(|regex| regex.is_match(&host_type.name))
        })
    }

    /// All declared recipe sets.
    #[must_use]
    pub fn recipesets(&self) -> &[RecipeSet] {
        &self.recipesets
    }

    /// Recipe sets the named host type belongs to.
    pub fn recipesets_containing<'a>(
        &'a self,
        host_type: &'a str,
    ) -> impl Iterator<Item = &'a RecipeSet> {
        self.recipesets
            .iter()
            .filter(move |recipeset| recipeset.contains(host_type))
    }

    /// All declared architectures.
    #[must_use]
    pub fn arches(&self) -> &[String] {
        &self.arches
    }

    /// Checks whether an architecture is declared.
    ///
    /// A database without architectures supports none.
    #[must_use]
    pub fn has_arch(&self, arch: &str) -> bool {
        self.arches.iter().any(|a| a == arch)
    }

    /// All declared trees.
    #[must_use]
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Looks up a tree by name.
    #[must_use]
    pub fn tree(&self, name: &str) -> Option<&Tree> {
        self.trees.iter().find(|tree| tree.name == name)
    }

    /// All loaded suites.
    #[must_use]
    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }
}
