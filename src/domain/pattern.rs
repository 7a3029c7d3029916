//! Applicability patterns for suites and cases
//!
//! A [`Pattern`] decides whether a suite or case applies to a particular
//! combination of tree, architecture and host type (a [`Subject`]).

use std::fmt;

use regex::Regex;

/// The value a [`Constraint`] is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The name of the tree being rendered.
    Tree,
    /// The architecture being rendered.
    Arch,
    /// The name of the host type a case would run on.
    HostType,
}

impl Target {
    /// The key used for this target in a pattern mapping.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Tree => "trees",
            Self::Arch => "arches",
            Self::HostType => "host_types",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The combination of values a pattern is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject<'a> {
    /// Tree name.
    pub tree: &'a str,
    /// Architecture name.
    pub arch: &'a str,
    /// Host type name.
    pub host_type: &'a str,
}

impl<'a> Subject<'a> {
    /// Creates a new subject.
    #[must_use]
    pub const fn new(tree: &'a str, arch: &'a str, host_type: &'a str) -> Self {
        Self {
            tree,
            arch,
            host_type,
        }
    }

    const fn get(&self, target: Target) -> &'a str {
        match target {
            Target::Tree => self.tree,
            Target::Arch => self.arch,
            Target::HostType => self.host_type,
        }
    }
}

/// A single field restriction.
///
/// Holds when any of its regular expressions matches the whole of the
/// targeted value. A constraint without any expressions never holds.
#[derive(Debug, Clone)]
pub struct Constraint {
    target: Target,
    regexes: Vec<Regex>,
}

impl Constraint {
    /// Compiles a constraint from a list of regular expression sources.
    ///
    /// Each expression is anchored at both ends, so `x86_64` will not match
    /// `x86_64_extra`.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the expressions is not a valid regular
    /// expression.
    pub fn new<I, S>(target: Target, sources: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let regexes = sources
            .into_iter()
            .map(|source| Regex::new(&format!("^(?:{})$", source.as_ref())))
            .collect::<Result<_, _>>()?;
        Ok(Self { target, regexes })
    }

    /// Checks the constraint against a subject.
    #[must_use]
    pub fn matches(&self, subject: &Subject<'_>) -> bool {
        let value = subject.get(self.target);
        self.regexes.iter().any(|regex| regex.is_match(value))
    }
}

/// Applicability of a suite or case.
#[derive(Debug, Clone, Default)]
pub enum Pattern {
    /// Applies everywhere.
    #[default]
    Unconditional,
    /// Applies where every constraint holds.
    Constrained(Vec<Constraint>),
}

impl Pattern {
    /// Builds a pattern from a list of constraints.
    ///
    /// An empty list yields [`Pattern::Unconditional`].
    #[must_use]
    pub fn from_constraints(constraints: Vec<Constraint>) -> Self {
        if constraints.is_empty() {
            Self::Unconditional
        } else {
            Self::Constrained(constraints)
        }
    }

    /// Evaluates the pattern against a subject.
    #[must_use]
    pub fn matches(&self, subject: &Subject<'_>) -> bool {
        match self {
            Self::Unconditional => true,
            Self::Constrained(constraints) => constraints.iter().all(|c| c.matches(subject)),
        }
    }

    /// Returns `true` if the pattern applies everywhere.
    #[must_use]
    pub const fn is_unconditional(&self) -> bool {
        matches!(self, Self::Unconditional)
    }
}
