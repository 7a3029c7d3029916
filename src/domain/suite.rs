use std::{
    num::NonZeroU64,
    path::{Path, PathBuf},
};

use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;

use crate::domain::pattern::{Pattern, Subject};

/// A single test case within a suite.
#[derive(Debug, Clone)]
pub struct Case {
    name: NonEmptyString,
    max_duration_seconds: NonZeroU64,
    waived: bool,
    pattern: Pattern,
}

impl Case {
    /// Creates an unwaived, unconditional case.
    #[must_use]
    pub const fn new(name: NonEmptyString, max_duration_seconds: NonZeroU64) -> Self {
        Self {
            name,
            max_duration_seconds,
            waived: false,
            pattern: Pattern::Unconditional,
        }
    }

    /// Restricts where the case applies.
    #[must_use]
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Marks the case result as not to be trusted.
    #[must_use]
    pub fn waived(mut self, waived: bool) -> Self {
        self.waived = waived;
        self
    }

    /// The case name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The maximum time the case is allowed to run, in seconds.
    #[must_use]
    pub const fn max_duration_seconds(&self) -> NonZeroU64 {
        self.max_duration_seconds
    }

    /// Whether failures of this case should be ignored.
    #[must_use]
    pub const fn is_waived(&self) -> bool {
        self.waived
    }

    /// The applicability pattern.
    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Checks whether the case applies to the given subject.
    #[must_use]
    pub fn applies_to(&self, subject: &Subject<'_>) -> bool {
        self.pattern.matches(subject)
    }
}

/// A collection of test cases sharing a description and maintainers.
#[derive(Debug, Clone)]
pub struct Suite {
    path: PathBuf,
    description: String,
    maintainers: NonEmpty<String>,
    pattern: Pattern,
    cases: Vec<Case>,
}

impl Suite {
    /// Creates an unconditional suite.
    #[must_use]
    pub const fn new(
        path: PathBuf,
        description: String,
        maintainers: NonEmpty<String>,
        cases: Vec<Case>,
    ) -> Self {
        Self {
            path,
            description,
            maintainers,
            pattern: Pattern::Unconditional,
            cases,
        }
    }

    /// Restricts where the whole suite applies.
    #[must_use]
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// The file the suite was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A human-readable description of the suite.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The people responsible for the suite.
    #[must_use]
    pub const fn maintainers(&self) -> &NonEmpty<String> {
        &self.maintainers
    }

    /// The suite-wide applicability pattern.
    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// All cases, in declaration order.
    #[must_use]
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    /// The cases applicable to the given subject.
    ///
    /// Nothing is returned when the suite itself does not apply.
    pub fn cases_for<'a>(&'a self, subject: Subject<'_>) -> impl Iterator<Item = &'a Case> {
        let applies = self.pattern.matches(&subject);
        self.cases
            .iter()
            .filter(move |case| applies && case.applies_to(&subject))
    }
}
