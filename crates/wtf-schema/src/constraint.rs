//! Version constraints such as `>= 1.0.0, < 2.0.0` or `~> 1.5`.
//!
//! A constraint is a list of clauses that must all hold. The pessimistic
//! operator `~>` allows the right-most written segment to grow:
//! `~> 1.2` is `>= 1.2.0, < 2.0.0` and `~> 1.2.0` is `>= 1.2.0, < 1.3.0`.
//!
//! Pre-releases follow semantic-versioning precedence rules: a range clause
//! only admits a pre-release when the clause itself names a pre-release of the
//! same `major.minor.patch`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::version::{Version, VersionError};

/// Errors that can occur when parsing a [`Constraint`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    /// A comma left an empty clause behind (`>= 1.0,`).
    #[error("empty clause in constraint '{constraint}'")]
    EmptyClause {
        /// The full constraint string.
        constraint: String,
    },

    /// A clause had an operator but nothing after it.
    #[error("missing version in clause '{clause}'")]
    MissingVersion {
        /// The offending clause.
        clause: String,
    },

    /// The version part of a clause did not parse.
    #[error("invalid version in clause '{clause}': {source}")]
    InvalidVersion {
        /// The offending clause.
        clause: String,
        /// Why the version was rejected.
        source: VersionError,
    },
}

/// Comparison operator of a single clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=` (also implied when no operator is written)
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `~>`
    Pessimistic,
}

impl Operator {
    /// Longest symbols first so `>=` is not read as `>`.
    const SYMBOLS: [(&'static str, Operator); 7] = [
        ("~>", Operator::Pessimistic),
        (">=", Operator::GreaterOrEqual),
        ("<=", Operator::LessOrEqual),
        ("!=", Operator::NotEqual),
        ("=", Operator::Equal),
        (">", Operator::Greater),
        ("<", Operator::Less),
    ];

    /// The operator's symbol.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Pessimistic => "~>",
        }
    }

    /// Split a leading operator off `clause`.
    fn split(clause: &str) -> (Option<Self>, &str) {
        Self::SYMBOLS
            .iter()
            .find_map(|(symbol, op)| clause.strip_prefix(symbol).map(|rest| (Some(*op), rest)))
            .unwrap_or((None, clause))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `operator version` comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    op: Operator,
    explicit_op: bool,
    version: Version,
    precision: usize,
    written: String,
}

impl Clause {
    fn parse(clause: &str) -> Result<Self, ConstraintError> {
        let (op, rest) = Operator::split(clause);
        let written = rest.trim();
        if written.is_empty() {
            return Err(ConstraintError::MissingVersion {
                clause: clause.to_string(),
            });
        }
        let (version, precision) =
            Version::parse_counted(written).map_err(|source| ConstraintError::InvalidVersion {
                clause: clause.to_string(),
                source,
            })?;

        Ok(Self {
            op: op.unwrap_or(Operator::Equal),
            explicit_op: op.is_some(),
            version,
            precision,
            written: written.to_string(),
        })
    }

    /// The clause's operator.
    pub fn op(&self) -> Operator {
        self.op
    }

    /// The version the clause compares against.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Whether `candidate` satisfies this clause.
    pub fn matches(&self, candidate: &Version) -> bool {
        let bound = &self.version;
        let order = candidate.cmp_precedence(bound);
        match self.op {
            Operator::Equal => order == Ordering::Equal,
            Operator::NotEqual => order != Ordering::Equal,
            Operator::Greater => prerelease_allowed(candidate, bound) && order == Ordering::Greater,
            Operator::GreaterOrEqual => {
                prerelease_allowed(candidate, bound) && order != Ordering::Less
            }
            Operator::Less => prerelease_allowed(candidate, bound) && order == Ordering::Less,
            Operator::LessOrEqual => {
                prerelease_allowed(candidate, bound) && order != Ordering::Greater
            }
            Operator::Pessimistic => {
                if !prerelease_allowed(candidate, bound)
                    || (bound.is_prerelease() && !candidate.is_prerelease())
                    || order == Ordering::Less
                {
                    return false;
                }
                // Every written segment but the last is pinned.
                let fixed = self.precision.saturating_sub(1);
                candidate.segments()[..fixed] == bound.segments()[..fixed]
            }
        }
    }
}

/// A pre-release candidate is only admitted by a clause that names a
/// pre-release of the same `major.minor.patch`.
fn prerelease_allowed(candidate: &Version, bound: &Version) -> bool {
    match (candidate.is_prerelease(), bound.is_prerelease()) {
        (true, true) => candidate.segments() == bound.segments(),
        (true, false) => false,
        (false, _) => true,
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.explicit_op {
            write!(f, "{} {}", self.op, self.written)
        } else {
            f.write_str(&self.written)
        }
    }
}

/// A conjunction of version clauses.
///
/// The empty constraint matches every version.
///
/// # Example
///
/// ```
/// use wtf_schema::{Constraint, Version};
///
/// let c: Constraint = ">= 1.0.0, < 2.0.0".parse().unwrap();
/// assert!(c.matches(&Version::new(1, 2, 0)));
/// assert!(!c.matches(&Version::new(2, 0, 0)));
/// assert_eq!(c.to_string(), ">= 1.0.0, < 2.0.0");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraint {
    clauses: Vec<Clause>,
}

impl Constraint {
    /// The constraint that matches everything.
    pub fn any() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list of clauses.
    ///
    /// Empty or whitespace-only input yields [`Constraint::any`].
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError`] if a clause is empty, has no version, or
    /// its version does not parse.
    pub fn parse(input: &str) -> Result<Self, ConstraintError> {
        if input.trim().is_empty() {
            return Ok(Self::any());
        }

        let clauses = input
            .split(',')
            .map(|raw| {
                let clause = raw.trim();
                if clause.is_empty() {
                    return Err(ConstraintError::EmptyClause {
                        constraint: input.to_string(),
                    });
                }
                Clause::parse(clause)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { clauses })
    }

    /// Whether every clause accepts `version`.
    pub fn matches(&self, version: &Version) -> bool {
        self.clauses.iter().all(|clause| clause.matches(version))
    }

    /// True for the empty constraint.
    pub fn is_any(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The individual clauses.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

impl FromStr for Constraint {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Version> for Constraint {
    /// An exact-match constraint.
    fn from(version: Version) -> Self {
        let written = version.to_string();
        Self {
            clauses: vec![Clause {
                op: Operator::Equal,
                explicit_op: true,
                version,
                precision: 3,
                written,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> Constraint {
        Constraint::parse(s).unwrap()
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn empty_constraint_matches_everything() {
        let any = c("  ");
        assert!(any.is_any());
        assert!(any.matches(&v("0.0.1")));
        assert!(any.matches(&v("3.0.0-alpha")));
        assert_eq!(any.to_string(), "");
    }

    #[test]
    fn comparison_operators() {
        let cases = [
            ("= 1.1.0", "1.1.0", true),
            ("= 1.1.0", "1.1.1", false),
            ("1.1.0", "1.1.0", true),
            ("!= 1.2.0", "1.2.0", false),
            ("!= 1.2.0", "1.1.0", true),
            ("> 1.0.0", "1.0.0", false),
            ("> 1.0.0", "1.0.1", true),
            (">= 1.0.0", "1.0.0", true),
            (">= 1.0.0", "0.9.9", false),
            ("< 2.0.0", "1.99.0", true),
            ("< 2.0.0", "2.0.0", false),
            ("<= 2.0.0", "2.0.0", true),
            ("<= 2.0.0", "2.0.1", false),
        ];
        for (constraint, version, expected) in cases {
            assert_eq!(
                c(constraint).matches(&v(version)),
                expected,
                "{constraint} vs {version}"
            );
        }
    }

    #[test]
    fn pessimistic_minor_precision() {
        let constraint = c("~> 1.0");
        assert!(constraint.matches(&v("1.0.0")));
        assert!(constraint.matches(&v("1.9.9")));
        assert!(!constraint.matches(&v("2.0.0")));
        assert!(!constraint.matches(&v("0.9.0")));
    }

    #[test]
    fn pessimistic_patch_precision() {
        let constraint = c("~> 1.0.0");
        assert!(constraint.matches(&v("1.0.9")));
        assert!(!constraint.matches(&v("1.1.0")));
        assert!(!constraint.matches(&v("0.9.9")));
    }

    #[test]
    fn pessimistic_major_precision_has_no_upper_bound() {
        let constraint = c("~> 1");
        assert!(constraint.matches(&v("1.0.0")));
        assert!(constraint.matches(&v("7.3.0")));
        assert!(!constraint.matches(&v("0.15.0")));
    }

    #[test]
    fn clauses_combine_with_and() {
        let constraint = c(">= 1.0.0, < 2.0.0");
        assert!(constraint.matches(&v("1.2.0")));
        assert!(!constraint.matches(&v("2.0.0")));
        assert!(!constraint.matches(&v("0.9.0")));
        assert_eq!(constraint.clauses().len(), 2);
    }

    #[test]
    fn release_constraints_skip_prereleases() {
        assert!(!c(">= 1.0.0").matches(&v("2.0.0-alpha")));
        assert!(!c("~> 1.0").matches(&v("1.1.0-beta")));
        assert!(!c("< 2.0.0").matches(&v("1.5.0-rc1")));
    }

    #[test]
    fn prerelease_bounds_admit_same_core_prereleases() {
        let constraint = c(">= 2.0.0-alpha");
        assert!(constraint.matches(&v("2.0.0-beta")));
        assert!(constraint.matches(&v("2.0.0")));
        assert!(!constraint.matches(&v("2.1.0-alpha")));
        assert!(!constraint.matches(&v("1.0.0")));
    }

    #[test]
    fn pessimistic_prerelease_bound_rejects_releases() {
        let constraint = c("~> 1.0.0-beta");
        assert!(constraint.matches(&v("1.0.0-rc1")));
        assert!(!constraint.matches(&v("1.0.0")));
    }

    #[test]
    fn exact_match_works_on_prereleases() {
        assert!(c("= 1.5.0-rc1").matches(&v("1.5.0-rc1")));
    }

    #[test]
    fn renders_as_written() {
        assert_eq!(c(">=1.0,<2.0").to_string(), ">= 1.0, < 2.0");
        assert_eq!(c("~> 1.5.0").to_string(), "~> 1.5.0");
        assert_eq!(c("1.2.3").to_string(), "1.2.3");
        assert_eq!(Constraint::from(v("1.2.3")).to_string(), "= 1.2.3");
    }

    #[test]
    fn rejects_malformed_constraints() {
        assert!(matches!(
            Constraint::parse(">= 1.0,"),
            Err(ConstraintError::EmptyClause { .. })
        ));
        assert!(matches!(
            Constraint::parse(">="),
            Err(ConstraintError::MissingVersion { .. })
        ));
        assert!(matches!(
            Constraint::parse("not-a-constraint"),
            Err(ConstraintError::InvalidVersion { .. })
        ));
        assert!(Constraint::parse("=> 1.0").is_err());
    }
}
