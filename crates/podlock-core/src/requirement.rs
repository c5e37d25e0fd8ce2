//! Version requirement parsing and matching.
//!
//! A requirement is an operator plus a version:
//! - `= 10.29.0` (exact; a bare version means the same)
//! - `~> 1.2` (pessimistic: `>= 1.2, < 2.0`; `~> 1.2.3` is `>= 1.2.3, < 1.3.0`)
//! - `> 1.0`, `>= 1.0`, `< 2.0`, `<= 2.0`
//!
//! A [`RequirementSet`] is a comma-separated conjunction such as
//! `>= 1.0, < 2.0`: a version must satisfy every member.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::version::{Version, VersionError};

/// A malformed requirement string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid requirement `{input}`: {reason}")]
pub struct RequirementError {
    pub input: String,
    pub reason: String,
}

impl From<VersionError> for RequirementError {
    fn from(e: VersionError) -> Self {
        Self {
            input: e.input.clone(),
            reason: e.to_string(),
        }
    }
}

/// Comparison operator of a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Exact,
    Pessimistic,
    Greater,
    GreaterEq,
    Less,
    LessEq,
}

impl Op {
    fn symbol(&self) -> &'static str {
        match self {
            Op::Exact => "=",
            Op::Pessimistic => "~>",
            Op::Greater => ">",
            Op::GreaterEq => ">=",
            Op::Less => "<",
            Op::LessEq => "<=",
        }
    }
}

/// A single version requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub op: Op,
    pub version: Version,
}

impl Requirement {
    /// Parse one requirement: an optional operator followed by a version.
    pub fn parse(input: &str) -> Result<Self, RequirementError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RequirementError {
                input: input.to_string(),
                reason: "empty requirement".to_string(),
            });
        }

        // Longest operators first so `>=` is not read as `>` + `=...`
        let (op, rest) = if let Some(rest) = trimmed.strip_prefix("~>") {
            (Op::Pessimistic, rest)
        } else if let Some(rest) = trimmed.strip_prefix(">=") {
            (Op::GreaterEq, rest)
        } else if let Some(rest) = trimmed.strip_prefix("<=") {
            (Op::LessEq, rest)
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            (Op::Greater, rest)
        } else if let Some(rest) = trimmed.strip_prefix('<') {
            (Op::Less, rest)
        } else if let Some(rest) = trimmed.strip_prefix('=') {
            (Op::Exact, rest)
        } else {
            // Bare version means exact
            (Op::Exact, trimmed)
        };

        let version = Version::parse(rest)?;
        Ok(Self { op, version })
    }

    /// Check whether a version satisfies this requirement.
    pub fn matches(&self, candidate: &Version) -> bool {
        match self.op {
            Op::Exact => candidate == &self.version,
            Op::Greater => candidate > &self.version,
            Op::GreaterEq => candidate >= &self.version,
            Op::Less => candidate < &self.version,
            Op::LessEq => candidate <= &self.version,
            Op::Pessimistic => {
                candidate >= &self.version && candidate < &self.pessimistic_upper()
            }
        }
    }

    /// The exclusive upper bound implied by `~>`: drop the last given
    /// release segment and bump the one before it (`1.2.3` -> `1.3`,
    /// `1.2` -> `2`, `1` -> `2`).
    fn pessimistic_upper(&self) -> Version {
        let segments = self.version.release_segments();
        let upper: Vec<u64> = if segments.len() >= 2 {
            let mut u = segments[..segments.len() - 1].to_vec();
            *u.last_mut().expect("at least one segment") += 1;
            u
        } else {
            vec![segments.first().copied().unwrap_or(0) + 1]
        };
        let rendered = upper
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        Version::parse(&rendered).expect("numeric segments always parse")
    }
}

impl FromStr for Requirement {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.symbol(), self.version)
    }
}

/// A conjunction of requirements; a version must satisfy all of them.
///
/// An empty set matches any version (a dependency declared without a
/// requirement).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementSet(Vec<Requirement>);

impl RequirementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated requirement list such as `>= 1.0, < 2.0`.
    pub fn parse(input: &str) -> Result<Self, RequirementError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::new());
        }
        let mut reqs = Vec::new();
        for part in trimmed.split(',') {
            reqs.push(Requirement::parse(part)?);
        }
        Ok(Self(reqs))
    }

    pub fn push(&mut self, req: Requirement) {
        self.0.push(req);
    }

    pub fn extend_from(&mut self, other: &RequirementSet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.0.iter()
    }

    /// Check whether a version satisfies every member requirement.
    pub fn matches(&self, candidate: &Version) -> bool {
        self.0.iter().all(|r| r.matches(candidate))
    }
}

impl fmt::Display for RequirementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "*");
        }
        let rendered = self
            .0
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&rendered)
    }
}

impl FromStr for RequirementSet {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn r(s: &str) -> Requirement {
        Requirement::parse(s).unwrap()
    }

    #[test]
    fn exact() {
        assert!(r("= 1.5").matches(&v("1.5")));
        assert!(r("= 1.5").matches(&v("1.5.0")));
        assert!(!r("= 1.5").matches(&v("1.5.1")));
    }

    #[test]
    fn bare_version_is_exact() {
        let req = r("2.0");
        assert_eq!(req.op, Op::Exact);
        assert!(req.matches(&v("2.0")));
        assert!(!req.matches(&v("2.1")));
    }

    #[test]
    fn bounds() {
        assert!(r(">= 1.0").matches(&v("1.0")));
        assert!(r(">= 1.0").matches(&v("3.2")));
        assert!(!r("> 1.0").matches(&v("1.0")));
        assert!(r("< 2.0").matches(&v("1.9.9")));
        assert!(!r("< 2.0").matches(&v("2.0")));
        assert!(r("<= 2.0").matches(&v("2.0")));
    }

    #[test]
    fn pessimistic_two_segments() {
        let req = r("~> 1.2");
        assert!(req.matches(&v("1.2")));
        assert!(req.matches(&v("1.3.0")));
        assert!(req.matches(&v("1.99")));
        assert!(!req.matches(&v("2.0")));
        assert!(!req.matches(&v("1.1")));
    }

    #[test]
    fn pessimistic_three_segments() {
        let req = r("~> 1.2.3");
        assert!(req.matches(&v("1.2.3")));
        assert!(req.matches(&v("1.2.9")));
        assert!(!req.matches(&v("1.3.0")));
        assert!(!req.matches(&v("1.2.2")));
    }

    #[test]
    fn pessimistic_single_segment() {
        let req = r("~> 10");
        assert!(req.matches(&v("10.0")));
        assert!(req.matches(&v("10.29.0")));
        assert!(!req.matches(&v("11.0")));
    }

    #[test]
    fn whitespace_tolerant() {
        assert_eq!(r("~>1.2"), r("~> 1.2"));
        assert_eq!(r("  >=  1.0 "), r(">= 1.0"));
    }

    #[test]
    fn display_round_trip() {
        for s in ["= 1.5", "~> 1.2", "> 1.0", ">= 1.0", "< 2.0", "<= 2.0"] {
            assert_eq!(r(s).to_string(), s);
            assert_eq!(r(&r(s).to_string()), r(s));
        }
    }

    #[test]
    fn set_conjunction() {
        let set = RequirementSet::parse(">= 1.0, < 2.0").unwrap();
        assert!(set.matches(&v("1.5")));
        assert!(!set.matches(&v("2.0")));
        assert!(!set.matches(&v("0.9")));
        assert_eq!(set.to_string(), ">= 1.0, < 2.0");
    }

    #[test]
    fn empty_set_matches_anything() {
        let set = RequirementSet::parse("").unwrap();
        assert!(set.matches(&v("0.0.1")));
        assert!(set.matches(&v("99.0")));
        assert_eq!(set.to_string(), "*");
    }

    #[test]
    fn rejects_malformed() {
        assert!(Requirement::parse("").is_err());
        assert!(Requirement::parse("~>").is_err());
        assert!(Requirement::parse("== 1.0").is_err());
        assert!(Requirement::parse(">= one.two").is_err());
        assert!(RequirementSet::parse(">= 1.0, bogus..1").is_err());
    }
}
