//! Pod version parsing, comparison, and ordering.
//!
//! Pod versions are dot-separated numeric segments with an optional
//! pre-release suffix after the first `-`:
//! - `10.29.0`, `2.0`, `1.15.2`
//! - `11.0.0-beta.3`, `7.0-rc.1`
//!
//! Ordering rules:
//! - Release segments compare numerically; missing trailing segments count
//!   as zero, so `1.0 == 1.0.0`
//! - A pre-release orders before its release (`1.0-beta < 1.0`)
//! - Pre-release segments compare numerically when both are numbers,
//!   case-insensitively as text otherwise; numbers order before text

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A malformed version string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid version `{input}`: {reason}")]
pub struct VersionError {
    pub input: String,
    pub reason: String,
}

/// A parsed pod version with comparable segments.
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    release: Vec<u64>,
    pre: Vec<PreSegment>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum PreSegment {
    Numeric(u64),
    Text(String),
}

impl Version {
    /// Parse a version string, rejecting malformed input.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let err = |reason: &str| VersionError {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(err("empty version string"));
        }

        let (release_part, pre_part) = match trimmed.split_once('-') {
            Some((r, p)) => (r, Some(p)),
            None => (trimmed, None),
        };

        let mut release = Vec::new();
        for segment in release_part.split('.') {
            if segment.is_empty() {
                return Err(err("empty release segment"));
            }
            let n = segment
                .parse::<u64>()
                .map_err(|_| err("non-numeric release segment"))?;
            release.push(n);
        }

        let mut pre = Vec::new();
        if let Some(pre_part) = pre_part {
            if pre_part.is_empty() {
                return Err(err("empty pre-release suffix"));
            }
            for segment in pre_part.split('.') {
                if segment.is_empty() {
                    return Err(err("empty pre-release segment"));
                }
                if !segment.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(err("pre-release segment must be alphanumeric"));
                }
                match segment.parse::<u64>() {
                    Ok(n) => pre.push(PreSegment::Numeric(n)),
                    Err(_) => pre.push(PreSegment::Text(segment.to_lowercase())),
                }
            }
        }

        Ok(Self {
            original: trimmed.to_string(),
            release,
            pre,
        })
    }

    /// The string this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Release segments (without pre-release suffix).
    pub fn release_segments(&self) -> &[u64] {
        &self.release
    }

    /// The leading release segment, used for major-bump detection.
    pub fn major(&self) -> u64 {
        self.release.first().copied().unwrap_or(0)
    }

    pub fn is_pre_release(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let max_len = self.release.len().max(other.release.len());
        for i in 0..max_len {
            let a = self.release.get(i).copied().unwrap_or(0);
            let b = other.release.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }

        match (self.pre.is_empty(), other.pre.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare_pre(&self.pre, &other.pre),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_pre(a: &[PreSegment], b: &[PreSegment]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = match (x, y) {
            (PreSegment::Numeric(x), PreSegment::Numeric(y)) => x.cmp(y),
            (PreSegment::Text(x), PreSegment::Text(y)) => x.cmp(y),
            (PreSegment::Numeric(_), PreSegment::Text(_)) => Ordering::Less,
            (PreSegment::Text(_), PreSegment::Numeric(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn basic_ordering() {
        assert!(v("1.0") < v("2.0"));
        assert!(v("10.29.0") > v("10.28.1"));
    }

    #[test]
    fn three_part_ordering() {
        assert!(v("1.0.0") < v("1.0.1"));
        assert!(v("1.0.1") < v("1.1.0"));
    }

    #[test]
    fn trailing_zeros_equal() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("2"), v("2.0.0"));
    }

    #[test]
    fn numeric_not_lexicographic() {
        assert!(v("1.9") < v("1.10"));
    }

    #[test]
    fn pre_release_before_release() {
        assert!(v("1.0-beta") < v("1.0"));
        assert!(v("11.0.0-beta.3") < v("11.0.0"));
    }

    #[test]
    fn pre_release_ordering() {
        assert!(v("1.0-alpha") < v("1.0-beta"));
        assert!(v("1.0-beta.2") < v("1.0-beta.11"));
        // Numeric pre segments order before text
        assert!(v("1.0-1") < v("1.0-alpha"));
        // A longer pre list with an equal prefix orders later
        assert!(v("1.0-beta") < v("1.0-beta.1"));
    }

    #[test]
    fn pre_release_case_insensitive() {
        assert_eq!(v("1.0-Beta"), v("1.0-beta"));
    }

    #[test]
    fn major_segment() {
        assert_eq!(v("10.29.0").major(), 10);
        assert_eq!(v("0.9").major(), 0);
    }

    #[test]
    fn rejects_malformed() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("1..0").is_err());
        assert!(Version::parse("1.x").is_err());
        assert!(Version::parse("abc").is_err());
        assert!(Version::parse("1.0-").is_err());
        assert!(Version::parse("1.0-beta..1").is_err());
        assert!(Version::parse("1.0-beta_1").is_err());
    }

    #[test]
    fn display_preserves_input() {
        assert_eq!(v("1.8.0").to_string(), "1.8.0");
        assert_eq!(v(" 1.8.0 ").to_string(), "1.8.0");
    }
}
