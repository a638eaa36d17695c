//! Qt version parsing and minimum-version checks.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use thiserror::Error;

/// A `major.minor.patch` version with numeric components.
///
/// Ordering is component-wise on integers, so `10.0.0 > 9.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTriple(Version);

/// A version string that is not exactly three dot-separated integers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed version `{input}`: expected `major.minor.patch`")]
pub struct VersionError {
    pub input: String,
}

impl VersionTriple {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        VersionTriple(Version::new(major, minor, patch))
    }

    /// Parse a dotted triple. Surrounding whitespace is ignored and leading
    /// zeros are allowed (`4.08.0`); anything else (missing components,
    /// suffixes, pre-release tags) is rejected.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let malformed = || VersionError {
            input: input.to_string(),
        };

        let mut parts = input.trim().split('.');
        let mut next = || -> Result<u64, VersionError> {
            let part = parts.next().ok_or_else(malformed)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse().map_err(|_| malformed())
        };

        let (major, minor, patch) = (next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(malformed());
        }

        Ok(VersionTriple::new(major, minor, patch))
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }
}

impl FromStr for VersionTriple {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionTriple::parse(s)
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}

/// Whether `actual >= minimum`, both given as dotted triples.
pub fn is_at_least(actual: &str, minimum: &str) -> Result<bool, VersionError> {
    Ok(VersionTriple::parse(actual)? >= VersionTriple::parse(minimum)?)
}

/// Outcome of checking a detected version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    /// At or above the minimum.
    Satisfied(VersionTriple),
    /// Below the minimum.
    TooOld(VersionTriple),
    /// Missing or malformed; cannot be compared.
    Unverified { found: Option<String> },
}

/// Minimum Qt version a project needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRequirement {
    minimum: VersionTriple,
}

impl VersionRequirement {
    pub fn new(minimum: VersionTriple) -> Self {
        VersionRequirement { minimum }
    }

    pub fn minimum(&self) -> &VersionTriple {
        &self.minimum
    }

    /// Check a detected version string. `None` means the toolchain did not
    /// report a version at all.
    pub fn check(&self, actual: Option<&str>) -> VersionCheck {
        let Some(actual) = actual else {
            return VersionCheck::Unverified { found: None };
        };

        match VersionTriple::parse(actual) {
            Ok(version) if version >= self.minimum => VersionCheck::Satisfied(version),
            Ok(version) => VersionCheck::TooOld(version),
            Err(_) => VersionCheck::Unverified {
                found: Some(actual.trim().to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_not_lexicographic() {
        assert!(is_at_least("10.0.0", "9.0.0").unwrap());
        assert!(is_at_least("5.10.0", "5.9.0").unwrap());
        assert!(is_at_least("5.9.10", "5.9.9").unwrap());
        assert!(!is_at_least("9.0.0", "10.0.0").unwrap());
    }

    #[test]
    fn test_inclusive_boundary() {
        assert!(is_at_least("4.0.0", "4.0.0").unwrap());
        assert!(!is_at_least("3.9.9", "4.0.0").unwrap());
        assert!(is_at_least("4.0.1", "4.0.0").unwrap());
    }

    #[test]
    fn test_malformed_inputs() {
        for bad in ["5.15", "5", "5.15.2.1", "?", "", "five.0.0", "5.15.2-beta", "-1.0.0", "+5.0.0", "5..0", "5.15.2+build"] {
            assert!(VersionTriple::parse(bad).is_err(), "`{}` should be rejected", bad);
        }
        assert!(is_at_least("5.15", "4.0.0").is_err());
        assert!(is_at_least("5.15.2", "4.0").is_err());
    }

    #[test]
    fn test_leading_zeros_are_numeric() {
        assert_eq!(is_at_least("4.08.0", "4.0.0"), Ok(true));
        assert_eq!(VersionTriple::parse("5.06.1").unwrap(), VersionTriple::new(5, 6, 1));

        let req = VersionRequirement::new(VersionTriple::new(4, 0, 0));
        assert_eq!(
            req.check(Some("5.06.1")),
            VersionCheck::Satisfied(VersionTriple::new(5, 6, 1))
        );
    }

    #[test]
    fn test_parse_trims_query_output() {
        let v: VersionTriple = "5.15.2\n".parse().unwrap();
        assert_eq!(v, VersionTriple::new(5, 15, 2));
        assert_eq!(v.to_string(), "5.15.2");
    }

    #[test]
    fn test_requirement_check() {
        let req = VersionRequirement::new(VersionTriple::new(4, 0, 0));

        assert_eq!(
            req.check(Some("5.15.2")),
            VersionCheck::Satisfied(VersionTriple::new(5, 15, 2))
        );
        assert_eq!(
            req.check(Some("3.3.8")),
            VersionCheck::TooOld(VersionTriple::new(3, 3, 8))
        );
        assert_eq!(
            req.check(Some("5.15")),
            VersionCheck::Unverified {
                found: Some("5.15".to_string())
            }
        );
        assert_eq!(req.check(None), VersionCheck::Unverified { found: None });
    }
}
