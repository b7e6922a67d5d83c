// SPDX-License-Identifier: MPL-2.0

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::InvalidVersion;

/// An OSGi bundle version: the ordered quadruple `(major, minor, micro,
/// qualifier)`, plus the [`Version::INFINITE`] sentinel.
///
/// `Infinite` never arises from parsing a manifest header; it only ever
/// appears as the open ceiling of [`VersionRange::default`](crate::VersionRange::default)
/// or of a single-version range. It compares strictly greater than every
/// other version, *including itself* — this is intentional: it is what
/// makes `v < Infinite` hold for every finite `v`, so a half-open range
/// `[floor, Infinite)` correctly never contains the sentinel itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Version {
    /// A concrete, parseable version.
    Finite {
        /// Major component.
        major: u32,
        /// Minor component.
        minor: u32,
        /// Micro component.
        micro: u32,
        /// Free-form qualifier, compared by byte value.
        qualifier: String,
    },
    /// The sentinel greater than every version, including itself.
    Infinite,
}

impl Version {
    /// Builds a concrete version from its four components.
    pub fn new(major: u32, minor: u32, micro: u32, qualifier: impl Into<String>) -> Self {
        Version::Finite {
            major,
            minor,
            micro,
            qualifier: qualifier.into(),
        }
    }

    /// The smallest valid version, `0.0.0`.
    pub fn zero() -> Self {
        Version::new(0, 0, 0, "")
    }

    /// The sentinel that compares greater than every version, including itself.
    pub fn infinite() -> Self {
        Version::Infinite
    }

    /// True for [`Version::Infinite`].
    pub fn is_infinite(&self) -> bool {
        matches!(self, Version::Infinite)
    }

    /// Parses a dotted version string `major[.minor[.micro[.qualifier]]]`.
    ///
    /// Missing numeric segments default to 0, a missing qualifier to the
    /// empty string. A non-numeric major/minor/micro segment is a parse
    /// error. The qualifier segment itself is never validated — OSGi
    /// qualifiers are free-form ASCII and may contain further `.`s, which
    /// is why splitting stops after the third `.`.
    pub fn parse(input: &str) -> Result<Self, InvalidVersion> {
        let err = |reason: &str| InvalidVersion {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = input.splitn(4, '.');
        let major = parse_segment(parts.next().unwrap_or(""), input)?;
        let minor = match parts.next() {
            Some(p) => parse_segment(p, input)?,
            None => 0,
        };
        let micro = match parts.next() {
            Some(p) => parse_segment(p, input)?,
            None => 0,
        };
        let qualifier = parts.next().unwrap_or("").to_string();

        if major.is_none() {
            return Err(err("major version must be numeric"));
        }
        Ok(Version::Finite {
            major: major.unwrap(),
            minor: minor.unwrap_or(0),
            micro: micro.unwrap_or(0),
            qualifier,
        })
    }
}

fn parse_segment(segment: &str, input: &str) -> Result<Option<u32>, InvalidVersion> {
    if segment.is_empty() {
        return Ok(None);
    }
    segment
        .parse::<u32>()
        .map(Some)
        .map_err(|_| InvalidVersion {
            input: input.to_string(),
            reason: format!("'{segment}' is not a non-negative integer"),
        })
}

impl Default for Version {
    fn default() -> Self {
        Version::zero()
    }
}

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Version::Infinite => f.write_str("infinite"),
            Version::Finite {
                major,
                minor,
                micro,
                qualifier,
            } => {
                write!(f, "{major}")?;
                if *minor != 0 || *micro != 0 || !qualifier.is_empty() {
                    write!(f, ".{minor}")?;
                }
                if *micro != 0 || !qualifier.is_empty() {
                    write!(f, ".{micro}")?;
                }
                if !qualifier.is_empty() {
                    write!(f, ".{qualifier}")?;
                }
                Ok(())
            }
        }
    }
}

// Hand-written rather than derived: `Infinite` must compare greater than
// every version including itself, which a derived total order cannot
// express (it would make `Infinite == Infinite` and `Infinite > Infinite`
// both true, which `PartialEq` alone already says about the `Eq` side).
impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Version::Infinite, _) => Ordering::Greater,
            (Version::Finite { .. }, Version::Infinite) => Ordering::Less,
            (
                Version::Finite {
                    major: a_major,
                    minor: a_minor,
                    micro: a_micro,
                    qualifier: a_qual,
                },
                Version::Finite {
                    major: b_major,
                    minor: b_minor,
                    micro: b_micro,
                    qualifier: b_qual,
                },
            ) => (a_major, a_minor, a_micro, a_qual).cmp(&(b_major, b_minor, b_micro, b_qual)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_missing_segments_as_zero() {
        assert_eq!(Version::parse("2").unwrap(), Version::new(2, 0, 0, ""));
        assert_eq!(Version::parse("1.2").unwrap(), Version::new(1, 2, 0, ""));
        assert_eq!(
            Version::parse("1.2.3.something").unwrap(),
            Version::new(1, 2, 3, "something")
        );
    }

    #[test]
    fn rejects_non_numeric_segments() {
        assert!(Version::parse("a.b.c").is_err());
        assert!(Version::parse("1.x.0").is_err());
    }

    #[test]
    fn default_is_zero_and_smallest() {
        assert_eq!(Version::default(), Version::zero());
        assert!(Version::zero() < Version::new(0, 0, 1, ""));
    }

    #[test]
    fn infinite_is_strictly_greater_than_itself() {
        assert_eq!(Version::infinite().cmp(&Version::infinite()), Ordering::Greater);
        assert!(Version::new(999, 0, 0, "") < Version::infinite());
    }

    #[test]
    fn canonical_display_matches_spec_examples() {
        assert_eq!(Version::new(2, 0, 0, "").to_string(), "2");
        assert_eq!(
            Version::new(1, 2, 3, "something").to_string(),
            "1.2.3.something"
        );
    }

    #[test]
    fn round_trips_through_display() {
        let v = Version::new(1, 2, 3, "beta");
        assert_eq!(Version::parse(&v.to_string()).unwrap(), v);
    }

    proptest! {
        #[test]
        fn canonical_display_round_trips_for_any_numeric_version(
            major in 0u32..1000, minor in 0u32..1000, micro in 0u32..1000,
        ) {
            let v = Version::new(major, minor, micro, "");
            prop_assert_eq!(Version::parse(&v.to_string()).unwrap(), v);
        }

        #[test]
        fn ordering_is_transitive(
            a in (0u32..20, 0u32..20, 0u32..20),
            b in (0u32..20, 0u32..20, 0u32..20),
            c in (0u32..20, 0u32..20, 0u32..20),
        ) {
            let v = |t: (u32, u32, u32)| Version::new(t.0, t.1, t.2, "");
            let (va, vb, vc) = (v(a), v(b), v(c));
            if va <= vb && vb <= vc {
                prop_assert!(va <= vc);
            }
        }

        #[test]
        fn infinite_is_always_strictly_greater_than_any_finite_version(
            major in 0u32..1000, minor in 0u32..1000, micro in 0u32..1000,
        ) {
            prop_assert!(Version::new(major, minor, micro, "") < Version::infinite());
        }
    }
}
