// SPDX-License-Identifier: MPL-2.0

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::{InvalidVersion, InvalidVersionRange};
use crate::version::Version;

/// A single interval of versions, `floor` to `ceiling`, with independent
/// inclusivity flags on each bound.
///
/// Unlike a general-purpose range type this never represents a union of
/// disjoint intervals — OSGi import/require version ranges are always one
/// interval — so membership is a single four-way comparison rather than a
/// scan over segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRange {
    floor: Version,
    ceiling: Version,
    floor_inclusive: bool,
    ceiling_inclusive: bool,
}

impl VersionRange {
    /// Builds a range, rejecting `floor > ceiling`.
    pub fn new(
        floor: Version,
        ceiling: Version,
        floor_inclusive: bool,
        ceiling_inclusive: bool,
    ) -> Result<Self, InvalidVersionRange> {
        if floor > ceiling {
            return Err(InvalidVersionRange::FloorAboveCeiling {
                input: String::new(),
                floor: floor.to_string(),
                ceiling: ceiling.to_string(),
            });
        }
        Ok(VersionRange {
            floor,
            ceiling,
            floor_inclusive,
            ceiling_inclusive,
        })
    }

    /// `[v, Infinite)`: every version at or above `v`.
    pub fn at_least(v: Version) -> Self {
        VersionRange {
            floor: v,
            ceiling: Version::infinite(),
            floor_inclusive: true,
            ceiling_inclusive: false,
        }
    }

    /// The lower bound.
    pub fn floor(&self) -> &Version {
        &self.floor
    }

    /// The upper bound.
    pub fn ceiling(&self) -> &Version {
        &self.ceiling
    }

    /// Whether `floor` itself is a member.
    pub fn floor_inclusive(&self) -> bool {
        self.floor_inclusive
    }

    /// Whether `ceiling` itself is a member.
    pub fn ceiling_inclusive(&self) -> bool {
        self.ceiling_inclusive
    }

    /// Whether `v` falls inside the interval.
    ///
    /// Because [`Version::Infinite`] compares strictly greater than itself,
    /// a ceiling-inclusive range whose ceiling is `Infinite` can still never
    /// contain `Infinite` — the comparison against the sentinel always
    /// yields "less than", on both sides of the bound.
    pub fn contains(&self, v: &Version) -> bool {
        let above_floor = if self.floor_inclusive {
            *v >= self.floor
        } else {
            *v > self.floor
        };
        let below_ceiling = if self.ceiling_inclusive {
            *v <= self.ceiling
        } else {
            *v < self.ceiling
        };
        above_floor && below_ceiling
    }

    /// Parses either a single version (`"1.2.3"`, meaning `[1.2.3, Infinite)`)
    /// or a bracketed interval (`"[1.0,2.0)"`, `"(1.0,2.0]"`, ...).
    pub fn parse(input: &str) -> Result<Self, InvalidVersionRange> {
        let trimmed = input.trim();
        if !trimmed.starts_with('[') && !trimmed.starts_with('(') {
            let v = Version::parse(trimmed).map_err(InvalidVersionRange::Version)?;
            return Ok(VersionRange::at_least(v));
        }

        let malformed = |reason: &str| InvalidVersionRange::Malformed {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let floor_inclusive = trimmed.starts_with('[');
        let ceiling_inclusive = trimmed.ends_with(']');
        if !trimmed.ends_with(']') && !trimmed.ends_with(')') {
            return Err(malformed("missing closing bracket"));
        }

        let inner = &trimmed[1..trimmed.len() - 1];
        let mut parts = inner.splitn(2, ',');
        let floor_str = parts.next().ok_or_else(|| malformed("missing floor"))?;
        let ceiling_str = parts
            .next()
            .ok_or_else(|| malformed("missing ',' separating floor and ceiling"))?;

        let parse_bound = |s: &str| -> Result<Version, InvalidVersion> { Version::parse(s.trim()) };
        let floor = parse_bound(floor_str).map_err(InvalidVersionRange::Version)?;
        let ceiling = parse_bound(ceiling_str).map_err(InvalidVersionRange::Version)?;

        if floor > ceiling {
            return Err(InvalidVersionRange::FloorAboveCeiling {
                input: input.to_string(),
                floor: floor.to_string(),
                ceiling: ceiling.to_string(),
            });
        }

        Ok(VersionRange {
            floor,
            ceiling,
            floor_inclusive,
            ceiling_inclusive,
        })
    }
}

impl Default for VersionRange {
    /// `[0.0.0, Infinite)`.
    fn default() -> Self {
        VersionRange::at_least(Version::zero())
    }
}

impl FromStr for VersionRange {
    type Err = InvalidVersionRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::parse(s)
    }
}

impl Display for VersionRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let is_open_ended_from_floor =
            self.ceiling.is_infinite() && !self.ceiling_inclusive && self.floor_inclusive;
        if is_open_ended_from_floor {
            return write!(f, "{}", self.floor);
        }
        let open = if self.floor_inclusive { '[' } else { '(' };
        let close = if self.ceiling_inclusive { ']' } else { ')' };
        write!(f, "{open}{},{}{close}", self.floor, self.ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_contains_zero_but_not_infinite() {
        let r = VersionRange::default();
        assert!(r.contains(&Version::zero()));
        assert!(r.contains(&Version::new(99, 0, 0, "")));
        assert!(!r.contains(&Version::infinite()));
    }

    #[test]
    fn single_version_parses_to_at_least() {
        let r = VersionRange::parse("1.2.3").unwrap();
        assert!(r.contains(&Version::new(1, 2, 3, "")));
        assert!(r.contains(&Version::new(5, 0, 0, "")));
        assert!(!r.contains(&Version::new(1, 2, 2, "")));
    }

    #[test]
    fn bracketed_range_respects_inclusivity() {
        let r = VersionRange::parse("[1.0.0,2.0.0)").unwrap();
        assert!(r.contains(&Version::new(1, 0, 0, "")));
        assert!(r.contains(&Version::new(1, 9, 9, "")));
        assert!(!r.contains(&Version::new(2, 0, 0, "")));

        let r2 = VersionRange::parse("(1.0.0,2.0.0]").unwrap();
        assert!(!r2.contains(&Version::new(1, 0, 0, "")));
        assert!(r2.contains(&Version::new(2, 0, 0, "")));
    }

    #[test]
    fn rejects_floor_above_ceiling() {
        assert!(VersionRange::parse("[2.0.0,1.0.0]").is_err());
    }

    #[test]
    fn canonical_display_round_trips() {
        assert_eq!(VersionRange::default().to_string(), "0");
        let r = VersionRange::parse("[1.0.0,2.0.0)").unwrap();
        assert_eq!(r.to_string(), "[1.0.0,2.0.0)");
    }

    proptest! {
        #[test]
        fn at_least_contains_every_version_from_its_floor_upward(
            floor in (0u32..50, 0u32..50, 0u32..50),
            candidate in (0u32..50, 0u32..50, 0u32..50),
        ) {
            let v = |t: (u32, u32, u32)| Version::new(t.0, t.1, t.2, "");
            let (floor, candidate) = (v(floor), v(candidate));
            let range = VersionRange::at_least(floor.clone());
            prop_assert_eq!(range.contains(&candidate), candidate >= floor);
        }

        #[test]
        fn default_never_contains_infinite(
            major in 0u32..1000, minor in 0u32..1000, micro in 0u32..1000,
        ) {
            let range = VersionRange::default();
            prop_assert!(range.contains(&Version::new(major, minor, micro, "")));
            prop_assert!(!range.contains(&Version::infinite()));
        }
    }
}
