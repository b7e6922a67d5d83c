// SPDX-License-Identifier: MPL-2.0

//! Parse errors for versions and version ranges.

use thiserror::Error;

/// A [`Version`](crate::Version) string failed to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version '{input}': {reason}")]
pub struct InvalidVersion {
    /// The string that failed to parse.
    pub input: String,
    /// Human-readable reason.
    pub reason: String,
}

/// A [`VersionRange`](crate::VersionRange) string failed to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidVersionRange {
    /// One of the range's endpoints is not a valid version.
    #[error(transparent)]
    Version(#[from] InvalidVersion),

    /// The range's textual grammar (brackets, comma) is malformed.
    #[error("invalid version range '{input}': {reason}")]
    Malformed {
        /// The string that failed to parse.
        input: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The range's floor is greater than its ceiling.
    #[error("invalid version range '{input}': floor {floor} is greater than ceiling {ceiling}")]
    FloorAboveCeiling {
        /// The string that failed to parse.
        input: String,
        /// The floor, rendered.
        floor: String,
        /// The ceiling, rendered.
        ceiling: String,
    },
}
