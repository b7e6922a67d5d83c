// SPDX-License-Identifier: MPL-2.0

//! Versions and version ranges for OSGi-style bundle metadata.
//!
//! A [`Version`] is the ordered quadruple `(major, minor, micro, qualifier)`
//! used throughout the OSGi R4 manifest grammar, plus a dedicated
//! [`Version::INFINITE`] sentinel that never occurs as a parsed version and
//! is only ever produced as the open ceiling of a [`VersionRange`].
//!
//! A [`VersionRange`] is a single interval `(floor, ceiling]` or similar,
//! with independent inclusivity flags on each bound — not the arbitrary
//! union of intervals a general-purpose range type would support, because
//! OSGi requirement ranges never need more than one interval.

mod error;
mod range;
mod version;

pub use error::{InvalidVersion, InvalidVersionRange};
pub use range::VersionRange;
pub use version::Version;
