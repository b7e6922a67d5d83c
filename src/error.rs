// SPDX-License-Identifier: MPL-2.0

//! The error taxonomy: parse failures, registration conflicts, and the
//! resolver's cycle/missing-dependency diagnostics.

use thiserror::Error;
use version_range::{InvalidVersion, InvalidVersionRange};

use crate::model::{BundleInfo, FragmentHost, ImportedPackage, RequiredBundle};

/// A manifest could not be parsed into a [`BundleInfo`](crate::model::BundleInfo).
///
/// This is the single parse-failure kind for the whole manifest grammar —
/// every rejected header (bad version, duplicate import, unknown directive
/// value, ...) reports through this one variant with a descriptive message,
/// rather than one enum arm per rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid bundle manifest: {message}")]
pub struct InvalidBundle {
    /// What was wrong with the manifest.
    pub message: String,
}

impl InvalidBundle {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        InvalidBundle {
            message: message.into(),
        }
    }
}

impl From<InvalidVersion> for InvalidBundle {
    fn from(e: InvalidVersion) -> Self {
        InvalidBundle::new(e.to_string())
    }
}

impl From<InvalidVersionRange> for InvalidBundle {
    fn from(e: InvalidVersionRange) -> Self {
        InvalidBundle::new(e.to_string())
    }
}

/// A precondition violation on [`BundleRegistry::add`](crate::registry::BundleRegistry::add).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A structurally identical bundle is already registered.
    #[error("bundle {symbolic_name} {version} is already registered")]
    AlreadyRegistered {
        /// The rejected bundle's symbolic name.
        symbolic_name: String,
        /// The rejected bundle's version, rendered.
        version: String,
    },
}

/// A cycle in the dependency graph. Raised out of
/// [`calculate_required_bundles`](crate::resolver::calculate_required_bundles)
/// and the `resolve_*` entry points — there is no meaningful partial
/// resolution for bundles caught in one.
///
/// `path` is closed: its first and last elements are the same bundle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dependency cycle: {}", render_cycle(path))]
pub struct DependencyCycle {
    /// The bundles forming the cycle, first == last.
    pub path: Vec<BundleInfo>,
}

fn render_cycle(path: &[BundleInfo]) -> String {
    path.iter()
        .map(|b| b.symbolic_name.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A single classified dependency outcome, as produced by the
/// [resolver](crate::resolver) for one wire.
///
/// These are *data*, not exceptions: they accumulate in the set returned by
/// `calculate_required_bundles`, and the caller inspects them. Only
/// [`DependencyCycle`] is raised as control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverOutcome {
    /// The dependency is satisfied by a candidate already marked resolved.
    Resolved(BundleInfo),
    /// The dependency is satisfied by a candidate not yet marked resolved.
    Unresolved(BundleInfo),
    /// A mandatory `Require-Bundle` had no satisfying candidate.
    MissingRequiredBundle {
        /// The bundle that declared the requirement.
        owner: BundleInfo,
        /// The unsatisfied requirement.
        requirement: RequiredBundle,
    },
    /// A mandatory `Import-Package` had no satisfying candidate.
    MissingImportedPackage {
        /// The bundle that declared the import.
        owner: BundleInfo,
        /// The unsatisfied import.
        requirement: ImportedPackage,
    },
    /// The `Fragment-Host` had no satisfying candidate.
    MissingFragmentHost {
        /// The fragment bundle.
        owner: BundleInfo,
        /// The unsatisfied fragment-host requirement.
        requirement: FragmentHost,
    },
}

impl ResolverOutcome {
    /// True for the three `Missing*` variants.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            ResolverOutcome::MissingRequiredBundle { .. }
                | ResolverOutcome::MissingImportedPackage { .. }
                | ResolverOutcome::MissingFragmentHost { .. }
        )
    }
}
