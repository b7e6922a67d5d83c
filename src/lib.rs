// SPDX-License-Identifier: MPL-2.0

//! Parsing for OSGi bundle manifests, and an in-memory registry that tracks
//! bundles and resolves their dependencies against one another.
//!
//! # Basic example
//!
//! ```
//! use osgi_registry::{parse_manifest, BundleRegistry, HeaderMap};
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("Bundle-SymbolicName".to_string(), "com.example.app".to_string());
//! headers.insert("Bundle-Version".to_string(), "1.0.0".to_string());
//! headers.insert("Import-Package".to_string(), "org.osgi.framework".to_string());
//!
//! let bundle = parse_manifest(&headers).unwrap();
//!
//! let mut registry = BundleRegistry::new("org.osgi.framework", "");
//! registry.add(bundle.clone()).unwrap();
//!
//! let errors = osgi_registry::resolve_bundles(&mut registry).unwrap();
//! assert!(errors.is_empty());
//! assert!(osgi_registry::is_resolved(&registry, &bundle));
//! ```
//!
//! # Modules
//!
//! - [`model`] — the plain data types a parsed manifest is made of.
//! - [`scanner`] — quote-aware splitting of raw header values.
//! - [`parser`] — turns raw headers into a [`model::BundleInfo`].
//! - [`registry`] — the indexed, in-memory bundle store.
//! - [`resolver`] — the dependency engine: wires, traversal, and the resolve
//!   state machine.
//! - [`error`] — the error and diagnostic taxonomy shared by the above.

#![warn(missing_docs)]

pub mod error;
pub mod model;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod scanner;

pub use error::{DependencyCycle, InvalidBundle, RegistryError, ResolverOutcome};
pub use model::{
    BundleInfo, ExportedPackage, FragmentExtension, FragmentHost, ImportedPackage, RequiredBundle,
};
pub use parser::{parse_manifest, HeaderMap};
pub use registry::{BundleId, BundleRegistry, BundleState, SYSTEM_BUNDLE_SYMBOLIC_NAME};
pub use resolver::{calculate_required_bundles, is_resolved, resolve_bundle, resolve_bundles};

pub use version_range::{InvalidVersion, InvalidVersionRange, Version, VersionRange};
