// SPDX-License-Identifier: MPL-2.0

//! Plain data types produced by the manifest [parser](crate::parser) and
//! consumed by the [registry](crate::registry).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};

use version_range::{Version, VersionRange};

/// A package a bundle declares it needs at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportedPackage {
    /// The package name.
    pub name: String,
    /// If true, a missing provider is not a resolve error.
    pub optional: bool,
    /// Acceptable exporter version range.
    pub version: VersionRange,
    /// Restrict matches to exports from this bundle.
    pub bundle_symbolic_name: Option<String>,
    /// Acceptable exporting-bundle version range.
    pub bundle_version: VersionRange,
    /// Arbitrary `name=value` parameters the export must also carry.
    pub matching_attributes: BTreeMap<String, String>,
}

impl ImportedPackage {
    /// A mandatory import of `name` with no further constraints.
    pub fn new(name: impl Into<String>) -> Self {
        ImportedPackage {
            name: name.into(),
            optional: false,
            version: VersionRange::default(),
            bundle_symbolic_name: None,
            bundle_version: VersionRange::default(),
            matching_attributes: BTreeMap::new(),
        }
    }
}

impl Display for ImportedPackage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.optional {
            write!(f, ";resolution:=optional")?;
        }
        if self.version != VersionRange::default() {
            write!(f, ";version=\"{}\"", self.version)?;
        }
        if let Some(bsn) = &self.bundle_symbolic_name {
            write!(f, ";bundle-symbolic-name={bsn}")?;
        }
        if self.bundle_version != VersionRange::default() {
            write!(f, ";bundle-version=\"{}\"", self.bundle_version)?;
        }
        for (k, v) in &self.matching_attributes {
            write!(f, ";{k}=\"{v}\"")?;
        }
        Ok(())
    }
}

/// A package a bundle declares it provides to others.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportedPackage {
    /// The package name.
    pub name: String,
    /// The concrete version being exported.
    pub version: Version,
    /// Packages this export's implementation depends on. Parsed, not
    /// enforced — see [`crate::resolver`] module docs.
    pub uses: BTreeSet<String>,
    /// Attribute names an importer must also specify (with any value, unless
    /// also named in `matching_attributes`).
    pub mandatory_attributes: BTreeSet<String>,
    /// If non-empty, only these classes are considered exported.
    pub included_classes: BTreeSet<String>,
    /// Classes excluded from the export even if otherwise included.
    pub excluded_classes: BTreeSet<String>,
    /// Arbitrary `name=value` parameters an importer can filter on.
    pub matching_attributes: BTreeMap<String, String>,
}

impl ExportedPackage {
    /// An export of `name` at the default version with no other constraints.
    pub fn new(name: impl Into<String>) -> Self {
        ExportedPackage {
            name: name.into(),
            version: Version::default(),
            uses: BTreeSet::new(),
            mandatory_attributes: BTreeSet::new(),
            included_classes: BTreeSet::new(),
            excluded_classes: BTreeSet::new(),
            matching_attributes: BTreeMap::new(),
        }
    }
}

impl Display for ExportedPackage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.version != Version::default() {
            write!(f, ";version=\"{}\"", self.version)?;
        }
        if !self.uses.is_empty() {
            write!(f, ";uses:=\"{}\"", join(&self.uses))?;
        }
        if !self.mandatory_attributes.is_empty() {
            write!(f, ";mandatory:={}", join(&self.mandatory_attributes))?;
        }
        if !self.included_classes.is_empty() {
            write!(f, ";include:={}", join(&self.included_classes))?;
        }
        if !self.excluded_classes.is_empty() {
            write!(f, ";exclude:={}", join(&self.excluded_classes))?;
        }
        for (k, v) in &self.matching_attributes {
            write!(f, ";{k}=\"{v}\"")?;
        }
        Ok(())
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(",")
}

/// A direct dependency on another bundle by symbolic name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequiredBundle {
    /// Symbolic name of the required bundle.
    pub symbolic_name: String,
    /// If true, a missing provider is not a resolve error.
    pub optional: bool,
    /// Acceptable version range.
    pub version: VersionRange,
    /// Whether the required bundle's exports are re-exported transitively.
    pub reexport: bool,
}

impl RequiredBundle {
    /// A mandatory requirement on `symbolic_name` with no version constraint.
    pub fn new(symbolic_name: impl Into<String>) -> Self {
        RequiredBundle {
            symbolic_name: symbolic_name.into(),
            optional: false,
            version: VersionRange::default(),
            reexport: false,
        }
    }
}

impl Display for RequiredBundle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbolic_name)?;
        if self.version != VersionRange::default() {
            write!(f, ";version=\"{}\"", self.version)?;
        }
        if self.optional {
            write!(f, ";resolution:=optional")?;
        }
        if self.reexport {
            write!(f, ";visibility:=reexport")?;
        }
        Ok(())
    }
}

/// The `extension` directive of a `Fragment-Host` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentExtension {
    /// No `extension` directive.
    None,
    /// `extension:=framework`.
    Framework,
    /// `extension:=bootclasspath`.
    BootClassPath,
}

/// A fragment's attachment point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FragmentHost {
    /// Symbolic name of the host bundle.
    pub symbolic_name: String,
    /// Acceptable host version range.
    pub version: VersionRange,
    /// Extension kind, if any.
    pub extension: FragmentExtension,
}

impl FragmentHost {
    /// Attaches to `symbolic_name` with no version constraint and no extension.
    pub fn new(symbolic_name: impl Into<String>) -> Self {
        FragmentHost {
            symbolic_name: symbolic_name.into(),
            version: VersionRange::default(),
            extension: FragmentExtension::None,
        }
    }
}

impl Display for FragmentHost {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbolic_name)?;
        if self.version != VersionRange::default() {
            write!(f, ";version=\"{}\"", self.version)?;
        }
        match self.extension {
            FragmentExtension::None => {}
            FragmentExtension::Framework => write!(f, ";extension:=framework")?,
            FragmentExtension::BootClassPath => write!(f, ";extension:=bootclasspath")?,
        }
        Ok(())
    }
}

/// The parsed contents of one bundle manifest.
///
/// Two `BundleInfo` values are equal iff every field is equal — including
/// `raw_headers` — which is the structural-equality notion the registry
/// uses to reject duplicate [`add`](crate::registry::BundleRegistry::add)
/// calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleInfo {
    /// `Bundle-ManifestVersion`; 1 if the header was absent.
    pub manifest_version: u8,
    /// `Bundle-SymbolicName`; never empty.
    pub symbolic_name: String,
    /// `Bundle-Name`, if present.
    pub name: Option<String>,
    /// `Bundle-Description`, if present.
    pub description: Option<String>,
    /// `Bundle-Version`; `Version::default()` if absent.
    pub version: Version,
    /// `Fragment-Host`, if this bundle is a fragment.
    pub fragment_host: Option<FragmentHost>,
    /// Whether `Bundle-SymbolicName` carried `singleton:=true`.
    pub singleton: bool,
    /// `Export-Package` entries, one per exported package name.
    pub exported_packages: Vec<ExportedPackage>,
    /// `Import-Package` entries, one per imported package name.
    pub imported_packages: Vec<ImportedPackage>,
    /// `Require-Bundle` entries, one per required bundle.
    pub required_bundles: Vec<RequiredBundle>,
    /// Every header as originally supplied, for pass-through lookups.
    pub raw_headers: BTreeMap<String, String>,
}

impl BundleInfo {
    /// Looks up a header by name, recognized or not.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.raw_headers.get(name).map(String::as_str)
    }

    /// True if this bundle declares a `Fragment-Host`.
    pub fn is_fragment(&self) -> bool {
        self.fragment_host.is_some()
    }
}
