// SPDX-License-Identifier: MPL-2.0

//! The indexed bundle store: `add`, the three priority-ordered lookup
//! families, and the system-bundle seed.

use indexmap::{IndexMap, IndexSet};
use log::{info, trace, warn};

use crate::error::RegistryError;
use crate::model::{BundleInfo, FragmentHost, ImportedPackage, RequiredBundle};

/// The fixed symbolic name of the synthetic system bundle, always ID 0.
pub const SYSTEM_BUNDLE_SYMBOLIC_NAME: &str = "system.bundle";

/// A bundle's numeric identity inside one registry. Assigned once, in
/// insertion order, and never reused. Kept distinct from `BundleInfo`'s
/// structural identity — do not hash or compare bundles by ID.
pub type BundleId = usize;

/// A bundle's position in the resolve state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleState {
    /// Not yet known to satisfy all its mandatory dependencies.
    Unresolved,
    /// Every mandatory dependency was satisfied the last time it was resolved.
    Resolved,
}

struct Entry {
    bundle: BundleInfo,
    state: BundleState,
}

/// The in-memory, single-threaded bundle registry.
///
/// Owns three name-keyed indexes over its bundles — by symbolic name, by
/// exported package, and by fragment-host symbolic name — each an
/// [`IndexMap`] to an [`IndexSet`] of [`BundleId`]s so that insertion order
/// is preserved for priority tie-breaking (lower ID wins among otherwise
/// equal candidates).
///
/// Not `Sync`: per the concurrency model, one logical actor owns a registry
/// at a time. Wrap it in a mutex if multiple callers must share one.
pub struct BundleRegistry {
    entries: Vec<Entry>,
    by_symbolic_name: IndexMap<String, IndexSet<BundleId>>,
    by_exported_package: IndexMap<String, IndexSet<BundleId>>,
    by_fragment_host: IndexMap<String, IndexSet<BundleId>>,
}

impl BundleRegistry {
    /// Creates a registry and seeds its synthetic system bundle.
    ///
    /// `system_packages` and `system_packages_extra` are comma-separated
    /// package lists (the OSGi `system.packages` / `system.packages.extra`
    /// properties), read once, here, and never again — an existing
    /// registry is unaffected by later changes to whatever ambient
    /// configuration the caller's values came from.
    pub fn new(system_packages: &str, system_packages_extra: &str) -> Self {
        let mut registry = BundleRegistry {
            entries: Vec::new(),
            by_symbolic_name: IndexMap::new(),
            by_exported_package: IndexMap::new(),
            by_fragment_host: IndexMap::new(),
        };
        let system_bundle = seed_system_bundle(system_packages, system_packages_extra);
        registry.insert(system_bundle, BundleState::Resolved);
        registry
    }

    /// Registers `bundle`, assigning it the next [`BundleId`].
    ///
    /// Rejects a bundle that is structurally equal to one already present.
    pub fn add(&mut self, bundle: BundleInfo) -> Result<BundleId, RegistryError> {
        if self.entries.iter().any(|e| e.bundle == bundle) {
            warn!(
                "rejected duplicate registration of {} {}",
                bundle.symbolic_name, bundle.version
            );
            return Err(RegistryError::AlreadyRegistered {
                symbolic_name: bundle.symbolic_name,
                version: bundle.version.to_string(),
            });
        }
        Ok(self.insert(bundle, BundleState::Unresolved))
    }

    fn insert(&mut self, bundle: BundleInfo, state: BundleState) -> BundleId {
        let id = self.entries.len();
        trace!("registering bundle {} {} as id {id}", bundle.symbolic_name, bundle.version);

        self.by_symbolic_name
            .entry(bundle.symbolic_name.clone())
            .or_default()
            .insert(id);
        for export in &bundle.exported_packages {
            self.by_exported_package
                .entry(export.name.clone())
                .or_default()
                .insert(id);
        }
        if let Some(fragment_host) = &bundle.fragment_host {
            self.by_fragment_host
                .entry(fragment_host.symbolic_name.clone())
                .or_default()
                .insert(id);
        }

        self.entries.push(Entry { bundle, state });
        id
    }

    /// The bundle registered under `id`, if any.
    pub fn bundle(&self, id: BundleId) -> Option<&BundleInfo> {
        self.entries.get(id).map(|e| &e.bundle)
    }

    /// The resolve state of the bundle registered under `id`, if any.
    pub fn state(&self, id: BundleId) -> Option<BundleState> {
        self.entries.get(id).map(|e| e.state)
    }

    /// Every registered bundle, in insertion order.
    pub fn bundles(&self) -> impl Iterator<Item = &BundleInfo> {
        self.entries.iter().map(|e| &e.bundle)
    }

    /// Every registered `(id, bundle)` pair, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (BundleId, &BundleInfo)> {
        self.entries.iter().enumerate().map(|(id, e)| (id, &e.bundle))
    }

    /// The `BundleId` of a structurally-equal registered bundle, if any.
    pub fn id_of(&self, bundle: &BundleInfo) -> Option<BundleId> {
        self.entries.iter().position(|e| &e.bundle == bundle)
    }

    /// Marks the bundle registered under `id` as [`BundleState::Resolved`].
    ///
    /// No-op (but still valid) if `id` is out of range for a bundle that is
    /// not actually registered; callers are expected to have checked
    /// [`id_of`](Self::id_of) first.
    pub fn mark_resolved(&mut self, id: BundleId) {
        if let Some(entry) = self.entries.get_mut(id) {
            info!("bundle {} {} resolved", entry.bundle.symbolic_name, entry.bundle.version);
            entry.state = BundleState::Resolved;
        }
    }

    /// Bundles with symbolic name `name` whose version is in `range`,
    /// best candidate first per the priority order: resolved before
    /// unresolved, higher version before lower, lower ID before higher.
    pub fn find_bundles_by_name(&self, name: &str, range: &version_range::VersionRange) -> Vec<&BundleInfo> {
        let ids: Vec<BundleId> = self
            .candidate_ids(&self.by_symbolic_name, name)
            .into_iter()
            .filter(|&id| range.contains(&self.entries[id].bundle.version))
            .collect();
        self.rank_and_sort(ids)
    }

    /// Convenience over [`find_bundles_by_name`](Self::find_bundles_by_name)
    /// for a [`RequiredBundle`] requirement.
    pub fn find_bundles_for_requirement(&self, requirement: &RequiredBundle) -> Vec<&BundleInfo> {
        self.find_bundles_by_name(&requirement.symbolic_name, &requirement.version)
    }

    /// Convenience over [`find_bundles_by_name`](Self::find_bundles_by_name)
    /// for a [`FragmentHost`] requirement.
    pub fn find_bundles_for_host(&self, host: &FragmentHost) -> Vec<&BundleInfo> {
        self.find_bundles_by_name(&host.symbolic_name, &host.version)
    }

    /// Exporters of `import.name` satisfying every clause of §4.5's matching
    /// rule, best candidate first by the same priority order.
    pub fn find_bundles_for_import(&self, import: &ImportedPackage) -> Vec<&BundleInfo> {
        let ids: Vec<BundleId> = self
            .candidate_ids(&self.by_exported_package, &import.name)
            .into_iter()
            .filter(|&id| {
                let bundle = &self.entries[id].bundle;
                bundle
                    .exported_packages
                    .iter()
                    .filter(|export| export.name == import.name)
                    .any(|export| export_satisfies_import(export, bundle, import))
            })
            .collect();
        self.rank_and_sort(ids)
    }

    /// Registered fragments declaring `bundle` as host, best candidate first.
    pub fn find_fragments(&self, bundle: &BundleInfo) -> Vec<&BundleInfo> {
        let ids: Vec<BundleId> = self
            .candidate_ids(&self.by_fragment_host, &bundle.symbolic_name)
            .into_iter()
            .filter(|&id| {
                let host = self.entries[id]
                    .bundle
                    .fragment_host
                    .as_ref()
                    .expect("indexed under by_fragment_host");
                host.version.contains(&bundle.version)
            })
            .collect();
        self.rank_and_sort(ids)
    }

    /// The single best candidate for `name`/`range`, if any.
    pub fn find_bundle_by_name(&self, name: &str, range: &version_range::VersionRange) -> Option<&BundleInfo> {
        self.find_bundles_by_name(name, range).into_iter().next()
    }

    /// The single best candidate satisfying `import`, if any.
    pub fn find_bundle_for_import(&self, import: &ImportedPackage) -> Option<&BundleInfo> {
        self.find_bundles_for_import(import).into_iter().next()
    }

    fn candidate_ids(&self, index: &IndexMap<String, IndexSet<BundleId>>, key: &str) -> Vec<BundleId> {
        index.get(key).map(|set| set.iter().copied().collect()).unwrap_or_default()
    }

    /// Sorts `ids` best-candidate-first and resolves them to bundles.
    fn rank_and_sort(&self, mut ids: Vec<BundleId>) -> Vec<&BundleInfo> {
        ids.sort_by(|&a, &b| self.priority_key(b).cmp(&self.priority_key(a)));
        ids.into_iter().map(|id| &self.entries[id].bundle).collect()
    }

    /// (resolved-first, higher-version-first, lower-id-first) as a sortable
    /// key: larger key = higher priority.
    fn priority_key(&self, id: BundleId) -> PriorityKey {
        let entry = &self.entries[id];
        PriorityKey {
            resolved: entry.state == BundleState::Resolved,
            version: entry.bundle.version.clone(),
            id_rank: usize::MAX - id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct PriorityKey {
    resolved: bool,
    version: version_range::Version,
    id_rank: usize,
}

fn export_satisfies_import(
    export: &crate::model::ExportedPackage,
    owner: &BundleInfo,
    import: &ImportedPackage,
) -> bool {
    if !import.version.contains(&export.version) {
        return false;
    }
    if let Some(bsn) = &import.bundle_symbolic_name {
        if bsn != &owner.symbolic_name {
            return false;
        }
    }
    if !import.bundle_version.contains(&owner.version) {
        return false;
    }
    if !export
        .mandatory_attributes
        .iter()
        .all(|name| import.matching_attributes.contains_key(name))
    {
        return false;
    }
    import.matching_attributes.iter().all(|(k, v)| {
        export.matching_attributes.get(k) == Some(v)
    })
}

fn seed_system_bundle(system_packages: &str, system_packages_extra: &str) -> BundleInfo {
    let mut combined = system_packages.to_string();
    if !system_packages_extra.is_empty() {
        if !combined.is_empty() {
            combined.push(',');
        }
        combined.push_str(system_packages_extra);
    }

    let exported_packages = combined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(crate::model::ExportedPackage::new)
        .collect();

    BundleInfo {
        manifest_version: 2,
        symbolic_name: SYSTEM_BUNDLE_SYMBOLIC_NAME.to_string(),
        name: Some("System Bundle".to_string()),
        description: None,
        version: version_range::Version::default(),
        fragment_host: None,
        singleton: true,
        exported_packages,
        imported_packages: Vec::new(),
        required_bundles: Vec::new(),
        raw_headers: std::collections::BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExportedPackage;
    use version_range::{Version, VersionRange};

    fn bundle(name: &str, version: &str) -> BundleInfo {
        BundleInfo {
            manifest_version: 2,
            symbolic_name: name.to_string(),
            name: None,
            description: None,
            version: Version::parse(version).unwrap(),
            fragment_host: None,
            singleton: false,
            exported_packages: vec![ExportedPackage::new("p")],
            imported_packages: Vec::new(),
            required_bundles: Vec::new(),
            raw_headers: std::collections::BTreeMap::new(),
        }
    }

    #[test]
    fn seeds_system_bundle_as_id_zero() {
        let registry = BundleRegistry::new("javax.mail,javax.ssl", "");
        assert_eq!(registry.bundle(0).unwrap().symbolic_name, SYSTEM_BUNDLE_SYMBOLIC_NAME);
        assert_eq!(registry.bundle(0).unwrap().exported_packages.len(), 2);
    }

    #[test]
    fn add_assigns_increasing_ids_and_rejects_duplicates() {
        let mut registry = BundleRegistry::new("", "");
        let a = bundle("com.example.a", "1.0.0");
        let id = registry.add(a.clone()).unwrap();
        assert!(id > 0);
        assert_eq!(registry.add(a).unwrap_err(), RegistryError::AlreadyRegistered {
            symbolic_name: "com.example.a".to_string(),
            version: "1.0.0".to_string(),
        });
    }

    #[test]
    fn priority_orders_resolved_then_version_then_id() {
        let mut registry = BundleRegistry::new("", "");
        let a1 = registry.add(bundle("A", "1.0.0")).unwrap();
        let _a2 = registry.add(bundle("A", "2.0.0")).unwrap();
        let _b2 = registry.add(bundle("B", "2.0.0")).unwrap();

        registry.mark_resolved(a1);
        let candidates = registry.find_bundles_by_name("A", &VersionRange::default());
        assert_eq!(candidates[0].version, Version::new(2, 0, 0, ""));

        registry.mark_resolved(registry.id_of(&bundle("A", "1.0.0")).unwrap());
        let candidates = registry.find_bundles_by_name("A", &VersionRange::default());
        assert_eq!(candidates[0].version, Version::new(2, 0, 0, ""));
    }

    #[test]
    fn import_matching_respects_attributes() {
        let mut registry = BundleRegistry::new("", "");
        let mut c = bundle("C", "3.0.0");
        c.exported_packages = vec![{
            let mut e = ExportedPackage::new("t");
            e.matching_attributes.insert("attr1".to_string(), "value1".to_string());
            e.matching_attributes.insert("attr2".to_string(), "value2".to_string());
            e
        }];
        let mut d = bundle("D", "4.0.0");
        d.exported_packages = vec![{
            let mut e = ExportedPackage::new("t");
            e.matching_attributes.insert("attr3".to_string(), "value3".to_string());
            e.matching_attributes.insert("attr4".to_string(), "value4".to_string());
            e
        }];
        registry.add(c).unwrap();
        registry.add(d).unwrap();

        let mut import = ImportedPackage::new("t");
        import.matching_attributes.insert("attr1".to_string(), "value1".to_string());
        let found = registry.find_bundle_for_import(&import).unwrap();
        assert_eq!(found.symbolic_name, "C");

        let mut import2 = ImportedPackage::new("t");
        import2.matching_attributes.insert("attr3".to_string(), "value3".to_string());
        import2.matching_attributes.insert("attr4".to_string(), "value4".to_string());
        let found2 = registry.find_bundle_for_import(&import2).unwrap();
        assert_eq!(found2.symbolic_name, "D");

        let mut import3 = ImportedPackage::new("t");
        import3.matching_attributes.insert("attr1".to_string(), "wrong".to_string());
        assert!(registry.find_bundle_for_import(&import3).is_none());
    }
}
