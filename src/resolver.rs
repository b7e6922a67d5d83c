// SPDX-License-Identifier: MPL-2.0

//! The dependency engine: shallow wire construction, transitive traversal
//! with cycle detection, and the resolve state machine.
//!
//! `uses:=` constraints on exported packages are parsed (see
//! [`crate::model::ExportedPackage::uses`]) but never checked here — no
//! "uses" class-space consistency solving is implemented, matching the
//! upstream behavior this library was modeled on.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{DependencyCycle, ResolverOutcome};
use crate::model::{BundleInfo, FragmentHost, ImportedPackage, RequiredBundle};
use crate::registry::{BundleRegistry, BundleState};

/// One dependency of a bundle, paired at classification time with its
/// candidate list from the registry.
#[derive(Debug, Clone)]
enum Wire {
    Require(RequiredBundle),
    Import(ImportedPackage),
    Fragment(FragmentHost),
}

/// Builds the shallow set of wires for `bundle`: one per `Require-Bundle`,
/// one per `Import-Package`, and one for its optional `Fragment-Host`.
///
/// When `include_optional` is false, optional requirements and imports are
/// skipped entirely — they are never even attempted, let alone reported
/// missing.
fn build_wires(bundle: &BundleInfo, include_optional: bool) -> Vec<Wire> {
    let mut wires = Vec::new();
    for required in &bundle.required_bundles {
        if required.optional && !include_optional {
            continue;
        }
        wires.push(Wire::Require(required.clone()));
    }
    for imported in &bundle.imported_packages {
        if imported.optional && !include_optional {
            continue;
        }
        wires.push(Wire::Import(imported.clone()));
    }
    if let Some(fragment_host) = &bundle.fragment_host {
        wires.push(Wire::Fragment(fragment_host.clone()));
    }
    wires
}

/// The result of picking a candidate for one wire, before it is turned into
/// a [`ResolverOutcome`] (which needs the owner/requirement on the missing
/// path, and the registry's resolve state on the matched path).
enum Selection {
    /// No candidate at all.
    Empty,
    /// Every candidate was the owning bundle itself.
    SelfOnly,
    /// The highest-priority candidate that isn't the owner.
    Candidate(BundleInfo),
}

/// Picks the highest-priority candidate, skipping the owner itself — the
/// "a bundle may import what it exports" rule, generalized to all three
/// wire kinds since each needs it.
fn select(owner: &BundleInfo, candidates: Vec<&BundleInfo>) -> Selection {
    if candidates.is_empty() {
        return Selection::Empty;
    }
    match candidates.into_iter().find(|candidate| *candidate != owner) {
        Some(candidate) => Selection::Candidate(candidate.clone()),
        None => Selection::SelfOnly,
    }
}

fn outcome_for_candidate(registry: &BundleRegistry, candidate: BundleInfo) -> ResolverOutcome {
    let resolved = registry
        .id_of(&candidate)
        .and_then(|id| registry.state(id))
        .map(|state| state == BundleState::Resolved)
        .unwrap_or(false);
    if resolved {
        ResolverOutcome::Resolved(candidate)
    } else {
        ResolverOutcome::Unresolved(candidate)
    }
}

/// Classifies a single wire against the registry's current candidates and
/// state, per §4.6 of the dependency-engine design.
fn classify_wire(registry: &BundleRegistry, owner: &BundleInfo, wire: &Wire) -> Option<ResolverOutcome> {
    match wire {
        Wire::Require(requirement) => {
            match select(owner, registry.find_bundles_for_requirement(requirement)) {
                Selection::Empty if requirement.optional => None,
                Selection::Empty => Some(ResolverOutcome::MissingRequiredBundle {
                    owner: owner.clone(),
                    requirement: requirement.clone(),
                }),
                Selection::SelfOnly => None,
                Selection::Candidate(candidate) => Some(outcome_for_candidate(registry, candidate)),
            }
        }
        Wire::Import(import) => {
            match select(owner, registry.find_bundles_for_import(import)) {
                Selection::Empty if import.optional => None,
                Selection::Empty => Some(ResolverOutcome::MissingImportedPackage {
                    owner: owner.clone(),
                    requirement: import.clone(),
                }),
                Selection::SelfOnly => None,
                Selection::Candidate(candidate) => Some(outcome_for_candidate(registry, candidate)),
            }
        }
        Wire::Fragment(host) => match select(owner, registry.find_bundles_for_host(host)) {
            Selection::Empty => Some(ResolverOutcome::MissingFragmentHost {
                owner: owner.clone(),
                requirement: host.clone(),
            }),
            Selection::SelfOnly => None,
            Selection::Candidate(candidate) => Some(outcome_for_candidate(registry, candidate)),
        },
    }
}

/// The bundle a `Resolved`/`Unresolved` outcome carries, if any — the only
/// two variants that recurse further; the three `Missing*` variants
/// terminate their branch.
fn outcome_dependency(outcome: &ResolverOutcome) -> Option<&BundleInfo> {
    match outcome {
        ResolverOutcome::Resolved(b) | ResolverOutcome::Unresolved(b) => Some(b),
        _ => None,
    }
}

fn push_dedup(results: &mut Vec<ResolverOutcome>, outcome: ResolverOutcome) {
    if !results.contains(&outcome) {
        results.push(outcome);
    }
}

struct Frame {
    bundle: BundleInfo,
    wires: Vec<Wire>,
    next_wire: usize,
    results: Vec<ResolverOutcome>,
}

impl Frame {
    fn new(bundle: BundleInfo, wires: Vec<Wire>) -> Self {
        Frame {
            bundle,
            wires,
            next_wire: 0,
            results: Vec::new(),
        }
    }
}

/// Every transitively reachable dependency of `root`, plus every
/// missing-dependency diagnostic encountered along the way, deduplicated by
/// structural equality.
///
/// Raises [`DependencyCycle`] if `root`'s dependency graph loops back on
/// itself. Traversal is iterative (an explicit frame stack standing in for
/// the call stack) so a deep or adversarial bundle graph cannot overflow
/// the host stack; the result is identical to the straightforward recursive
/// description in the dependency-engine design.
pub fn calculate_required_bundles(
    registry: &BundleRegistry,
    root: &BundleInfo,
    include_optional: bool,
) -> Result<Vec<ResolverOutcome>, DependencyCycle> {
    let mut cache: FxHashMap<BundleInfo, Vec<ResolverOutcome>> = FxHashMap::default();

    let mut path_set: FxHashSet<BundleInfo> = FxHashSet::default();
    path_set.insert(root.clone());
    let mut stack = vec![Frame::new(root.clone(), build_wires(root, include_optional))];

    loop {
        let frame = stack.last_mut().expect("stack is never empty inside the loop");
        if frame.next_wire >= frame.wires.len() {
            let finished = stack.pop().unwrap();
            path_set.remove(&finished.bundle);
            cache.insert(finished.bundle.clone(), finished.results.clone());
            match stack.last_mut() {
                Some(parent) => {
                    for outcome in finished.results {
                        push_dedup(&mut parent.results, outcome);
                    }
                }
                None => return Ok(finished.results),
            }
            continue;
        }

        let owner = frame.bundle.clone();
        let wire = frame.wires[frame.next_wire].clone();
        frame.next_wire += 1;

        let Some(outcome) = classify_wire(registry, &owner, &wire) else {
            continue;
        };
        let dependency = outcome_dependency(&outcome).cloned();
        push_dedup(&mut stack.last_mut().unwrap().results, outcome);

        let Some(dependency) = dependency else {
            continue;
        };

        if path_set.contains(&dependency) {
            let path: Vec<BundleInfo> = stack.iter().map(|f| f.bundle.clone()).collect();
            let start = path
                .iter()
                .position(|b| *b == dependency)
                .expect("dependency is known to be on the path");
            let mut cycle = path[start..].to_vec();
            cycle.push(dependency);
            return Err(DependencyCycle { path: cycle });
        }

        if let Some(cached) = cache.get(&dependency) {
            for outcome in cached.clone() {
                push_dedup(&mut stack.last_mut().unwrap().results, outcome);
            }
        } else {
            let wires = build_wires(&dependency, include_optional);
            path_set.insert(dependency.clone());
            stack.push(Frame::new(dependency, wires));
        }
    }
}

/// Resolves one bundle against the registry's current contents.
///
/// Idempotent: a bundle already recorded as resolved returns immediately
/// with no errors. Otherwise computes
/// [`calculate_required_bundles`] with `include_optional = false` and, if
/// no mandatory dependency came back missing, transitions the bundle (if it
/// is registered) to [`BundleState::Resolved`]. Returns the set of missing-
/// dependency diagnostics encountered, which is empty on success.
pub fn resolve_bundle(
    registry: &mut BundleRegistry,
    bundle: &BundleInfo,
) -> Result<Vec<ResolverOutcome>, DependencyCycle> {
    if let Some(id) = registry.id_of(bundle) {
        if registry.state(id) == Some(BundleState::Resolved) {
            return Ok(Vec::new());
        }
    }

    let outcomes = calculate_required_bundles(registry, bundle, false)?;
    let errors: Vec<ResolverOutcome> = outcomes.into_iter().filter(ResolverOutcome::is_missing).collect();

    if errors.is_empty() {
        if let Some(id) = registry.id_of(bundle) {
            registry.mark_resolved(id);
        }
    }
    Ok(errors)
}

/// Resolves every registered bundle, in insertion order, folding their
/// error sets together.
///
/// Monotonic: repeated calls can only turn unresolved bundles resolved,
/// never the reverse, so recovery after adding a missing dependency just
/// works by calling this again.
pub fn resolve_bundles(registry: &mut BundleRegistry) -> Result<Vec<ResolverOutcome>, DependencyCycle> {
    let bundles: Vec<BundleInfo> = registry.bundles().cloned().collect();
    let mut errors = Vec::new();
    for bundle in bundles {
        errors.extend(resolve_bundle(registry, &bundle)?);
    }
    Ok(errors)
}

/// Whether `bundle` is currently recorded as resolved.
pub fn is_resolved(registry: &BundleRegistry, bundle: &BundleInfo) -> bool {
    registry
        .id_of(bundle)
        .and_then(|id| registry.state(id))
        .map(|state| state == BundleState::Resolved)
        .unwrap_or(false)
}
