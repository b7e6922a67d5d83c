// SPDX-License-Identifier: MPL-2.0

//! Turns a manifest's raw headers into a [`BundleInfo`](crate::model::BundleInfo).
//!
//! The grammar is small enough to scan directly with [`crate::scanner`];
//! there is no need for a general parser-combinator framework here.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use indexmap::IndexMap;
use version_range::{Version, VersionRange};

use crate::error::InvalidBundle;
use crate::model::{
    BundleInfo, ExportedPackage, FragmentExtension, FragmentHost, ImportedPackage, RequiredBundle,
};
use crate::scanner::{self, Token};

const HEADER_MANIFEST_VERSION: &str = "Bundle-ManifestVersion";
const HEADER_SYMBOLIC_NAME: &str = "Bundle-SymbolicName";
const HEADER_VERSION: &str = "Bundle-Version";
const HEADER_NAME: &str = "Bundle-Name";
const HEADER_DESCRIPTION: &str = "Bundle-Description";
const HEADER_FRAGMENT_HOST: &str = "Fragment-Host";
const HEADER_IMPORT_PACKAGE: &str = "Import-Package";
const HEADER_EXPORT_PACKAGE: &str = "Export-Package";
const HEADER_REQUIRE_BUNDLE: &str = "Require-Bundle";

/// The raw header map a caller supplies: header name to raw value string.
pub type HeaderMap = IndexMap<String, String>;

/// Parses a manifest's headers into a [`BundleInfo`].
///
/// Headers not in the recognized set pass through unchanged and remain
/// retrievable via [`BundleInfo::header`].
pub fn parse_manifest(headers: &HeaderMap) -> Result<BundleInfo, InvalidBundle> {
    let manifest_version = parse_manifest_version(headers)?;
    let (symbolic_name, singleton) = parse_symbolic_name(headers)?;
    let version = match headers.get(HEADER_VERSION) {
        Some(v) => Version::parse(v)?,
        None => Version::default(),
    };
    let name = headers.get(HEADER_NAME).cloned();
    let description = headers.get(HEADER_DESCRIPTION).cloned();
    let fragment_host = parse_fragment_host(headers.get(HEADER_FRAGMENT_HOST).map(String::as_str))?;
    let exported_packages =
        parse_export_package(headers.get(HEADER_EXPORT_PACKAGE).map(String::as_str))?;
    let imported_packages =
        parse_import_package(headers.get(HEADER_IMPORT_PACKAGE).map(String::as_str))?;
    let required_bundles =
        parse_require_bundle(headers.get(HEADER_REQUIRE_BUNDLE).map(String::as_str))?;

    let raw_headers: BTreeMap<String, String> = headers
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(BundleInfo {
        manifest_version,
        symbolic_name,
        name,
        description,
        version,
        fragment_host,
        singleton,
        exported_packages,
        imported_packages,
        required_bundles,
        raw_headers,
    })
}

fn parse_manifest_version(headers: &HeaderMap) -> Result<u8, InvalidBundle> {
    match headers.get(HEADER_MANIFEST_VERSION) {
        None => Ok(1),
        Some(v) => {
            let trimmed = scanner::trim_right_if(
                scanner::trim_left_if(v, char::is_whitespace),
                char::is_whitespace,
            );
            trimmed
                .parse::<u8>()
                .map_err(|_| InvalidBundle::new(format!("Bundle-ManifestVersion '{v}' is not an integer")))
        }
    }
}

/// Case-insensitive whole-value match against a known directive/parameter
/// keyword (`optional`, `reexport`, `framework`, ...), built from the
/// scanner's exposed primitives rather than `str::eq_ignore_ascii_case`.
fn directive_value_is(value: &str, keyword: &str) -> bool {
    value.len() == keyword.len()
        && scanner::starts_with_ignore_case(value, 0, keyword)
        && scanner::ends_with_ignore_case(value, keyword)
}

fn parse_symbolic_name(headers: &HeaderMap) -> Result<(String, bool), InvalidBundle> {
    let value = headers
        .get(HEADER_SYMBOLIC_NAME)
        .ok_or_else(|| InvalidBundle::new("Bundle-SymbolicName is mandatory"))?;
    let clauses = scanner::split_clauses(value);
    let first_clause = clauses
        .first()
        .ok_or_else(|| InvalidBundle::new("Bundle-SymbolicName is empty"))?;
    let tokens = scanner::split_tokens(first_clause);

    let mut name = None;
    let mut singleton = false;
    for token in &tokens {
        match scanner::lex_token(token) {
            Token::Name(n) => {
                if name.is_some() {
                    return Err(InvalidBundle::new(
                        "Bundle-SymbolicName clause has more than one name",
                    ));
                }
                name = Some(n);
            }
            Token::Directive(d, v) if d.eq_ignore_ascii_case("singleton") => {
                singleton = v.eq_ignore_ascii_case("true");
            }
            _ => {}
        }
    }

    let name = name.unwrap_or_default();
    if name.is_empty() {
        return Err(InvalidBundle::new("Bundle-SymbolicName must not be empty"));
    }
    Ok((name, singleton))
}

fn parse_fragment_host(value: Option<&str>) -> Result<Option<FragmentHost>, InvalidBundle> {
    let Some(value) = value else {
        return Ok(None);
    };
    let clauses = scanner::split_clauses(value);
    if clauses.len() != 1 {
        return Err(InvalidBundle::new(
            "Fragment-Host must contain exactly one clause",
        ));
    }
    let tokens = scanner::split_tokens(&clauses[0]);

    let mut symbolic_name = None;
    let mut version = VersionRange::default();
    let mut extension = FragmentExtension::None;

    for token in &tokens {
        match scanner::lex_token(token) {
            Token::Name(n) => {
                if symbolic_name.is_some() {
                    return Err(InvalidBundle::new(
                        "Fragment-Host clause has more than one name",
                    ));
                }
                symbolic_name = Some(n);
            }
            Token::Directive(d, v) if d.eq_ignore_ascii_case("extension") => {
                extension = if directive_value_is(&v, "framework") {
                    FragmentExtension::Framework
                } else if directive_value_is(&v, "bootclasspath") {
                    FragmentExtension::BootClassPath
                } else {
                    return Err(InvalidBundle::new(format!(
                        "unknown Fragment-Host extension '{v}'"
                    )));
                };
            }
            Token::Parameter(p, v) if p.eq_ignore_ascii_case("bundle-version") => {
                version = VersionRange::parse(&v)?;
            }
            _ => {}
        }
    }

    let symbolic_name = symbolic_name
        .ok_or_else(|| InvalidBundle::new("Fragment-Host clause has no symbolic name"))?;
    Ok(Some(FragmentHost {
        symbolic_name,
        version,
        extension,
    }))
}

/// Shared state accumulated while scanning one clause's directive/parameter
/// tokens, before it is fanned out across that clause's package names.
struct SharedAttrs {
    version: Option<VersionRange>,
    specification_version: Option<VersionRange>,
    matching_attributes: BTreeMap<String, String>,
}

impl SharedAttrs {
    fn empty() -> Self {
        SharedAttrs {
            version: None,
            specification_version: None,
            matching_attributes: BTreeMap::new(),
        }
    }

    fn resolved_version(&self) -> Result<VersionRange, InvalidBundle> {
        match (&self.version, &self.specification_version) {
            (Some(a), Some(b)) if a != b => Err(InvalidBundle::new(
                "version and specification-version disagree",
            )),
            (Some(a), _) => Ok(a.clone()),
            (None, Some(b)) => Ok(b.clone()),
            (None, None) => Ok(VersionRange::default()),
        }
    }
}

fn parse_import_package(value: Option<&str>) -> Result<Vec<ImportedPackage>, InvalidBundle> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let mut result = Vec::new();
    let mut seen = HashSet::new();

    for clause in scanner::split_clauses(value) {
        let tokens = scanner::split_tokens(&clause);
        let mut names = Vec::new();
        let mut optional = false;
        let mut bundle_symbolic_name = None;
        let mut bundle_version = VersionRange::default();
        let mut shared = SharedAttrs::empty();

        for token in &tokens {
            match scanner::lex_token(token) {
                Token::Name(n) => names.push(n),
                Token::Directive(d, v) if d.eq_ignore_ascii_case("resolution") => {
                    optional = if directive_value_is(&v, "optional") {
                        true
                    } else if directive_value_is(&v, "mandatory") {
                        false
                    } else {
                        return Err(InvalidBundle::new(format!(
                            "unknown Import-Package resolution '{v}'"
                        )));
                    };
                }
                Token::Parameter(p, v) if p.eq_ignore_ascii_case("version") => {
                    shared.version = Some(VersionRange::parse(&v)?);
                }
                Token::Parameter(p, v) if p.eq_ignore_ascii_case("specification-version") => {
                    shared.specification_version = Some(VersionRange::parse(&v)?);
                }
                Token::Parameter(p, v) if p.eq_ignore_ascii_case("bundle-symbolic-name") => {
                    bundle_symbolic_name = Some(v);
                }
                Token::Parameter(p, v) if p.eq_ignore_ascii_case("bundle-version") => {
                    bundle_version = VersionRange::parse(&v)?;
                }
                Token::Parameter(p, v) => {
                    shared.matching_attributes.insert(p, v);
                }
                Token::Directive(..) => {}
            }
        }

        let version = shared.resolved_version()?;
        if names.is_empty() {
            return Err(InvalidBundle::new("Import-Package clause has no package name"));
        }
        for name in names {
            if !seen.insert(name.clone()) {
                return Err(InvalidBundle::new(format!("duplicate import of '{name}'")));
            }
            result.push(ImportedPackage {
                name,
                optional,
                version: version.clone(),
                bundle_symbolic_name: bundle_symbolic_name.clone(),
                bundle_version: bundle_version.clone(),
                matching_attributes: shared.matching_attributes.clone(),
            });
        }
    }
    Ok(result)
}

fn parse_export_package(value: Option<&str>) -> Result<Vec<ExportedPackage>, InvalidBundle> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let mut result = Vec::new();

    for clause in scanner::split_clauses(value) {
        let tokens = scanner::split_tokens(&clause);
        let mut names = Vec::new();
        let mut uses = BTreeSet::new();
        let mut mandatory_attributes = BTreeSet::new();
        let mut included_classes = BTreeSet::new();
        let mut excluded_classes = BTreeSet::new();
        let mut shared = SharedAttrs::empty();

        for token in &tokens {
            match scanner::lex_token(token) {
                Token::Name(n) => names.push(n),
                Token::Directive(d, v) if d.eq_ignore_ascii_case("uses") => {
                    uses.extend(scanner::split_list(&v));
                }
                Token::Directive(d, v) if d.eq_ignore_ascii_case("mandatory") => {
                    mandatory_attributes.extend(scanner::split_list(&v));
                }
                Token::Directive(d, v) if d.eq_ignore_ascii_case("include") => {
                    included_classes.extend(scanner::split_list(&v));
                }
                Token::Directive(d, v) if d.eq_ignore_ascii_case("exclude") => {
                    excluded_classes.extend(scanner::split_list(&v));
                }
                Token::Parameter(p, v) if p.eq_ignore_ascii_case("version") => {
                    shared.version = Some(VersionRange::parse(&v)?);
                }
                Token::Parameter(p, v) if p.eq_ignore_ascii_case("specification-version") => {
                    shared.specification_version = Some(VersionRange::parse(&v)?);
                }
                Token::Parameter(p, v) => {
                    shared.matching_attributes.insert(p, v);
                }
                Token::Directive(..) => {}
            }
        }

        // Export-Package version is a single concrete version, unlike the
        // range an importer specifies; reuse the shared-attrs plumbing and
        // take its floor.
        let version = shared.resolved_version()?.floor().clone();

        if names.is_empty() {
            return Err(InvalidBundle::new("Export-Package clause has no package name"));
        }
        for name in names {
            result.push(ExportedPackage {
                name,
                version: version.clone(),
                uses: uses.clone(),
                mandatory_attributes: mandatory_attributes.clone(),
                included_classes: included_classes.clone(),
                excluded_classes: excluded_classes.clone(),
                matching_attributes: shared.matching_attributes.clone(),
            });
        }
    }
    Ok(result)
}

fn parse_require_bundle(value: Option<&str>) -> Result<Vec<RequiredBundle>, InvalidBundle> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let mut result = Vec::new();

    for clause in scanner::split_clauses(value) {
        let tokens = scanner::split_tokens(&clause);
        let mut symbolic_name = None;
        let mut optional = false;
        let mut reexport = false;
        let mut version = VersionRange::default();

        for token in &tokens {
            match scanner::lex_token(token) {
                Token::Name(n) => {
                    if symbolic_name.is_some() {
                        return Err(InvalidBundle::new(
                            "Require-Bundle clause has more than one name",
                        ));
                    }
                    symbolic_name = Some(n);
                }
                Token::Directive(d, v) if d.eq_ignore_ascii_case("visibility") => {
                    reexport = if directive_value_is(&v, "reexport") {
                        true
                    } else if directive_value_is(&v, "private") {
                        false
                    } else {
                        return Err(InvalidBundle::new(format!(
                            "unknown Require-Bundle visibility '{v}'"
                        )));
                    };
                }
                Token::Directive(d, v) if d.eq_ignore_ascii_case("resolution") => {
                    optional = if directive_value_is(&v, "optional") {
                        true
                    } else if directive_value_is(&v, "mandatory") {
                        false
                    } else {
                        return Err(InvalidBundle::new(format!(
                            "unknown Require-Bundle resolution '{v}'"
                        )));
                    };
                }
                Token::Parameter(p, v) if p.eq_ignore_ascii_case("bundle-version") => {
                    version = VersionRange::parse(&v)?;
                }
                _ => {}
            }
        }

        let symbolic_name = symbolic_name
            .ok_or_else(|| InvalidBundle::new("Require-Bundle clause has no symbolic name"))?;
        result.push(RequiredBundle {
            symbolic_name,
            optional,
            version,
            reexport,
        });
    }
    Ok(result)
}
