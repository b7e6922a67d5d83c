// SPDX-License-Identifier: MPL-2.0

use osgi_registry::{parse_manifest, HeaderMap};

fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn parses_a_realistic_manifest() {
    let headers = headers(&[
        ("Bundle-ManifestVersion", "2"),
        ("Bundle-SymbolicName", "com.example.mailer; singleton:=true"),
        ("Bundle-Name", "Example Mailer"),
        ("Bundle-Version", "1.4.2"),
        (
            "Export-Package",
            "com.example.mailer.api;version=\"1.4\";uses:=\"javax.mail\"",
        ),
        (
            "Import-Package",
            "javax.mail;version=\"[1.4,2.0)\",javax.mail.internet;resolution:=optional",
        ),
        (
            "Require-Bundle",
            "com.example.core;bundle-version=\"[1.0,2.0)\";visibility:=reexport",
        ),
    ]);

    let bundle = parse_manifest(&headers).unwrap();
    assert_eq!(bundle.symbolic_name, "com.example.mailer");
    assert!(bundle.singleton);
    assert_eq!(bundle.name.as_deref(), Some("Example Mailer"));
    assert_eq!(bundle.exported_packages.len(), 1);
    assert_eq!(bundle.exported_packages[0].uses.len(), 1);
    assert_eq!(bundle.imported_packages.len(), 2);
    assert!(bundle.imported_packages[1].optional);
    assert_eq!(bundle.required_bundles.len(), 1);
    assert!(bundle.required_bundles[0].reexport);
    assert_eq!(bundle.header("Bundle-Name"), Some("Example Mailer"));
}

#[test]
fn missing_symbolic_name_is_rejected() {
    let headers = headers(&[("Bundle-Version", "1.0.0")]);
    assert!(parse_manifest(&headers).is_err());
}

#[test]
fn absent_manifest_version_defaults_to_one() {
    let headers = headers(&[("Bundle-SymbolicName", "com.example.a")]);
    let bundle = parse_manifest(&headers).unwrap();
    assert_eq!(bundle.manifest_version, 1);
    assert_eq!(bundle.version, osgi_registry::Version::default());
}

#[test]
fn version_and_specification_version_must_agree() {
    let headers = headers(&[
        ("Bundle-SymbolicName", "com.example.a"),
        (
            "Export-Package",
            "com.example.a.api;version=1.0;specification-version=2.0",
        ),
    ]);
    assert!(parse_manifest(&headers).is_err());
}

#[test]
fn unrecognized_headers_pass_through() {
    let headers = headers(&[
        ("Bundle-SymbolicName", "com.example.a"),
        ("X-Vendor-Build", "42"),
    ]);
    let bundle = parse_manifest(&headers).unwrap();
    assert_eq!(bundle.header("X-Vendor-Build"), Some("42"));
}
