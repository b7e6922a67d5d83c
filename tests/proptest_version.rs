// SPDX-License-Identifier: MPL-2.0

use osgi_registry::{Version, VersionRange};
use proptest::prelude::*;

fn arb_version() -> impl Strategy<Value = Version> {
    (0u32..50, 0u32..50, 0u32..50).prop_map(|(major, minor, micro)| Version::new(major, minor, micro, ""))
}

proptest! {
    #[test]
    fn canonical_display_round_trips(v in arb_version()) {
        let rendered = v.to_string();
        prop_assert_eq!(Version::parse(&rendered).unwrap(), v);
    }

    #[test]
    fn at_least_range_contains_every_version_from_its_floor_upward(
        floor in arb_version(),
        candidate in arb_version(),
    ) {
        let range = VersionRange::at_least(floor.clone());
        prop_assert_eq!(range.contains(&candidate), candidate >= floor);
    }

    #[test]
    fn infinite_is_never_contained_in_a_default_range(v in arb_version()) {
        let range = VersionRange::default();
        prop_assert!(range.contains(&v));
        prop_assert!(!range.contains(&Version::infinite()));
    }

    #[test]
    fn ordering_is_transitive_across_three_versions(
        a in arb_version(), b in arb_version(), c in arb_version(),
    ) {
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
    }
}
