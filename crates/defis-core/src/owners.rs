//! Registrant name → pharmaceutical group.
//!
//! The catalogue lists marketing-authorisation holders with their legal
//! entity and country suffix (`" PFIZER (GRANDE BRETAGNE)"`). Known variants
//! collapse to the group name; anything else is returned unchanged. Keys keep
//! the leading space the source writes, and no group name is itself a key, so
//! the mapping is idempotent.

const OWNER_GROUPS: &[(&str, &str)] = &[
    (" ABBVIE", "ABBVIE"),
    (" ABBVIE DEUTSCHLAND (ALLEMAGNE)", "ABBVIE"),
    (" ASTRAZENECA", "ASTRAZENECA"),
    (" ASTRAZENECA AB", "ASTRAZENECA"),
    (" BAYER AG (ALLEMAGNE)", "BAYER"),
    (" BAYER HEALTHCARE", "BAYER"),
    (" BAYER PHARMA (ALLEMAGNE)", "BAYER"),
    (" BRISTOL MYERS SQUIBB", "BRISTOL MYERS SQUIBB"),
    (
        " BRISTOL MYERS SQUIBB PHARMA (GRANDE BRETAGNE)",
        "BRISTOL MYERS SQUIBB",
    ),
    (" JOHNSON & JOHNSON SANTE BEAUTE FRANCE", "JOHNSON & JOHNSON"),
    (" NOVARTIS EUROPHARM (IRLANDE)", "NOVARTIS"),
    (" NOVARTIS EUROPHARM (ROYAUME-UNI)", "NOVARTIS"),
    (" NOVARTIS GENE THERAPIES EU (IRLANDE)", "NOVARTIS"),
    (" NOVARTIS PHARMA", "NOVARTIS"),
    (" NOVO NORDISK", "NOVO NORDISK"),
    (" NOVO NORDISK (DANEMARK)", "NOVO NORDISK"),
    (" PFIZER (GRANDE BRETAGNE)", "PFIZER"),
    (" PFIZER EUROPE MA EEIG (BELGIQUE)", "PFIZER"),
    (
        " PFIZER EUROPE MA EEIG (BELGIQUE);PFIZER (GRANDE BRETAGNE)",
        "PFIZER",
    ),
    (" PFIZER EUROPE MA EEIG (ROYAUME UNI)", "PFIZER"),
    (" PFIZER HOLDING FRANCE", "PFIZER"),
    (" PFIZER IRELAND PHARMACEUTICALS (IRLANDE)", "PFIZER"),
    (" PFIZER PFE FRANCE", "PFIZER"),
    (" ROCHE", "ROCHE"),
    (" ROCHE REGISTRATION", "ROCHE"),
    (" ROCHE REGISTRATION (ALLEMAGNE)", "ROCHE"),
];

/// Returns the group for a raw registrant name, or the name itself when the
/// variant is not known.
#[must_use]
pub fn canonicalize_owner(raw_name: &str) -> &str {
    OWNER_GROUPS
        .iter()
        .find(|(variant, _)| *variant == raw_name)
        .map_or(raw_name, |(_, group)| *group)
}

/// Every group the static table knows about, sorted and deduplicated.
#[must_use]
pub fn known_groups() -> Vec<&'static str> {
    let mut groups: Vec<&'static str> = OWNER_GROUPS.iter().map(|(_, g)| *g).collect();
    groups.sort_unstable();
    groups.dedup();
    groups
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn pfizer_variants_collapse() {
        assert_eq!(canonicalize_owner(" PFIZER (GRANDE BRETAGNE)"), "PFIZER");
        assert_eq!(canonicalize_owner(" PFIZER PFE FRANCE"), "PFIZER");
        assert_eq!(
            canonicalize_owner(" PFIZER EUROPE MA EEIG (BELGIQUE);PFIZER (GRANDE BRETAGNE)"),
            "PFIZER"
        );
    }

    #[test]
    fn unknown_names_pass_through() {
        assert_eq!(canonicalize_owner(" SANOFI WINTHROP INDUSTRIE"), " SANOFI WINTHROP INDUSTRIE");
        assert_eq!(canonicalize_owner(""), "");
    }

    #[test]
    fn lookup_is_exact() {
        // Without the source's leading space the variant is not recognised.
        assert_eq!(canonicalize_owner("PFIZER PFE FRANCE"), "PFIZER PFE FRANCE");
    }

    #[test]
    fn group_names_are_not_variants() {
        for group in known_groups() {
            assert_eq!(canonicalize_owner(group), group);
        }
    }

    #[test]
    fn known_groups_are_sorted_and_unique() {
        let groups = known_groups();
        assert_eq!(groups.len(), 9);
        assert!(groups.windows(2).all(|w| w[0] < w[1]));
    }

    proptest! {
        #[test]
        fn canonicalize_is_idempotent(name in ".{0,48}") {
            let once = canonicalize_owner(&name);
            prop_assert_eq!(canonicalize_owner(once), once);
        }

        #[test]
        fn canonicalize_is_idempotent_on_known_variants(idx in 0..OWNER_GROUPS.len()) {
            let once = canonicalize_owner(OWNER_GROUPS[idx].0);
            prop_assert_eq!(canonicalize_owner(once), once);
        }
    }
}
