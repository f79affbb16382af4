//! Rating taxonomy for the four HAS rating families.
//!
//! Raw codes from the source tables ("I", "NA", "Modéré", ...) map to display
//! labels through fixed per-family tables. The mapping is total: a blank or
//! missing code maps to [`UNSET_LABEL`], and a code missing from the table is
//! returned as-is so new regulatory codes still show up in reports.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Label for rows whose rating is missing. Never merged with a real category.
pub const UNSET_LABEL: &str = "Non renseigné";

/// Label for the explicit "NA" code.
pub const NOT_APPLICABLE_LABEL: &str = "Non applicable";

const NOT_APPLICABLE_COLOR: &str = "#d1d5db";
const NEUTRAL_COLOR: &str = "#9ca3af";

/// A rating family: SMR/ASMR rate drugs, SR/ASR rate medical devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingFamily {
    Smr,
    Asmr,
    Sr,
    Asr,
}

struct Tier {
    label: &'static str,
    color: &'static str,
}

const SMR_TIERS: &[Tier] = &[
    Tier { label: "SMR Important", color: "#1a3a5c" },
    Tier { label: "SMR Modéré", color: "#2563eb" },
    Tier { label: "SMR Faible", color: "#f59e0b" },
    Tier { label: "SMR Insuffisant", color: "#dc2626" },
];

const SR_TIERS: &[Tier] = &[
    Tier { label: "SR Important", color: "#1a3a5c" },
    Tier { label: "SR Modéré", color: "#2563eb" },
    Tier { label: "SR Faible", color: "#f59e0b" },
    Tier { label: "SR Insuffisant", color: "#dc2626" },
];

const ASMR_TIERS: &[Tier] = &[
    Tier { label: "I – Progrès majeur", color: "#1a3a5c" },
    Tier { label: "II – Amélioration importante", color: "#2563eb" },
    Tier { label: "III – Amélioration modérée", color: "#60a5fa" },
    Tier { label: "IV – Amélioration mineure", color: "#f59e0b" },
    Tier { label: "V – Absence d'amélioration", color: "#dc2626" },
    Tier { label: NOT_APPLICABLE_LABEL, color: NOT_APPLICABLE_COLOR },
];

const ASR_TIERS: &[Tier] = &[
    Tier { label: "I – Amélioration substantielle", color: "#1a3a5c" },
    Tier { label: "II – Amélioration modérée", color: "#2563eb" },
    Tier { label: "III – Amélioration faible", color: "#f59e0b" },
    Tier { label: "IV – Absence d'amélioration", color: "#dc2626" },
    Tier { label: NOT_APPLICABLE_LABEL, color: NOT_APPLICABLE_COLOR },
];

// Raw code -> index into the family's tier table.
const SMR_CODES: &[(&str, usize)] = &[
    ("Important", 0),
    ("Modéré", 1),
    ("Faible", 2),
    ("Insuffisant", 3),
];

const ASMR_CODES: &[(&str, usize)] = &[
    ("I", 0),
    ("II", 1),
    ("III", 2),
    ("IV", 3),
    ("V", 4),
    ("V.absence amélioration", 4),
    ("NA", 5),
];

const ASR_CODES: &[(&str, usize)] = &[("I", 0), ("II", 1), ("III", 2), ("IV", 3), ("NA", 4)];

impl RatingFamily {
    pub const ALL: [RatingFamily; 4] = [
        RatingFamily::Smr,
        RatingFamily::Asmr,
        RatingFamily::Sr,
        RatingFamily::Asr,
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            RatingFamily::Smr => "SMR",
            RatingFamily::Asmr => "ASMR",
            RatingFamily::Sr => "SR",
            RatingFamily::Asr => "ASR",
        }
    }

    fn tiers(self) -> &'static [Tier] {
        match self {
            RatingFamily::Smr => SMR_TIERS,
            RatingFamily::Sr => SR_TIERS,
            RatingFamily::Asmr => ASMR_TIERS,
            RatingFamily::Asr => ASR_TIERS,
        }
    }

    fn codes(self) -> &'static [(&'static str, usize)] {
        match self {
            // SR shares SMR's raw vocabulary.
            RatingFamily::Smr | RatingFamily::Sr => SMR_CODES,
            RatingFamily::Asmr => ASMR_CODES,
            RatingFamily::Asr => ASR_CODES,
        }
    }

    /// Canonical labels in clinical order, highest value first.
    pub fn ordered_labels(self) -> impl Iterator<Item = &'static str> {
        self.tiers().iter().map(|t| t.label)
    }

    /// Position of `label` in the family's clinical order.
    #[must_use]
    pub fn rank(self, label: &str) -> Option<usize> {
        self.tiers().iter().position(|t| t.label == label)
    }

    /// Stable display color for a canonical label.
    ///
    /// Highest clinical value is darkest blue, lowest is red; "Non applicable",
    /// [`UNSET_LABEL`] and labels outside the family are gray.
    #[must_use]
    pub fn color(self, label: &str) -> &'static str {
        self.tiers()
            .iter()
            .find(|t| t.label == label)
            .map_or(NEUTRAL_COLOR, |t| t.color)
    }

    /// Sort key for display: known labels in clinical order, then
    /// pass-through labels, then [`UNSET_LABEL`].
    #[must_use]
    pub fn display_key(self, label: &str) -> (u8, usize) {
        match self.rank(label) {
            Some(rank) => (0, rank),
            None if label == UNSET_LABEL => (2, 0),
            None => (1, 0),
        }
    }
}

impl std::fmt::Display for RatingFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for RatingFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RatingFamily::ALL
            .into_iter()
            .find(|f| f.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown rating family '{s}'"))
    }
}

/// Maps a raw rating code to its canonical display label.
///
/// - blank or missing → [`UNSET_LABEL`]
/// - known code (surrounding whitespace ignored) → the family's label
/// - anything else → `raw` unchanged
#[must_use]
pub fn normalize(raw: Option<&str>, family: RatingFamily) -> Cow<'_, str> {
    let Some(raw) = raw else {
        return Cow::Borrowed(UNSET_LABEL);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cow::Borrowed(UNSET_LABEL);
    }
    match family.codes().iter().find(|(code, _)| *code == trimmed) {
        Some(&(_, tier)) => Cow::Borrowed(family.tiers()[tier].label),
        None => Cow::Borrowed(raw),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn asmr_codes_map_to_labels() {
        assert_eq!(normalize(Some("I"), RatingFamily::Asmr), "I – Progrès majeur");
        assert_eq!(
            normalize(Some("IV"), RatingFamily::Asmr),
            "IV – Amélioration mineure"
        );
        assert_eq!(normalize(Some("NA"), RatingFamily::Asmr), NOT_APPLICABLE_LABEL);
    }

    #[test]
    fn synonymous_asmr_codes_share_a_label() {
        assert_eq!(
            normalize(Some("V"), RatingFamily::Asmr),
            normalize(Some("V.absence amélioration"), RatingFamily::Asmr)
        );
    }

    #[test]
    fn same_code_differs_between_drug_and_device_families() {
        assert_eq!(
            normalize(Some("II"), RatingFamily::Asr),
            "II – Amélioration modérée"
        );
        assert_eq!(
            normalize(Some("II"), RatingFamily::Asmr),
            "II – Amélioration importante"
        );
        assert_eq!(normalize(Some("Faible"), RatingFamily::Sr), "SR Faible");
        assert_eq!(normalize(Some("Faible"), RatingFamily::Smr), "SMR Faible");
    }

    #[test]
    fn asr_has_no_fifth_level() {
        assert_eq!(normalize(Some("V"), RatingFamily::Asr), "V");
    }

    #[test]
    fn lookup_ignores_surrounding_whitespace() {
        assert_eq!(normalize(Some(" III "), RatingFamily::Asmr), "III – Amélioration modérée");
    }

    #[test]
    fn missing_and_blank_codes_are_unset() {
        assert_eq!(normalize(None, RatingFamily::Smr), UNSET_LABEL);
        assert_eq!(normalize(Some("  "), RatingFamily::Smr), UNSET_LABEL);
    }

    #[test]
    fn unknown_codes_pass_through_unchanged() {
        assert_eq!(normalize(Some("VI bis"), RatingFamily::Asmr), "VI bis");
        assert!(matches!(
            normalize(Some("Inconnu"), RatingFamily::Smr),
            Cow::Borrowed("Inconnu")
        ));
    }

    #[test]
    fn colors_run_from_blue_to_red() {
        assert_eq!(RatingFamily::Asmr.color("I – Progrès majeur"), "#1a3a5c");
        assert_eq!(
            RatingFamily::Asmr.color("V – Absence d'amélioration"),
            "#dc2626"
        );
        assert_eq!(RatingFamily::Asr.color(NOT_APPLICABLE_LABEL), "#d1d5db");
        assert_eq!(RatingFamily::Smr.color(UNSET_LABEL), "#9ca3af");
        assert_eq!(RatingFamily::Smr.color("something new"), "#9ca3af");
    }

    #[test]
    fn display_key_orders_known_then_unknown_then_unset() {
        let family = RatingFamily::Asmr;
        assert!(family.display_key("I – Progrès majeur") < family.display_key(NOT_APPLICABLE_LABEL));
        assert!(family.display_key(NOT_APPLICABLE_LABEL) < family.display_key("VI bis"));
        assert!(family.display_key("VI bis") < family.display_key(UNSET_LABEL));
    }

    #[test]
    fn family_parses_case_insensitively() {
        assert_eq!("asmr".parse::<RatingFamily>(), Ok(RatingFamily::Asmr));
        assert!("xyz".parse::<RatingFamily>().is_err());
    }

    fn any_family() -> impl Strategy<Value = RatingFamily> {
        prop_oneof![
            Just(RatingFamily::Smr),
            Just(RatingFamily::Asmr),
            Just(RatingFamily::Sr),
            Just(RatingFamily::Asr),
        ]
    }

    proptest! {
        #[test]
        fn normalize_never_drops_a_value(raw in ".{0,24}", family in any_family()) {
            let label = normalize(Some(&raw), family);
            prop_assert!(!label.is_empty());
            if raw.trim().is_empty() {
                prop_assert_eq!(label.as_ref(), UNSET_LABEL);
            } else {
                let known = family.rank(&label).is_some();
                prop_assert!(known || label.as_ref() == raw.as_str());
            }
        }

        #[test]
        fn color_is_a_pure_function_of_label(raw in ".{0,24}", family in any_family()) {
            let label = normalize(Some(&raw), family);
            prop_assert_eq!(family.color(&label), family.color(&label));
        }
    }
}
