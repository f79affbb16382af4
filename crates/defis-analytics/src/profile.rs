//! Rating distributions over product rows.
//!
//! Distributions are built in two steps: first keyed by the raw value (a
//! missing rating is its own key), then relabelled through the taxonomy with
//! keys that share a label merged. Group and portfolio profiles both go
//! through [`RatingProfile::from_raw`], so a single-group portfolio produces
//! exactly the group's own profile.

use std::collections::BTreeMap;

use defis_core::{normalize, RatingFamily};
use serde::Serialize;

/// Probability mass keyed by raw rating value. `None` is a missing rating.
pub type RawDistribution = BTreeMap<Option<String>, f64>;

/// Empirical distribution of `values`: each distinct value's count divided
/// by the number of values. Empty input yields an empty map.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn raw_distribution<'a, I>(values: I) -> RawDistribution
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: BTreeMap<Option<String>, usize> = BTreeMap::new();
    let mut total = 0usize;
    for value in values {
        *counts.entry(value.map(str::to_owned)).or_default() += 1;
        total += 1;
    }
    counts
        .into_iter()
        .map(|(value, count)| (value, count as f64 / total as f64))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileEntry {
    pub label: String,
    /// Share of the profile in `[0, 1]`.
    pub mass: f64,
    pub percent: f64,
    pub color: &'static str,
}

/// A labelled rating distribution in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingProfile {
    pub family: RatingFamily,
    pub entries: Vec<ProfileEntry>,
    /// Sum of all masses: 1.0 for a complete distribution, lower when part
    /// of a portfolio had no rows.
    pub total_mass: f64,
}

impl RatingProfile {
    /// Relabels a raw distribution for `family`, merging raw values that
    /// map to the same label by summing their masses.
    #[must_use]
    pub fn from_raw(raw: &RawDistribution, family: RatingFamily) -> Self {
        let mut merged: BTreeMap<String, f64> = BTreeMap::new();
        for (value, mass) in raw {
            let label = normalize(value.as_deref(), family).into_owned();
            *merged.entry(label).or_insert(0.0) += mass;
        }

        let mut entries: Vec<ProfileEntry> = merged
            .into_iter()
            .map(|(label, mass)| ProfileEntry {
                color: family.color(&label),
                percent: mass * 100.0,
                label,
                mass,
            })
            .collect();
        // Known labels in clinical order, then unknown labels (already
        // alphabetical from the map), then the unset label.
        entries.sort_by_key(|e| family.display_key(&e.label));

        let total_mass = entries.iter().map(|e| e.mass).sum();
        Self {
            family,
            entries,
            total_mass,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mass for `label`, or 0.0 when absent.
    #[must_use]
    pub fn mass(&self, label: &str) -> f64 {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map_or(0.0, |e| e.mass)
    }
}
