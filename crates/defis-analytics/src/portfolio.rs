//! Weighted multi-group portfolios.
//!
//! A portfolio is a list of (group, raw weight) pairs. Raw weights are
//! normalized by their sum; each group contributes its empirical rating
//! distribution scaled by its normalized weight. Groups with no rows
//! contribute nothing and are reported back, and the resulting total mass is
//! left below 1.0 rather than renormalized.

use std::collections::BTreeMap;

use defis_core::{ProductRecord, ProductType, RatingColumn};
use serde::{Deserialize, Serialize};

use crate::error::PortfolioError;
use crate::kpi::{compute_kpis, Kpis};
use crate::profile::{raw_distribution, RatingProfile, RawDistribution};

const BALANCED_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub group: String,
    /// Raw weight, conventionally a percentage.
    pub weight: f64,
}

impl PortfolioEntry {
    #[must_use]
    pub fn new(group: impl Into<String>, weight: f64) -> Self {
        Self {
            group: group.into(),
            weight,
        }
    }
}

/// Whether the raw weights already add up to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WeightStatus {
    Balanced,
    Rescaled { total: f64 },
}

/// A validated portfolio: non-empty, finite non-negative weights, positive sum.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    entries: Vec<PortfolioEntry>,
    total_weight: f64,
}

impl Portfolio {
    /// # Errors
    ///
    /// - [`PortfolioError::Empty`] when there are no entries.
    /// - [`PortfolioError::InvalidWeight`] for a negative or non-finite weight.
    /// - [`PortfolioError::ZeroTotal`] when the weights sum to zero.
    pub fn new(entries: Vec<PortfolioEntry>) -> Result<Self, PortfolioError> {
        if entries.is_empty() {
            return Err(PortfolioError::Empty);
        }
        if let Some(bad) = entries
            .iter()
            .find(|e| !e.weight.is_finite() || e.weight < 0.0)
        {
            return Err(PortfolioError::InvalidWeight {
                group: bad.group.clone(),
                weight: bad.weight,
            });
        }
        let total_weight: f64 = entries.iter().map(|e| e.weight).sum();
        if total_weight <= 0.0 || !total_weight.is_finite() {
            return Err(PortfolioError::ZeroTotal);
        }
        Ok(Self {
            entries,
            total_weight,
        })
    }

    #[must_use]
    pub fn entries(&self) -> &[PortfolioEntry] {
        &self.entries
    }

    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Entries paired with their weight divided by the total.
    pub fn normalized(&self) -> impl Iterator<Item = (&PortfolioEntry, f64)> {
        self.entries
            .iter()
            .map(move |e| (e, e.weight / self.total_weight))
    }

    #[must_use]
    pub fn weight_status(&self) -> WeightStatus {
        if (self.total_weight - 100.0).abs() < BALANCED_TOLERANCE {
            WeightStatus::Balanced
        } else {
            WeightStatus::Rescaled {
                total: self.total_weight,
            }
        }
    }
}

/// Equal starting weights for `groups`: `100 / n` rounded to one decimal.
#[must_use]
pub fn default_entries(groups: &[String]) -> Vec<PortfolioEntry> {
    if groups.is_empty() {
        return Vec::new();
    }
    #[allow(clippy::cast_precision_loss)]
    let weight = (100.0 / groups.len() as f64 * 10.0).round() / 10.0;
    groups
        .iter()
        .map(|g| PortfolioEntry::new(g.clone(), weight))
        .collect()
}

/// Weighted profile plus the groups that had no matching rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioProfile {
    pub profile: RatingProfile,
    pub missing_groups: Vec<String>,
}

fn selection<'a>(
    products: &'a [ProductRecord],
    group: &'a str,
    product_type: Option<ProductType>,
) -> impl Iterator<Item = &'a ProductRecord> + 'a {
    products.iter().filter(move |p| {
        p.is_in_group(group) && product_type.is_none_or(|t| p.product_type == Some(t))
    })
}

/// Aggregates `column` over the portfolio's groups.
///
/// When `product_type` is set only rows of that type are selected and the
/// matching family is used; otherwise the drug family labels the result.
#[must_use]
pub fn aggregate(
    products: &[ProductRecord],
    portfolio: &Portfolio,
    column: RatingColumn,
    product_type: Option<ProductType>,
) -> PortfolioProfile {
    let family = column.family(product_type.unwrap_or(ProductType::Drug));
    let mut weighted: RawDistribution = BTreeMap::new();
    let mut missing_groups = Vec::new();

    for (entry, norm_weight) in portfolio.normalized() {
        let local = raw_distribution(
            selection(products, &entry.group, product_type).map(|p| p.rating(column)),
        );
        if local.is_empty() {
            missing_groups.push(entry.group.clone());
            continue;
        }
        for (value, share) in local {
            *weighted.entry(value).or_insert(0.0) += norm_weight * share;
        }
    }

    if !missing_groups.is_empty() {
        tracing::debug!(?missing_groups, "portfolio groups without products");
    }

    PortfolioProfile {
        profile: RatingProfile::from_raw(&weighted, family),
        missing_groups,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedEntry {
    pub group: String,
    pub weight: f64,
    pub normalized_weight: f64,
    pub product_count: usize,
}

/// Everything the portfolio view shows for one set of weights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReport {
    pub column: RatingColumn,
    pub entries: Vec<WeightedEntry>,
    pub weight_status: WeightStatus,
    pub kpis: Kpis,
    pub profile: RatingProfile,
    pub missing_groups: Vec<String>,
    pub total_mass: f64,
}

/// Builds the full portfolio view over the combined dataset.
#[must_use]
pub fn portfolio_report(
    products: &[ProductRecord],
    portfolio: &Portfolio,
    column: RatingColumn,
) -> PortfolioReport {
    let entries = portfolio
        .normalized()
        .map(|(entry, normalized_weight)| WeightedEntry {
            group: entry.group.clone(),
            weight: entry.weight,
            normalized_weight,
            product_count: selection(products, &entry.group, None).count(),
        })
        .collect();

    let kpis = compute_kpis(
        products.iter().filter(|p| {
            portfolio
                .entries()
                .iter()
                .any(|e| p.is_in_group(&e.group))
        }),
        column,
    );

    let PortfolioProfile {
        profile,
        missing_groups,
    } = aggregate(products, portfolio, column, None);

    PortfolioReport {
        column,
        entries,
        weight_status: portfolio.weight_status(),
        kpis,
        total_mass: profile.total_mass,
        profile,
        missing_groups,
    }
}

#[cfg(test)]
#[path = "portfolio_test.rs"]
mod tests;
