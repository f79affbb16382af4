//! Group quality profiles and two-group comparison.

use std::collections::BTreeSet;

use defis_core::{ProductRecord, ProductType, RatingColumn};
use serde::Serialize;

use crate::error::AnalyticsError;
use crate::kpi::{compute_kpis, Kpis};
use crate::profile::{raw_distribution, RatingProfile};

/// Sorted distinct root groups of the combined dataset.
#[must_use]
pub fn list_groups(products: &[ProductRecord]) -> Vec<String> {
    products
        .iter()
        .filter_map(|p| p.group.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupReport {
    pub group: String,
    pub column: RatingColumn,
    pub product_count: usize,
    /// Distinct registrants of the group's products, sorted.
    pub subsidiaries: Vec<String>,
    pub kpis: Kpis,
    /// `None` when the group has no drugs.
    pub drug_profile: Option<RatingProfile>,
    /// `None` when the group has no devices.
    pub device_profile: Option<RatingProfile>,
    pub products: Vec<ProductRecord>,
}

fn split_profile(
    rows: &[ProductRecord],
    column: RatingColumn,
    product_type: ProductType,
) -> Option<RatingProfile> {
    let dist = raw_distribution(
        rows.iter()
            .filter(|p| p.product_type == Some(product_type))
            .map(|p| p.rating(column)),
    );
    (!dist.is_empty()).then(|| RatingProfile::from_raw(&dist, column.family(product_type)))
}

/// Builds the quality report of one group.
///
/// # Errors
///
/// Returns [`AnalyticsError::UnknownGroup`] if no product belongs to `group`.
pub fn group_report(
    products: &[ProductRecord],
    group: &str,
    column: RatingColumn,
) -> Result<GroupReport, AnalyticsError> {
    let rows: Vec<ProductRecord> = products
        .iter()
        .filter(|p| p.is_in_group(group))
        .cloned()
        .collect();
    if rows.is_empty() {
        return Err(AnalyticsError::UnknownGroup(group.to_owned()));
    }

    let subsidiaries = rows
        .iter()
        .filter_map(|p| p.owner.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Ok(GroupReport {
        group: group.to_owned(),
        column,
        product_count: rows.len(),
        subsidiaries,
        kpis: compute_kpis(&rows, column),
        drug_profile: split_profile(&rows, column, ProductType::Drug),
        device_profile: split_profile(&rows, column, ProductType::Device),
        products: rows,
    })
}

/// Left minus right for each KPI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiDeltas {
    pub total: i64,
    pub drugs: i64,
    pub devices: i64,
    /// Percentage-point difference of the I/II improvement share, one decimal.
    pub improvement_top_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComparison {
    pub left: GroupReport,
    pub right: GroupReport,
    pub deltas: KpiDeltas,
}

#[allow(clippy::cast_possible_wrap)]
fn delta(left: usize, right: usize) -> i64 {
    left as i64 - right as i64
}

/// Compares two distinct groups.
///
/// # Errors
///
/// - [`AnalyticsError::SameGroup`] if `left == right`.
/// - [`AnalyticsError::UnknownGroup`] if either group has no products.
pub fn compare_groups(
    products: &[ProductRecord],
    left: &str,
    right: &str,
    column: RatingColumn,
) -> Result<GroupComparison, AnalyticsError> {
    if left == right {
        return Err(AnalyticsError::SameGroup(left.to_owned()));
    }
    let left = group_report(products, left, column)?;
    let right = group_report(products, right, column)?;
    let deltas = KpiDeltas {
        total: delta(left.kpis.total, right.kpis.total),
        drugs: delta(left.kpis.drugs, right.kpis.drugs),
        devices: delta(left.kpis.devices, right.kpis.devices),
        improvement_top_share: ((left.kpis.improvement_top_share
            - right.kpis.improvement_top_share)
            * 10.0)
            .round()
            / 10.0,
    };
    Ok(GroupComparison {
        left,
        right,
        deltas,
    })
}
