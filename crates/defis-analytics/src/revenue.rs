//! Per-laboratory revenue breakdown.

use std::collections::BTreeSet;

use defis_core::{RatingFamily, RevenueLine};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::AnalyticsError;
use crate::profile::{raw_distribution, RatingProfile};

/// Sorted distinct laboratories of the revenue dataset.
#[must_use]
pub fn list_labs(revenue: &[RevenueLine]) -> Vec<String> {
    revenue
        .iter()
        .map(|l| l.owner.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueShare {
    #[serde(flatten)]
    pub line: RevenueLine,
    /// Percent of the laboratory's total revenue.
    pub share_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueBreakdown {
    pub lab: String,
    pub total_usd: Decimal,
    pub drug_count: usize,
    pub top_drug: Option<String>,
    /// Largest `CA_groupe` among the laboratory's lines.
    pub group_revenue_usd: Option<Decimal>,
    /// Lines by descending revenue; ties keep dataset order.
    pub lines: Vec<RevenueShare>,
    pub smr_profile: RatingProfile,
    pub asmr_profile: RatingProfile,
}

fn share(part: Decimal, total: Decimal) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    (part / total * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
}

/// Builds the revenue breakdown of `lab`.
///
/// # Errors
///
/// Returns [`AnalyticsError::UnknownLab`] if the laboratory has no lines.
pub fn revenue_breakdown(
    revenue: &[RevenueLine],
    lab: &str,
) -> Result<RevenueBreakdown, AnalyticsError> {
    let mut lines: Vec<RevenueLine> = revenue.iter().filter(|l| l.owner == lab).cloned().collect();
    if lines.is_empty() {
        return Err(AnalyticsError::UnknownLab(lab.to_owned()));
    }

    let total_usd: Decimal = lines.iter().map(|l| l.revenue_usd).sum();
    let drug_count = lines
        .iter()
        .map(|l| l.drug_name.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let mut top: Option<&RevenueLine> = None;
    for line in &lines {
        if top.is_none_or(|t| line.revenue_usd > t.revenue_usd) {
            top = Some(line);
        }
    }
    let top_drug = top.map(|l| l.drug_name.clone());
    let group_revenue_usd = lines.iter().filter_map(|l| l.group_revenue_usd).max();
    let smr_profile = RatingProfile::from_raw(
        &raw_distribution(lines.iter().map(|l| l.smr.as_deref())),
        RatingFamily::Smr,
    );
    let asmr_profile = RatingProfile::from_raw(
        &raw_distribution(lines.iter().map(|l| l.asmr.as_deref())),
        RatingFamily::Asmr,
    );

    lines.sort_by(|a, b| b.revenue_usd.cmp(&a.revenue_usd));
    let lines = lines
        .into_iter()
        .map(|line| RevenueShare {
            share_percent: share(line.revenue_usd, total_usd),
            line,
        })
        .collect();

    Ok(RevenueBreakdown {
        lab: lab.to_owned(),
        total_usd,
        drug_count,
        top_drug,
        group_revenue_usd,
        lines,
        smr_profile,
        asmr_profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(owner: &str, drug: &str, usd: i64) -> RevenueLine {
        RevenueLine {
            owner: owner.to_string(),
            drug_name: drug.to_string(),
            revenue_usd: Decimal::from(usd),
            group_revenue_usd: Some(Decimal::from(1_000_000)),
            smr: Some("Important".to_string()),
            smr_label: None,
            asmr: Some("II".to_string()),
            asmr_label: None,
        }
    }

    fn dataset() -> Vec<RevenueLine> {
        vec![
            line("PFIZER", "ELIQUIS", 300),
            line("PFIZER", "PREVENAR 13", 500),
            line("ROCHE", "OCREVUS", 900),
            line("PFIZER", "IBRANCE", 500),
            line("PFIZER", "ELIQUIS", 0),
        ]
    }

    #[test]
    fn labs_are_sorted_and_distinct() {
        assert_eq!(list_labs(&dataset()), vec!["PFIZER", "ROCHE"]);
    }

    #[test]
    fn breakdown_totals_and_counts_distinct_drugs() {
        let b = revenue_breakdown(&dataset(), "PFIZER").unwrap();
        assert_eq!(b.total_usd, Decimal::from(1300));
        assert_eq!(b.drug_count, 3);
        assert_eq!(b.group_revenue_usd, Some(Decimal::from(1_000_000)));
    }

    #[test]
    fn top_drug_is_first_on_ties() {
        let b = revenue_breakdown(&dataset(), "PFIZER").unwrap();
        assert_eq!(b.top_drug.as_deref(), Some("PREVENAR 13"));
    }

    #[test]
    fn lines_sorted_descending_with_shares() {
        let b = revenue_breakdown(&dataset(), "PFIZER").unwrap();
        let names: Vec<&str> = b.lines.iter().map(|s| s.line.drug_name.as_str()).collect();
        assert_eq!(names, ["PREVENAR 13", "IBRANCE", "ELIQUIS", "ELIQUIS"]);
        let total: f64 = b.lines.iter().map(|s| s.share_percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!((b.lines[0].share_percent - 500.0 / 13.0).abs() < 1e-9);
    }

    #[test]
    fn breakdown_profiles_rate_every_line() {
        let b = revenue_breakdown(&dataset(), "PFIZER").unwrap();
        assert_eq!(b.smr_profile.entries.len(), 1);
        assert!((b.smr_profile.mass("SMR Important") - 1.0).abs() < 1e-9);
        assert!((b.asmr_profile.total_mass - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_gives_zero_shares() {
        let b = revenue_breakdown(&[line("X", "A", 0)], "X").unwrap();
        assert_eq!(b.lines[0].share_percent, 0.0);
    }

    #[test]
    fn unknown_lab_is_an_error() {
        assert!(matches!(
            revenue_breakdown(&dataset(), "SANOFI"),
            Err(AnalyticsError::UnknownLab(_))
        ));
    }
}
