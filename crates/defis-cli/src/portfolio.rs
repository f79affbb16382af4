//! `portfolio` command: weighted multi-group rating profile.

use std::path::Path;

use defis_analytics::{
    default_entries, portfolio_report, Portfolio, PortfolioEntry, WeightStatus,
};
use defis_core::RatingColumn;
use defis_loader::DatasetRepository;

use crate::output::{export_rows, print_kpis, print_profile};

/// Parses a `GROUP=WEIGHT` argument. The last `=` separates the weight so
/// group names may contain `=`.
pub(crate) fn parse_entry(raw: &str) -> Result<PortfolioEntry, String> {
    let (group, weight) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected GROUP=WEIGHT, got '{raw}'"))?;
    let group = group.trim();
    if group.is_empty() {
        return Err(format!("missing group name in '{raw}'"));
    }
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|_| format!("invalid weight in '{raw}'"))?;
    Ok(PortfolioEntry::new(group, weight))
}

/// Weighted entries, or equal weights over `groups` when none are given.
pub(crate) fn resolve_entries(
    entries: Vec<PortfolioEntry>,
    groups: &[String],
) -> Vec<PortfolioEntry> {
    if entries.is_empty() {
        default_entries(groups)
    } else {
        entries
    }
}

/// Builds and prints the portfolio report.
///
/// # Errors
///
/// Returns an error for invalid weights or a failed load or export.
pub(crate) async fn run_portfolio(
    repo: &DatasetRepository,
    entries: Vec<PortfolioEntry>,
    column: RatingColumn,
    export: Option<&Path>,
    profile_export: Option<&Path>,
) -> anyhow::Result<()> {
    let portfolio = Portfolio::new(entries)?;
    let products = repo.products().await?;
    let report = portfolio_report(&products, &portfolio, column);

    println!("{:<32}{:>10}{:>12}{:>10}", "GROUPE", "POIDS", "NORMALISÉ", "PRODUITS");
    for entry in &report.entries {
        println!(
            "{:<32}{:>9.1}%{:>12.3}{:>10}",
            entry.group, entry.weight, entry.normalized_weight, entry.product_count
        );
    }
    match report.weight_status {
        WeightStatus::Balanced => println!("Total : {:.1}%", portfolio.total_weight()),
        WeightStatus::Rescaled { total } => {
            println!("Total : {total:.1}% \u{2192} normalisé à 100%");
        }
    }
    println!();
    print_kpis(&report.kpis);
    print_profile(
        &format!("Répartition {} pondérée", column.display_name()),
        &report.profile,
    );
    if !report.missing_groups.is_empty() {
        println!(
            "Groupes sans produits: {} (masse totale {:.1}%)",
            report.missing_groups.join(", "),
            report.total_mass * 100.0
        );
    }

    export_rows(export, &report.entries, "Portefeuille", "portefeuille", None)?;
    export_rows(
        profile_export,
        &report.profile.entries,
        "Profil",
        "profil_portefeuille",
        Some(column.display_name()),
    )
}
