//! Group and laboratory commands.

use std::path::Path;

use defis_analytics::{
    compare_groups, group_report, list_groups, list_labs, revenue_breakdown, GroupReport,
};
use defis_core::RatingColumn;
use defis_loader::DatasetRepository;

use crate::output::{export_rows, opt, print_kpis, print_profile, truncate};

pub(crate) async fn run_groups(repo: &DatasetRepository) -> anyhow::Result<()> {
    let products = repo.products().await?;
    for group in list_groups(&products) {
        println!("{group}");
    }
    Ok(())
}

pub(crate) async fn run_labs(repo: &DatasetRepository) -> anyhow::Result<()> {
    let revenue = repo.revenue().await?;
    for lab in list_labs(&revenue) {
        println!("{lab}");
    }
    Ok(())
}

fn print_group(report: &GroupReport) {
    println!("Groupe: {} ({} produits)", report.group, report.product_count);
    if !report.subsidiaries.is_empty() {
        println!("Filiales: {}", report.subsidiaries.join(", "));
    }
    print_kpis(&report.kpis);
    if let Some(profile) = &report.drug_profile {
        print_profile(&format!("Médicaments \u{2014} {}", profile.family.code()), profile);
    }
    if let Some(profile) = &report.device_profile {
        print_profile(&format!("Dispositifs \u{2014} {}", profile.family.code()), profile);
    }
}

/// Prints one group's profile, or a side-by-side comparison with `other`.
///
/// # Errors
///
/// Returns an error for an unknown group, a self-comparison, or a failed
/// load or export.
pub(crate) async fn run_group(
    repo: &DatasetRepository,
    group: &str,
    other: Option<&str>,
    column: RatingColumn,
    export: Option<&Path>,
) -> anyhow::Result<()> {
    let products = repo.products().await?;

    if let Some(other) = other {
        let comparison = compare_groups(&products, group, other, column)?;
        print_group(&comparison.left);
        println!();
        print_group(&comparison.right);
        println!();
        let d = comparison.deltas;
        println!(
            "Écarts: total {:+}  médicaments {:+}  dispositifs {:+}  % ASMR I/II {:+.1} pts",
            d.total, d.drugs, d.devices, d.improvement_top_share
        );
        return Ok(());
    }

    let report = group_report(&products, group, column)?;
    print_group(&report);
    export_rows(export, &report.products, &report.group, "groupe", Some(&report.group))
}

/// Prints a laboratory's revenue lines, largest first.
///
/// # Errors
///
/// Returns an error for an unknown laboratory or a failed load or export.
pub(crate) async fn run_revenue(
    repo: &DatasetRepository,
    lab: &str,
    export: Option<&Path>,
) -> anyhow::Result<()> {
    let revenue = repo.revenue().await?;
    let breakdown = revenue_breakdown(&revenue, lab)?;

    println!("Laboratoire: {}", breakdown.lab);
    println!(
        "CA total: {} USD  Médicaments: {}  Top: {}",
        breakdown.total_usd.round_dp(0),
        breakdown.drug_count,
        opt(breakdown.top_drug.as_deref())
    );
    if let Some(group_usd) = breakdown.group_revenue_usd {
        println!("CA groupe: {} USD", group_usd.round_dp(0));
    }
    println!();
    println!("{:<42}{:>16}{:>9}  {:<12}ASMR", "MÉDICAMENT", "CA (USD)", "PART", "SMR");
    for share in &breakdown.lines {
        let line = &share.line;
        println!(
            "{:<42}{:>16}{:>8.1}%  {:<12}{}",
            truncate(&line.drug_name, 38),
            line.revenue_usd.round_dp(0).to_string(),
            share.share_percent,
            opt(line.smr.as_deref()),
            opt(line.asmr.as_deref())
        );
    }
    println!();
    print_profile("SMR", &breakdown.smr_profile);
    print_profile("ASMR", &breakdown.asmr_profile);

    export_rows(export, &breakdown.lines, "CA", "CA", Some(&breakdown.lab))
}
