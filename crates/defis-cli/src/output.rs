//! Terminal rendering and `.xlsx` export shared by every command.

use std::path::{Path, PathBuf};

use chrono::Local;
use defis_analytics::{Kpis, RatingProfile};
use defis_export::{export_file_name, write_xlsx, TabularRecord};

/// Placeholder for an absent value.
pub(crate) const DASH: &str = "\u{2014}";

pub(crate) fn opt(value: Option<&str>) -> &str {
    value.unwrap_or(DASH)
}

/// Truncates `text` to `max` characters, marking the cut with `...`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_owned()
    }
}

pub(crate) fn print_kpis(kpis: &Kpis) {
    println!(
        "Total produits: {}  Médicaments: {}  Dispositifs: {}  % top niveau ({}): {:.1}%",
        kpis.total,
        kpis.drugs,
        kpis.devices,
        kpis.column.display_name(),
        kpis.top_level_share
    );
}

pub(crate) fn print_profile(title: &str, profile: &RatingProfile) {
    println!("{title}");
    if profile.is_empty() {
        println!("  (aucune donnée)");
        return;
    }
    for entry in &profile.entries {
        println!("  {:<36}{:>6.1}%", entry.label, entry.percent);
    }
}

/// Where an export lands: inside `target` under the dated export name when
/// `target` is a directory, at `target` itself otherwise.
pub(crate) fn resolve_export_path(target: &Path, prefix: &str, subject: Option<&str>) -> PathBuf {
    if target.is_dir() {
        target.join(export_file_name(prefix, subject, Local::now().date_naive()))
    } else {
        target.to_path_buf()
    }
}

/// Writes `rows` as a one-sheet workbook when `target` is set.
///
/// # Errors
///
/// Returns an error if the workbook cannot be built or written.
pub(crate) fn export_rows<T: TabularRecord>(
    target: Option<&Path>,
    rows: &[T],
    sheet: &str,
    prefix: &str,
    subject: Option<&str>,
) -> anyhow::Result<()> {
    let Some(target) = target else {
        return Ok(());
    };
    let path = resolve_export_path(target, prefix, subject);
    let bytes = write_xlsx(rows, sheet)?;
    std::fs::write(&path, bytes)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
    tracing::info!(path = %path.display(), rows = rows.len(), "xlsx export written");
    println!("exported {} rows to {}", rows.len(), path.display());
    Ok(())
}
