use defis_core::{ProductRecord, ProductType, RatingColumn};
use serde::Serialize;

const TOP_IMPROVEMENT_CODES: [&str; 2] = ["I", "II"];
const TOP_BENEFIT_CODE: &str = "Important";

/// Headline counts for a selection of products.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub total: usize,
    pub drugs: usize,
    pub devices: usize,
    /// Percent of rows whose improvement rating is I or II.
    pub improvement_top_share: f64,
    /// Percent of rows at the top level of the requested column: I or II
    /// for improvement, "Important" for benefit.
    pub top_level_share: f64,
    pub column: RatingColumn,
}

fn is_top_level(record: &ProductRecord, column: RatingColumn) -> bool {
    let Some(value) = record.rating(column).map(str::trim) else {
        return false;
    };
    match column {
        RatingColumn::Improvement => TOP_IMPROVEMENT_CODES.contains(&value),
        RatingColumn::Benefit => value == TOP_BENEFIT_CODE,
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64 * 100.0
    }
}

/// Computes [`Kpis`] over `rows`. An empty selection yields zero shares.
#[must_use]
pub fn compute_kpis<'a, I>(rows: I, column: RatingColumn) -> Kpis
where
    I: IntoIterator<Item = &'a ProductRecord>,
{
    let mut total = 0;
    let mut drugs = 0;
    let mut devices = 0;
    let mut improvement_top = 0;
    let mut top_level = 0;
    for record in rows {
        total += 1;
        match record.product_type {
            Some(ProductType::Drug) => drugs += 1,
            Some(ProductType::Device) => devices += 1,
            None => {}
        }
        if is_top_level(record, RatingColumn::Improvement) {
            improvement_top += 1;
        }
        if is_top_level(record, column) {
            top_level += 1;
        }
    }
    Kpis {
        total,
        drugs,
        devices,
        improvement_top_share: percent(improvement_top, total),
        top_level_share: percent(top_level, total),
        column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(kind: ProductType, benefit: Option<&str>, improvement: Option<&str>) -> ProductRecord {
        ProductRecord {
            code: "1".to_string(),
            sub_code: None,
            name: "X".to_string(),
            benefit: benefit.map(str::to_string),
            improvement: improvement.map(str::to_string),
            owner: None,
            product_type: Some(kind),
            group: Some("G".to_string()),
        }
    }

    #[test]
    fn empty_selection_has_zero_shares() {
        let kpis = compute_kpis(&[], RatingColumn::Improvement);
        assert_eq!(kpis.total, 0);
        assert_eq!(kpis.improvement_top_share, 0.0);
        assert_eq!(kpis.top_level_share, 0.0);
    }

    #[test]
    fn counts_products_by_type() {
        let rows = vec![
            product(ProductType::Drug, Some("Important"), Some("I")),
            product(ProductType::Drug, Some("Faible"), Some("V")),
            product(ProductType::Device, Some("Important"), Some("II")),
        ];
        let kpis = compute_kpis(&rows, RatingColumn::Improvement);
        assert_eq!((kpis.total, kpis.drugs, kpis.devices), (3, 2, 1));
    }

    #[test]
    fn improvement_share_counts_levels_one_and_two() {
        let rows = vec![
            product(ProductType::Drug, None, Some("I")),
            product(ProductType::Drug, None, Some("II")),
            product(ProductType::Drug, None, Some("III")),
            product(ProductType::Drug, None, None),
        ];
        let kpis = compute_kpis(&rows, RatingColumn::Improvement);
        assert!((kpis.improvement_top_share - 50.0).abs() < 1e-9);
        assert!((kpis.top_level_share - 50.0).abs() < 1e-9);
    }

    #[test]
    fn benefit_top_level_is_important() {
        let rows = vec![
            product(ProductType::Drug, Some("Important"), Some("V")),
            product(ProductType::Device, Some("Modéré"), Some("I")),
        ];
        let kpis = compute_kpis(&rows, RatingColumn::Benefit);
        assert!((kpis.top_level_share - 50.0).abs() < 1e-9);
        assert!((kpis.improvement_top_share - 50.0).abs() < 1e-9);
    }
}
