//! Row/column views of the records and reports the dashboard displays.

use defis_analytics::{ProfileEntry, RevenueShare, WeightedEntry};
use defis_core::{DeviceRecord, DrugPresentation, ProductRecord, RevenueLine};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn text(value: &str) -> Self {
        Cell::Text(value.to_owned())
    }

    fn opt(value: Option<&str>) -> Self {
        value.map_or(Cell::Empty, Cell::text)
    }

    fn decimal(value: Decimal) -> Self {
        value.to_f64().map_or(Cell::Empty, Cell::Number)
    }

    #[allow(clippy::cast_precision_loss)]
    fn count(value: usize) -> Self {
        Cell::Number(value as f64)
    }
}

/// A record that can be written as one spreadsheet row.
pub trait TabularRecord {
    fn headers() -> &'static [&'static str];

    /// One cell per header, in header order.
    fn cells(&self) -> Vec<Cell>;
}

impl TabularRecord for ProductRecord {
    fn headers() -> &'static [&'static str] {
        &[
            "Code",
            "CIP13",
            "Nom",
            "Valeur du SMR",
            "Valeur de l'ASMR",
            "Titulaire(s)",
            "type_produit",
            "groupe_racine",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.code),
            Cell::opt(self.sub_code.as_deref()),
            Cell::text(&self.name),
            Cell::opt(self.benefit.as_deref()),
            Cell::opt(self.improvement.as_deref()),
            Cell::opt(self.owner.as_deref()),
            Cell::opt(self.product_type.map(|t| t.source_tag())),
            Cell::opt(self.group.as_deref()),
        ]
    }
}

impl TabularRecord for DrugPresentation {
    fn headers() -> &'static [&'static str] {
        &[
            "Code CIS",
            "CIP13",
            "Dénomination du médicament",
            "Titulaire(s)",
            "Valeur du SMR",
            "Libellé du SMR",
            "Valeur de l'ASMR",
            "Libellé de l'ASMR",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.cis_code),
            Cell::opt(self.cip13.as_deref()),
            Cell::text(&self.name),
            Cell::opt(self.owner.as_deref()),
            Cell::opt(self.smr.as_deref()),
            Cell::opt(self.smr_label.as_deref()),
            Cell::opt(self.asmr.as_deref()),
            Cell::opt(self.asmr_label.as_deref()),
        ]
    }
}

impl TabularRecord for DeviceRecord {
    fn headers() -> &'static [&'static str] {
        &[
            "Code dossier",
            "Nom dispositif",
            "Titulaire(s)",
            "Valeur du SR",
            "Valeur de l'ASR",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.dossier_code),
            Cell::text(&self.name),
            Cell::opt(self.owner.as_deref()),
            Cell::opt(self.sr.as_deref()),
            Cell::opt(self.asr.as_deref()),
        ]
    }
}

impl TabularRecord for RevenueLine {
    fn headers() -> &'static [&'static str] {
        &[
            "Titulaire(s)",
            "Dénomination du médicament",
            "Revenue_USD",
            "CA_groupe",
            "Valeur du SMR",
            "Libellé du SMR",
            "Valeur de l'ASMR",
            "Libellé de l'ASMR",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.owner),
            Cell::text(&self.drug_name),
            Cell::decimal(self.revenue_usd),
            self.group_revenue_usd.map_or(Cell::Empty, Cell::decimal),
            Cell::opt(self.smr.as_deref()),
            Cell::opt(self.smr_label.as_deref()),
            Cell::opt(self.asmr.as_deref()),
            Cell::opt(self.asmr_label.as_deref()),
        ]
    }
}

impl TabularRecord for RevenueShare {
    fn headers() -> &'static [&'static str] {
        &[
            "Titulaire(s)",
            "Dénomination du médicament",
            "Revenue_USD",
            "Part (%)",
            "CA_groupe",
            "Valeur du SMR",
            "Libellé du SMR",
            "Valeur de l'ASMR",
            "Libellé de l'ASMR",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        let mut cells = self.line.cells();
        cells.insert(3, Cell::Number(self.share_percent));
        cells
    }
}

impl TabularRecord for WeightedEntry {
    fn headers() -> &'static [&'static str] {
        &["Groupe", "Poids (%)", "Poids normalisé", "Nb produits"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.group),
            Cell::Number(self.weight),
            Cell::Number(self.normalized_weight),
            Cell::count(self.product_count),
        ]
    }
}

/// Profile rows export the percentage rounded to one decimal.
impl TabularRecord for ProfileEntry {
    fn headers() -> &'static [&'static str] {
        &["Niveau", "Pourcentage (%)"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.label),
            Cell::Number((self.percent * 10.0).round() / 10.0),
        ]
    }
}
