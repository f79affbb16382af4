use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::taxonomy::RatingFamily;

/// Kind of regulated product a row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Drug,
    Device,
}

impl ProductType {
    /// Parses the source's `type_produit` tag. Unknown tags yield `None`.
    #[must_use]
    pub fn from_source_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "medicament" => Some(ProductType::Drug),
            "dispositif_medical" => Some(ProductType::Device),
            _ => None,
        }
    }

    #[must_use]
    pub fn source_tag(self) -> &'static str {
        match self {
            ProductType::Drug => "medicament",
            ProductType::Device => "dispositif_medical",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductType::Drug => write!(f, "drug"),
            ProductType::Device => write!(f, "device"),
        }
    }
}

/// Which of the two rating columns a view reads.
///
/// The combined dataset stores SMR and SR in the same "benefit" column and
/// ASMR and ASR in the same "improvement" column; the product type decides
/// which family the raw codes belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingColumn {
    /// SMR for drugs, SR for devices.
    #[default]
    Benefit,
    /// ASMR for drugs, ASR for devices.
    Improvement,
}

impl RatingColumn {
    /// The rating family for this column and product type.
    #[must_use]
    pub fn family(self, product_type: ProductType) -> RatingFamily {
        match (self, product_type) {
            (RatingColumn::Benefit, ProductType::Drug) => RatingFamily::Smr,
            (RatingColumn::Benefit, ProductType::Device) => RatingFamily::Sr,
            (RatingColumn::Improvement, ProductType::Drug) => RatingFamily::Asmr,
            (RatingColumn::Improvement, ProductType::Device) => RatingFamily::Asr,
        }
    }

    /// Display name covering both families, e.g. `"SMR / SR"`.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            RatingColumn::Benefit => "SMR / SR",
            RatingColumn::Improvement => "ASMR / ASR",
        }
    }
}

impl std::str::FromStr for RatingColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "benefit" | "smr" | "sr" => Ok(RatingColumn::Benefit),
            "improvement" | "asmr" | "asr" => Ok(RatingColumn::Improvement),
            other => Err(format!(
                "unknown rating column '{other}'; expected benefit or improvement"
            )),
        }
    }
}

/// One row of the combined drug + device dataset that feeds the group and
/// portfolio views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// CIS code for drugs, HAS dossier code for devices.
    pub code: String,
    /// CIP13 presentation code, when the row has one.
    pub sub_code: Option<String>,
    pub name: String,
    /// Raw SMR (drugs) or SR (devices) code.
    pub benefit: Option<String>,
    /// Raw ASMR (drugs) or ASR (devices) code.
    pub improvement: Option<String>,
    /// Registrant as written in the source, legal-entity suffix included.
    pub owner: Option<String>,
    pub product_type: Option<ProductType>,
    /// Root holding group (`groupe_racine`).
    pub group: Option<String>,
}

impl ProductRecord {
    /// Raw value of the requested rating column.
    #[must_use]
    pub fn rating(&self, column: RatingColumn) -> Option<&str> {
        match column {
            RatingColumn::Benefit => self.benefit.as_deref(),
            RatingColumn::Improvement => self.improvement.as_deref(),
        }
    }

    #[must_use]
    pub fn is_in_group(&self, group: &str) -> bool {
        self.group.as_deref() == Some(group)
    }
}

/// One presentation (CIS + CIP13) from the drug catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugPresentation {
    pub cis_code: String,
    pub cip13: Option<String>,
    pub name: String,
    /// Registrant, already passed through [`crate::canonicalize_owner`].
    pub owner: Option<String>,
    pub smr: Option<String>,
    pub smr_label: Option<String>,
    pub asmr: Option<String>,
    pub asmr_label: Option<String>,
}

/// One medical device from the HAS device dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub dossier_code: String,
    pub name: String,
    pub owner: Option<String>,
    pub sr: Option<String>,
    pub asr: Option<String>,
}

/// Revenue of one drug for one laboratory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueLine {
    pub owner: String,
    pub drug_name: String,
    pub revenue_usd: Decimal,
    /// Group-level revenue (`CA_groupe`), used as a chart ceiling.
    pub group_revenue_usd: Option<Decimal>,
    pub smr: Option<String>,
    pub smr_label: Option<String>,
    pub asmr: Option<String>,
    pub asmr_label: Option<String>,
}
