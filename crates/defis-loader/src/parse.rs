//! Typed parsing of the four datasets from a [`RawTable`].

use std::collections::HashSet;
use std::str::FromStr;

use defis_core::{
    canonicalize_owner, DeviceRecord, DrugPresentation, ProductRecord, ProductType, RevenueLine,
};
use rust_decimal::Decimal;

use crate::error::LoadError;
use crate::table::RawTable;

pub const COL_CIS: &str = "Code CIS";
pub const COL_CIP13: &str = "CIP13";
pub const COL_DRUG_NAME: &str = "Dénomination du médicament";
pub const COL_OWNER: &str = "Titulaire(s)";
pub const COL_SMR: &str = "Valeur du SMR";
pub const COL_SMR_LABEL: &str = "Libellé du SMR";
pub const COL_ASMR: &str = "Valeur de l'ASMR";
pub const COL_ASMR_LABEL: &str = "Libellé de l'ASMR";
pub const COL_REVENUE: &str = "Revenue_USD";
pub const COL_GROUP_REVENUE: &str = "CA_groupe";
pub const COL_DOSSIER: &str = "Code dossier";
pub const COL_DEVICE_NAME: &str = "Nom dispositif";
pub const COL_SR: &str = "Valeur du SR";
pub const COL_ASR: &str = "Valeur de l'ASR";
pub const COL_GROUP: &str = "groupe_racine";
pub const COL_PRODUCT_TYPE: &str = "type_produit";

fn owned(cell: Option<&str>) -> Option<String> {
    cell.map(str::to_owned)
}

/// Keeps the first row for each key. Rows whose key is `None` are always kept.
fn dedup_first<T, K, F>(rows: Vec<T>, dataset: &str, key: F) -> Vec<T>
where
    K: Eq + std::hash::Hash,
    F: Fn(&T) -> Option<K>,
{
    let before = rows.len();
    let mut seen = HashSet::new();
    let kept: Vec<T> = rows
        .into_iter()
        .filter(|row| key(row).is_none_or(|k| seen.insert(k)))
        .collect();
    let dropped = before - kept.len();
    if dropped > 0 {
        tracing::info!(dataset, dropped, kept = kept.len(), "dropped duplicate rows");
    }
    kept
}

/// Parses a revenue figure. Blank is zero; scientific notation is accepted.
fn parse_decimal(
    table: &RawTable,
    row: usize,
    column: &str,
    raw: Option<&str>,
) -> Result<Option<Decimal>, LoadError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map(Some)
        .map_err(|_| LoadError::InvalidValue {
            dataset: table.dataset().to_owned(),
            row: row + 1,
            column: column.to_owned(),
            value: raw.to_owned(),
        })
}

/// Drug catalogue: owners canonicalized, deduplicated on (CIS, CIP13).
///
/// # Errors
///
/// Returns [`LoadError::MissingColumn`] if a required column is absent.
pub fn parse_catalogue(table: &RawTable) -> Result<Vec<DrugPresentation>, LoadError> {
    let cis = table.column(COL_CIS)?;
    let cip13 = table.column(COL_CIP13)?;
    let name = table.column(COL_DRUG_NAME)?;
    let owner = table.column(COL_OWNER)?;
    let smr = table.optional_column(COL_SMR);
    let smr_label = table.optional_column(COL_SMR_LABEL);
    let asmr = table.optional_column(COL_ASMR);
    let asmr_label = table.optional_column(COL_ASMR_LABEL);

    let rows = (0..table.len())
        .map(|r| DrugPresentation {
            cis_code: table.cell(r, cis).unwrap_or_default().to_owned(),
            cip13: owned(table.cell(r, cip13)),
            name: table.cell(r, name).unwrap_or_default().to_owned(),
            owner: table.cell(r, owner).map(|o| canonicalize_owner(o).to_owned()),
            smr: owned(table.optional_cell(r, smr)),
            smr_label: owned(table.optional_cell(r, smr_label)),
            asmr: owned(table.optional_cell(r, asmr)),
            asmr_label: owned(table.optional_cell(r, asmr_label)),
        })
        .collect();

    Ok(dedup_first(rows, table.dataset(), |p: &DrugPresentation| {
        (!p.cis_code.is_empty()).then(|| (p.cis_code.clone(), p.cip13.clone()))
    }))
}

/// Revenue per drug. Rows without a laboratory are skipped.
///
/// # Errors
///
/// - [`LoadError::MissingColumn`] if a required column is absent.
/// - [`LoadError::InvalidValue`] if a revenue cell is not a number.
pub fn parse_revenue(table: &RawTable) -> Result<Vec<RevenueLine>, LoadError> {
    let owner = table.column(COL_OWNER)?;
    let name = table.column(COL_DRUG_NAME)?;
    let revenue = table.column(COL_REVENUE)?;
    let group_revenue = table.optional_column(COL_GROUP_REVENUE);
    let smr = table.optional_column(COL_SMR);
    let smr_label = table.optional_column(COL_SMR_LABEL);
    let asmr = table.optional_column(COL_ASMR);
    let asmr_label = table.optional_column(COL_ASMR_LABEL);

    let mut lines = Vec::with_capacity(table.len());
    let mut skipped = 0usize;
    for r in 0..table.len() {
        let Some(lab) = table.cell(r, owner) else {
            skipped += 1;
            continue;
        };
        let revenue_usd =
            parse_decimal(table, r, COL_REVENUE, table.cell(r, revenue))?.unwrap_or(Decimal::ZERO);
        let group_revenue_usd = parse_decimal(
            table,
            r,
            COL_GROUP_REVENUE,
            table.optional_cell(r, group_revenue),
        )?;
        lines.push(RevenueLine {
            owner: lab.to_owned(),
            drug_name: table.cell(r, name).unwrap_or_default().to_owned(),
            revenue_usd,
            group_revenue_usd,
            smr: owned(table.optional_cell(r, smr)),
            smr_label: owned(table.optional_cell(r, smr_label)),
            asmr: owned(table.optional_cell(r, asmr)),
            asmr_label: owned(table.optional_cell(r, asmr_label)),
        });
    }
    if skipped > 0 {
        tracing::debug!(skipped, "revenue rows without laboratory skipped");
    }
    Ok(lines)
}

/// HAS device dossiers. SR, ASR and owner columns are optional.
///
/// # Errors
///
/// Returns [`LoadError::MissingColumn`] if a required column is absent.
pub fn parse_devices(table: &RawTable) -> Result<Vec<DeviceRecord>, LoadError> {
    let dossier = table.column(COL_DOSSIER)?;
    let name = table.column(COL_DEVICE_NAME)?;
    let owner = table.optional_column(COL_OWNER);
    let sr = table.optional_column(COL_SR);
    let asr = table.optional_column(COL_ASR);

    Ok((0..table.len())
        .map(|r| DeviceRecord {
            dossier_code: table.cell(r, dossier).unwrap_or_default().trim().to_owned(),
            name: table.cell(r, name).unwrap_or_default().to_owned(),
            owner: owned(table.optional_cell(r, owner)),
            sr: owned(table.optional_cell(r, sr)),
            asr: owned(table.optional_cell(r, asr)),
        })
        .collect())
}

/// Combined drug and device dataset, deduplicated on (code, sub-code).
///
/// The identifier is the CIS code, or the dossier code for device rows; at
/// least one of the two columns must exist.
///
/// # Errors
///
/// Returns [`LoadError::MissingColumn`] if a required column is absent.
pub fn parse_products(table: &RawTable) -> Result<Vec<ProductRecord>, LoadError> {
    let cis = table.optional_column(COL_CIS);
    let dossier = table.optional_column(COL_DOSSIER);
    if cis.is_none() && dossier.is_none() {
        table.column(COL_CIS)?;
    }
    let sub_code = table.optional_column(COL_CIP13);
    let drug_name = table.optional_column(COL_DRUG_NAME);
    let device_name = table.optional_column(COL_DEVICE_NAME);
    let benefit = table.column(COL_SMR)?;
    let improvement = table.column(COL_ASMR)?;
    let owner = table.optional_column(COL_OWNER);
    let product_type = table.column(COL_PRODUCT_TYPE)?;
    let group = table.column(COL_GROUP)?;

    let mut unknown_types = 0usize;
    let rows = (0..table.len())
        .map(|r| {
            let tag = table.cell(r, product_type);
            let parsed_type = tag.and_then(ProductType::from_source_tag);
            if tag.is_some() && parsed_type.is_none() {
                unknown_types += 1;
            }
            ProductRecord {
                code: table
                    .optional_cell(r, cis)
                    .or_else(|| table.optional_cell(r, dossier))
                    .unwrap_or_default()
                    .trim()
                    .to_owned(),
                sub_code: owned(table.optional_cell(r, sub_code)),
                name: table
                    .optional_cell(r, drug_name)
                    .or_else(|| table.optional_cell(r, device_name))
                    .unwrap_or_default()
                    .to_owned(),
                benefit: owned(table.cell(r, benefit)),
                improvement: owned(table.cell(r, improvement)),
                owner: owned(table.optional_cell(r, owner)),
                product_type: parsed_type,
                group: owned(table.cell(r, group)),
            }
        })
        .collect();
    if unknown_types > 0 {
        tracing::warn!(unknown_types, "product rows with an unrecognised type_produit");
    }

    Ok(dedup_first(rows, table.dataset(), |p: &ProductRecord| {
        (!p.code.is_empty()).then(|| (p.code.clone(), p.sub_code.clone()))
    }))
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
