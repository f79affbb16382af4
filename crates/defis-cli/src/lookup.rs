//! `drug` and `device` commands: option lists and exact-match lookups.

use std::path::Path;

use defis_analytics::{
    device_options, drug_options, lookup_device, lookup_drug, DeviceKey, DrugKey,
};
use defis_loader::DatasetRepository;

use crate::output::{export_rows, opt, truncate};

/// Prints the matching presentations, or the option list without a value.
///
/// # Errors
///
/// Returns an error if the catalogue cannot be loaded or exported.
pub(crate) async fn run_drug(
    repo: &DatasetRepository,
    key: DrugKey,
    value: Option<&str>,
    export: Option<&Path>,
) -> anyhow::Result<()> {
    let catalogue = repo.catalogue().await?;

    let Some(value) = value else {
        for option in drug_options(&catalogue, key) {
            println!("{option}");
        }
        return Ok(());
    };

    let lookup = lookup_drug(&catalogue, key, value);
    if lookup.presentations.is_empty() {
        println!("no presentation matches '{value}'");
        return Ok(());
    }

    println!("Présentations: {}", lookup.presentation_count);
    println!(
        "SMR: {}  ASMR: {}",
        opt(lookup.smr.as_deref()),
        opt(lookup.asmr.as_deref())
    );
    println!();
    println!(
        "{:<10}{:<15}{:<42}{:<22}{:<12}ASMR",
        "CIS", "CIP13", "DÉNOMINATION", "TITULAIRE", "SMR"
    );
    for p in &lookup.presentations {
        println!(
            "{:<10}{:<15}{:<42}{:<22}{:<12}{}",
            p.cis_code,
            opt(p.cip13.as_deref()),
            truncate(&p.name, 38),
            truncate(opt(p.owner.as_deref()), 20),
            opt(p.smr.as_deref()),
            opt(p.asmr.as_deref())
        );
    }

    export_rows(export, &lookup.presentations, "Médicament", "medicament", Some(value))
}

/// Prints the matching devices, or the option list without a value.
///
/// # Errors
///
/// Returns an error if the device dataset cannot be loaded or exported.
pub(crate) async fn run_device(
    repo: &DatasetRepository,
    key: DeviceKey,
    value: Option<&str>,
    export: Option<&Path>,
) -> anyhow::Result<()> {
    let devices = repo.devices().await?;

    let Some(value) = value else {
        for option in device_options(&devices, key) {
            println!("{option}");
        }
        return Ok(());
    };

    let lookup = lookup_device(&devices, key, value);
    if lookup.devices.is_empty() {
        println!("no device matches '{value}'");
        return Ok(());
    }

    println!("{:<14}{:<42}{:<22}{:<14}ASR", "DOSSIER", "NOM", "TITULAIRE", "SR");
    for d in &lookup.devices {
        println!(
            "{:<14}{:<42}{:<22}{:<14}{}",
            d.dossier_code,
            truncate(&d.name, 38),
            truncate(opt(d.owner.as_deref()), 20),
            opt(d.sr.as_deref()),
            opt(d.asr.as_deref())
        );
    }

    export_rows(export, &lookup.devices, "Dispositif", "dispositif", Some(value))
}
