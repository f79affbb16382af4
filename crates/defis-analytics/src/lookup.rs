//! Exact-match product lookup in the drug catalogue and the device dataset.

use std::collections::BTreeSet;
use std::str::FromStr;

use defis_core::{DeviceRecord, DrugPresentation};
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrugKey {
    Name,
    Cis,
    Cip13,
}

impl DrugKey {
    fn value(self, p: &DrugPresentation) -> Option<&str> {
        let value = match self {
            DrugKey::Name => Some(p.name.as_str()),
            DrugKey::Cis => Some(p.cis_code.as_str()),
            DrugKey::Cip13 => p.cip13.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}

impl FromStr for DrugKey {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(DrugKey::Name),
            "cis" => Ok(DrugKey::Cis),
            "cip13" => Ok(DrugKey::Cip13),
            _ => Err(AnalyticsError::InvalidKey(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKey {
    Name,
    Dossier,
}

impl DeviceKey {
    fn value(self, d: &DeviceRecord) -> Option<&str> {
        let value = match self {
            DeviceKey::Name => d.name.as_str(),
            DeviceKey::Dossier => d.dossier_code.as_str(),
        };
        (!value.is_empty()).then_some(value)
    }
}

impl FromStr for DeviceKey {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(DeviceKey::Name),
            "dossier" => Ok(DeviceKey::Dossier),
            _ => Err(AnalyticsError::InvalidKey(s.to_owned())),
        }
    }
}

fn sorted_distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Values a drug can be looked up by, sorted and distinct.
#[must_use]
pub fn drug_options(catalogue: &[DrugPresentation], key: DrugKey) -> Vec<String> {
    sorted_distinct(catalogue.iter().filter_map(|p| key.value(p)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugLookup {
    pub key: DrugKey,
    pub value: String,
    pub presentation_count: usize,
    /// First non-blank SMR among the matches.
    pub smr: Option<String>,
    /// First non-blank ASMR among the matches.
    pub asmr: Option<String>,
    pub presentations: Vec<DrugPresentation>,
}

#[must_use]
pub fn lookup_drug(catalogue: &[DrugPresentation], key: DrugKey, value: &str) -> DrugLookup {
    let presentations: Vec<DrugPresentation> = catalogue
        .iter()
        .filter(|p| key.value(p) == Some(value))
        .cloned()
        .collect();
    let smr = presentations.iter().find_map(|p| p.smr.clone());
    let asmr = presentations.iter().find_map(|p| p.asmr.clone());
    DrugLookup {
        key,
        value: value.to_owned(),
        presentation_count: presentations.len(),
        smr,
        asmr,
        presentations,
    }
}

/// Values a device can be looked up by, sorted and distinct.
#[must_use]
pub fn device_options(devices: &[DeviceRecord], key: DeviceKey) -> Vec<String> {
    sorted_distinct(devices.iter().filter_map(|d| key.value(d)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceLookup {
    pub key: DeviceKey,
    pub value: String,
    pub count: usize,
    pub devices: Vec<DeviceRecord>,
}

/// Devices matching `value`. Dossier codes are compared as text, ignoring
/// surrounding whitespace in the query.
#[must_use]
pub fn lookup_device(devices: &[DeviceRecord], key: DeviceKey, value: &str) -> DeviceLookup {
    let needle = match key {
        DeviceKey::Dossier => value.trim(),
        DeviceKey::Name => value,
    };
    let matches: Vec<DeviceRecord> = devices
        .iter()
        .filter(|d| key.value(d) == Some(needle))
        .cloned()
        .collect();
    DeviceLookup {
        key,
        value: value.to_owned(),
        count: matches.len(),
        devices: matches,
    }
}
