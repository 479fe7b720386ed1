//! Catalog and treatment payload parsing.
//!
//! Payloads may arrive bare or wrapped in a `{ "data": ... }` envelope, and
//! ids may be numbers or numeric strings.

use medrecon_core::models::{
    CustomMedicationItem, Medicine, PersistedTreatment, ProtocolMedicine, TreatmentProtocol,
};
use medrecon_core::InMemoryCatalog;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Invalid payload: {0}")]
    InvalidFormat(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// An id or count sent either as a number or as a numeric string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FlexNumber {
    Int(u64),
    Float(f64),
    Text(String),
}

impl FlexNumber {
    pub fn to_u64(&self) -> CatalogResult<u64> {
        match self {
            FlexNumber::Int(n) => Ok(*n),
            FlexNumber::Float(f) if f.fract() == 0.0 && *f >= 0.0 => Ok(*f as u64),
            FlexNumber::Float(f) => Err(CatalogError::InvalidId(f.to_string())),
            FlexNumber::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| CatalogError::InvalidId(s.clone())),
        }
    }

    pub fn to_u32(&self) -> CatalogResult<u32> {
        let value = self.to_u64()?;
        u32::try_from(value).map_err(|_| CatalogError::InvalidId(value.to_string()))
    }

    pub fn to_f64(&self) -> CatalogResult<f64> {
        match self {
            FlexNumber::Int(n) => Ok(*n as f64),
            FlexNumber::Float(f) => Ok(*f),
            FlexNumber::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| CatalogError::InvalidFormat(format!("not a number: {}", s))),
        }
    }
}

fn opt_u64(value: &Option<FlexNumber>) -> CatalogResult<Option<u64>> {
    value.as_ref().map(FlexNumber::to_u64).transpose()
}

fn opt_u32(value: &Option<FlexNumber>) -> CatalogResult<Option<u32>> {
    value.as_ref().map(FlexNumber::to_u32).transpose()
}

/// Protocol medicine as sent by the catalog API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProtocolMedicine {
    #[serde(alias = "id")]
    pub protocol_medicine_id: FlexNumber,
    #[serde(default)]
    pub medicine_id: Option<FlexNumber>,
    #[serde(alias = "medicineName")]
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub duration_value: Option<FlexNumber>,
    #[serde(default)]
    pub duration_unit: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RawProtocolMedicine {
    pub fn into_model(self) -> CatalogResult<ProtocolMedicine> {
        Ok(ProtocolMedicine {
            protocol_medicine_id: self.protocol_medicine_id.to_u64()?,
            medicine_id: opt_u64(&self.medicine_id)?,
            name: self.name,
            dosage: self.dosage.unwrap_or_default(),
            unit: self.unit,
            duration_value: opt_u32(&self.duration_value)?,
            duration_unit: self.duration_unit,
            schedule: self.schedule,
            notes: self.notes,
        })
    }
}

/// Treatment protocol as sent by the catalog API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProtocol {
    pub id: FlexNumber,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_disease: Option<String>,
    #[serde(default)]
    pub duration_value: Option<FlexNumber>,
    #[serde(default)]
    pub duration_unit: Option<String>,
    #[serde(default)]
    pub medicines: Vec<RawProtocolMedicine>,
}

impl RawProtocol {
    pub fn into_model(self) -> CatalogResult<TreatmentProtocol> {
        let medicines = self
            .medicines
            .into_iter()
            .map(RawProtocolMedicine::into_model)
            .collect::<CatalogResult<Vec<_>>>()?;
        Ok(TreatmentProtocol {
            id: self.id.to_u64()?,
            name: self.name,
            description: self.description,
            target_disease: self.target_disease,
            duration_value: opt_u32(&self.duration_value)?,
            duration_unit: self.duration_unit,
            medicines,
        })
    }
}

/// Catalog medicine as sent by the catalog API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMedicine {
    pub id: FlexNumber,
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub dose: Option<String>,
    #[serde(default)]
    pub price: Option<FlexNumber>,
}

impl RawMedicine {
    pub fn into_model(self) -> CatalogResult<Medicine> {
        Ok(Medicine {
            id: self.id.to_u64()?,
            name: self.name,
            unit: self.unit.unwrap_or_default(),
            dose: self.dose.unwrap_or_default(),
            price: self.price.as_ref().map(FlexNumber::to_f64).transpose()?.unwrap_or(0.0),
        })
    }
}

/// Custom medication as stored with a treatment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCustomMedication {
    #[serde(default)]
    pub medicine_id: Option<FlexNumber>,
    #[serde(default)]
    pub protocol_medicine_id: Option<FlexNumber>,
    pub medicine_name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub duration_value: Option<FlexNumber>,
    #[serde(default)]
    pub duration_unit: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub price: Option<FlexNumber>,
}

impl RawCustomMedication {
    pub fn into_model(self) -> CatalogResult<CustomMedicationItem> {
        Ok(CustomMedicationItem {
            medicine_id: opt_u64(&self.medicine_id)?,
            protocol_medicine_id: opt_u64(&self.protocol_medicine_id)?,
            medicine_name: self.medicine_name,
            dosage: self.dosage.unwrap_or_default(),
            unit: self.unit,
            frequency: self.frequency,
            duration_value: opt_u32(&self.duration_value)?,
            duration_unit: self.duration_unit,
            schedule: self.schedule,
            notes: self.notes,
            price: self.price.as_ref().map(FlexNumber::to_f64).transpose()?,
        })
    }
}

/// Treatment record as returned by the persistence API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTreatment {
    pub protocol_id: FlexNumber,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub custom_medications: Vec<RawCustomMedication>,
    #[serde(default)]
    pub is_ended: bool,
    #[serde(default)]
    pub excluded_protocol_medicine_ids: Vec<FlexNumber>,
}

impl RawTreatment {
    pub fn into_model(self) -> CatalogResult<PersistedTreatment> {
        let custom_medications = self
            .custom_medications
            .into_iter()
            .map(RawCustomMedication::into_model)
            .collect::<CatalogResult<Vec<_>>>()?;
        let excluded_protocol_medicine_ids = self
            .excluded_protocol_medicine_ids
            .iter()
            .map(FlexNumber::to_u64)
            .collect::<CatalogResult<Vec<_>>>()?;
        Ok(PersistedTreatment {
            protocol_id: self.protocol_id.to_u64()?,
            start_date: self.start_date.unwrap_or_default(),
            end_date: self.end_date.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
            custom_medications,
            is_ended: self.is_ended,
            excluded_protocol_medicine_ids,
        })
    }
}

/// Protocols and medicines in one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCatalogBundle {
    #[serde(default)]
    pub protocols: Vec<RawProtocol>,
    #[serde(default)]
    pub medicines: Vec<RawMedicine>,
}

/// Strip a `{ "data": ... }` envelope if present, then deserialize.
fn parse_enveloped<T: DeserializeOwned>(json: &str) -> CatalogResult<T> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let inner = match value {
        serde_json::Value::Object(mut map) if map.contains_key("data") => map
            .remove("data")
            .ok_or_else(|| CatalogError::InvalidFormat("empty data envelope".into()))?,
        other => other,
    };
    Ok(serde_json::from_value(inner)?)
}

/// Parse one protocol with its medicines.
pub fn parse_protocol(json: &str) -> CatalogResult<TreatmentProtocol> {
    parse_enveloped::<RawProtocol>(json)?.into_model()
}

/// Parse a protocol list.
pub fn parse_protocols(json: &str) -> CatalogResult<Vec<TreatmentProtocol>> {
    parse_enveloped::<Vec<RawProtocol>>(json)?
        .into_iter()
        .map(RawProtocol::into_model)
        .collect()
}

/// Parse the medicine catalog.
pub fn parse_medicines(json: &str) -> CatalogResult<Vec<Medicine>> {
    parse_enveloped::<Vec<RawMedicine>>(json)?
        .into_iter()
        .map(RawMedicine::into_model)
        .collect()
}

/// Parse a persisted treatment record.
pub fn parse_treatment(json: &str) -> CatalogResult<PersistedTreatment> {
    parse_enveloped::<RawTreatment>(json)?.into_model()
}

/// Parse a `{ "protocols": [...], "medicines": [...] }` document into a catalog.
pub fn parse_catalog_bundle(json: &str) -> CatalogResult<InMemoryCatalog> {
    let bundle: RawCatalogBundle = parse_enveloped(json)?;
    let protocols = bundle
        .protocols
        .into_iter()
        .map(RawProtocol::into_model)
        .collect::<CatalogResult<Vec<_>>>()?;
    let medicines = bundle
        .medicines
        .into_iter()
        .map(RawMedicine::into_model)
        .collect::<CatalogResult<Vec<_>>>()?;
    tracing::debug!(
        protocols = protocols.len(),
        medicines = medicines.len(),
        "Loaded catalog bundle"
    );
    Ok(InMemoryCatalog::new(protocols, medicines))
}
