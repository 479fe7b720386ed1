//! Treatment protocol models (catalog-owned, read-only).

use serde::{Deserialize, Serialize};

/// Unit of a treatment or medication duration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum DurationUnit {
    Day,
    Week,
    Month,
    Year,
}

impl DurationUnit {
    /// Parse one of the four duration literals (case-insensitive).
    ///
    /// Anything else, including an empty string, yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "DAY" => Some(DurationUnit::Day),
            "WEEK" => Some(DurationUnit::Week),
            "MONTH" => Some(DurationUnit::Month),
            "YEAR" => Some(DurationUnit::Year),
            _ => None,
        }
    }

    /// Wire literal for this unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Day => "DAY",
            DurationUnit::Week => "WEEK",
            DurationUnit::Month => "MONTH",
            DurationUnit::Year => "YEAR",
        }
    }
}

/// A medicine line inside a treatment protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolMedicine {
    /// Row id of this line within the protocol
    pub protocol_medicine_id: u64,
    /// Catalog medicine id (may be absent on legacy protocols)
    #[serde(default)]
    pub medicine_id: Option<u64>,
    /// Display name
    pub name: String,
    /// Dosage text (e.g., "1 viên", "500mg")
    #[serde(default)]
    pub dosage: String,
    /// Dispensing unit, when the protocol lists one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Duration amount
    #[serde(default)]
    pub duration_value: Option<u32>,
    /// Duration unit literal as stored in the catalog
    #[serde(default)]
    pub duration_unit: Option<String>,
    /// Schedule (e.g., "MORNING", "EVENING")
    #[serde(default)]
    pub schedule: Option<String>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl ProtocolMedicine {
    /// Create a protocol medicine with required fields.
    pub fn new(protocol_medicine_id: u64, medicine_id: Option<u64>, name: String) -> Self {
        Self {
            protocol_medicine_id,
            medicine_id,
            name,
            dosage: String::new(),
            unit: None,
            duration_value: None,
            duration_unit: None,
            schedule: None,
            notes: None,
        }
    }
}

/// A treatment protocol: a named, ordered list of medicines for a disease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentProtocol {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_disease: Option<String>,
    /// Overall treatment duration amount
    #[serde(default)]
    pub duration_value: Option<u32>,
    /// Overall treatment duration unit literal
    #[serde(default)]
    pub duration_unit: Option<String>,
    /// Medicines in protocol order
    #[serde(default)]
    pub medicines: Vec<ProtocolMedicine>,
}

impl TreatmentProtocol {
    /// Create an empty protocol.
    pub fn new(id: u64, name: String) -> Self {
        Self {
            id,
            name,
            description: None,
            target_disease: None,
            duration_value: None,
            duration_unit: None,
            medicines: Vec::new(),
        }
    }

    /// Overall duration, if both parts are present and the unit is valid.
    pub fn duration(&self) -> Option<(u32, DurationUnit)> {
        let value = self.duration_value?;
        let unit = DurationUnit::parse(self.duration_unit.as_deref()?)?;
        Some((value, unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_unit_parse() {
        assert_eq!(DurationUnit::parse("DAY"), Some(DurationUnit::Day));
        assert_eq!(DurationUnit::parse("week"), Some(DurationUnit::Week));
        assert_eq!(DurationUnit::parse(" Month "), Some(DurationUnit::Month));
        assert_eq!(DurationUnit::parse("YEAR"), Some(DurationUnit::Year));
        assert_eq!(DurationUnit::parse("FORTNIGHT"), None);
        assert_eq!(DurationUnit::parse(""), None);
    }

    #[test]
    fn test_protocol_duration_requires_both_parts() {
        let mut protocol = TreatmentProtocol::new(1, "HIV first line".into());
        assert_eq!(protocol.duration(), None);

        protocol.duration_value = Some(3);
        assert_eq!(protocol.duration(), None);

        protocol.duration_unit = Some("MONTH".into());
        assert_eq!(protocol.duration(), Some((3, DurationUnit::Month)));

        protocol.duration_unit = Some("LIFETIME".into());
        assert_eq!(protocol.duration(), None);
    }

    #[test]
    fn test_protocol_medicine_deserialize_camel_case() {
        let json = r#"{
            "protocolMedicineId": 11,
            "medicineId": 7,
            "name": "Tenofovir",
            "dosage": "1 viên",
            "durationValue": 30,
            "durationUnit": "DAY",
            "schedule": "MORNING"
        }"#;
        let med: ProtocolMedicine = serde_json::from_str(json).unwrap();
        assert_eq!(med.protocol_medicine_id, 11);
        assert_eq!(med.medicine_id, Some(7));
        assert_eq!(med.dosage, "1 viên");
        assert_eq!(med.unit, None);
        assert_eq!(med.notes, None);
    }
}
