//! Clinician-owned custom medication items.

use serde::{Deserialize, Serialize};

use super::Medicine;

/// A custom medication: either a clinician addition or an override of a
/// protocol medicine (same shape, role decided by identity).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomMedicationItem {
    /// Catalog medicine id (absent or zero for free-text additions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medicine_id: Option<u64>,
    /// Protocol line this item replaces, kept so an override of a line
    /// without a catalog id still matches it after a reload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_medicine_id: Option<u64>,
    pub medicine_name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_value: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl CustomMedicationItem {
    /// Create an item with name and dosage; everything else unset.
    pub fn new(medicine_name: String, dosage: String) -> Self {
        Self {
            medicine_name,
            dosage,
            ..Default::default()
        }
    }

    /// Seed an addition from a catalog medicine.
    pub fn from_medicine(medicine: &Medicine) -> Self {
        Self {
            medicine_id: Some(medicine.id),
            medicine_name: medicine.name.clone(),
            dosage: medicine.dose.clone(),
            unit: Some(medicine.unit.clone()).filter(|u| !u.is_empty()),
            price: Some(medicine.price),
            ..Default::default()
        }
    }

    /// Apply a set of partial edits on top of this item.
    pub fn apply(&mut self, edits: &MedicationEdits) {
        if let Some(id) = edits.medicine_id {
            self.medicine_id = Some(id);
        }
        if let Some(name) = &edits.medicine_name {
            self.medicine_name = name.clone();
        }
        if let Some(dosage) = &edits.dosage {
            self.dosage = dosage.clone();
        }
        if let Some(unit) = &edits.unit {
            self.unit = Some(unit.clone());
        }
        if let Some(frequency) = &edits.frequency {
            self.frequency = Some(frequency.clone());
        }
        if let Some(value) = edits.duration_value {
            self.duration_value = Some(value);
        }
        if let Some(unit) = &edits.duration_unit {
            self.duration_unit = Some(unit.clone());
        }
        if let Some(schedule) = &edits.schedule {
            self.schedule = Some(schedule.clone());
        }
        if let Some(notes) = &edits.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(price) = edits.price {
            self.price = Some(price);
        }
    }
}

/// Partial edits to a custom medication item. `None` leaves a field as is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicationEdits {
    pub medicine_id: Option<u64>,
    pub medicine_name: Option<String>,
    pub dosage: Option<String>,
    pub unit: Option<String>,
    pub frequency: Option<String>,
    pub duration_value: Option<u32>,
    pub duration_unit: Option<String>,
    pub schedule: Option<String>,
    pub notes: Option<String>,
    pub price: Option<f64>,
}

impl MedicationEdits {
    /// Edits that only change the dosage.
    pub fn dosage(dosage: impl Into<String>) -> Self {
        Self {
            dosage: Some(dosage.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_touches_set_fields() {
        let mut item = CustomMedicationItem::new("Paracetamol".into(), "1 viên".into());
        item.unit = Some("viên".into());

        item.apply(&MedicationEdits::dosage("2 viên"));

        assert_eq!(item.dosage, "2 viên");
        assert_eq!(item.medicine_name, "Paracetamol");
        assert_eq!(item.unit.as_deref(), Some("viên"));
    }

    #[test]
    fn test_from_medicine() {
        let mut medicine = Medicine::new(5, "Amoxicillin".into(), "viên".into());
        medicine.dose = "500mg".into();
        medicine.price = 1200.0;

        let item = CustomMedicationItem::from_medicine(&medicine);
        assert_eq!(item.medicine_id, Some(5));
        assert_eq!(item.dosage, "500mg");
        assert_eq!(item.unit.as_deref(), Some("viên"));
        assert_eq!(item.price, Some(1200.0));
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let item = CustomMedicationItem::new("Paracetamol".into(), "1 viên".into());
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"medicineName":"Paracetamol","dosage":"1 viên"}"#);
    }
}
