//! Custom-medication schema checks.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{CustomMedicationItem, DurationUnit};

/// Field-level validation errors, keyed by camelCase field name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field (first message wins).
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// Check an item against the custom-medication schema.
///
/// Required: `medicineName`, `dosage`, `unit`, `durationValue` (> 0) and a
/// valid `durationUnit`.
pub fn validate_item(item: &CustomMedicationItem) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if is_blank(Some(&item.medicine_name)) {
        errors.add("medicineName", "Medicine name is required");
    }
    if is_blank(Some(&item.dosage)) {
        errors.add("dosage", "Dosage is required");
    }
    if is_blank(item.unit.as_deref()) {
        errors.add("unit", "Unit is required");
    }
    match item.duration_value {
        None => errors.add("durationValue", "Duration is required"),
        Some(0) => errors.add("durationValue", "Duration must be greater than 0"),
        Some(_) => {}
    }
    match item.duration_unit.as_deref() {
        None => errors.add("durationUnit", "Duration unit is required"),
        Some(raw) if DurationUnit::parse(raw).is_none() => {
            errors.add("durationUnit", format!("Unknown duration unit: {}", raw))
        }
        Some(_) => {}
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_item() -> CustomMedicationItem {
        CustomMedicationItem {
            medicine_name: "Paracetamol".into(),
            dosage: "1 viên".into(),
            unit: Some("viên".into()),
            duration_value: Some(5),
            duration_unit: Some("DAY".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_item_passes() {
        assert!(validate_item(&valid_item()).is_ok());
    }

    #[test]
    fn test_missing_fields_reported_per_field() {
        let item = CustomMedicationItem::new("   ".into(), String::new());
        let errors = validate_item(&item).unwrap_err();

        assert_eq!(errors.len(), 5);
        assert!(errors.contains("medicineName"));
        assert!(errors.contains("dosage"));
        assert!(errors.contains("unit"));
        assert!(errors.contains("durationValue"));
        assert!(errors.contains("durationUnit"));
    }

    #[test]
    fn test_zero_duration_and_bad_unit() {
        let mut item = valid_item();
        item.duration_value = Some(0);
        item.duration_unit = Some("FORTNIGHT".into());

        let errors = validate_item(&item).unwrap_err();
        assert_eq!(errors.get("durationValue"), Some("Duration must be greater than 0"));
        assert_eq!(errors.get("durationUnit"), Some("Unknown duration unit: FORTNIGHT"));
    }

    #[test]
    fn test_lowercase_unit_accepted() {
        let mut item = valid_item();
        item.duration_unit = Some("week".into());
        assert!(validate_item(&item).is_ok());
    }

    #[test]
    fn test_display_lists_fields_in_order() {
        let mut errors = FieldErrors::new();
        errors.add("unit", "Unit is required");
        errors.add("dosage", "Dosage is required");
        errors.add("dosage", "ignored");
        assert_eq!(errors.to_string(), "dosage: Dosage is required; unit: Unit is required");
    }
}
