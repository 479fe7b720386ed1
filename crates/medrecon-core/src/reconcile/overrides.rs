//! Converting an edit of a protocol medicine into a custom override.

use crate::config::EngineConfig;
use crate::models::{CustomMedicationItem, MedicationEdits, ProtocolMedicine};

use super::{validate_item, ReconcileError, ReconcileResult};

/// Build the override item for `protocol_med` with `edits` applied.
///
/// The item keeps the protocol medicine's catalog id and line id so it
/// shadows the protocol entry. `medicineId` and `frequency` edits are ignored: overrides
/// always carry the configured default cadence.
pub fn convert_to_override(
    protocol_med: &ProtocolMedicine,
    edits: &MedicationEdits,
    config: &EngineConfig,
) -> ReconcileResult<CustomMedicationItem> {
    let mut item = seed_from_protocol(protocol_med);

    let edits = MedicationEdits {
        medicine_id: None,
        frequency: None,
        ..edits.clone()
    };
    item.apply(&edits);
    item.frequency = Some(config.default_frequency.clone());

    validate_item(&item).map_err(ReconcileError::Validation)?;
    Ok(item)
}

/// A custom item carrying the protocol medicine's values verbatim.
pub fn seed_from_protocol(protocol_med: &ProtocolMedicine) -> CustomMedicationItem {
    CustomMedicationItem {
        medicine_id: protocol_med.medicine_id,
        protocol_medicine_id: Some(protocol_med.protocol_medicine_id),
        medicine_name: protocol_med.name.clone(),
        dosage: protocol_med.dosage.clone(),
        unit: protocol_med.unit.clone(),
        frequency: None,
        duration_value: protocol_med.duration_value,
        duration_unit: protocol_med.duration_unit.clone(),
        schedule: protocol_med.schedule.clone(),
        notes: protocol_med.notes.clone(),
        price: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenofovir() -> ProtocolMedicine {
        ProtocolMedicine {
            protocol_medicine_id: 11,
            medicine_id: Some(7),
            name: "Tenofovir".into(),
            dosage: "1 viên".into(),
            unit: Some("viên".into()),
            duration_value: Some(30),
            duration_unit: Some("DAY".into()),
            schedule: Some("MORNING".into()),
            notes: None,
        }
    }

    #[test]
    fn test_override_seeds_from_protocol() {
        let item = convert_to_override(
            &tenofovir(),
            &MedicationEdits::dosage("2 viên"),
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(item.medicine_id, Some(7));
        assert_eq!(item.protocol_medicine_id, Some(11));
        assert_eq!(item.medicine_name, "Tenofovir");
        assert_eq!(item.dosage, "2 viên");
        assert_eq!(item.duration_value, Some(30));
        assert_eq!(item.schedule.as_deref(), Some("MORNING"));
        assert_eq!(item.frequency.as_deref(), Some("DAILY"));
    }

    #[test]
    fn test_frequency_and_identity_edits_ignored() {
        let edits = MedicationEdits {
            medicine_id: Some(99),
            frequency: Some("TWICE_DAILY".into()),
            ..Default::default()
        };
        let config = EngineConfig {
            default_frequency: "ONCE".into(),
            ..Default::default()
        };

        let item = convert_to_override(&tenofovir(), &edits, &config).unwrap();
        assert_eq!(item.medicine_id, Some(7));
        assert_eq!(item.frequency.as_deref(), Some("ONCE"));
    }

    #[test]
    fn test_missing_unit_fails_validation() {
        let mut med = tenofovir();
        med.unit = None;

        let err = convert_to_override(&med, &MedicationEdits::default(), &EngineConfig::default())
            .unwrap_err();
        match err {
            ReconcileError::Validation(errors) => {
                assert!(errors.contains("unit"));
                assert_eq!(errors.len(), 1);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_edit_can_supply_missing_fields() {
        let mut med = tenofovir();
        med.unit = None;
        med.duration_unit = None;

        let edits = MedicationEdits {
            unit: Some("viên".into()),
            duration_unit: Some("week".into()),
            ..Default::default()
        };
        let item = convert_to_override(&med, &edits, &EngineConfig::default()).unwrap();
        assert_eq!(item.duration_unit.as_deref(), Some("week"));
    }
}
