//! Submission payload for the treatment persistence API.

use serde::{Deserialize, Serialize};

use crate::models::CustomMedicationItem;
use crate::reconcile::{FieldErrors, ReconcileError, ReconcileResult, ReconciliationSession};

/// One custom medication as sent to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedMedication {
    pub medicine_id: u64,
    /// Protocol line an override replaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_medicine_id: Option<u64>,
    pub medicine_name: String,
    pub dosage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_value: Option<u32>,
    /// Upper-cased
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_unit: Option<String>,
    /// Upper-cased
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub frequency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SubmittedMedication {
    pub fn from_item(item: &CustomMedicationItem, default_frequency: &str) -> Self {
        Self {
            medicine_id: item.medicine_id.unwrap_or(0),
            protocol_medicine_id: item.protocol_medicine_id,
            medicine_name: item.medicine_name.clone(),
            dosage: item.dosage.clone(),
            unit: item.unit.clone(),
            duration_value: item.duration_value,
            duration_unit: item.duration_unit.as_deref().map(str::to_uppercase),
            schedule: item.schedule.as_deref().map(str::to_uppercase),
            frequency: item
                .frequency
                .clone()
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| default_frequency.to_string()),
            notes: item.notes.clone(),
        }
    }
}

/// Final treatment plan sent on save.
///
/// Protocol medicines are implied by `protocol_id`; only the custom ledger is
/// listed. Deleted protocol medicines travel in
/// `excluded_protocol_medicine_ids` unless disabled in the session's
/// [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentSubmission {
    pub patient_id: u64,
    pub protocol_id: u64,
    pub doctor_id: u64,
    pub start_date: String,
    /// Empty for open-ended treatment
    pub end_date: String,
    pub notes: String,
    pub custom_medications: Vec<SubmittedMedication>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_protocol_medicine_ids: Vec<u64>,
    /// Sum of custom medication prices
    pub total: f64,
}

impl TreatmentSubmission {
    /// Build the payload for a session.
    pub fn from_session(
        session: &ReconciliationSession,
        patient_id: u64,
        doctor_id: u64,
    ) -> ReconcileResult<Self> {
        let config = session.config();
        let protocol = session.protocol().ok_or(ReconcileError::NoProtocol)?;
        if session.start_date().trim().is_empty() {
            let mut errors = FieldErrors::new();
            errors.add("startDate", "Start date is required");
            return Err(ReconcileError::Validation(errors));
        }

        let items: Vec<&CustomMedicationItem> = session.ledger().iter().map(|e| e.item()).collect();
        let custom_medications = items
            .iter()
            .map(|item| SubmittedMedication::from_item(item, &config.default_frequency))
            .collect();
        let total: f64 = items.iter().filter_map(|item| item.price).sum();

        let excluded_protocol_medicine_ids = if config.serialize_deletions {
            session.excluded_protocol_medicine_ids()
        } else {
            Vec::new()
        };

        tracing::info!(
            session = %session.id(),
            patient_id,
            protocol_id = protocol.id,
            custom = items.len(),
            excluded = excluded_protocol_medicine_ids.len(),
            "Built treatment submission"
        );

        Ok(Self {
            patient_id,
            protocol_id: protocol.id,
            doctor_id,
            start_date: session.start_date().to_string(),
            end_date: session.end_date().to_string(),
            notes: session.notes().to_string(),
            custom_medications,
            excluded_protocol_medicine_ids,
            total,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::models::{MedicationEdits, ProtocolMedicine, TreatmentProtocol};

    fn session() -> ReconciliationSession {
        session_with(EngineConfig::default())
    }

    fn session_with(config: EngineConfig) -> ReconciliationSession {
        let mut protocol = TreatmentProtocol::new(3, "ARV".into());
        protocol.duration_value = Some(2);
        protocol.duration_unit = Some("WEEK".into());
        let mut m1 = ProtocolMedicine::new(11, Some(7), "Tenofovir".into());
        m1.dosage = "1 viên".into();
        m1.unit = Some("viên".into());
        m1.duration_value = Some(14);
        m1.duration_unit = Some("day".into());
        m1.schedule = Some("morning".into());
        protocol.medicines = vec![m1, ProtocolMedicine::new(12, Some(8), "Lamivudine".into())];

        let mut session = ReconciliationSession::new(config);
        session.set_protocol(Some(protocol)).unwrap();
        session.set_start_date("2024-05-01".into()).unwrap();
        session
    }

    #[test]
    fn test_submission_lists_ledger_only() {
        let mut session = session();
        session
            .override_protocol_medicine(0, &MedicationEdits::dosage("2 viên"))
            .unwrap();
        let mut extra = CustomMedicationItem::new("Paracetamol".into(), "1 viên".into());
        extra.unit = Some("viên".into());
        extra.duration_value = Some(3);
        extra.duration_unit = Some("DAY".into());
        extra.price = Some(1500.0);
        session.add_custom(extra).unwrap();
        session.delete_protocol_medicine(1).unwrap();

        let submission = TreatmentSubmission::from_session(&session, 100, 200).unwrap();

        assert_eq!(submission.protocol_id, 3);
        assert_eq!(submission.end_date, "2024-05-15");
        assert_eq!(submission.custom_medications.len(), 2);

        let override_med = &submission.custom_medications[0];
        assert_eq!(override_med.medicine_id, 7);
        assert_eq!(override_med.protocol_medicine_id, Some(11));
        assert_eq!(override_med.duration_unit.as_deref(), Some("DAY"));
        assert_eq!(override_med.schedule.as_deref(), Some("MORNING"));
        assert_eq!(override_med.frequency, "DAILY");

        let addition = &submission.custom_medications[1];
        assert_eq!(addition.medicine_id, 0);
        assert_eq!(addition.protocol_medicine_id, None);
        assert_eq!(addition.frequency, "DAILY");

        assert_eq!(submission.excluded_protocol_medicine_ids, vec![12]);
        assert_eq!(submission.total, 1500.0);
    }

    #[test]
    fn test_deletions_omitted_when_disabled() {
        let mut session = session_with(EngineConfig {
            serialize_deletions: false,
            ..Default::default()
        });
        session.delete_protocol_medicine(1).unwrap();

        let submission = TreatmentSubmission::from_session(&session, 1, 2).unwrap();
        assert!(submission.excluded_protocol_medicine_ids.is_empty());

        let json = submission.to_json().unwrap();
        assert!(!json.contains("excludedProtocolMedicineIds"));
        assert!(json.contains("\"customMedications\": []"));
    }

    #[test]
    fn test_requires_protocol_and_start_date() {
        let empty = ReconciliationSession::new(EngineConfig::default());
        assert_eq!(
            TreatmentSubmission::from_session(&empty, 1, 2),
            Err(ReconcileError::NoProtocol)
        );

        let mut no_start = session();
        no_start.set_start_date(String::new()).unwrap();
        let err = TreatmentSubmission::from_session(&no_start, 1, 2).unwrap_err();
        assert!(matches!(err, ReconcileError::Validation(ref f) if f.contains("startDate")));
    }

    #[test]
    fn test_default_frequency_comes_from_session_config() {
        let mut session = session_with(EngineConfig {
            default_frequency: "TWICE_DAILY".into(),
            ..Default::default()
        });
        let mut extra = CustomMedicationItem::new("Paracetamol".into(), "1 viên".into());
        extra.unit = Some("viên".into());
        extra.duration_value = Some(3);
        extra.duration_unit = Some("DAY".into());
        session.add_custom(extra).unwrap();

        let submission = TreatmentSubmission::from_session(&session, 1, 2).unwrap();
        assert_eq!(submission.custom_medications[0].frequency, "TWICE_DAILY");
    }
}
