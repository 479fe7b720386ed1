//! Persisted treatment records (the editing entry point).

use serde::{Deserialize, Serialize};

use super::CustomMedicationItem;

/// A previously saved treatment, replayed into a session when editing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTreatment {
    pub protocol_id: u64,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub custom_medications: Vec<CustomMedicationItem>,
    /// Treatment has ended; the plan is read-only
    #[serde(default)]
    pub is_ended: bool,
    /// Protocol-medicine ids the clinician removed from the plan
    #[serde(default)]
    pub excluded_protocol_medicine_ids: Vec<u64>,
}
