//! Merge of protocol medicines and the custom ledger into the effective list.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{CustomMedicationItem, IdentityKey, ProtocolMedicine, TreatmentProtocol};

use super::{CustomLedger, DeletionTracker, ReconciliationSession};

/// One row of the effective medication list.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MedicationEntry {
    Protocol {
        /// Index in the protocol's medicine list
        index: usize,
        #[serde(flatten)]
        medicine: ProtocolMedicine,
    },
    Custom {
        /// Index in the custom ledger
        #[serde(rename = "ledgerIndex")]
        ledger_index: usize,
        /// Ledger identity; for an override, the key of the protocol line it replaces
        key: IdentityKey,
        /// Whether this row replaces a protocol medicine
        #[serde(rename = "isOverride")]
        is_override: bool,
        #[serde(flatten)]
        item: CustomMedicationItem,
    },
}

impl MedicationEntry {
    pub fn key(&self) -> IdentityKey {
        match self {
            MedicationEntry::Protocol { medicine, .. } => IdentityKey::of_protocol(medicine),
            MedicationEntry::Custom { key, .. } => key.clone(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MedicationEntry::Protocol { medicine, .. } => &medicine.name,
            MedicationEntry::Custom { item, .. } => &item.medicine_name,
        }
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, MedicationEntry::Protocol { .. })
    }
}

/// Counts shown on the list badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EffectiveCounts {
    pub protocol: usize,
    pub custom: usize,
    pub total: usize,
}

impl EffectiveCounts {
    pub fn of(entries: &[MedicationEntry]) -> Self {
        let protocol = entries.iter().filter(|e| e.is_protocol()).count();
        Self {
            protocol,
            custom: entries.len() - protocol,
            total: entries.len(),
        }
    }
}

/// Effective medication list for a session.
pub fn resolve(session: &ReconciliationSession) -> Vec<MedicationEntry> {
    resolve_parts(session.protocol(), session.deletions(), session.ledger())
}

/// Effective medication list from its parts.
///
/// Protocol medicines come first, in protocol order, minus deleted indices and
/// minus any whose key appears in the ledger. Ledger rows follow in ledger
/// order. A key never appears twice; the first occurrence wins.
pub fn resolve_parts(
    protocol: Option<&TreatmentProtocol>,
    deletions: &DeletionTracker,
    ledger: &CustomLedger,
) -> Vec<MedicationEntry> {
    let overridden = ledger.keys();
    let mut seen: HashSet<IdentityKey> = HashSet::new();
    let mut entries = Vec::new();

    let medicines = protocol.map(|p| p.medicines.as_slice()).unwrap_or_default();
    for (index, medicine) in medicines.iter().enumerate() {
        if deletions.is_deleted(index) {
            continue;
        }
        let key = IdentityKey::of_protocol(medicine);
        if overridden.contains(&key) {
            continue;
        }
        if !seen.insert(key) {
            tracing::warn!(index, name = %medicine.name, "Skipping repeated protocol medicine");
            continue;
        }
        entries.push(MedicationEntry::Protocol {
            index,
            medicine: medicine.clone(),
        });
    }

    for (ledger_index, entry) in ledger.iter().enumerate() {
        let key = entry.key();
        if !seen.insert(key.clone()) {
            tracing::warn!(ledger_index, %key, "Skipping repeated custom medication");
            continue;
        }
        entries.push(MedicationEntry::Custom {
            ledger_index,
            key,
            is_override: entry.is_override(),
            item: entry.item().clone(),
        });
    }

    entries
}
