//! Reconciliation session: the single mutation surface of the engine.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::duration::end_date_for;
use crate::models::{
    CustomMedicationItem, IdentityKey, MedicationEdits, Medicine, PersistedTreatment,
    ProtocolMedicine, TreatmentProtocol,
};

use super::{
    convert_to_override, resolve, validate_item, CustomLedger, DeletionTracker, EffectiveCounts,
    LedgerEntry, MedicationEntry, ReconcileError, ReconcileResult, Removal,
};

/// A mutation of the session, as issued by the editing screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionAction {
    SetProtocol { protocol: Option<TreatmentProtocol> },
    SetStartDate { start_date: String },
    SetNotes { notes: String },
    DeleteProtocolMedicine { idx: usize },
    UndoLast,
    UndoAll,
    OverrideProtocolMedicine { idx: usize, edits: MedicationEdits },
    AddCustom { item: CustomMedicationItem },
    /// Pick from the catalog search; `edits` supply what the catalog lacks
    AddFromCatalog {
        medicine: Medicine,
        #[serde(default)]
        edits: MedicationEdits,
    },
    UpdateCustom {
        index: usize,
        item: CustomMedicationItem,
    },
    RemoveCustom { index: usize },
}

impl SessionAction {
    /// Actions that need an explicit user confirmation before they are applied.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            SessionAction::DeleteProtocolMedicine { .. } | SessionAction::RemoveCustom { .. }
        )
    }

    fn name(&self) -> &'static str {
        match self {
            SessionAction::SetProtocol { .. } => "set_protocol",
            SessionAction::SetStartDate { .. } => "set_start_date",
            SessionAction::SetNotes { .. } => "set_notes",
            SessionAction::DeleteProtocolMedicine { .. } => "delete_protocol_medicine",
            SessionAction::UndoLast => "undo_last",
            SessionAction::UndoAll => "undo_all",
            SessionAction::OverrideProtocolMedicine { .. } => "override_protocol_medicine",
            SessionAction::AddCustom { .. } => "add_custom",
            SessionAction::AddFromCatalog { .. } => "add_from_catalog",
            SessionAction::UpdateCustom { .. } => "update_custom",
            SessionAction::RemoveCustom { .. } => "remove_custom",
        }
    }
}

/// How the session departs from the raw protocol.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Adjustment<'a> {
    Removed {
        idx: usize,
        med: &'a ProtocolMedicine,
    },
    Overridden {
        key: &'a IdentityKey,
        item: &'a CustomMedicationItem,
    },
    Added {
        item: &'a CustomMedicationItem,
    },
}

/// State of one treatment-editing episode.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationSession {
    id: Uuid,
    protocol: Option<TreatmentProtocol>,
    deletions: DeletionTracker,
    ledger: CustomLedger,
    start_date: String,
    end_date: String,
    notes: String,
    ended: bool,
    config: EngineConfig,
}

impl ReconciliationSession {
    /// Create an empty session (new treatment).
    pub fn new(config: EngineConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            protocol: None,
            deletions: DeletionTracker::new(),
            ledger: CustomLedger::new(),
            start_date: String::new(),
            end_date: String::new(),
            notes: String::new(),
            ended: false,
            config,
        }
    }

    /// Rebuild an edit session from a saved treatment and its protocol.
    ///
    /// Custom medications are taken verbatim; items whose identity matches a
    /// protocol medicine become overrides. Excluded protocol medicines are
    /// replayed as deletions in protocol order, except those an override
    /// already replaces.
    pub fn from_persisted(
        protocol: TreatmentProtocol,
        record: &PersistedTreatment,
        config: EngineConfig,
    ) -> ReconcileResult<Self> {
        if protocol.id != record.protocol_id {
            return Err(ReconcileError::Precondition(format!(
                "treatment references protocol {}, got protocol {}",
                record.protocol_id, protocol.id
            )));
        }

        let mut session = Self::new(config);
        let protocol_keys = protocol_keys(Some(&protocol));

        let entries = record
            .custom_medications
            .iter()
            .cloned()
            .map(|item| classify(&protocol_keys, item))
            .collect();
        session.ledger = CustomLedger::from_entries(entries);

        let excluded: HashSet<u64> = record.excluded_protocol_medicine_ids.iter().copied().collect();
        for (idx, med) in protocol.medicines.iter().enumerate() {
            if !excluded.contains(&med.protocol_medicine_id) {
                continue;
            }
            if session.ledger.position_of(&IdentityKey::of_protocol(med)).is_some() {
                tracing::warn!(
                    protocol_medicine_id = med.protocol_medicine_id,
                    "Ignoring exclusion of an overridden protocol medicine"
                );
                continue;
            }
            session.deletions.delete(idx, med.clone())?;
        }

        session.protocol = Some(protocol);
        session.start_date = record.start_date.clone();
        session.notes = record.notes.clone();
        session.end_date = if record.end_date.is_empty() {
            end_date_for(&session.start_date, session.protocol.as_ref())
        } else {
            record.end_date.clone()
        };
        session.ended = record.is_ended;

        tracing::debug!(
            session = %session.id,
            protocol_id = record.protocol_id,
            custom = session.ledger.len(),
            deleted = session.deletions.len(),
            "Hydrated session from persisted treatment"
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn protocol(&self) -> Option<&TreatmentProtocol> {
        self.protocol.as_ref()
    }

    pub fn deletions(&self) -> &DeletionTracker {
        &self.deletions
    }

    pub fn ledger(&self) -> &CustomLedger {
        &self.ledger
    }

    pub fn start_date(&self) -> &str {
        &self.start_date
    }

    /// Derived end date; empty means open-ended.
    pub fn end_date(&self) -> &str {
        &self.end_date
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Effective medication list.
    pub fn resolve(&self) -> Vec<MedicationEntry> {
        resolve(self)
    }

    /// Badge counts for the effective list.
    pub fn counts(&self) -> EffectiveCounts {
        EffectiveCounts::of(&self.resolve())
    }

    /// Removals, overrides and additions currently in effect.
    pub fn adjustments(&self) -> Vec<Adjustment<'_>> {
        let mut adjustments: Vec<Adjustment<'_>> = self
            .deletions
            .pending()
            .map(|r| Adjustment::Removed {
                idx: r.idx,
                med: &r.med,
            })
            .collect();
        adjustments.extend(self.ledger.iter().map(|entry| match entry {
            LedgerEntry::Added { item } => Adjustment::Added { item },
            LedgerEntry::Overridden { key, item } => Adjustment::Overridden { key, item },
        }));
        adjustments
    }

    /// Protocol-medicine ids of deleted indices, in protocol order.
    pub fn excluded_protocol_medicine_ids(&self) -> Vec<u64> {
        let Some(protocol) = &self.protocol else {
            return Vec::new();
        };
        self.deletions
            .deleted_indices()
            .filter_map(|idx| protocol.medicines.get(idx))
            .map(|med| med.protocol_medicine_id)
            .collect()
    }

    /// Mark the treatment ended (or reopen it). Always allowed.
    pub fn set_ended(&mut self, ended: bool) {
        self.ended = ended;
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Apply an action, logging rejections.
    pub fn apply(&mut self, action: SessionAction) -> ReconcileResult<()> {
        let name = action.name();
        let result = match action {
            SessionAction::SetProtocol { protocol } => self.set_protocol(protocol),
            SessionAction::SetStartDate { start_date } => self.set_start_date(start_date),
            SessionAction::SetNotes { notes } => self.set_notes(notes),
            SessionAction::DeleteProtocolMedicine { idx } => self.delete_protocol_medicine(idx),
            SessionAction::UndoLast => self.undo_last().map(|_| ()),
            SessionAction::UndoAll => self.undo_all().map(|_| ()),
            SessionAction::OverrideProtocolMedicine { idx, edits } => {
                self.override_protocol_medicine(idx, &edits).map(|_| ())
            }
            SessionAction::AddCustom { item } => self.add_custom(item).map(|_| ()),
            SessionAction::AddFromCatalog { medicine, edits } => {
                self.add_from_catalog(&medicine, &edits).map(|_| ())
            }
            SessionAction::UpdateCustom { index, item } => self.update_custom(index, item),
            SessionAction::RemoveCustom { index } => self.remove_custom(index).map(|_| ()),
        };
        if let Err(e) = &result {
            tracing::warn!(session = %self.id, action = name, "Rejected: {e}");
        }
        result
    }

    /// Select a protocol. Any previous reconciliation is discarded.
    pub fn set_protocol(&mut self, protocol: Option<TreatmentProtocol>) -> ReconcileResult<()> {
        self.ensure_editable()?;
        self.deletions.clear();
        self.ledger.clear();
        self.protocol = protocol;
        self.refresh_end_date();
        tracing::debug!(
            session = %self.id,
            protocol_id = ?self.protocol.as_ref().map(|p| p.id),
            end_date = %self.end_date,
            "Protocol selected"
        );
        Ok(())
    }

    pub fn set_start_date(&mut self, start_date: String) -> ReconcileResult<()> {
        self.ensure_editable()?;
        self.start_date = start_date;
        self.refresh_end_date();
        tracing::debug!(
            session = %self.id,
            start_date = %self.start_date,
            end_date = %self.end_date,
            "Start date set"
        );
        Ok(())
    }

    pub fn set_notes(&mut self, notes: String) -> ReconcileResult<()> {
        self.ensure_editable()?;
        self.notes = notes;
        Ok(())
    }

    /// Remove protocol medicine `idx` from the plan (undoable).
    pub fn delete_protocol_medicine(&mut self, idx: usize) -> ReconcileResult<()> {
        self.ensure_editable()?;
        let med = self.protocol_medicine(idx)?.clone();
        if self.ledger.position_of(&IdentityKey::of_protocol(&med)).is_some() {
            return Err(ReconcileError::Shadowed(idx));
        }
        self.deletions.delete(idx, med)?;
        tracing::debug!(session = %self.id, idx, "Deleted protocol medicine");
        Ok(())
    }

    /// Restore the most recently deleted protocol medicine.
    pub fn undo_last(&mut self) -> ReconcileResult<Removal> {
        self.ensure_editable()?;
        let removal = self.deletions.undo_last()?;
        tracing::debug!(session = %self.id, idx = removal.idx, "Undid deletion");
        Ok(removal)
    }

    /// Restore every deleted protocol medicine.
    pub fn undo_all(&mut self) -> ReconcileResult<Vec<Removal>> {
        self.ensure_editable()?;
        let removals = self.deletions.undo_all()?;
        tracing::debug!(session = %self.id, count = removals.len(), "Undid all deletions");
        Ok(removals)
    }

    /// Replace protocol medicine `idx` with an edited copy.
    ///
    /// An existing override for the same medicine is replaced in place.
    /// Returns the ledger index of the override.
    pub fn override_protocol_medicine(
        &mut self,
        idx: usize,
        edits: &MedicationEdits,
    ) -> ReconcileResult<usize> {
        self.ensure_editable()?;
        let med = self.protocol_medicine(idx)?;
        if self.deletions.is_deleted(idx) {
            return Err(ReconcileError::AlreadyDeleted(idx));
        }
        let key = IdentityKey::of_protocol(med);
        let item = convert_to_override(med, edits, &self.config)?;

        let index = self.ledger.upsert_override(key.clone(), item);
        tracing::debug!(session = %self.id, idx, %key, ledger_index = index, "Protocol medicine overridden");
        Ok(index)
    }

    /// Add a custom medication. An item matching a protocol medicine
    /// becomes (or replaces) that medicine's override, unless that medicine
    /// is deleted.
    pub fn add_custom(&mut self, item: CustomMedicationItem) -> ReconcileResult<usize> {
        self.ensure_editable()?;
        validate_item(&item).map_err(ReconcileError::Validation)?;

        let entry = classify(&protocol_keys(self.protocol()), item);
        self.ensure_not_deleted(&entry)?;
        let index = match entry {
            LedgerEntry::Overridden { key, item } => self.ledger.upsert_override(key, item),
            LedgerEntry::Added { item } => self.ledger.add(item)?,
        };
        tracing::debug!(session = %self.id, ledger_index = index, "Custom medication added");
        Ok(index)
    }

    /// Add a catalog medicine picked from search, with `edits` on top.
    pub fn add_from_catalog(
        &mut self,
        medicine: &Medicine,
        edits: &MedicationEdits,
    ) -> ReconcileResult<usize> {
        let mut item = CustomMedicationItem::from_medicine(medicine);
        item.apply(&MedicationEdits {
            medicine_id: None,
            ..edits.clone()
        });
        self.add_custom(item)
    }

    /// Replace the ledger row at `index`.
    ///
    /// An override keeps shadowing its protocol medicine as long as the
    /// item's identity is unchanged, and keeps its frequency.
    pub fn update_custom(
        &mut self,
        index: usize,
        mut item: CustomMedicationItem,
    ) -> ReconcileResult<()> {
        self.ensure_editable()?;
        let current = self
            .ledger
            .get(index)
            .ok_or(ReconcileError::IndexOutOfRange {
                index,
                len: self.ledger.len(),
            })?;
        validate_item(&item).map_err(ReconcileError::Validation)?;

        let entry = match current {
            LedgerEntry::Overridden { key, item: old }
                if IdentityKey::of_custom(old) == IdentityKey::of_custom(&item) =>
            {
                item.frequency = old.frequency.clone();
                LedgerEntry::Overridden {
                    key: key.clone(),
                    item,
                }
            }
            _ => classify(&protocol_keys(self.protocol()), item),
        };
        self.ensure_not_deleted(&entry)?;
        self.ledger.update(index, entry)?;
        tracing::debug!(session = %self.id, ledger_index = index, "Custom medication updated");
        Ok(())
    }

    /// Remove the ledger row at `index`. Removing an override brings the
    /// protocol medicine back.
    pub fn remove_custom(&mut self, index: usize) -> ReconcileResult<LedgerEntry> {
        self.ensure_editable()?;
        let entry = self.ledger.remove(index)?;
        tracing::debug!(
            session = %self.id,
            ledger_index = index,
            was_override = entry.is_override(),
            "Custom medication removed"
        );
        Ok(entry)
    }

    fn ensure_editable(&self) -> ReconcileResult<()> {
        if self.ended {
            return Err(ReconcileError::Precondition(
                "treatment has ended and can no longer be edited".into(),
            ));
        }
        Ok(())
    }

    /// Overrides may not target a deleted protocol medicine.
    fn ensure_not_deleted(&self, entry: &LedgerEntry) -> ReconcileResult<()> {
        let LedgerEntry::Overridden { key, .. } = entry else {
            return Ok(());
        };
        let Some(protocol) = &self.protocol else {
            return Ok(());
        };
        let deleted = protocol
            .medicines
            .iter()
            .enumerate()
            .find(|(idx, med)| {
                self.deletions.is_deleted(*idx) && IdentityKey::of_protocol(med) == *key
            });
        match deleted {
            Some((idx, _)) => Err(ReconcileError::AlreadyDeleted(idx)),
            None => Ok(()),
        }
    }

    fn protocol_medicine(&self, idx: usize) -> ReconcileResult<&ProtocolMedicine> {
        let protocol = self.protocol.as_ref().ok_or(ReconcileError::NoProtocol)?;
        protocol
            .medicines
            .get(idx)
            .ok_or(ReconcileError::IndexOutOfRange {
                index: idx,
                len: protocol.medicines.len(),
            })
    }

    fn refresh_end_date(&mut self) {
        self.end_date = end_date_for(&self.start_date, self.protocol.as_ref());
    }
}

fn protocol_keys(protocol: Option<&TreatmentProtocol>) -> HashSet<IdentityKey> {
    protocol
        .map(|p| p.medicines.iter().map(IdentityKey::of_protocol).collect())
        .unwrap_or_default()
}

/// Decide whether an item is an addition or an override.
fn classify(protocol_keys: &HashSet<IdentityKey>, item: CustomMedicationItem) -> LedgerEntry {
    let key = IdentityKey::of_custom(&item);
    if protocol_keys.contains(&key) {
        LedgerEntry::Overridden { key, item }
    } else {
        LedgerEntry::Added { item }
    }
}
