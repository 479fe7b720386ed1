//! Ordered ledger of clinician additions and protocol overrides.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{CustomMedicationItem, IdentityKey};

use super::{ReconcileError, ReconcileResult};

/// One ledger row. The role is explicit instead of inferred from flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "camelCase")]
pub enum LedgerEntry {
    /// Clinician addition with no protocol counterpart
    Added { item: CustomMedicationItem },
    /// Replacement for the protocol medicine with identity `key`
    Overridden {
        key: IdentityKey,
        item: CustomMedicationItem,
    },
}

impl LedgerEntry {
    pub fn item(&self) -> &CustomMedicationItem {
        match self {
            LedgerEntry::Added { item } | LedgerEntry::Overridden { item, .. } => item,
        }
    }

    pub fn into_item(self) -> CustomMedicationItem {
        match self {
            LedgerEntry::Added { item } | LedgerEntry::Overridden { item, .. } => item,
        }
    }

    /// Identity used for dedup and for shadowing protocol medicines.
    pub fn key(&self) -> IdentityKey {
        match self {
            LedgerEntry::Added { item } => IdentityKey::of_custom(item),
            LedgerEntry::Overridden { key, .. } => key.clone(),
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, LedgerEntry::Overridden { .. })
    }
}

/// Custom medications in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomLedger {
    entries: Vec<LedgerEntry>,
}

impl CustomLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from already-classified entries, as persisted.
    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    /// Append an addition. Rejected if its key is already in the ledger.
    pub fn add(&mut self, item: CustomMedicationItem) -> ReconcileResult<usize> {
        let key = IdentityKey::of_custom(&item);
        if self.position_of(&key).is_some() {
            return Err(ReconcileError::DuplicateAddition { key });
        }
        self.entries.push(LedgerEntry::Added { item });
        Ok(self.entries.len() - 1)
    }

    /// Insert or replace the override for `key`. Replacement keeps the
    /// existing position.
    pub fn upsert_override(&mut self, key: IdentityKey, item: CustomMedicationItem) -> usize {
        let entry = LedgerEntry::Overridden {
            key: key.clone(),
            item,
        };
        match self.position_of(&key) {
            Some(index) => {
                self.entries[index] = entry;
                index
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        }
    }

    /// Replace the entry at `index`. Its key must not collide with another row.
    pub fn update(&mut self, index: usize, entry: LedgerEntry) -> ReconcileResult<()> {
        self.check_index(index)?;
        let key = entry.key();
        if self
            .entries
            .iter()
            .enumerate()
            .any(|(i, e)| i != index && e.key() == key)
        {
            return Err(ReconcileError::DuplicateAddition { key });
        }
        self.entries[index] = entry;
        Ok(())
    }

    /// Remove and return the entry at `index`.
    pub fn remove(&mut self, index: usize) -> ReconcileResult<LedgerEntry> {
        self.check_index(index)?;
        Ok(self.entries.remove(index))
    }

    pub fn position_of(&self, key: &IdentityKey) -> Option<usize> {
        self.entries.iter().position(|e| &e.key() == key)
    }

    pub fn get(&self, index: usize) -> Option<&LedgerEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    /// Keys of every row.
    pub fn keys(&self) -> HashSet<IdentityKey> {
        self.entries.iter().map(LedgerEntry::key).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn check_index(&self, index: usize) -> ReconcileResult<()> {
        if index >= self.entries.len() {
            return Err(ReconcileError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }
}
