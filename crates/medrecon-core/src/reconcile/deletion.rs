//! Deletion tracking with LIFO undo over protocol medicine indices.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::ProtocolMedicine;

use super::{ReconcileError, ReconcileResult};

/// A protocol medicine removed by the clinician, as pushed on the undo stack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Removal {
    /// Index into the protocol's medicine list
    pub idx: usize,
    /// The medicine as it was at that index
    pub med: ProtocolMedicine,
}

/// Deleted-index set plus undo stack.
///
/// Every deleted index has exactly one entry on the stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeletionTracker {
    deleted: BTreeSet<usize>,
    // Most recent removal is the last element.
    stack: Vec<Removal>,
}

impl DeletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `idx` deleted and push it on the undo stack.
    pub fn delete(&mut self, idx: usize, med: ProtocolMedicine) -> ReconcileResult<()> {
        if self.deleted.contains(&idx) {
            return Err(ReconcileError::AlreadyDeleted(idx));
        }
        self.deleted.insert(idx);
        self.stack.push(Removal { idx, med });
        Ok(())
    }

    /// Pop the most recent removal and un-delete its index.
    pub fn undo_last(&mut self) -> ReconcileResult<Removal> {
        let removal = self.stack.pop().ok_or(ReconcileError::EmptyUndoStack)?;
        self.deleted.remove(&removal.idx);
        Ok(removal)
    }

    /// Undo every pending removal. Returned most recent first.
    pub fn undo_all(&mut self) -> ReconcileResult<Vec<Removal>> {
        if self.stack.is_empty() {
            return Err(ReconcileError::EmptyUndoStack);
        }
        self.deleted.clear();
        let mut removed = std::mem::take(&mut self.stack);
        removed.reverse();
        Ok(removed)
    }

    pub fn is_deleted(&self, idx: usize) -> bool {
        self.deleted.contains(&idx)
    }

    /// Deleted indices in ascending order.
    pub fn deleted_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.deleted.iter().copied()
    }

    /// Pending removals, most recent first.
    pub fn pending(&self) -> impl Iterator<Item = &Removal> {
        self.stack.iter().rev()
    }

    /// The removal `undo_last` would restore.
    pub fn peek(&self) -> Option<&Removal> {
        self.stack.last()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// "Undo all" is only offered with more than one pending removal.
    pub fn offers_undo_all(&self) -> bool {
        self.stack.len() > 1
    }

    pub fn clear(&mut self) {
        self.deleted.clear();
        self.stack.clear();
    }
}
