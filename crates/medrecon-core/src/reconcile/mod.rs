//! Medication reconciliation engine.
//!
//! A [`ReconciliationSession`] holds the selected protocol, the deletion
//! tracker and the custom ledger. Every mutation goes through the session;
//! [`resolve`] derives the effective medication list from it.

mod deletion;
mod ledger;
mod merge;
mod overrides;
mod session;
mod validation;

pub use deletion::*;
pub use ledger::*;
pub use merge::*;
pub use overrides::*;
pub use session::*;
pub use validation::*;

use thiserror::Error;

use crate::models::IdentityKey;

/// Reconciliation errors. A failed operation leaves the session unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Medication already added: {key}")]
    DuplicateAddition { key: IdentityKey },

    #[error("Nothing to undo")]
    EmptyUndoStack,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("No treatment protocol selected")]
    NoProtocol,

    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Protocol medicine {0} is already deleted")]
    AlreadyDeleted(usize),

    #[error("Protocol medicine {0} is overridden; remove the override instead")]
    Shadowed(usize),
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
