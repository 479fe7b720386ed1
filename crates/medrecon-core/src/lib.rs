//! Medrecon Core Library
//!
//! Medication reconciliation for treatment-plan editing: merges a fixed
//! treatment-protocol medicine list with clinician additions, per-item
//! overrides and deletions (with undo), and derives the treatment end date.
//!
//! # Architecture
//!
//! ```text
//!   Catalog (protocol + medicines)
//!                │
//!                ▼
//!   ┌─────────────────────────────────┐      user action
//!   │      ReconciliationSession      │ ◄──  delete / undo /
//!   │  protocol · deletions · ledger  │      override / add /
//!   └────────────────┬────────────────┘      update / remove
//!                    │
//!          ┌─────────┴──────────┐
//!          ▼                    ▼
//!   resolve() ─► effective   TreatmentSubmission
//!   medication list          (customMedications, endDate)
//! ```
//!
//! # Core Principle
//!
//! **Every operation either commits a well-formed transition or leaves the
//! session unchanged.** Errors are returned, never swallowed.
//!
//! # Modules
//!
//! - [`models`]: Domain types (TreatmentProtocol, CustomMedicationItem, IdentityKey, ...)
//! - [`duration`]: End-date calculation
//! - [`reconcile`]: Session, deletion tracker, ledger, overrides, merge resolver
//! - [`catalog`]: Catalog provider trait and medicine search
//! - [`submission`]: Payload for the persistence API
//! - [`config`]: Engine configuration

pub mod catalog;
pub mod config;
pub mod duration;
pub mod models;
pub mod reconcile;
pub mod submission;

// Re-export commonly used types
pub use catalog::{CatalogProvider, InMemoryCatalog, MedicineSearch};
pub use config::EngineConfig;
pub use duration::{compute_end_date, end_date_for};
pub use models::{
    CustomMedicationItem, DurationUnit, IdentityKey, MedicationEdits, Medicine,
    PersistedTreatment, ProtocolMedicine, TreatmentProtocol,
};
pub use reconcile::{
    resolve, EffectiveCounts, FieldErrors, LedgerEntry, MedicationEntry, ReconcileError,
    ReconcileResult, ReconciliationSession, SessionAction,
};
pub use submission::{SubmittedMedication, TreatmentSubmission};
