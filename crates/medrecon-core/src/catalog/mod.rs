//! Catalog access for protocols and medicines.
//!
//! The engine never fetches catalog data itself; callers hand it a
//! [`CatalogProvider`] whose data is already loaded.

mod memory;
mod search;

pub use memory::*;
pub use search::*;

use crate::models::{Medicine, TreatmentProtocol};

/// Read-only source of protocols and medicines.
pub trait CatalogProvider {
    /// Protocol by id, with its medicines.
    fn protocol(&self, id: u64) -> Option<&TreatmentProtocol>;

    /// All protocols.
    fn protocols(&self) -> &[TreatmentProtocol];

    /// All catalog medicines.
    fn medicines(&self) -> &[Medicine];

    /// Medicine by id.
    fn medicine(&self, id: u64) -> Option<&Medicine> {
        self.medicines().iter().find(|m| m.id == id)
    }
}
