//! In-memory catalog.

use crate::models::{Medicine, TreatmentProtocol};

use super::CatalogProvider;

/// Catalog held in memory, e.g. after one fetch from the catalog API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryCatalog {
    protocols: Vec<TreatmentProtocol>,
    medicines: Vec<Medicine>,
}

impl InMemoryCatalog {
    pub fn new(protocols: Vec<TreatmentProtocol>, medicines: Vec<Medicine>) -> Self {
        Self {
            protocols,
            medicines,
        }
    }

    /// Add or replace a protocol (matched by id).
    pub fn upsert_protocol(&mut self, protocol: TreatmentProtocol) {
        match self.protocols.iter_mut().find(|p| p.id == protocol.id) {
            Some(existing) => *existing = protocol,
            None => self.protocols.push(protocol),
        }
    }

    /// Add or replace a medicine (matched by id).
    pub fn upsert_medicine(&mut self, medicine: Medicine) {
        match self.medicines.iter_mut().find(|m| m.id == medicine.id) {
            Some(existing) => *existing = medicine,
            None => self.medicines.push(medicine),
        }
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn protocol(&self, id: u64) -> Option<&TreatmentProtocol> {
        self.protocols.iter().find(|p| p.id == id)
    }

    fn protocols(&self) -> &[TreatmentProtocol] {
        &self.protocols
    }

    fn medicines(&self) -> &[Medicine] {
        &self.medicines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut catalog = InMemoryCatalog::default();
        catalog.upsert_medicine(Medicine::new(1, "Paracetamol".into(), "viên".into()));
        catalog.upsert_medicine(Medicine::new(1, "Paracetamol 500mg".into(), "viên".into()));
        catalog.upsert_protocol(TreatmentProtocol::new(3, "ARV".into()));

        assert_eq!(catalog.medicines().len(), 1);
        assert_eq!(catalog.medicine(1).unwrap().name, "Paracetamol 500mg");
        assert!(catalog.medicine(2).is_none());
        assert_eq!(catalog.protocol(3).unwrap().name, "ARV");
    }
}
