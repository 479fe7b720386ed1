//! Identity keys used for dedup and override matching.
//!
//! Every comparison between protocol medicines and custom items goes through
//! [`IdentityKey`]. Ids of zero are treated as absent.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CustomMedicationItem, ProtocolMedicine};

/// Identity of a medication entry in the effective set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum IdentityKey {
    /// Catalog medicine id
    Medicine(u64),
    /// Protocol line id, for protocol medicines without a catalog id
    ProtocolEntry(u64),
    /// Normalized medicine name, for custom additions without a catalog id
    Name(String),
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Medicine(id) => write!(f, "medicine:{}", id),
            IdentityKey::ProtocolEntry(id) => write!(f, "protocol-entry:{}", id),
            IdentityKey::Name(name) => write!(f, "name:{}", name),
        }
    }
}

impl IdentityKey {
    /// Key of a protocol medicine.
    pub fn of_protocol(med: &ProtocolMedicine) -> Self {
        match non_zero(med.medicine_id) {
            Some(id) => IdentityKey::Medicine(id),
            None => IdentityKey::ProtocolEntry(med.protocol_medicine_id),
        }
    }

    /// Key of a custom medication item.
    ///
    /// Mirrors [`IdentityKey::of_protocol`]: catalog id first, then the
    /// protocol line it was seeded from, then the normalized name.
    pub fn of_custom(item: &CustomMedicationItem) -> Self {
        match (non_zero(item.medicine_id), non_zero(item.protocol_medicine_id)) {
            (Some(id), _) => IdentityKey::Medicine(id),
            (None, Some(line)) => IdentityKey::ProtocolEntry(line),
            (None, None) => IdentityKey::Name(normalize_name(&item.medicine_name)),
        }
    }
}

/// Lower-case, trim and collapse inner whitespace.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn non_zero(id: Option<u64>) -> Option<u64> {
    id.filter(|id| *id != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_key_prefers_medicine_id() {
        let med = ProtocolMedicine::new(11, Some(7), "Tenofovir".into());
        assert_eq!(IdentityKey::of_protocol(&med), IdentityKey::Medicine(7));

        let legacy = ProtocolMedicine::new(11, None, "Tenofovir".into());
        assert_eq!(IdentityKey::of_protocol(&legacy), IdentityKey::ProtocolEntry(11));

        let zero = ProtocolMedicine::new(12, Some(0), "Lamivudine".into());
        assert_eq!(IdentityKey::of_protocol(&zero), IdentityKey::ProtocolEntry(12));
    }

    #[test]
    fn test_custom_key_falls_back_to_name() {
        let mut item = CustomMedicationItem::new("  Paracetamol   500 ".into(), "1 viên".into());
        assert_eq!(
            IdentityKey::of_custom(&item),
            IdentityKey::Name("paracetamol 500".into())
        );

        item.medicine_id = Some(0);
        assert_eq!(
            IdentityKey::of_custom(&item),
            IdentityKey::Name("paracetamol 500".into())
        );

        item.medicine_id = Some(42);
        assert_eq!(IdentityKey::of_custom(&item), IdentityKey::Medicine(42));
    }

    #[test]
    fn test_custom_key_matches_protocol_line_without_catalog_id() {
        let line = ProtocolMedicine::new(104, None, "Dolutegravir".into());
        let mut item = CustomMedicationItem::new("Dolutegravir".into(), "1 viên".into());
        item.protocol_medicine_id = Some(104);

        assert_eq!(IdentityKey::of_custom(&item), IdentityKey::ProtocolEntry(104));
        assert_eq!(IdentityKey::of_custom(&item), IdentityKey::of_protocol(&line));

        // A catalog id still wins
        item.medicine_id = Some(9);
        assert_eq!(IdentityKey::of_custom(&item), IdentityKey::Medicine(9));
    }

    #[test]
    fn test_display() {
        assert_eq!(IdentityKey::Medicine(7).to_string(), "medicine:7");
        assert_eq!(IdentityKey::ProtocolEntry(3).to_string(), "protocol-entry:3");
        assert_eq!(IdentityKey::Name("abc".into()).to_string(), "name:abc");
    }
}
