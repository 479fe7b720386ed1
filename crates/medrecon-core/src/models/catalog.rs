//! Medicine catalog models.

use serde::{Deserialize, Serialize};

/// A medicine in the searchable catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: u64,
    pub name: String,
    /// Dispensing unit (e.g., "viên", "ml")
    #[serde(default)]
    pub unit: String,
    /// Reference dose text
    #[serde(default)]
    pub dose: String,
    /// Unit price
    #[serde(default)]
    pub price: f64,
}

impl Medicine {
    /// Create a catalog medicine.
    pub fn new(id: u64, name: String, unit: String) -> Self {
        Self {
            id,
            name,
            unit,
            dose: String::new(),
            price: 0.0,
        }
    }
}
