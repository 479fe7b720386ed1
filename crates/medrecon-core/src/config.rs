//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Frequency given to overrides and to submitted items without one.
pub const DEFAULT_FREQUENCY: &str = "DAILY";

/// Tunables for the reconciliation engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed cadence for overrides and items submitted without a frequency
    pub default_frequency: String,
    /// Send deleted protocol medicines as `excludedProtocolMedicineIds`
    pub serialize_deletions: bool,
    /// Minimum score for a catalog search hit (0.0 - 1.0)
    pub search_min_score: f64,
    /// Maximum number of catalog search hits
    pub search_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_frequency: DEFAULT_FREQUENCY.to_string(),
            serialize_deletions: true,
            search_min_score: 0.55,
            search_limit: 10,
        }
    }
}

impl EngineConfig {
    /// Load from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
