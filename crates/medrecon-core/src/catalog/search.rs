//! Fuzzy medicine search for the add/override picker.

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::config::EngineConfig;
use crate::models::{normalize_name, Medicine};

use super::CatalogProvider;

/// A catalog medicine with its match score.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicineMatch<'a> {
    pub medicine: &'a Medicine,
    /// 0.0 - 1.0
    pub score: f64,
}

/// Ranks catalog medicines against a typed query.
pub struct MedicineSearch {
    min_score: f64,
    limit: usize,
}

impl MedicineSearch {
    pub fn new(min_score: f64, limit: usize) -> Self {
        Self { min_score, limit }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.search_min_score, config.search_limit)
    }

    /// Best matches first. A blank query lists the catalog in order.
    pub fn search<'a, C: CatalogProvider + ?Sized>(
        &self,
        catalog: &'a C,
        query: &str,
    ) -> Vec<MedicineMatch<'a>> {
        let query = normalize_name(query);
        if query.is_empty() {
            return catalog
                .medicines()
                .iter()
                .take(self.limit)
                .map(|medicine| MedicineMatch {
                    medicine,
                    score: 1.0,
                })
                .collect();
        }

        let mut matches: Vec<MedicineMatch<'a>> = catalog
            .medicines()
            .iter()
            .map(|medicine| MedicineMatch {
                medicine,
                score: score_name(&query, &normalize_name(&medicine.name)),
            })
            .filter(|m| m.score >= self.min_score)
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.medicine.name.cmp(&b.medicine.name))
        });
        matches.truncate(self.limit);
        matches
    }
}

/// Score a normalized query against a normalized name (0.0 - 1.0).
fn score_name(query: &str, name: &str) -> f64 {
    if name.starts_with(query) {
        return 1.0;
    }
    if name.contains(query) {
        return 0.9;
    }

    // Best of whole-name and per-word similarity
    let whole = fuzzy_match(query, name);
    let best_word = name
        .split(' ')
        .map(|word| fuzzy_match(query, word))
        .fold(0.0_f64, f64::max);
    whole.max(best_word)
}

/// Jaro-Winkler for typos and prefixes, Levenshtein for overall shape.
fn fuzzy_match(a: &str, b: &str) -> f64 {
    jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(
            vec![],
            vec![
                Medicine::new(1, "Paracetamol 500mg".into(), "viên".into()),
                Medicine::new(2, "Amoxicillin".into(), "viên".into()),
                Medicine::new(3, "Ibuprofen".into(), "viên".into()),
                Medicine::new(4, "Efferalgan Paracetamol".into(), "gói".into()),
            ],
        )
    }

    #[test]
    fn test_prefix_ranks_before_contains() {
        let catalog = catalog();
        let search = MedicineSearch::new(0.5, 10);
        let hits = search.search(&catalog, "paracet");

        let ids: Vec<u64> = hits.iter().map(|h| h.medicine.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(hits[0].score, 1.0);
        assert_eq!(hits[1].score, 0.9);
    }

    #[test]
    fn test_typo_still_matches() {
        let catalog = catalog();
        let search = MedicineSearch::new(0.6, 10);
        let hits = search.search(&catalog, "amoxicilin");
        assert_eq!(hits.first().map(|h| h.medicine.id), Some(2));
    }

    #[test]
    fn test_unrelated_query_filtered() {
        let catalog = catalog();
        let search = MedicineSearch::from_config(&EngineConfig::default());
        assert!(search.search(&catalog, "zzzz").is_empty());
    }

    #[test]
    fn test_blank_query_lists_catalog_with_limit() {
        let catalog = catalog();
        let search = MedicineSearch::new(0.5, 2);
        let ids: Vec<u64> = search.search(&catalog, "  ").iter().map(|h| h.medicine.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
