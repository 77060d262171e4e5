// Linguistic Engine
// Capability boundary for annotation (tokens, POS, dependencies, entities, sentences)
// - heuristic: local rule-based annotator, used as fallback and in tests
// - service_client: HTTP client for the spaCy annotation service

pub mod heuristic;
pub mod service_client;

use rustc_hash::FxHashMap;

use crate::models::AnnotatedDocument;
use crate::services::errors::AnalysisError;

pub use heuristic::HeuristicEngine;
pub use service_client::SpacyServiceEngine;

pub trait LinguisticEngine: Send + Sync {
    fn annotate(&self, text: &str) -> Result<AnnotatedDocument, AnalysisError>;

    /// Semantic similarity of two sentences in [0, 1].
    fn similarity(&self, a: &str, b: &str) -> f64;

    fn name(&self) -> &str;
}

/// Cosine similarity over lowercase word counts; the fallback similarity measure.
pub fn bag_of_words_similarity(a: &str, b: &str, skip: impl Fn(&str) -> bool) -> f64 {
    let count = |s: &str| {
        let mut m: FxHashMap<String, f64> = FxHashMap::default();
        for w in crate::services::text_processor::words(s) {
            let lw = w.to_lowercase();
            if skip(&lw) {
                continue;
            }
            *m.entry(lw).or_insert(0.0) += 1.0;
        }
        m
    };
    let va = count(a);
    let vb = count(b);
    if va.is_empty() || vb.is_empty() {
        return 0.0;
    }
    let dot: f64 = va
        .iter()
        .filter_map(|(k, x)| vb.get(k).map(|y| x * y))
        .sum();
    let na = va.values().map(|x| x * x).sum::<f64>().sqrt();
    let nb = vb.values().map(|x| x * x).sum::<f64>().sqrt();
    (dot / (na * nb)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bag_of_words_similarity() {
        let same = bag_of_words_similarity("Rust is fast", "rust is FAST", |_| false);
        assert!((same - 1.0).abs() < 1e-9);
        let disjoint = bag_of_words_similarity("apples", "oranges", |_| false);
        assert_eq!(disjoint, 0.0);
        let empty = bag_of_words_similarity("", "oranges", |_| false);
        assert_eq!(empty, 0.0);
    }
}
