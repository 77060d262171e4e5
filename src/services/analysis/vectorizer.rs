// Vectorizer & Clustering
// Bag-of-terms TF-IDF (smooth idf, L2 rows) and seeded k-means++ clustering

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::services::stopwords::StopwordFilter;

pub const DEFAULT_SEED: u64 = 42;
const MAX_ITERATIONS: usize = 300;
const TOLERANCE: f64 = 1e-4;

fn term_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("term regex"))
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VectorizeError {
    #[error("empty vocabulary; perhaps the documents only contain stop words")]
    EmptyVocabulary,
    #[error("no documents to vectorize")]
    NoDocuments,
}

/// Dense document-term matrix; columns follow `vocabulary` (alphabetical).
#[derive(Debug, Clone, PartialEq)]
pub struct TermMatrix {
    pub vocabulary: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl TermMatrix {
    pub fn n_terms(&self) -> usize {
        self.vocabulary.len()
    }

    /// Sum of a term's weight over all rows
    pub fn column_sum(&self, term: &str) -> f64 {
        match self.vocabulary.binary_search_by(|t| t.as_str().cmp(term)) {
            Ok(col) => self.rows.iter().map(|r| r[col]).sum(),
            Err(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    stopwords: Option<Arc<StopwordFilter>>,
    ngram_max: usize,
    max_features: Option<usize>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self {
            stopwords: None,
            ngram_max: 1,
            max_features: None,
        }
    }
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stopwords(mut self, stopwords: Arc<StopwordFilter>) -> Self {
        self.stopwords = Some(stopwords);
        self
    }

    /// Terms are n-grams of length 1..=n
    pub fn with_ngram_max(mut self, n: usize) -> Self {
        self.ngram_max = n.max(1);
        self
    }

    pub fn with_max_features(mut self, n: usize) -> Self {
        self.max_features = Some(n);
        self
    }

    /// Terms of one document in order of appearance.
    pub fn analyze(&self, doc: &str) -> Vec<String> {
        let lower = doc.to_lowercase();
        let words: Vec<&str> = term_re()
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|w| !self.stopwords.as_ref().is_some_and(|s| s.is_stopword(w)))
            .collect();

        let mut terms: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        for n in 2..=self.ngram_max {
            if words.len() < n {
                break;
            }
            terms.extend(words.windows(n).map(|w| w.join(" ")));
        }
        terms
    }

    pub fn fit_transform<S: AsRef<str>>(&self, docs: &[S]) -> Result<TermMatrix, VectorizeError> {
        if docs.is_empty() {
            return Err(VectorizeError::NoDocuments);
        }

        let counts: Vec<FxHashMap<String, usize>> = docs
            .iter()
            .map(|d| {
                let mut m: FxHashMap<String, usize> = FxHashMap::default();
                for term in self.analyze(d.as_ref()) {
                    *m.entry(term).or_insert(0) += 1;
                }
                m
            })
            .collect();

        let mut corpus_freq: FxHashMap<&str, usize> = FxHashMap::default();
        for doc in &counts {
            for (term, c) in doc {
                *corpus_freq.entry(term.as_str()).or_insert(0) += c;
            }
        }
        if corpus_freq.is_empty() {
            return Err(VectorizeError::EmptyVocabulary);
        }

        let mut ranked: Vec<(&str, usize)> = corpus_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        if let Some(limit) = self.max_features {
            ranked.truncate(limit);
        }
        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
        vocabulary.sort();

        let n_docs = docs.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|term| {
                let df = counts.iter().filter(|c| c.contains_key(term)).count() as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows = counts
            .iter()
            .map(|doc| {
                let mut row: Vec<f64> = vocabulary
                    .iter()
                    .zip(idf.iter())
                    .map(|(term, w)| doc.get(term).copied().unwrap_or(0) as f64 * w)
                    .collect();
                let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
                if norm > 0.0 {
                    row.iter_mut().for_each(|x| *x /= norm);
                }
                row
            })
            .collect();

        Ok(TermMatrix { vocabulary, rows })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster index per matrix row
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn kmeans_plus_plus(rows: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = rows.len();
    let mut centroids = vec![rows[rng.gen_range(0..n)].clone()];
    while centroids.len() < k {
        let d2: Vec<f64> = rows.iter().map(|r| nearest(r, &centroids).1).collect();
        let total: f64 = d2.iter().sum();
        let pick = if total <= 0.0 {
            rng.gen_range(0..n)
        } else {
            let target = rng.gen::<f64>() * total;
            let mut acc = 0.0;
            d2.iter()
                .position(|d| {
                    acc += d;
                    acc >= target
                })
                .unwrap_or(n - 1)
        };
        centroids.push(rows[pick].clone());
    }
    centroids
}

/// Lloyd's k-means with k-means++ seeding; `k` is clamped to `1..=rows`.
pub fn kmeans(matrix: &TermMatrix, k: usize, seed: u64) -> Clustering {
    let rows = &matrix.rows;
    if rows.is_empty() {
        return Clustering { labels: Vec::new(), centroids: Vec::new() };
    }
    let k = k.clamp(1, rows.len());
    let dims = matrix.n_terms();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = kmeans_plus_plus(rows, k, &mut rng);
    let mut labels = vec![0usize; rows.len()];

    for iteration in 0..MAX_ITERATIONS {
        let new_labels: Vec<usize> = rows.iter().map(|r| nearest(r, &centroids).0).collect();
        let changed = iteration == 0 || new_labels != labels;
        labels = new_labels;

        let mut sums = vec![vec![0.0; dims]; k];
        let mut sizes = vec![0usize; k];
        for (row, &label) in rows.iter().zip(labels.iter()) {
            sizes[label] += 1;
            for (s, x) in sums[label].iter_mut().zip(row.iter()) {
                *s += x;
            }
        }

        let mut shift = 0.0;
        for c in 0..k {
            // An empty cluster keeps its previous centroid
            if sizes[c] == 0 {
                continue;
            }
            let updated: Vec<f64> = sums[c].iter().map(|s| s / sizes[c] as f64).collect();
            shift += squared_distance(&updated, &centroids[c]);
            centroids[c] = updated;
        }

        if !changed || shift <= TOLERANCE * TOLERANCE {
            break;
        }
    }

    Clustering { labels, centroids }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_transform_vocabulary_and_norm() {
        let matrix = TfidfVectorizer::new()
            .fit_transform(&["cats chase mice", "dogs chase cats"])
            .unwrap();
        assert_eq!(matrix.vocabulary, vec!["cats", "chase", "dogs", "mice"]);
        for row in &matrix.rows {
            let norm: f64 = row.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
        // "mice" only in doc 0 gets a higher idf than shared "cats"
        assert!(matrix.rows[0][3] > matrix.rows[0][0]);
        assert_eq!(matrix.rows[1][3], 0.0);
    }

    #[test]
    fn test_bigrams_and_stopwords() {
        let stop = Arc::new(StopwordFilter::from_list(&["the", "of"]));
        let v = TfidfVectorizer::new().with_stopwords(stop).with_ngram_max(2);
        assert_eq!(
            v.analyze("The speed of light matters"),
            vec!["speed", "light", "matters", "speed light", "light matters"]
        );
    }

    #[test]
    fn test_max_features_prefers_frequent_then_alphabetical() {
        let matrix = TfidfVectorizer::new()
            .with_max_features(2)
            .fit_transform(&["zeta zeta alpha", "beta gamma"])
            .unwrap();
        assert_eq!(matrix.vocabulary, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_empty_vocabulary() {
        let stop = Arc::new(StopwordFilter::from_list(&["the", "a"]));
        let err = TfidfVectorizer::new()
            .with_stopwords(stop)
            .fit_transform(&["The a", "a"])
            .unwrap_err();
        assert_eq!(err, VectorizeError::EmptyVocabulary);
    }

    #[test]
    fn test_kmeans_separates_groups_deterministically() {
        let docs = [
            "cats dogs pets",
            "stocks market finance",
            "cats dogs pets",
            "stocks market finance",
        ];
        let matrix = TfidfVectorizer::new().fit_transform(&docs).unwrap();
        let a = kmeans(&matrix, 2, DEFAULT_SEED);
        let b = kmeans(&matrix, 2, DEFAULT_SEED);
        assert_eq!(a, b);
        assert_eq!(a.labels[0], a.labels[2]);
        assert_eq!(a.labels[1], a.labels[3]);
        assert_ne!(a.labels[0], a.labels[1]);
    }

    #[test]
    fn test_kmeans_clamps_k() {
        let matrix = TfidfVectorizer::new().fit_transform(&["one thing", "two things"]).unwrap();
        let c = kmeans(&matrix, 10, DEFAULT_SEED);
        assert_eq!(c.centroids.len(), 2);
        assert_eq!(c.labels.len(), 2);
    }
}
