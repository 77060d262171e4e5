// Topic Clusterer
// Groups document sentences into topics via TF-IDF + seeded k-means

use std::sync::Arc;
use tracing::warn;

use crate::models::{AnnotatedDocument, TopicCluster};
use crate::services::analysis::vectorizer::{kmeans, TfidfVectorizer, DEFAULT_SEED};
use crate::services::stopwords::StopwordFilter;

pub const DEFAULT_NUM_TOPICS: usize = 5;
const MAX_FEATURES: usize = 100;
const KEY_TERMS: usize = 5;
const SAMPLE_SENTENCES: usize = 2;

pub struct TopicClusterer {
    vectorizer: TfidfVectorizer,
    seed: u64,
}

impl TopicClusterer {
    pub fn new(stopwords: Arc<StopwordFilter>) -> Self {
        Self {
            vectorizer: TfidfVectorizer::new()
                .with_stopwords(stopwords)
                .with_ngram_max(2)
                .with_max_features(MAX_FEATURES),
            seed: DEFAULT_SEED,
        }
    }

    pub fn cluster(&self, doc: &AnnotatedDocument, num_topics: usize) -> Vec<TopicCluster> {
        let sentences = doc.sentence_texts();
        let k = num_topics.min(sentences.len()).max(1);

        let matrix = match self.vectorizer.fit_transform(&sentences) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, sentences = sentences.len(), "[topics] vectorization failed, single cluster");
                return vec![TopicCluster {
                    topic_id: 0,
                    key_terms: Vec::new(),
                    sample_sentences: sentences,
                }];
            }
        };

        let clustering = kmeans(&matrix, k, self.seed);

        clustering
            .centroids
            .iter()
            .enumerate()
            .filter_map(|(topic_id, centroid)| {
                let members: Vec<&String> = sentences
                    .iter()
                    .zip(clustering.labels.iter())
                    .filter(|(_, label)| **label == topic_id)
                    .map(|(s, _)| s)
                    .collect();
                if members.is_empty() {
                    return None;
                }

                let mut weighted: Vec<(usize, f64)> = centroid.iter().copied().enumerate().collect();
                // Vocabulary is alphabetical, so a stable sort keeps ties alphabetical
                weighted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
                let key_terms = weighted
                    .iter()
                    .take(KEY_TERMS)
                    .map(|(i, _)| matrix.vocabulary[*i].clone())
                    .collect();

                Some(TopicCluster {
                    topic_id,
                    key_terms,
                    sample_sentences: members.into_iter().take(SAMPLE_SENTENCES).cloned().collect(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::engine::{HeuristicEngine, LinguisticEngine};

    fn clusterer() -> TopicClusterer {
        let stop = StopwordFilter::from_list(&["it", "is", "we", "are", "the", "a", "of"]);
        TopicClusterer::new(Arc::new(stop))
    }

    #[test]
    fn test_topics_clamped_to_sentence_count() {
        let doc = HeuristicEngine::default()
            .annotate("Rust compilers optimize code. Gardens need water daily.")
            .unwrap();
        let topics = clusterer().cluster(&doc, 5);
        // disjoint vocabularies: each sentence forms its own cluster
        assert_eq!(topics.len(), 2);
        assert!(topics.iter().all(|t| t.sample_sentences.len() == 1));
        assert_ne!(topics[0].sample_sentences, topics[1].sample_sentences);
    }

    #[test]
    fn test_single_topic_has_key_terms_and_samples() {
        let text = "Rust compilers optimize code. Rust compilers check code. Rust code runs.";
        let doc = HeuristicEngine::default().annotate(text).unwrap();
        let topics = clusterer().cluster(&doc, 1);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].topic_id, 0);
        assert!(topics[0].key_terms.len() <= 5);
        assert!(topics[0].key_terms.contains(&"rust".to_string()));
        assert_eq!(topics[0].sample_sentences.len(), 2);
    }

    #[test]
    fn test_degenerate_vocabulary_single_cluster() {
        let doc = HeuristicEngine::default().annotate("It is. We are.").unwrap();
        let topics = clusterer().cluster(&doc, 3);
        assert_eq!(topics.len(), 1);
        assert!(topics[0].key_terms.is_empty());
        assert_eq!(topics[0].sample_sentences, vec!["It is.", "We are."]);
    }

    #[test]
    fn test_deterministic() {
        let text = "Cats chase mice. Dogs chase cats. Markets fell sharply. Stocks fell again.";
        let doc = HeuristicEngine::default().annotate(text).unwrap();
        assert_eq!(clusterer().cluster(&doc, 2), clusterer().cluster(&doc, 2));
    }
}
