// Key Phrase Extraction
// Noun chunks `(ADJ)* (NOUN|PROPN)+` ranked by summed TF-IDF weight, frequency as fallback

use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

use crate::models::{AnnotatedDocument, Sentence};
use crate::services::analysis::vectorizer::TfidfVectorizer;
use crate::services::stopwords::StopwordFilter;

pub const DEFAULT_TOP_N: usize = 5;

/// Noun chunk detector over annotated sentences
#[derive(Debug, Clone)]
pub struct NounChunker {
    max_length: usize,
}

impl Default for NounChunker {
    fn default() -> Self {
        Self { max_length: 5 }
    }
}

impl NounChunker {
    /// Chunk texts (source slices) in document order
    pub fn extract<'a>(&self, sentence: &'a Sentence, doc_text: &'a str) -> Vec<&'a str> {
        let tokens = &sentence.tokens;
        let mut chunks = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let mut end = i;
            while end < tokens.len() && tokens[end].pos == "ADJ" {
                end += 1;
            }
            let noun_start = end;
            while end < tokens.len() && tokens[end].is_nominal() {
                end += 1;
            }
            let len = end - i;
            if end > noun_start && len <= self.max_length {
                if let Some(text) = doc_text.get(tokens[i].idx..tokens[end - 1].end()) {
                    chunks.push(text);
                }
                i = end;
                continue;
            }
            i += 1;
        }
        chunks
    }
}

pub struct KeyPhraseExtractor {
    chunker: NounChunker,
    stopwords: Arc<StopwordFilter>,
}

impl KeyPhraseExtractor {
    pub fn new(stopwords: Arc<StopwordFilter>) -> Self {
        Self {
            chunker: NounChunker::default(),
            stopwords,
        }
    }

    /// Lowercase candidate phrases, one entry per occurrence
    pub fn candidates(&self, doc: &AnnotatedDocument) -> Vec<String> {
        doc.sentences
            .iter()
            .flat_map(|s| self.chunker.extract(s, &doc.text))
            .map(|c| c.to_lowercase())
            .filter(|c| {
                let words: Vec<&str> = c.split_whitespace().collect();
                !self.stopwords.all_stopwords(&words)
            })
            .collect()
    }

    pub fn extract(&self, doc: &AnnotatedDocument, top_n: usize) -> Vec<String> {
        let candidates = self.candidates(doc);
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut unique: Vec<&str> = Vec::new();
        let mut frequency: FxHashMap<&str, usize> = FxHashMap::default();
        for c in &candidates {
            let count = frequency.entry(c.as_str()).or_insert(0);
            if *count == 0 {
                unique.push(c.as_str());
            }
            *count += 1;
        }

        let vectorizer = TfidfVectorizer::new();
        let mut scored: Vec<(&str, f64)> = match vectorizer.fit_transform(&candidates) {
            Ok(matrix) => unique
                .iter()
                .map(|p| {
                    let weight = vectorizer.analyze(p).iter().map(|t| matrix.column_sum(t)).sum();
                    (*p, weight)
                })
                .collect(),
            Err(e) => {
                debug!(error = %e, "[keyphrases] falling back to frequency ranking");
                unique.iter().map(|p| (*p, frequency[p] as f64)).collect()
            }
        };

        // Stable: equal scores keep first-occurrence order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(top_n).map(|(p, _)| p.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::engine::{HeuristicEngine, LinguisticEngine};

    fn extractor() -> KeyPhraseExtractor {
        KeyPhraseExtractor::new(Arc::new(StopwordFilter::from_list(&["the", "a", "it", "is"])))
    }

    #[test]
    fn test_chunks_skip_determiners_and_keep_adjectives() {
        let doc = HeuristicEngine::default()
            .annotate("The new parser reads source files.")
            .unwrap();
        let chunks = extractor().candidates(&doc);
        assert_eq!(chunks, vec!["new parser", "source files"]);
    }

    #[test]
    fn test_repeated_phrase_ranks_first() {
        let text = "The parser reads files. The parser writes logs. The parser builds trees.";
        let doc = HeuristicEngine::default().annotate(text).unwrap();
        let phrases = extractor().extract(&doc, 5);
        assert_eq!(phrases[0], "parser");
        assert_eq!(phrases.len(), 4);
    }

    #[test]
    fn test_top_n_limits() {
        let text = "The parser reads files. The parser writes logs. The parser builds trees.";
        let doc = HeuristicEngine::default().annotate(text).unwrap();
        assert_eq!(extractor().extract(&doc, 2).len(), 2);
    }

    #[test]
    fn test_no_candidates() {
        let doc = HeuristicEngine::default().annotate("It is.").unwrap();
        assert!(extractor().extract(&doc, 5).is_empty());
    }
}
