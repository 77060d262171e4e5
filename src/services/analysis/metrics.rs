// Metrics Aggregator
// Readability, sentence structure, coherence, entities and key phrases for one text

use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{
    AnnotatedDocument, ReadabilityScores, SentenceTypeCounts, StructureMetrics, TextMetrics,
};
use crate::services::analysis::keyphrases::{KeyPhraseExtractor, DEFAULT_TOP_N};
use crate::services::analysis::readability::{ReadabilityFormulas, TextStats};
use crate::services::engine::LinguisticEngine;
use crate::services::errors::{AnalysisError, EngineError};
use crate::services::lexicon::Lexicons;

const COMPLEX_WORD_CHARS: usize = 6;

/// Mean similarity of consecutive sentences; exactly 1.0 below two sentences.
pub fn coherence_score(engine: &dyn LinguisticEngine, doc: &AnnotatedDocument) -> f64 {
    if doc.sentences.len() < 2 {
        return 1.0;
    }
    let pairs: Vec<f64> = doc
        .sentences
        .windows(2)
        .map(|w| engine.similarity(&w[0].text, &w[1].text))
        .collect();
    pairs.iter().sum::<f64>() / pairs.len() as f64
}

pub struct MetricsAggregator {
    engine: Arc<dyn LinguisticEngine>,
    readability: Arc<dyn ReadabilityFormulas>,
    keyphrases: KeyPhraseExtractor,
    discourse_markers: Vec<Regex>,
}

impl MetricsAggregator {
    pub fn new(
        engine: Arc<dyn LinguisticEngine>,
        lexicons: &Lexicons,
        readability: Arc<dyn ReadabilityFormulas>,
    ) -> Result<Self, EngineError> {
        let discourse_markers = lexicons
            .discourse_markers
            .iter()
            .map(|m| {
                RegexBuilder::new(&format!(r"\b{}\b", regex::escape(m)))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| EngineError::InvalidConfiguration(format!("Invalid discourse marker '{}': {}", m, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            engine,
            readability,
            keyphrases: KeyPhraseExtractor::new(Arc::new(lexicons.stopwords.clone())),
            discourse_markers,
        })
    }

    pub fn aggregate(&self, text: &str) -> Result<TextMetrics, AnalysisError> {
        let doc = self.engine.annotate(text)?;
        Ok(self.aggregate_document(&doc))
    }

    pub fn aggregate_document(&self, doc: &AnnotatedDocument) -> TextMetrics {
        let whitespace_words: Vec<&str> = doc.text.split_whitespace().collect();
        let avg_word_length = if whitespace_words.is_empty() {
            0.0
        } else {
            whitespace_words.iter().map(|w| w.chars().count()).sum::<usize>() as f64
                / whitespace_words.len() as f64
        };

        let (entities, named_entities) = self.entities(doc);

        TextMetrics {
            word_count: whitespace_words.len(),
            sentence_count: doc.sentences.len(),
            avg_word_length,
            readability: self.readability(doc),
            structure: self.structure(doc),
            entities,
            named_entities,
            key_phrases: self.keyphrases.extract(doc, DEFAULT_TOP_N),
        }
    }

    pub fn readability(&self, doc: &AnnotatedDocument) -> ReadabilityScores {
        let stats = TextStats::from_text(&doc.text);
        let f = self.readability.as_ref();

        let word_tokens: Vec<&str> = doc
            .tokens()
            .filter(|t| !t.is_punct)
            .map(|t| t.text.as_str())
            .collect();
        let (avg_word_length, complex_word_ratio) = if word_tokens.is_empty() {
            (0.0, 0.0)
        } else {
            let n = word_tokens.len() as f64;
            let chars: usize = word_tokens.iter().map(|w| w.chars().count()).sum();
            let complex = word_tokens
                .iter()
                .filter(|w| w.chars().count() > COMPLEX_WORD_CHARS)
                .count();
            (chars as f64 / n, complex as f64 / n)
        };
        let whitespace_words = doc.text.split_whitespace().count();
        let avg_sentence_length = if doc.sentences.is_empty() {
            0.0
        } else {
            whitespace_words as f64 / doc.sentences.len() as f64
        };

        ReadabilityScores {
            flesch_reading_ease: f.flesch_reading_ease(&stats),
            flesch_kincaid_grade: f.flesch_kincaid_grade(&stats),
            gunning_fog: f.gunning_fog(&stats),
            smog_index: f.smog_index(&stats),
            automated_readability_index: f.automated_readability_index(&stats),
            coleman_liau_index: f.coleman_liau_index(&stats),
            linsear_write_formula: f.linsear_write_formula(&stats),
            dale_chall_readability_score: f.dale_chall_readability_score(&stats),
            avg_sentence_length,
            avg_word_length,
            complex_word_ratio,
        }
    }

    pub fn structure(&self, doc: &AnnotatedDocument) -> StructureMetrics {
        let mut sentence_types = SentenceTypeCounts::default();
        let mut discourse_markers = 0usize;

        for sent in &doc.sentences {
            if sent.has_dep("mark") {
                sentence_types.complex += 1;
            } else if sent.has_dep("cc") {
                sentence_types.compound += 1;
            } else {
                sentence_types.simple += 1;
            }
            discourse_markers += self
                .discourse_markers
                .iter()
                .map(|re| re.find_iter(&sent.text).count())
                .sum::<usize>();
        }

        StructureMetrics {
            sentence_types,
            discourse_markers,
            coherence_score: coherence_score(self.engine.as_ref(), doc),
        }
    }

    /// Surface texts per label (first-seen order, de-duplicated) and mention counts per label
    fn entities(&self, doc: &AnnotatedDocument) -> (BTreeMap<String, Vec<String>>, BTreeMap<String, usize>) {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for ent in doc.entities() {
            *counts.entry(ent.label.clone()).or_insert(0) += 1;
            let texts = grouped.entry(ent.label.clone()).or_default();
            if !texts.contains(&ent.text) {
                texts.push(ent.text.clone());
            }
        }
        (grouped, counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analysis::readability::Textstat;
    use crate::services::engine::HeuristicEngine;

    fn aggregator() -> MetricsAggregator {
        let lexicons = Lexicons::default();
        MetricsAggregator::new(Arc::new(HeuristicEngine::default()), &lexicons, Arc::new(Textstat)).unwrap()
    }

    #[test]
    fn test_single_sentence_coherence_is_one() {
        let metrics = aggregator().aggregate("The cat runs fast.").unwrap();
        assert_eq!(metrics.structure.coherence_score, 1.0);
        assert_eq!(metrics.sentence_count, 1);
        assert_eq!(metrics.word_count, 4);
    }

    #[test]
    fn test_coherence_is_mean_of_consecutive_pairs() {
        let engine = HeuristicEngine::default();
        let doc = engine.annotate("Rust code compiles. Rust code compiles. Gardens grow.").unwrap();
        // pairs: identical (1.0) and disjoint (0.0)
        assert!((coherence_score(&engine, &doc) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_sentence_types_and_markers() {
        let text = "We stayed because it rained. The cat runs and the dog sleeps. However, it ended.";
        let metrics = aggregator().aggregate(text).unwrap();
        let types = &metrics.structure.sentence_types;
        assert_eq!((types.complex, types.compound, types.simple), (1, 1, 1));
        assert_eq!(metrics.structure.discourse_markers, 1);
    }

    #[test]
    fn test_entities_grouped_and_counted() {
        let text = "Engineers at Mozilla built it. Then Mozilla shipped 3 releases.";
        let metrics = aggregator().aggregate(text).unwrap();
        assert_eq!(metrics.entities["MISC"], vec!["Mozilla"]);
        assert_eq!(metrics.named_entities["MISC"], 2);
        assert_eq!(metrics.entities["CARDINAL"], vec!["3"]);
    }

    #[test]
    fn test_readability_extras() {
        let metrics = aggregator().aggregate("The elephant sat.").unwrap();
        let r = &metrics.readability;
        assert!((r.avg_sentence_length - 3.0).abs() < 1e-9);
        assert!((r.avg_word_length - 14.0 / 3.0).abs() < 1e-9);
        assert!((r.complex_word_ratio - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_metrics() {
        let metrics = aggregator().aggregate("").unwrap();
        assert_eq!(metrics.word_count, 0);
        assert_eq!(metrics.structure.coherence_score, 1.0);
        assert!(metrics.key_phrases.is_empty());
    }
}
