// Synonym-based Optimizer
// Level-gated rewriting: structural splitting of long sentences and synonym substitution,
// with whole-sentence keyword preservation

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::models::{
    AnnotatedDocument, OptimizationLevel, OptimizationSuggestion, Sentence, TextMetrics,
};
use crate::services::analysis::keyphrases::{KeyPhraseExtractor, DEFAULT_TOP_N};
use crate::services::analysis::metrics::MetricsAggregator;
use crate::services::analysis::suggestions::SuggestionGenerator;
use crate::services::config_store::LimitsConfig;
use crate::services::engine::LinguisticEngine;
use crate::services::errors::{AnalysisError, InputError};
use crate::services::thesaurus::{pos_hint_for, SynonymCandidate, SynonymLexicon};

const SPLIT_MIN_TOKENS: usize = 20;
const CONJUNCTION_RUN: usize = 5;
const COMMA_RUN: usize = 10;
const MAX_SYNONYMS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationOutcome {
    pub original: String,
    pub optimized: String,
    pub level: OptimizationLevel,
    /// Lowercased keywords actually used for preservation
    pub preserved_keywords: Vec<String>,
    pub metrics: TextMetrics,
    pub suggestions: Vec<OptimizationSuggestion>,
}

pub struct TextOptimizer {
    engine: Arc<dyn LinguisticEngine>,
    synonyms: Arc<dyn SynonymLexicon>,
    keyphrases: KeyPhraseExtractor,
    metrics: Arc<MetricsAggregator>,
    suggestions: Arc<SuggestionGenerator>,
    limits: LimitsConfig,
}

impl TextOptimizer {
    pub fn new(
        engine: Arc<dyn LinguisticEngine>,
        synonyms: Arc<dyn SynonymLexicon>,
        keyphrases: KeyPhraseExtractor,
        metrics: Arc<MetricsAggregator>,
        suggestions: Arc<SuggestionGenerator>,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            engine,
            synonyms,
            keyphrases,
            metrics,
            suggestions,
            limits,
        }
    }

    fn check_length(&self, text: &str) -> Result<(), InputError> {
        let len = text.chars().count();
        if text.is_empty() || len < self.limits.min_text_length {
            return Err(InputError::TextTooShort { min: self.limits.min_text_length });
        }
        if len > self.limits.max_text_length {
            return Err(InputError::TextTooLong { max: self.limits.max_text_length, actual: len });
        }
        Ok(())
    }

    /// Level given as a string; checked after the length bounds.
    pub fn optimize_str(
        &self,
        text: &str,
        level: &str,
        keywords: Option<&[String]>,
    ) -> Result<OptimizationOutcome, AnalysisError> {
        self.check_length(text)?;
        let level = OptimizationLevel::parse(level)
            .ok_or_else(|| InputError::InvalidOptimizationLevel(level.to_string()))?;
        self.optimize(text, level, keywords)
    }

    /// `None` keywords are auto-extracted from the text's key phrases.
    pub fn optimize(
        &self,
        text: &str,
        level: OptimizationLevel,
        keywords: Option<&[String]>,
    ) -> Result<OptimizationOutcome, AnalysisError> {
        self.check_length(text)?;

        self.rewrite(text, level, keywords).map_err(|e| match e {
            AnalysisError::Processing(cause) => {
                AnalysisError::processing("Error during text optimization", cause)
            }
            other => other,
        })
    }

    fn rewrite(
        &self,
        text: &str,
        level: OptimizationLevel,
        keywords: Option<&[String]>,
    ) -> Result<OptimizationOutcome, AnalysisError> {
        let doc = self.engine.annotate(text)?;

        let preserved: Vec<String> = match keywords {
            Some(k) => k.iter().map(|w| w.to_lowercase()).filter(|w| !w.is_empty()).collect(),
            None => self.keyphrases.extract(&doc, DEFAULT_TOP_N),
        };

        let mut kept = 0usize;
        let sentences: Vec<String> = doc
            .sentences
            .iter()
            .map(|sent| {
                let lower = sent.text.to_lowercase();
                if preserved.iter().any(|k| lower.contains(k.as_str())) {
                    kept += 1;
                    return sent.text.clone();
                }
                let mut out = sent.text.clone();
                if level.splits_sentences() {
                    out = split_long_sentence(sent, &doc);
                }
                if level.substitutes_synonyms() {
                    out = self.substitute_synonyms(&out, sent);
                }
                out
            })
            .collect();
        let optimized = sentences.join(" ");

        let optimized_doc = self.engine.annotate(&optimized)?;
        let metrics = self.metrics.aggregate_document(&optimized_doc);
        let suggestions = self
            .suggestions
            .suggest_with_coherence(&optimized_doc, metrics.structure.coherence_score);

        info!(
            level = level.as_str(),
            sentences = doc.sentences.len(),
            preserved_sentences = kept,
            keywords = preserved.len(),
            "[optimizer] text optimized"
        );

        Ok(OptimizationOutcome {
            original: text.to_string(),
            optimized,
            level,
            preserved_keywords: preserved,
            metrics,
            suggestions,
        })
    }

    /// Top candidates: no self-matches or multi-word lemmas, de-duplicated, stable by score.
    pub fn synonyms_for(&self, word: &str, pos_hint: Option<&str>) -> Vec<SynonymCandidate> {
        let mut candidates: Vec<SynonymCandidate> = Vec::new();
        for c in self.synonyms.lookup(word, pos_hint) {
            if c.lemma.eq_ignore_ascii_case(word) || c.lemma.contains('_') || c.lemma.contains(' ') {
                continue;
            }
            if candidates.iter().any(|seen| seen.lemma == c.lemma) {
                continue;
            }
            candidates.push(c);
        }
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        candidates.truncate(MAX_SYNONYMS);
        candidates
    }

    fn substitute_synonyms(&self, text: &str, sent: &Sentence) -> String {
        text.split_whitespace()
            .map(|word| {
                let hint = sent
                    .tokens
                    .iter()
                    .find(|t| t.text == word)
                    .and_then(|t| pos_hint_for(&t.pos));
                match self.synonyms_for(word, hint).into_iter().next() {
                    Some(best) => best.lemma,
                    None => word.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Split a sentence of more than 20 tokens at conjunctions, markers or commas.
/// Trigger tokens are dropped; segments are joined with ". ".
pub fn split_long_sentence(sent: &Sentence, doc: &AnnotatedDocument) -> String {
    let tokens = &sent.tokens;
    if tokens.len() <= SPLIT_MIN_TOKENS {
        return sent.text.clone();
    }

    let mut segments: Vec<(usize, usize)> = Vec::new();
    let mut run: Option<(usize, usize)> = None;
    let mut run_len = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        let conjunction = (token.dep == "cc" || token.dep == "mark") && run_len >= CONJUNCTION_RUN;
        let comma = token.text == "," && run_len >= COMMA_RUN;
        if conjunction || comma {
            if let Some(r) = run.take() {
                segments.push(r);
            }
            run_len = 0;
            continue;
        }
        run = Some(match run {
            Some((first, _)) => (first, i),
            None => (i, i),
        });
        run_len += 1;
    }
    if let Some(r) = run {
        segments.push(r);
    }

    segments
        .iter()
        .filter_map(|(first, last)| doc.text.get(tokens[*first].idx..tokens[*last].end()))
        .collect::<Vec<_>>()
        .join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analysis::readability::Textstat;
    use crate::services::engine::HeuristicEngine;
    use crate::services::errors::EngineError;
    use crate::services::lexicon::Lexicons;
    use crate::services::thesaurus::Thesaurus;

    const NO_KEYWORDS: &[String] = &[];
    const LONG: &str = "The quick team wrote the first draft of the long report and the other team reviewed every page of the long report carefully today.";

    fn optimizer_with(engine: Arc<dyn LinguisticEngine>) -> TextOptimizer {
        let lexicons = Lexicons::default();
        let stopwords = Arc::new(lexicons.stopwords.clone());
        let metrics = MetricsAggregator::new(engine.clone(), &lexicons, Arc::new(Textstat)).unwrap();
        TextOptimizer::new(
            engine.clone(),
            Arc::new(Thesaurus::builtin()),
            KeyPhraseExtractor::new(stopwords),
            Arc::new(metrics),
            Arc::new(SuggestionGenerator::new(engine)),
            LimitsConfig::default(),
        )
    }

    fn optimizer() -> TextOptimizer {
        optimizer_with(Arc::new(HeuristicEngine::default()))
    }

    struct FailingEngine(AnalysisError);

    impl LinguisticEngine for FailingEngine {
        fn annotate(&self, _text: &str) -> Result<AnnotatedDocument, AnalysisError> {
            Err(self.0.clone())
        }
        fn similarity(&self, _a: &str, _b: &str) -> f64 {
            0.0
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_empty_text_too_short() {
        let err = optimizer().optimize_str("", "medium", None).unwrap_err();
        assert!(matches!(err, AnalysisError::Input(InputError::TextTooShort { .. })));
    }

    #[test]
    fn test_text_too_long() {
        let text = "a".repeat(10001);
        let err = optimizer().optimize_str(&text, "medium", Some(NO_KEYWORDS)).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Input(InputError::TextTooLong { max: 10000, actual: 10001 })
        );
    }

    #[test]
    fn test_invalid_level() {
        let err = optimizer().optimize_str("The cat runs.", "invalid", Some(NO_KEYWORDS)).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Input(InputError::InvalidOptimizationLevel("invalid".into()))
        );
    }

    #[test]
    fn test_keyword_sentence_passes_through_at_every_level() {
        let text = "The big dog runs. The big cat runs.";
        let keywords = vec!["DOG".to_string()];
        for level in ["light", "medium", "aggressive"] {
            let out = optimizer().optimize_str(text, level, Some(keywords.as_slice())).unwrap();
            assert!(out.optimized.starts_with("The big dog runs."));
        }
        let out = optimizer().optimize_str(text, "aggressive", Some(keywords.as_slice())).unwrap();
        assert_eq!(out.optimized, "The big dog runs. The large cat runs.");
        assert_eq!(out.preserved_keywords, vec!["dog"]);
    }

    #[test]
    fn test_light_is_identity_per_sentence() {
        let out = optimizer().optimize_str(LONG, "light", Some(NO_KEYWORDS)).unwrap();
        assert_eq!(out.optimized, LONG);
    }

    #[test]
    fn test_medium_splits_long_sentence() {
        let out = optimizer().optimize_str(LONG, "medium", Some(NO_KEYWORDS)).unwrap();
        assert_eq!(
            out.optimized,
            "The quick team wrote the first draft of the long report. the other team reviewed every page of the long report carefully today."
        );
        assert_eq!(out.metrics.sentence_count, 2);
    }

    #[test]
    fn test_short_sentence_not_split() {
        let out = optimizer().optimize_str("The cat runs and the dog sleeps.", "medium", Some(NO_KEYWORDS)).unwrap();
        assert_eq!(out.optimized, "The cat runs and the dog sleeps.");
    }

    fn split(text: &str, expected_tokens: usize) -> String {
        let doc = HeuristicEngine::default().annotate(text).unwrap();
        assert_eq!(doc.sentences.len(), 1);
        assert_eq!(doc.sentences[0].tokens.len(), expected_tokens);
        split_long_sentence(&doc.sentences[0], &doc)
    }

    #[test]
    fn test_comma_splits_only_after_ten_tokens() {
        // first comma closes a run of 9 and stays; the second closes a run of 20
        let text = "Parsers lexers tokens trees nodes edges graphs paths cycles, queues stacks heaps lists maps sets arrays slices bytes words, pages files logs tables rows.";
        assert_eq!(
            split(text, 27),
            "Parsers lexers tokens trees nodes edges graphs paths cycles, queues stacks heaps lists maps sets arrays slices bytes words. pages files logs tables rows."
        );
    }

    #[test]
    fn test_comma_at_run_of_exactly_ten_splits() {
        let text = "Parsers lexers tokens trees nodes edges graphs paths cycles queues, stacks heaps lists maps sets arrays slices bytes words pages.";
        assert_eq!(
            split(text, 22),
            "Parsers lexers tokens trees nodes edges graphs paths cycles queues. stacks heaps lists maps sets arrays slices bytes words pages."
        );
    }

    #[test]
    fn test_subordinator_splits_after_five_tokens() {
        let text = "We stayed inside the warm old house all day because the heavy storm outside kept raging through the long cold winter night.";
        assert_eq!(
            split(text, 23),
            "We stayed inside the warm old house all day. the heavy storm outside kept raging through the long cold winter night."
        );

        // "because" after a run of 2 stays in place
        let early = "We left because the heavy storm outside kept raging through the long cold winter night over the quiet old town.";
        assert_eq!(split(early, 21), early);
    }

    #[test]
    fn test_split_needs_more_than_twenty_tokens() {
        let twenty = "The team wrote the first draft and the other team reviewed every page of the long report carefully today.";
        assert_eq!(split(twenty, 20), twenty);

        let twenty_one = "The team wrote the first draft and the other team reviewed every page of the long report very carefully today.";
        assert_eq!(
            split(twenty_one, 21),
            "The team wrote the first draft. the other team reviewed every page of the long report very carefully today."
        );
    }

    #[test]
    fn test_synonym_ranking_filters_self_and_multiword() {
        let mut entries = rustc_hash::FxHashMap::default();
        entries.insert(
            "quick".to_string(),
            vec![
                SynonymCandidate { lemma: "quick".into(), pos: None, score: 1.0 },
                SynonymCandidate { lemma: "fast_paced".into(), pos: None, score: 0.99 },
                SynonymCandidate { lemma: "speedy".into(), pos: None, score: 0.5 },
                SynonymCandidate { lemma: "rapid".into(), pos: None, score: 0.9 },
                SynonymCandidate { lemma: "rapid".into(), pos: None, score: 0.1 },
                SynonymCandidate { lemma: "swift".into(), pos: None, score: 0.5 },
                SynonymCandidate { lemma: "brisk".into(), pos: None, score: 0.2 },
            ],
        );
        let engine: Arc<dyn LinguisticEngine> = Arc::new(HeuristicEngine::default());
        let mut opt = optimizer_with(engine);
        opt.synonyms = Arc::new(Thesaurus::from_entries(entries));
        let lemmas: Vec<String> = opt.synonyms_for("quick", None).into_iter().map(|c| c.lemma).collect();
        assert_eq!(lemmas, vec!["rapid", "speedy", "swift"]);
    }

    #[test]
    fn test_processing_fault_wrapped_once() {
        let opt = optimizer_with(Arc::new(FailingEngine(AnalysisError::Processing("boom".into()))));
        let err = opt.optimize_str("The cat runs.", "medium", Some(NO_KEYWORDS)).unwrap_err();
        assert_eq!(err.to_string(), "Error during text optimization: boom");
    }

    #[test]
    fn test_engine_error_propagates_unchanged() {
        let missing = AnalysisError::Engine(EngineError::ModelNotFound("en_core_web_sm".into()));
        let opt = optimizer_with(Arc::new(FailingEngine(missing.clone())));
        assert_eq!(opt.optimize_str("The cat runs.", "medium", Some(NO_KEYWORDS)).unwrap_err(), missing);
    }

    #[test]
    fn test_auto_keywords_when_absent() {
        let out = optimizer().optimize_str("The parser reads files.", "light", None).unwrap();
        assert!(out.preserved_keywords.contains(&"parser".to_string()));
    }
}
