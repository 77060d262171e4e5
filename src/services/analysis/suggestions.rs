// Suggestion Generator
// At most one suggestion per condition: long sentences, complex words, passive voice, low coherence

use std::sync::Arc;

use crate::models::{AnnotatedDocument, OptimizationSuggestion, SuggestionSeverity};
use crate::services::analysis::metrics::coherence_score;
use crate::services::engine::LinguisticEngine;
use crate::services::text_processor::whitespace_word_count;

const LONG_SENTENCE_WORDS: usize = 20;
const COMPLEX_WORD_CHARS: usize = 12;
const COHERENCE_THRESHOLD: f64 = 0.5;

pub struct SuggestionGenerator {
    engine: Arc<dyn LinguisticEngine>,
}

impl SuggestionGenerator {
    pub fn new(engine: Arc<dyn LinguisticEngine>) -> Self {
        Self { engine }
    }

    pub fn suggest(&self, doc: &AnnotatedDocument) -> Vec<OptimizationSuggestion> {
        let coherence = coherence_score(self.engine.as_ref(), doc);
        self.suggest_with_coherence(doc, coherence)
    }

    /// Same as `suggest`, reusing an already computed coherence score
    pub fn suggest_with_coherence(&self, doc: &AnnotatedDocument, coherence: f64) -> Vec<OptimizationSuggestion> {
        let mut suggestions = Vec::new();

        let long_sentences: Vec<&str> = doc
            .sentences
            .iter()
            .filter(|s| whitespace_word_count(&s.text) > LONG_SENTENCE_WORDS)
            .map(|s| s.text.as_str())
            .collect();
        if !long_sentences.is_empty() {
            suggestions.push(OptimizationSuggestion {
                r#type: "sentence_length".to_string(),
                severity: SuggestionSeverity::Medium,
                message: format!(
                    "Consider breaking down {} long sentences for better readability",
                    long_sentences.len()
                ),
                examples: Some(long_sentences.iter().take(2).map(|s| s.to_string()).collect()),
                score: None,
            });
        }

        let complex_words: Vec<&str> = doc
            .tokens()
            .filter(|t| !t.is_stop && t.text.chars().count() > COMPLEX_WORD_CHARS)
            .map(|t| t.text.as_str())
            .collect();
        if !complex_words.is_empty() {
            let examples: Vec<String> = complex_words.iter().take(3).map(|w| w.to_string()).collect();
            suggestions.push(OptimizationSuggestion {
                r#type: "word_complexity".to_string(),
                severity: SuggestionSeverity::Low,
                message: format!("Consider simplifying complex words: {}", examples.join(", ")),
                examples: Some(examples),
                score: None,
            });
        }

        let passive: Vec<&str> = doc
            .sentences
            .iter()
            .filter(|s| s.has_dep("auxpass"))
            .map(|s| s.text.as_str())
            .collect();
        if !passive.is_empty() {
            suggestions.push(OptimizationSuggestion {
                r#type: "passive_voice".to_string(),
                severity: SuggestionSeverity::Low,
                message: "Consider using active voice in some sentences".to_string(),
                examples: Some(passive.iter().take(2).map(|s| s.to_string()).collect()),
                score: None,
            });
        }

        if coherence < COHERENCE_THRESHOLD {
            suggestions.push(OptimizationSuggestion {
                r#type: "coherence".to_string(),
                severity: SuggestionSeverity::High,
                message: "Consider improving the flow between sentences with transitions".to_string(),
                examples: None,
                score: Some(coherence),
            });
        }

        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::engine::HeuristicEngine;

    fn suggest(text: &str) -> Vec<OptimizationSuggestion> {
        let engine: Arc<dyn LinguisticEngine> = Arc::new(HeuristicEngine::default());
        let doc = engine.annotate(text).unwrap();
        SuggestionGenerator::new(engine).suggest(&doc)
    }

    fn types(suggestions: &[OptimizationSuggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.r#type.as_str()).collect()
    }

    #[test]
    fn test_clean_text_has_no_suggestions() {
        assert!(suggest("The cat runs fast.").is_empty());
    }

    #[test]
    fn test_long_sentence_and_complex_word() {
        let long = format!("The {} runs fast.", vec!["cat"; 20].join(" "));
        let s = suggest(&format!("{} Internationalization matters.", long));
        assert!(types(&s).contains(&"sentence_length"));
        let complex = s.iter().find(|x| x.r#type == "word_complexity").unwrap();
        assert_eq!(complex.examples.as_ref().unwrap(), &vec!["Internationalization".to_string()]);
        assert_eq!(complex.severity, SuggestionSeverity::Low);
    }

    #[test]
    fn test_passive_voice_single_entry() {
        let s = suggest("The report was written by the team.");
        let passive: Vec<_> = s.iter().filter(|x| x.r#type == "passive_voice").collect();
        assert_eq!(passive.len(), 1);
        assert_eq!(passive[0].examples.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_low_coherence_carries_score() {
        let s = suggest("Rust code compiles. Gardens grow.");
        let coherence = s.iter().find(|x| x.r#type == "coherence").unwrap();
        assert_eq!(coherence.severity, SuggestionSeverity::High);
        assert_eq!(coherence.score, Some(0.0));
        assert!(coherence.examples.is_none());
    }
}
