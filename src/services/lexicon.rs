// Lexicons & Rule Tables
// Process-wide read-only vocabulary: polarity words, emotion lists, discourse markers,
// stopwords and per-guide style rules. Built once and shared behind an Arc.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::models::{Emotion, StyleGuideType, StyleRule};
use crate::services::errors::EngineError;
use crate::services::stopwords::StopwordFilter;

const POSITIVE_WORDS: [&str; 3] = ["good", "great", "excellent"];
const NEGATIVE_WORDS: [&str; 3] = ["bad", "poor", "terrible"];

const DISCOURSE_MARKERS: [&str; 16] = [
    "however",
    "therefore",
    "moreover",
    "furthermore",
    "consequently",
    "nevertheless",
    "thus",
    "hence",
    "meanwhile",
    "additionally",
    "finally",
    "similarly",
    "in addition",
    "for example",
    "in contrast",
    "on the other hand",
];

fn default_emotion_words(emotion: Emotion) -> &'static [&'static str] {
    match emotion {
        Emotion::Joy => &["happy", "delighted", "pleased"],
        Emotion::Sadness => &["sad", "disappointed", "unhappy"],
        Emotion::Anger => &["angry", "furious", "irritated"],
        Emotion::Fear => &["scared", "afraid", "worried"],
        Emotion::Surprise => &["surprised", "amazed", "astonished"],
    }
}

fn rule(name: &str, description: &str, pattern: &str, suggestion: &str, severity: u8) -> StyleRule {
    StyleRule {
        name: name.to_string(),
        description: description.to_string(),
        pattern: pattern.to_string(),
        suggestion: suggestion.to_string(),
        severity,
    }
}

/// Pattern rules per guide; creative writing has none.
pub fn default_style_rules(guide: StyleGuideType) -> Vec<StyleRule> {
    match guide {
        StyleGuideType::Academic => vec![
            rule(
                "first_person",
                "Avoid first-person pronouns in academic writing",
                r"\b(I|me|my|mine|we|us|our|ours)\b",
                "Use third-person or passive voice",
                2,
            ),
            rule(
                "informal_contractions",
                "Avoid contractions in academic writing",
                r"\b\w+'\w+\b",
                "Use the full form",
                1,
            ),
            rule(
                "citation_needed",
                "Claims may need citation",
                r"\b(clearly|obviously|everyone knows|naturally|of course)\b",
                "Add citation or remove claim of certainty",
                3,
            ),
        ],
        StyleGuideType::Business => vec![
            rule(
                "passive_voice",
                "Prefer active voice in business writing",
                r"\b(am|is|are|was|were|being|been|be)\s+\w+ed\b",
                "Use active voice for clarity",
                1,
            ),
            rule(
                "jargon",
                "Minimize business jargon",
                r"\b(synergy|paradigm|leverage|utilize|optimize)\b",
                "Use simpler, clearer terms",
                2,
            ),
        ],
        StyleGuideType::Technical => vec![
            rule(
                "ambiguous_pronouns",
                "Avoid ambiguous pronouns in technical writing",
                r"\b(it|this|that|these|those)\b",
                "Be specific about what is being referenced",
                2,
            ),
            rule(
                "future_tense",
                "Use present tense for technical documentation",
                r"\b(will|shall)\s+\w+\b",
                "Use present tense for clarity",
                1,
            ),
        ],
        StyleGuideType::Creative => vec![],
    }
}

/// Optional on-disk overrides; absent fields keep the built-in lists.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexiconFile {
    #[serde(default)]
    pub positive: Option<Vec<String>>,
    #[serde(default)]
    pub negative: Option<Vec<String>>,
    #[serde(default)]
    pub emotions: BTreeMap<Emotion, Vec<String>>,
    #[serde(default)]
    pub discourse_markers: Option<Vec<String>>,
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Lexicons {
    pub positive: FxHashSet<String>,
    pub negative: FxHashSet<String>,
    pub emotions: BTreeMap<Emotion, FxHashSet<String>>,
    pub discourse_markers: Vec<String>,
    pub stopwords: StopwordFilter,
    pub style_rules: BTreeMap<StyleGuideType, Vec<StyleRule>>,
}

impl Default for Lexicons {
    fn default() -> Self {
        Self::with_stopwords(StopwordFilter::english())
    }
}

fn lower_set<S: AsRef<str>>(words: &[S]) -> FxHashSet<String> {
    words.iter().map(|w| w.as_ref().to_lowercase()).collect()
}

impl Lexicons {
    pub fn with_stopwords(stopwords: StopwordFilter) -> Self {
        let emotions = Emotion::ALL
            .iter()
            .map(|e| (*e, lower_set(default_emotion_words(*e))))
            .collect();
        let style_rules = StyleGuideType::ALL
            .iter()
            .map(|g| (*g, default_style_rules(*g)))
            .collect();

        Self {
            positive: lower_set(&POSITIVE_WORDS),
            negative: lower_set(&NEGATIVE_WORDS),
            emotions,
            discourse_markers: DISCOURSE_MARKERS.iter().map(|s| s.to_string()).collect(),
            stopwords,
            style_rules,
        }
    }

    /// Load built-in lexicons and apply overrides from a JSON file
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidConfiguration(format!("Failed to read lexicon file {}: {}", path.display(), e))
        })?;
        let overrides: LexiconFile = serde_json::from_str(&content).map_err(|e| {
            EngineError::InvalidConfiguration(format!("Failed to parse lexicon file {}: {}", path.display(), e))
        })?;
        let lexicons = Self::default().with_overrides(overrides);
        info!(path = %path.display(), "[lexicon] loaded overrides");
        Ok(lexicons)
    }

    pub fn with_overrides(mut self, overrides: LexiconFile) -> Self {
        if let Some(words) = overrides.positive {
            self.positive = lower_set(&words);
        }
        if let Some(words) = overrides.negative {
            self.negative = lower_set(&words);
        }
        for (emotion, words) in overrides.emotions {
            self.emotions.insert(emotion, lower_set(&words));
        }
        if let Some(markers) = overrides.discourse_markers {
            self.discourse_markers = markers.iter().map(|m| m.to_lowercase()).collect();
        }
        self.stopwords.add_stopwords(&overrides.extra_stopwords);
        self
    }

    /// Union of positive and negative words
    pub fn is_subjective(&self, lower: &str) -> bool {
        self.positive.contains(lower) || self.negative.contains(lower)
    }

    pub fn emotion_words(&self, emotion: Emotion) -> Option<&FxHashSet<String>> {
        self.emotions.get(&emotion)
    }

    pub fn rules_for(&self, guide: StyleGuideType) -> &[StyleRule] {
        self.style_rules.get(&guide).map(|r| r.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let lex = Lexicons::default();
        assert!(lex.is_subjective("good"));
        assert!(lex.is_subjective("terrible"));
        assert!(!lex.is_subjective("product"));
        assert_eq!(lex.emotions.len(), 5);
        assert_eq!(lex.rules_for(StyleGuideType::Academic).len(), 3);
        assert!(lex.rules_for(StyleGuideType::Creative).is_empty());
    }

    #[test]
    fn test_overrides_replace_only_given_lists() {
        let overrides: LexiconFile = serde_json::from_str(
            r#"{"positive": ["Superb"], "emotions": {"joy": ["thrilled"]}}"#,
        )
        .unwrap();
        let lex = Lexicons::default().with_overrides(overrides);
        assert!(lex.positive.contains("superb"));
        assert!(!lex.positive.contains("good"));
        assert!(lex.negative.contains("bad"));
        assert!(lex.emotion_words(Emotion::Joy).unwrap().contains("thrilled"));
        assert!(lex.emotion_words(Emotion::Fear).unwrap().contains("afraid"));
    }
}
