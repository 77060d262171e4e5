// Sentiment & Emotion Scorer
// Lexicon-based polarity, subjectivity and per-emotion tone

use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{AnnotatedDocument, Emotion, SentimentScore};
use crate::services::lexicon::Lexicons;

pub struct SentimentAnalyzer {
    lexicons: Arc<Lexicons>,
}

impl SentimentAnalyzer {
    pub fn new(lexicons: Arc<Lexicons>) -> Self {
        Self { lexicons }
    }

    pub fn score(&self, doc: &AnnotatedDocument) -> SentimentScore {
        let total = doc.tokens().filter(|t| !t.is_punct).count();

        let mut positive = 0usize;
        let mut negative = 0usize;
        let mut subjective = 0usize;
        let mut unique: FxHashSet<String> = FxHashSet::default();

        for token in doc.tokens() {
            let lower = token.lower();
            if self.lexicons.positive.contains(&lower) {
                positive += 1;
            }
            if self.lexicons.negative.contains(&lower) {
                negative += 1;
            }
            if self.lexicons.is_subjective(&lower) {
                subjective += 1;
            }
            unique.insert(lower);
        }

        let (polarity, subjectivity) = if total == 0 {
            (0.0, 0.0)
        } else {
            (
                (positive as f64 - negative as f64) / total as f64,
                subjective as f64 / total as f64,
            )
        };

        let emotional_tone = Emotion::ALL
            .iter()
            .map(|emotion| {
                let score = match self.lexicons.emotion_words(*emotion) {
                    Some(words) if !unique.is_empty() => {
                        unique.iter().filter(|w| words.contains(*w)).count() as f64 / unique.len() as f64
                    }
                    _ => 0.0,
                };
                (*emotion, score)
            })
            .collect::<BTreeMap<_, _>>();

        SentimentScore {
            polarity,
            subjectivity,
            objectivity: 1.0 - subjectivity,
            emotional_tone,
        }
    }

    /// Emotion with the highest score; ties go to the earlier emotion in `Emotion::ALL`.
    pub fn dominant_emotion(score: &SentimentScore) -> Emotion {
        let mut best = Emotion::Joy;
        let mut best_score = f64::NEG_INFINITY;
        for emotion in Emotion::ALL {
            let s = score.emotional_tone.get(&emotion).copied().unwrap_or(0.0);
            if s > best_score {
                best = emotion;
                best_score = s;
            }
        }
        best
    }

    pub fn summary(&self, score: &SentimentScore) -> String {
        let label = if score.polarity > 0.0 {
            "positive"
        } else if score.polarity < 0.0 {
            "negative"
        } else {
            "neutral"
        };
        format!(
            "The text has a {} tone (polarity: {:.2}) with {:.1}% subjectivity. The dominant emotion is {}.",
            label,
            score.polarity,
            score.subjectivity * 100.0,
            Self::dominant_emotion(score).as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::engine::{HeuristicEngine, LinguisticEngine};

    fn score(text: &str) -> SentimentScore {
        let doc = HeuristicEngine::default().annotate(text).unwrap();
        SentimentAnalyzer::new(Arc::new(Lexicons::default())).score(&doc)
    }

    #[test]
    fn test_polarity_and_subjectivity() {
        // 4 non-punctuation tokens: one positive
        let s = score("The food is good.");
        assert!((s.polarity - 0.25).abs() < 1e-9);
        assert!((s.subjectivity - 0.25).abs() < 1e-9);
        assert_eq!(s.objectivity, 1.0 - s.subjectivity);
    }

    #[test]
    fn test_accented_words_count_once() {
        let doc = HeuristicEngine::default().annotate("Café naïve résumé is good.").unwrap();
        let words: Vec<&str> = doc.tokens().filter(|t| !t.is_punct).map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["Café", "naïve", "résumé", "is", "good"]);
        let s = score("Café naïve résumé is good.");
        assert!((s.polarity - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_mixed_polarity_cancels() {
        let s = score("Good food, bad service.");
        assert_eq!(s.polarity, 0.0);
        assert!((s.subjectivity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_emotional_tone_over_unique_words() {
        // unique words: i, am, happy, and, worried, .
        let s = score("I am happy and happy and worried.");
        let joy = s.emotional_tone[&Emotion::Joy];
        let fear = s.emotional_tone[&Emotion::Fear];
        assert!((joy - 1.0 / 6.0).abs() < 1e-9);
        assert_eq!(joy, fear);
        assert_eq!(s.emotional_tone[&Emotion::Anger], 0.0);
        assert_eq!(s.emotional_tone.len(), 5);
    }

    #[test]
    fn test_ranges_hold() {
        for text in ["Terrible, bad, poor!", "Great excellent good.", "Nothing here."] {
            let s = score(text);
            assert!((-1.0..=1.0).contains(&s.polarity));
            assert!((0.0..=1.0).contains(&s.subjectivity));
            assert_eq!(s.objectivity, 1.0 - s.subjectivity);
            assert!(s.emotional_tone.values().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_empty_document_scores_zero() {
        let analyzer = SentimentAnalyzer::new(Arc::new(Lexicons::default()));
        let s = analyzer.score(&AnnotatedDocument::empty(""));
        assert_eq!(s.polarity, 0.0);
        assert_eq!(s.subjectivity, 0.0);
        assert_eq!(s.objectivity, 1.0);
        assert!(s.emotional_tone.values().all(|v| *v == 0.0));
    }

    #[test]
    fn test_summary_text_and_tie_break() {
        let analyzer = SentimentAnalyzer::new(Arc::new(Lexicons::default()));
        let s = score("The food is good.");
        assert_eq!(
            analyzer.summary(&s),
            "The text has a positive tone (polarity: 0.25) with 25.0% subjectivity. The dominant emotion is joy."
        );
        let tied = score("I am sad and angry.");
        assert_eq!(SentimentAnalyzer::dominant_emotion(&tied), Emotion::Sadness);
    }
}
