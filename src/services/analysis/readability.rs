// Readability Formulas
// Classic grade-level formulas over sentence/word/syllable counts

use crate::services::text_processor::{count_syllables, split_sentences_advanced, words};

const LINSEAR_WINDOW: usize = 100;

/// Surface counts the formulas are computed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStats {
    pub sentences: usize,
    pub words: usize,
    pub syllables: usize,
    /// Alphanumeric characters in words
    pub letters: usize,
    /// Words with three or more syllables
    pub polysyllables: usize,
    /// Syllable count per word, in text order
    pub word_syllables: Vec<usize>,
}

impl TextStats {
    pub fn from_text(text: &str) -> Self {
        let ws = words(text);
        let word_syllables: Vec<usize> = ws.iter().map(|w| count_syllables(w)).collect();
        Self {
            sentences: split_sentences_advanced(text).len(),
            words: ws.len(),
            syllables: word_syllables.iter().sum(),
            letters: ws.iter().map(|w| w.chars().filter(|c| c.is_alphanumeric()).count()).sum(),
            polysyllables: word_syllables.iter().filter(|s| **s >= 3).count(),
            word_syllables,
        }
    }

    fn words_per_sentence(&self) -> f64 {
        self.words as f64 / self.sentences.max(1) as f64
    }

    fn per_word(&self, n: usize) -> f64 {
        n as f64 / self.words as f64
    }

    fn is_empty(&self) -> bool {
        self.words == 0
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub trait ReadabilityFormulas: Send + Sync {
    fn flesch_reading_ease(&self, stats: &TextStats) -> f64;
    fn flesch_kincaid_grade(&self, stats: &TextStats) -> f64;
    fn gunning_fog(&self, stats: &TextStats) -> f64;
    fn smog_index(&self, stats: &TextStats) -> f64;
    fn automated_readability_index(&self, stats: &TextStats) -> f64;
    fn coleman_liau_index(&self, stats: &TextStats) -> f64;
    fn linsear_write_formula(&self, stats: &TextStats) -> f64;
    fn dale_chall_readability_score(&self, stats: &TextStats) -> f64;
}

/// Textstat-style formulas; every score is 0.0 for text without words.
#[derive(Debug, Clone, Copy, Default)]
pub struct Textstat;

impl ReadabilityFormulas for Textstat {
    fn flesch_reading_ease(&self, stats: &TextStats) -> f64 {
        if stats.is_empty() {
            return 0.0;
        }
        round2(206.835 - 1.015 * stats.words_per_sentence() - 84.6 * stats.per_word(stats.syllables))
    }

    fn flesch_kincaid_grade(&self, stats: &TextStats) -> f64 {
        if stats.is_empty() {
            return 0.0;
        }
        round2(0.39 * stats.words_per_sentence() + 11.8 * stats.per_word(stats.syllables) - 15.59)
    }

    fn gunning_fog(&self, stats: &TextStats) -> f64 {
        if stats.is_empty() {
            return 0.0;
        }
        round2(0.4 * (stats.words_per_sentence() + 100.0 * stats.per_word(stats.polysyllables)))
    }

    fn smog_index(&self, stats: &TextStats) -> f64 {
        if stats.is_empty() {
            return 0.0;
        }
        let scaled = stats.polysyllables as f64 * 30.0 / stats.sentences.max(1) as f64;
        round2(1.043 * scaled.sqrt() + 3.1291)
    }

    fn automated_readability_index(&self, stats: &TextStats) -> f64 {
        if stats.is_empty() {
            return 0.0;
        }
        round2(4.71 * stats.per_word(stats.letters) + 0.5 * stats.words_per_sentence() - 21.43)
    }

    fn coleman_liau_index(&self, stats: &TextStats) -> f64 {
        if stats.is_empty() {
            return 0.0;
        }
        let letters_per_100 = stats.per_word(stats.letters) * 100.0;
        let sentences_per_100 = stats.per_word(stats.sentences.max(1)) * 100.0;
        round2(0.0588 * letters_per_100 - 0.296 * sentences_per_100 - 15.8)
    }

    fn linsear_write_formula(&self, stats: &TextStats) -> f64 {
        if stats.is_empty() {
            return 0.0;
        }
        let window = &stats.word_syllables[..stats.word_syllables.len().min(LINSEAR_WINDOW)];
        let easy = window.iter().filter(|s| **s < 3).count() as f64;
        let hard = window.iter().filter(|s| **s >= 3).count() as f64;
        let r = (easy + 3.0 * hard) / stats.sentences.max(1) as f64;
        round2(if r > 20.0 { r / 2.0 } else { (r - 2.0) / 2.0 })
    }

    /// Polysyllabic words stand in for words outside the familiar-word list.
    fn dale_chall_readability_score(&self, stats: &TextStats) -> f64 {
        if stats.is_empty() {
            return 0.0;
        }
        let pct_difficult = stats.per_word(stats.polysyllables) * 100.0;
        let mut score = 0.1579 * pct_difficult + 0.0496 * stats.words_per_sentence();
        if pct_difficult > 5.0 {
            score += 3.6365;
        }
        round2(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counts() {
        let stats = TextStats::from_text("The cat sat. It was important.");
        assert_eq!(stats.sentences, 2);
        assert_eq!(stats.words, 6);
        assert_eq!(stats.polysyllables, 1);
        assert_eq!(stats.letters, 23);
    }

    #[test]
    fn test_simple_text_reads_easily() {
        let t = Textstat;
        let stats = TextStats::from_text("The cat sat on the mat. The dog ran.");
        assert!(t.flesch_reading_ease(&stats) > 90.0);
        assert!(t.flesch_kincaid_grade(&stats) < 2.0);
        assert!(t.gunning_fog(&stats) > 0.0);
    }

    #[test]
    fn test_flesch_reading_ease_value() {
        // 6 words, 1 sentence, 6 syllables
        let stats = TextStats::from_text("The cat sat on the mat.");
        assert_eq!(Textstat.flesch_reading_ease(&stats), round2(206.835 - 1.015 * 6.0 - 84.6));
    }

    #[test]
    fn test_empty_text_scores_zero() {
        let stats = TextStats::from_text("");
        let t = Textstat;
        assert_eq!(t.flesch_reading_ease(&stats), 0.0);
        assert_eq!(t.smog_index(&stats), 0.0);
        assert_eq!(t.linsear_write_formula(&stats), 0.0);
    }
}
