// Stopword Filter
// English stopword set backed by the `stop-words` crate

use rustc_hash::FxHashSet;
use stop_words::{get, LANGUAGE};

#[derive(Debug, Clone)]
pub struct StopwordFilter {
    /// Lowercase stopwords
    stopwords: FxHashSet<String>,
}

impl Default for StopwordFilter {
    fn default() -> Self {
        Self::english()
    }
}

impl StopwordFilter {
    pub fn english() -> Self {
        let stopwords = get(LANGUAGE::English)
            .iter()
            .map(|s| s.to_string().to_lowercase())
            .collect();
        Self { stopwords }
    }

    /// Build a filter from a custom list (used by tests and lexicon overrides)
    pub fn from_list(words: &[&str]) -> Self {
        Self {
            stopwords: words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    pub fn add_stopwords(&mut self, words: &[String]) {
        for word in words {
            self.stopwords.insert(word.to_lowercase());
        }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    /// True when every word is a stopword (an empty slice counts as all-stopword)
    pub fn all_stopwords<S: AsRef<str>>(&self, words: &[S]) -> bool {
        words.iter().all(|w| self.is_stopword(w.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }
}
