// Thesaurus Service
// Lexical synonym database behind the `SynonymLexicon` capability

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::services::errors::EngineError;

/// One synonym candidate with the database-provided similarity score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynonymCandidate {
    pub lemma: String,
    /// WordNet-style POS letter: n, v, a, r
    #[serde(default)]
    pub pos: Option<String>,
    #[serde(default = "default_score")]
    pub score: f64,
}

fn default_score() -> f64 { 1.0 }

pub trait SynonymLexicon: Send + Sync {
    /// Candidates in database order; `pos_hint` filters when provided.
    fn lookup(&self, word: &str, pos_hint: Option<&str>) -> Vec<SynonymCandidate>;
}

/// Map a coarse universal POS tag to the thesaurus POS letter.
pub fn pos_hint_for(pos: &str) -> Option<&'static str> {
    match pos {
        "NOUN" | "PROPN" => Some("n"),
        "VERB" => Some("v"),
        "ADJ" => Some("a"),
        "ADV" => Some("r"),
        _ => None,
    }
}

const BUILTIN_ENTRIES: [(&str, &str, &[&str]); 16] = [
    ("big", "a", &["large", "huge", "great"]),
    ("small", "a", &["little", "minor", "tiny"]),
    ("fast", "r", &["quickly", "rapidly", "speedily"]),
    ("quick", "a", &["fast", "speedy", "rapid"]),
    ("use", "v", &["employ", "apply", "utilize"]),
    ("show", "v", &["demonstrate", "display", "reveal"]),
    ("help", "v", &["assist", "aid", "support"]),
    ("important", "a", &["significant", "crucial", "essential"]),
    ("result", "n", &["outcome", "consequence", "effect"]),
    ("method", "n", &["approach", "technique", "procedure"]),
    ("begin", "v", &["start", "commence", "initiate"]),
    ("end", "v", &["finish", "conclude", "terminate"]),
    ("buy", "v", &["purchase", "acquire", "get"]),
    ("hard", "a", &["difficult", "tough", "arduous"]),
    ("easy", "a", &["simple", "effortless", "straightforward"]),
    ("problem", "n", &["issue", "difficulty", "trouble"]),
];

#[derive(Debug, Clone, Default)]
pub struct Thesaurus {
    entries: FxHashMap<String, Vec<SynonymCandidate>>,
}

impl Thesaurus {
    /// Small built-in table; scores descend in listing order.
    pub fn builtin() -> Self {
        let mut entries = FxHashMap::default();
        for (word, pos, lemmas) in BUILTIN_ENTRIES.iter() {
            let candidates = lemmas
                .iter()
                .enumerate()
                .map(|(i, lemma)| SynonymCandidate {
                    lemma: lemma.to_string(),
                    pos: Some(pos.to_string()),
                    score: 1.0 - i as f64 * 0.1,
                })
                .collect();
            entries.insert(word.to_string(), candidates);
        }
        Self { entries }
    }

    pub fn from_entries(entries: FxHashMap<String, Vec<SynonymCandidate>>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self { entries }
    }

    /// Load `{ "word": [{"lemma": "...", "pos": "n", "score": 0.9}] }`
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidConfiguration(format!("Failed to read thesaurus {}: {}", path.display(), e))
        })?;
        let entries: FxHashMap<String, Vec<SynonymCandidate>> = serde_json::from_str(&content)
            .map_err(|e| {
                EngineError::InvalidConfiguration(format!("Failed to parse thesaurus {}: {}", path.display(), e))
            })?;
        info!(path = %path.display(), words = entries.len(), "[thesaurus] loaded");
        Ok(Self::from_entries(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SynonymLexicon for Thesaurus {
    fn lookup(&self, word: &str, pos_hint: Option<&str>) -> Vec<SynonymCandidate> {
        let Some(candidates) = self.entries.get(&word.to_lowercase()) else {
            return Vec::new();
        };
        candidates
            .iter()
            .filter(|c| match (pos_hint, c.pos.as_deref()) {
                (Some(hint), Some(pos)) => hint == pos,
                _ => true,
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup_is_case_insensitive() {
        let t = Thesaurus::builtin();
        let found = t.lookup("Big", None);
        assert_eq!(found[0].lemma, "large");
        assert!(t.lookup("zebra", None).is_empty());
    }

    #[test]
    fn test_pos_hint_filters() {
        let t = Thesaurus::builtin();
        assert!(t.lookup("big", Some("n")).is_empty());
        assert_eq!(t.lookup("big", Some("a")).len(), 3);
    }

    #[test]
    fn test_from_json_entries() {
        let entries: FxHashMap<String, Vec<SynonymCandidate>> =
            serde_json::from_str(r#"{"Cat": [{"lemma": "feline"}]}"#).unwrap();
        let t = Thesaurus::from_entries(entries);
        let found = t.lookup("cat", Some("n"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].score, 1.0);
    }
}
