// Semantic Optimizer Data Models
// Annotation structures, analysis findings and request/response schemas

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============ Annotation ============

/// One token as produced by the linguistic engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub text: String,
    /// UTF-8 byte offset (0-based) into the document text.
    pub idx: usize,
    /// Coarse universal POS tag (NOUN, VERB, DET, ...).
    pub pos: String,
    /// Fine-grained Penn tag (NN, VBZ, DT, ...).
    pub tag: String,
    /// Dependency label (nsubj, ROOT, det, cc, mark, auxpass, ...).
    pub dep: String,
    /// Index of the head token within the same sentence; the root points at itself.
    pub head: usize,
    #[serde(default)]
    pub is_stop: bool,
    #[serde(default)]
    pub is_punct: bool,
}

impl Token {
    pub fn end(&self) -> usize {
        self.idx + self.text.len()
    }

    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }

    pub fn is_nominal(&self) -> bool {
        self.pos == "NOUN" || self.pos == "PROPN"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
    /// Index of the parent sentence in the document.
    pub sentence: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    /// UTF-8 byte offset (0-based) into the document text.
    pub start: usize,
    /// UTF-8 byte offset (0-based, end-exclusive) into the document text.
    pub end: usize,
    pub text: String,
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Sentence {
    pub fn head_of(&self, token: &Token) -> Option<&Token> {
        self.tokens.get(token.head)
    }

    pub fn word_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| !t.is_punct)
    }

    pub fn has_dep(&self, dep: &str) -> bool {
        self.tokens.iter().any(|t| t.dep == dep)
    }
}

/// Text annotated with sentence/token/entity structure. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedDocument {
    pub text: String,
    pub sentences: Vec<Sentence>,
}

impl AnnotatedDocument {
    /// Build a document, rejecting head references or spans that escape their container.
    pub fn new(text: impl Into<String>, sentences: Vec<Sentence>) -> Result<Self, String> {
        let text = text.into();
        for (si, sent) in sentences.iter().enumerate() {
            if sent.start > sent.end || sent.end > text.len() {
                return Err(format!(
                    "Sentence {} span {}..{} outside text of length {}",
                    si,
                    sent.start,
                    sent.end,
                    text.len()
                ));
            }
            for (ti, tok) in sent.tokens.iter().enumerate() {
                if tok.head >= sent.tokens.len() {
                    return Err(format!(
                        "Token {} in sentence {} has head {} outside sentence of {} tokens",
                        ti,
                        si,
                        tok.head,
                        sent.tokens.len()
                    ));
                }
            }
        }
        Ok(Self { text, sentences })
    }

    pub fn empty(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sentences: Vec::new(),
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences.iter().flat_map(|s| s.tokens.iter())
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.sentences.iter().flat_map(|s| s.entities.iter())
    }

    pub fn sentence_texts(&self) -> Vec<String> {
        self.sentences.iter().map(|s| s.text.clone()).collect()
    }
}

// ============ Grammar ============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GrammarIssueKind {
    SubjectVerbAgreement { subject: String, verb: String },
    ArticleUsage { article: String, noun: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GrammarIssue {
    #[serde(flatten)]
    pub kind: GrammarIssueKind,
    /// Text of the enclosing sentence.
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl GrammarIssue {
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            GrammarIssueKind::SubjectVerbAgreement { .. } => "subject_verb_agreement",
            GrammarIssueKind::ArticleUsage { .. } => "article_usage",
        }
    }
}

// ============ Style ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleGuideType {
    Academic,
    Business,
    Technical,
    Creative,
}

impl StyleGuideType {
    pub const ALL: [StyleGuideType; 4] = [
        StyleGuideType::Academic,
        StyleGuideType::Business,
        StyleGuideType::Technical,
        StyleGuideType::Creative,
    ];

    /// Parse a guide name; unknown names yield `None`.
    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_lowercase().as_str() {
            "academic" => Some(Self::Academic),
            "business" => Some(Self::Business),
            "technical" => Some(Self::Technical),
            "creative" => Some(Self::Creative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::Business => "business",
            Self::Technical => "technical",
            Self::Creative => "creative",
        }
    }
}

impl fmt::Display for StyleGuideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    pub name: String,
    pub description: String,
    pub pattern: String,
    pub suggestion: String,
    /// 1 (suggestion) to 3 (critical)
    pub severity: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StyleViolation {
    pub rule_name: String,
    pub description: String,
    pub text: String,
    pub suggestion: String,
    pub start: usize,
    pub end: usize,
    pub severity: u8,
}

// ============ Sentiment ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
}

impl Emotion {
    /// Fixed iteration order; also the tie-break order for the dominant emotion.
    pub const ALL: [Emotion; 5] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Joy => "joy",
            Self::Sadness => "sadness",
            Self::Anger => "anger",
            Self::Fear => "fear",
            Self::Surprise => "surprise",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SentimentScore {
    /// -1 to 1
    pub polarity: f64,
    /// 0 to 1
    pub subjectivity: f64,
    /// Always `1 - subjectivity`.
    pub objectivity: f64,
    pub emotional_tone: BTreeMap<Emotion, f64>,
}

// ============ Optimization ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    Light,
    #[default]
    Medium,
    Aggressive,
}

impl OptimizationLevel {
    pub fn parse(val: &str) -> Option<Self> {
        match val {
            "light" => Some(Self::Light),
            "medium" => Some(Self::Medium),
            "aggressive" => Some(Self::Aggressive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Aggressive => "aggressive",
        }
    }

    pub fn splits_sentences(&self) -> bool {
        matches!(self, Self::Medium | Self::Aggressive)
    }

    pub fn substitutes_synonyms(&self) -> bool {
        matches!(self, Self::Aggressive)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSuggestion {
    pub r#type: String,
    pub severity: SuggestionSeverity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

// ============ Topics ============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicCluster {
    pub topic_id: usize,
    pub key_terms: Vec<String>,
    pub sample_sentences: Vec<String>,
}

// ============ Metrics ============

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadabilityScores {
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    pub gunning_fog: f64,
    pub smog_index: f64,
    pub automated_readability_index: f64,
    pub coleman_liau_index: f64,
    pub linsear_write_formula: f64,
    pub dale_chall_readability_score: f64,
    pub avg_sentence_length: f64,
    pub avg_word_length: f64,
    pub complex_word_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SentenceTypeCounts {
    pub simple: usize,
    pub compound: usize,
    pub complex: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureMetrics {
    pub sentence_types: SentenceTypeCounts,
    pub discourse_markers: usize,
    pub coherence_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextMetrics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_word_length: f64,
    pub readability: ReadabilityScores,
    pub structure: StructureMetrics,
    /// Entity surface texts grouped by label, de-duplicated in first-seen order.
    pub entities: BTreeMap<String, Vec<String>>,
    /// Number of entity mentions per label.
    pub named_entities: BTreeMap<String, usize>,
    pub key_phrases: Vec<String>,
}

// ============ Requests ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(default)]
    pub style_guide: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub num_topics: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub content: String,
    #[serde(default = "default_level")]
    pub optimization_level: String,
    /// `None` triggers automatic key-phrase extraction; an explicit empty list preserves nothing.
    #[serde(default)]
    pub preserve_keywords: Option<Vec<String>>,
    #[serde(default = "default_language")]
    pub language: String,
}

// ============ Responses ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarResponse {
    pub original_text: String,
    pub enhanced_text: String,
    pub issues: Vec<GrammarIssue>,
    pub improvement_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleResponse {
    pub original_text: String,
    pub issues: Vec<StyleViolation>,
    pub style_guide_type: StyleGuideType,
    pub compliance_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResponse {
    pub text: String,
    pub polarity: f64,
    pub subjectivity: f64,
    pub objectivity: f64,
    pub emotional_tone: BTreeMap<Emotion, f64>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub request_id: String,
    pub grammar: GrammarResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleResponse>,
    pub sentiment: SentimentResponse,
    pub metrics: TextMetrics,
    pub suggestions: Vec<OptimizationSuggestion>,
    pub topics: Vec<TopicCluster>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    pub request_id: String,
    pub original: String,
    pub optimized: String,
    pub optimization_level: OptimizationLevel,
    pub preserved_keywords: Vec<String>,
    pub metrics: TextMetrics,
    pub suggestions: Vec<OptimizationSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ============ Default Value Functions ============

fn default_language() -> String { "en".to_string() }
fn default_level() -> String { "medium".to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, idx: usize, head: usize) -> Token {
        Token {
            text: text.to_string(),
            idx,
            pos: "NOUN".to_string(),
            tag: "NN".to_string(),
            dep: "ROOT".to_string(),
            head,
            is_stop: false,
            is_punct: false,
        }
    }

    #[test]
    fn test_document_rejects_foreign_head() {
        let sent = Sentence {
            start: 0,
            end: 3,
            text: "cat".to_string(),
            tokens: vec![token("cat", 0, 4)],
            entities: vec![],
        };
        assert!(AnnotatedDocument::new("cat", vec![sent]).is_err());
    }

    #[test]
    fn test_document_rejects_span_past_text() {
        let sent = Sentence {
            start: 0,
            end: 10,
            text: "cat".to_string(),
            tokens: vec![token("cat", 0, 0)],
            entities: vec![],
        };
        assert!(AnnotatedDocument::new("cat", vec![sent]).is_err());
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(OptimizationLevel::parse("aggressive"), Some(OptimizationLevel::Aggressive));
        assert_eq!(OptimizationLevel::parse("invalid"), None);
        assert!(!OptimizationLevel::Light.splits_sentences());
        assert!(OptimizationLevel::Medium.splits_sentences());
        assert!(!OptimizationLevel::Medium.substitutes_synonyms());
    }

    #[test]
    fn test_grammar_issue_serializes_kind_tag() {
        let issue = GrammarIssue {
            kind: GrammarIssueKind::ArticleUsage {
                article: "an".to_string(),
                noun: "cat".to_string(),
            },
            text: "I saw an cat.".to_string(),
            start: 0,
            end: 13,
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["type"], "article_usage");
        assert_eq!(json["article"], "an");
        assert_eq!(issue.kind_name(), "article_usage");
    }

    #[test]
    fn test_optimize_request_keywords_absent_vs_empty() {
        let absent: OptimizeRequest = serde_json::from_str(r#"{"content":"x"}"#).unwrap();
        assert!(absent.preserve_keywords.is_none());
        assert_eq!(absent.optimization_level, "medium");
        let empty: OptimizeRequest =
            serde_json::from_str(r#"{"content":"x","preserveKeywords":[]}"#).unwrap();
        assert_eq!(empty.preserve_keywords, Some(vec![]));
    }
}
