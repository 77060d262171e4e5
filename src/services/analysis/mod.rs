// Analysis Components
// Rule-based scoring over an annotated document:
// - grammar: article and subject-verb agreement issues
// - style_guide: per-guide rule engine and compliance score
// - sentiment: lexicon polarity, subjectivity and emotion tone
// - optimizer: level-gated rewriting with keyword preservation
// - topics / vectorizer: TF-IDF + seeded k-means sentence clusters
// - metrics / readability / keyphrases / suggestions: aggregated text metrics
// - pipeline: the `TextAnalyzer` wiring all of the above

pub mod grammar;
pub mod keyphrases;
pub mod metrics;
pub mod optimizer;
pub mod pipeline;
pub mod readability;
pub mod sentiment;
pub mod style_guide;
pub mod suggestions;
pub mod topics;
pub mod vectorizer;

pub use grammar::GrammarChecker;
pub use keyphrases::KeyPhraseExtractor;
pub use metrics::{coherence_score, MetricsAggregator};
pub use optimizer::{OptimizationOutcome, TextOptimizer};
pub use pipeline::{AnalysisReport, TextAnalyzer};
pub use readability::{ReadabilityFormulas, TextStats, Textstat};
pub use sentiment::SentimentAnalyzer;
pub use style_guide::{compliance_score, StyleGuideChecker};
pub use suggestions::SuggestionGenerator;
pub use topics::TopicClusterer;
pub use vectorizer::{kmeans, Clustering, TermMatrix, TfidfVectorizer, VectorizeError};
