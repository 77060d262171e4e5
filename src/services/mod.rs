// Semantic Optimizer Core Services

pub mod errors;
pub mod text_processor;
pub mod stopwords;
pub mod lexicon;
pub mod thesaurus;
pub mod engine;
pub mod analysis;
pub mod config_store;

pub use errors::*;
pub use config_store::*;
pub use engine::{HeuristicEngine, LinguisticEngine, SpacyServiceEngine};
pub use lexicon::Lexicons;
pub use thesaurus::{SynonymLexicon, Thesaurus};

// Re-export the pipeline entry points
pub use analysis::{AnalysisReport, OptimizationOutcome, TextAnalyzer};
