// Text Analyzer Pipeline
// Wires engine, lexicons and analysis components behind analyze/optimize and the request helpers

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::models::{
    AnalysisResponse, AnalyzeRequest, AnnotatedDocument, GrammarResponse, HealthResponse,
    OptimizationSuggestion, OptimizeRequest, OptimizeResponse, SentimentResponse, StyleGuideType,
    StyleResponse, TextMetrics, TopicCluster,
};
use crate::services::analysis::grammar::GrammarChecker;
use crate::services::analysis::keyphrases::KeyPhraseExtractor;
use crate::services::analysis::metrics::MetricsAggregator;
use crate::services::analysis::optimizer::{OptimizationOutcome, TextOptimizer};
use crate::services::analysis::readability::Textstat;
use crate::services::analysis::sentiment::SentimentAnalyzer;
use crate::services::analysis::style_guide::{compliance_score, StyleGuideChecker};
use crate::services::analysis::suggestions::SuggestionGenerator;
use crate::services::analysis::topics::{TopicClusterer, DEFAULT_NUM_TOPICS};
use crate::services::config_store::AppConfig;
use crate::services::engine::{HeuristicEngine, LinguisticEngine};
use crate::services::errors::{AnalysisError, EngineError, InputError};
use crate::services::lexicon::Lexicons;
use crate::services::thesaurus::{SynonymLexicon, Thesaurus};

pub const SUPPORTED_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub grammar: GrammarResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleResponse>,
    pub sentiment: SentimentResponse,
    pub metrics: TextMetrics,
    pub suggestions: Vec<OptimizationSuggestion>,
    pub topics: Vec<TopicCluster>,
}

impl AnalysisReport {
    pub fn into_response(self, request_id: String) -> AnalysisResponse {
        AnalysisResponse {
            request_id,
            grammar: self.grammar,
            style: self.style,
            sentiment: self.sentiment,
            metrics: self.metrics,
            suggestions: self.suggestions,
            topics: self.topics,
        }
    }
}

fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Shared, lock-free analysis pipeline. Every call annotates the text afresh.
pub struct TextAnalyzer {
    engine: Arc<dyn LinguisticEngine>,
    lexicons: Arc<Lexicons>,
    config: AppConfig,
    grammar: GrammarChecker,
    style: StyleGuideChecker,
    sentiment: SentimentAnalyzer,
    topics: TopicClusterer,
    metrics: Arc<MetricsAggregator>,
    suggestions: Arc<SuggestionGenerator>,
    optimizer: TextOptimizer,
}

impl TextAnalyzer {
    pub fn new(
        engine: Arc<dyn LinguisticEngine>,
        lexicons: Arc<Lexicons>,
        synonyms: Arc<dyn SynonymLexicon>,
        config: AppConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let stopwords = Arc::new(lexicons.stopwords.clone());
        let metrics = Arc::new(MetricsAggregator::new(engine.clone(), &lexicons, Arc::new(Textstat))?);
        let suggestions = Arc::new(SuggestionGenerator::new(engine.clone()));
        let optimizer = TextOptimizer::new(
            engine.clone(),
            synonyms,
            KeyPhraseExtractor::new(stopwords.clone()),
            metrics.clone(),
            suggestions.clone(),
            config.limits.clone(),
        );

        info!(
            engine = engine.name(),
            max_text_length = config.limits.max_text_length,
            "[analyzer] pipeline ready"
        );

        Ok(Self {
            style: StyleGuideChecker::new(&lexicons)?,
            sentiment: SentimentAnalyzer::new(lexicons.clone()),
            topics: TopicClusterer::new(stopwords),
            grammar: GrammarChecker::new(),
            engine,
            lexicons,
            config,
            metrics,
            suggestions,
            optimizer,
        })
    }

    /// Built-in lexicons, built-in thesaurus and the local heuristic engine.
    pub fn with_heuristic_engine(config: AppConfig) -> Result<Self, EngineError> {
        let lexicons = Arc::new(Lexicons::default());
        let engine = Arc::new(HeuristicEngine::new(Arc::new(lexicons.stopwords.clone())));
        Self::new(engine, lexicons, Arc::new(Thesaurus::builtin()), config)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn lexicons(&self) -> &Lexicons {
        &self.lexicons
    }

    // ============ Validation ============

    fn check_language(&self, language: &str) -> Result<(), InputError> {
        if language.eq_ignore_ascii_case(SUPPORTED_LANGUAGE) {
            Ok(())
        } else {
            Err(InputError::UnsupportedLanguage(language.to_string()))
        }
    }

    fn check_length(&self, text: &str) -> Result<(), InputError> {
        let limits = &self.config.limits;
        let len = text.chars().count();
        if text.trim().is_empty() || len < limits.min_text_length {
            return Err(InputError::TextTooShort { min: limits.min_text_length });
        }
        if len > limits.max_text_length {
            return Err(InputError::TextTooLong { max: limits.max_text_length, actual: len });
        }
        Ok(())
    }

    fn annotate(&self, text: &str) -> Result<AnnotatedDocument, AnalysisError> {
        self.check_length(text)?;
        self.engine.annotate(text)
    }

    // ============ Components ============

    fn grammar_response(&self, text: &str, doc: &AnnotatedDocument) -> GrammarResponse {
        let (enhanced_text, issues) = self.grammar.enhance(text, doc);
        let improvement_score = self.grammar.improvement_score(text, issues.len());
        GrammarResponse {
            original_text: text.to_string(),
            enhanced_text,
            issues,
            improvement_score,
        }
    }

    fn style_response(&self, text: &str, doc: &AnnotatedDocument, guide: StyleGuideType) -> StyleResponse {
        let issues = self.style.check(text, doc, guide);
        StyleResponse {
            original_text: text.to_string(),
            compliance_score: compliance_score(&issues),
            issues,
            style_guide_type: guide,
        }
    }

    fn sentiment_response(&self, text: &str, doc: &AnnotatedDocument) -> SentimentResponse {
        let score = self.sentiment.score(doc);
        SentimentResponse {
            text: text.to_string(),
            summary: self.sentiment.summary(&score),
            polarity: score.polarity,
            subjectivity: score.subjectivity,
            objectivity: score.objectivity,
            emotional_tone: score.emotional_tone,
        }
    }

    pub fn grammar(&self, text: &str) -> Result<GrammarResponse, AnalysisError> {
        let doc = self.annotate(text)?;
        Ok(self.grammar_response(text, &doc))
    }

    pub fn style(&self, text: &str, guide: StyleGuideType) -> Result<StyleResponse, AnalysisError> {
        let doc = self.annotate(text)?;
        Ok(self.style_response(text, &doc, guide))
    }

    pub fn sentiment(&self, text: &str) -> Result<SentimentResponse, AnalysisError> {
        let doc = self.annotate(text)?;
        Ok(self.sentiment_response(text, &doc))
    }

    // ============ Pipeline ============

    pub fn analyze(&self, text: &str, style_guide: Option<StyleGuideType>) -> Result<AnalysisReport, AnalysisError> {
        self.analyze_with_topics(text, style_guide, DEFAULT_NUM_TOPICS)
    }

    pub fn analyze_with_topics(
        &self,
        text: &str,
        style_guide: Option<StyleGuideType>,
        num_topics: usize,
    ) -> Result<AnalysisReport, AnalysisError> {
        let started = Instant::now();
        let doc = self.annotate(text)?;

        let metrics = self.metrics.aggregate_document(&doc);
        let suggestions = self
            .suggestions
            .suggest_with_coherence(&doc, metrics.structure.coherence_score);
        let report = AnalysisReport {
            grammar: self.grammar_response(text, &doc),
            style: style_guide.map(|g| self.style_response(text, &doc, g)),
            sentiment: self.sentiment_response(text, &doc),
            topics: self.topics.cluster(&doc, num_topics),
            metrics,
            suggestions,
        };

        info!(
            sentences = doc.sentences.len(),
            grammar_issues = report.grammar.issues.len(),
            style = style_guide.map(|g| g.as_str()).unwrap_or("none"),
            topics = report.topics.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "[analyzer] analysis complete"
        );
        Ok(report)
    }

    /// `keywords: None` auto-extracts key phrases to preserve.
    pub fn optimize(
        &self,
        text: &str,
        level: &str,
        keywords: Option<&[String]>,
    ) -> Result<OptimizationOutcome, AnalysisError> {
        self.optimizer.optimize_str(text, level, keywords)
    }

    // ============ Requests ============

    fn parse_guide(&self, guide: Option<&str>) -> Result<Option<StyleGuideType>, InputError> {
        match guide.map(str::trim).filter(|g| !g.is_empty()) {
            Some(name) => StyleGuideType::parse(name)
                .map(Some)
                .ok_or_else(|| InputError::InvalidStyleGuide(name.to_string())),
            None => Ok(None),
        }
    }

    pub fn handle_analyze(&self, req: &AnalyzeRequest) -> Result<AnalysisResponse, AnalysisError> {
        self.check_language(&req.language)?;
        let guide = self.parse_guide(req.style_guide.as_deref())?;
        let report = self.analyze_with_topics(&req.text, guide, req.num_topics.unwrap_or(DEFAULT_NUM_TOPICS))?;
        Ok(report.into_response(new_request_id()))
    }

    pub fn handle_grammar(&self, req: &AnalyzeRequest) -> Result<GrammarResponse, AnalysisError> {
        self.check_language(&req.language)?;
        self.grammar(&req.text)
    }

    pub fn handle_style(&self, req: &AnalyzeRequest) -> Result<StyleResponse, AnalysisError> {
        self.check_language(&req.language)?;
        let guide = self
            .parse_guide(req.style_guide.as_deref())?
            .ok_or(InputError::MissingStyleGuide)?;
        self.style(&req.text, guide)
    }

    pub fn handle_sentiment(&self, req: &AnalyzeRequest) -> Result<SentimentResponse, AnalysisError> {
        self.check_language(&req.language)?;
        self.sentiment(&req.text)
    }

    pub fn handle_optimize(&self, req: &OptimizeRequest) -> Result<OptimizeResponse, AnalysisError> {
        self.check_language(&req.language)?;
        let outcome = self.optimize(
            &req.content,
            &req.optimization_level,
            req.preserve_keywords.as_deref(),
        )?;
        Ok(OptimizeResponse {
            request_id: new_request_id(),
            original: outcome.original,
            optimized: outcome.optimized,
            optimization_level: outcome.level,
            preserved_keywords: outcome.preserved_keywords,
            metrics: outcome.metrics,
            suggestions: outcome.suggestions,
        })
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
