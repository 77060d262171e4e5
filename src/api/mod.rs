// Request Handlers
// Async entry points over the shared `TextAnalyzer`; every pipeline call runs on a blocking worker

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::models::{
    AnalysisResponse, AnalyzeRequest, GrammarResponse, HealthResponse, OptimizeRequest,
    OptimizeResponse, SentimentResponse, StyleResponse,
};
use crate::services::analysis::TextAnalyzer;
use crate::services::errors::AnalysisError;

async fn run_blocking<T, F>(analyzer: Arc<TextAnalyzer>, op: &'static str, f: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&TextAnalyzer) -> Result<T, AnalysisError> + Send + 'static,
{
    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || f(&analyzer))
        .await
        .map_err(|e| {
            error!(op, error = %e, "[api] worker task failed");
            format!("{} failed: {}", op, e)
        })?;

    match result {
        Ok(value) => {
            info!(op, elapsed_ms = started.elapsed().as_millis() as u64, "[api] request complete");
            Ok(value)
        }
        Err(e) if e.is_internal() => {
            error!(op, error = %e, "[api] request failed");
            Err(e.to_string())
        }
        Err(e) => {
            warn!(op, error = %e, "[api] request rejected");
            Err(e.to_string())
        }
    }
}

pub async fn analyze_text(analyzer: Arc<TextAnalyzer>, request: AnalyzeRequest) -> Result<AnalysisResponse, String> {
    run_blocking(analyzer, "analyze_text", move |a| a.handle_analyze(&request)).await
}

pub async fn enhance_grammar(analyzer: Arc<TextAnalyzer>, request: AnalyzeRequest) -> Result<GrammarResponse, String> {
    run_blocking(analyzer, "enhance_grammar", move |a| a.handle_grammar(&request)).await
}

pub async fn analyze_style(analyzer: Arc<TextAnalyzer>, request: AnalyzeRequest) -> Result<StyleResponse, String> {
    run_blocking(analyzer, "analyze_style", move |a| a.handle_style(&request)).await
}

pub async fn analyze_sentiment(
    analyzer: Arc<TextAnalyzer>,
    request: AnalyzeRequest,
) -> Result<SentimentResponse, String> {
    run_blocking(analyzer, "analyze_sentiment", move |a| a.handle_sentiment(&request)).await
}

pub async fn optimize_text(analyzer: Arc<TextAnalyzer>, request: OptimizeRequest) -> Result<OptimizeResponse, String> {
    run_blocking(analyzer, "optimize_text", move |a| a.handle_optimize(&request)).await
}

pub async fn health_check(analyzer: Arc<TextAnalyzer>) -> Result<HealthResponse, String> {
    Ok(analyzer.health())
}
