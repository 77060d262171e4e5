// Annotation Service Client
// Calls the Python spaCy annotation service; falls back to the local heuristic engine
// when the service cannot be reached.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::{AnnotatedDocument, Entity, Sentence, Token};
use crate::services::config_store::EngineConfig;
use crate::services::engine::{HeuristicEngine, LinguisticEngine};
use crate::services::errors::{AnalysisError, EngineError};

pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:8788";

fn char_offset_to_utf8_byte_index(text: &str, char_offset: usize) -> Option<usize> {
    if char_offset == 0 {
        return Some(0);
    }
    text.char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(text.len()))
        .nth(char_offset)
}

/// spaCy reports code-point offsets; convert to UTF-8 byte offsets.
fn normalize_offset(text: &str, offset: usize) -> Option<usize> {
    if text.is_ascii() {
        return (offset <= text.len()).then_some(offset);
    }
    char_offset_to_utf8_byte_index(text, offset)
}

#[derive(Debug, Serialize)]
struct AnnotateRequest<'a> {
    text: &'a str,
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct SimilarityRequest<'a> {
    a: &'a str,
    b: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireToken {
    /// Document-level token index.
    i: usize,
    text: String,
    idx: usize,
    pos: String,
    tag: String,
    dep: String,
    /// Document-level index of the head token.
    head: usize,
    #[serde(default)]
    is_stop: bool,
    #[serde(default)]
    is_punct: bool,
}

#[derive(Debug, Deserialize)]
struct WireEntity {
    text: String,
    label: String,
    start: usize,
    end: usize,
}

#[derive(Debug, Deserialize)]
struct WireSentence {
    start: usize,
    end: usize,
    tokens: Vec<WireToken>,
    #[serde(default)]
    entities: Vec<WireEntity>,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    sentences: Vec<WireSentence>,
}

#[derive(Debug, Deserialize)]
struct SimilarityResponse {
    similarity: f64,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: String,
}

fn convert_document(text: &str, wire: AnnotateResponse) -> Result<AnnotatedDocument, String> {
    let mut sentences = Vec::with_capacity(wire.sentences.len());
    for (si, ws) in wire.sentences.into_iter().enumerate() {
        let start = normalize_offset(text, ws.start)
            .ok_or_else(|| format!("Invalid sentence offset: {}", ws.start))?;
        let end = normalize_offset(text, ws.end)
            .ok_or_else(|| format!("Invalid sentence offset: {}", ws.end))?;
        if end < start {
            return Err(format!("Invalid sentence offsets: start={} end={}", ws.start, ws.end));
        }
        let first = ws.tokens.first().map(|t| t.i).unwrap_or(0);
        let count = ws.tokens.len();

        let mut tokens = Vec::with_capacity(count);
        for (ti, wt) in ws.tokens.into_iter().enumerate() {
            let idx = normalize_offset(text, wt.idx)
                .ok_or_else(|| format!("Invalid token offset: {}", wt.idx))?;
            let head = wt
                .head
                .checked_sub(first)
                .filter(|h| *h < count)
                .unwrap_or(ti);
            tokens.push(Token {
                text: wt.text,
                idx,
                pos: wt.pos,
                tag: wt.tag,
                dep: wt.dep,
                head,
                is_stop: wt.is_stop,
                is_punct: wt.is_punct,
            });
        }

        let mut entities = Vec::with_capacity(ws.entities.len());
        for we in ws.entities {
            let (Some(es), Some(ee)) = (normalize_offset(text, we.start), normalize_offset(text, we.end)) else {
                continue;
            };
            entities.push(Entity {
                text: we.text,
                label: we.label,
                start: es,
                end: ee,
                sentence: si,
            });
        }

        sentences.push(Sentence {
            start,
            end,
            text: text.get(start..end).unwrap_or("").to_string(),
            tokens,
            entities,
        });
    }
    AnnotatedDocument::new(text, sentences)
}

/// spaCy annotation service client
pub struct SpacyServiceEngine {
    client: Client,
    base_url: String,
    model: String,
    fallback: Option<Arc<HeuristicEngine>>,
}

impl SpacyServiceEngine {
    pub fn new(config: &EngineConfig, fallback: Option<Arc<HeuristicEngine>>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: config.service_url.trim_end_matches('/').to_string(),
            model: config.model_name.clone(),
            fallback,
        }
    }

    /// Check whether the service is reachable and healthy
    pub fn is_available(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send() {
            Ok(resp) => resp
                .json::<HealthResponse>()
                .map(|h| h.status == "ok" || h.status == "healthy")
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    fn call_annotate(&self, text: &str) -> Result<AnnotatedDocument, AnalysisError> {
        let url = format!("{}/annotate", self.base_url);
        let request = AnnotateRequest { text, model: &self.model };

        let response = match self.client.post(&url).json(&request).send() {
            Ok(r) => r,
            Err(e) => return self.fall_back(text, &e.to_string()),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(EngineError::ModelNotFound(self.model.clone()).into());
        }
        if !status.is_success() {
            let detail = response.json::<ErrorResponse>().map(|e| e.detail).unwrap_or_default();
            if detail.to_lowercase().contains("model") && detail.to_lowercase().contains("not found") {
                return Err(EngineError::ModelNotFound(self.model.clone()).into());
            }
            return Err(AnalysisError::Processing(format!(
                "Annotation service returned error: {} {}",
                status, detail
            )));
        }

        let wire: AnnotateResponse = response
            .json()
            .map_err(|e| AnalysisError::processing("Failed to parse annotation response", e))?;
        convert_document(text, wire).map_err(|e| AnalysisError::processing("Invalid annotation", e))
    }

    fn fall_back(&self, text: &str, reason: &str) -> Result<AnnotatedDocument, AnalysisError> {
        match &self.fallback {
            Some(local) => {
                warn!("[engine] annotation service unavailable ({}), falling back to local", reason);
                local.annotate(text)
            }
            None => Err(AnalysisError::processing("Failed to call annotation service", reason)),
        }
    }
}

impl LinguisticEngine for SpacyServiceEngine {
    fn annotate(&self, text: &str) -> Result<AnnotatedDocument, AnalysisError> {
        let doc = self.call_annotate(text)?;
        info!(sentences = doc.sentences.len(), bytes = text.len(), "[engine] annotated");
        Ok(doc)
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        let url = format!("{}/similarity", self.base_url);
        let request = SimilarityRequest { a, b, model: &self.model };
        let remote = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .ok()
            .filter(|r| r.status().is_success())
            .and_then(|r| r.json::<SimilarityResponse>().ok());

        match (remote, &self.fallback) {
            (Some(r), _) => r.similarity.clamp(0.0, 1.0),
            (None, Some(local)) => local.similarity(a, b),
            (None, None) => 0.0,
        }
    }

    fn name(&self) -> &str {
        "spacy-service"
    }
}
