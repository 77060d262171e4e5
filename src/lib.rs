pub mod models;
pub mod services;
pub mod api;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use services::config_store::AppConfig;
use services::engine::{HeuristicEngine, LinguisticEngine, SpacyServiceEngine};
use services::errors::EngineError;
use services::lexicon::Lexicons;
use services::thesaurus::{SynonymLexicon, Thesaurus};
use services::analysis::TextAnalyzer;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_PREFIX: &str = "semanticOptimizer_";
const LOGS_TO_KEEP: usize = 30;

fn env_flag(name: &str) -> bool {
    matches!(std::env::var(name).as_deref(), Ok("1") | Ok("true") | Ok("TRUE"))
}

/// Initialize logging with a timestamped log file per session.
/// Console output goes to stderr so stdout stays clean for JSON.
pub fn init_logging() {
    let disable_file_log = env_flag("SEMOPT_DISABLE_FILE_LOG");
    let disable_cleanup = env_flag("SEMOPT_DISABLE_LOG_CLEANUP");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if disable_file_log {
        init_console_only_logging(env_filter);
        info!("File logging disabled via SEMOPT_DISABLE_FILE_LOG");
        return;
    }

    let logs_dir = match std::env::var("SEMOPT_LOG_DIR") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => get_logs_dir(),
    };

    if let Err(e) = fs::create_dir_all(&logs_dir) {
        eprintln!("Failed to create logs directory: {}", e);
        init_console_only_logging(env_filter);
        info!("Falling back to console-only logging (log dir not writable)");
        return;
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_filename = format!("{}{}.log", LOG_PREFIX, timestamp);

    let file_appender = rolling::never(&logs_dir, &log_filename);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(file_guard);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true);

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(console_layer)
            .try_init();
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .try_init();
    }

    info!("=== Semantic Optimizer Started ===");
    info!("Log file: {}/{}", logs_dir.display(), log_filename);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if !disable_cleanup {
        std::thread::spawn(move || {
            cleanup_old_logs(&logs_dir, LOGS_TO_KEEP);
        });
    }
}

fn get_logs_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("logs")
    }

    #[cfg(not(debug_assertions))]
    {
        if let Some(data_dir) = dirs::data_local_dir() {
            return data_dir.join("semanticOptimizer").join("logs");
        }
        PathBuf::from("logs")
    }
}

fn cleanup_old_logs(logs_dir: &Path, keep: usize) {
    let mut entries: Vec<_> = match fs::read_dir(logs_dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).collect(),
        Err(_) => return,
    };

    entries.retain(|e| {
        let name = e.file_name().to_string_lossy().to_string();
        name.starts_with(LOG_PREFIX) && name.ends_with(".log")
    });

    if entries.len() <= keep {
        return;
    }

    entries.sort_by_key(|e| {
        (
            e.metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
            e.file_name(),
        )
    });

    let remove_count = entries.len().saturating_sub(keep);
    for entry in entries.into_iter().take(remove_count) {
        let _ = fs::remove_file(entry.path());
    }
}

fn init_console_only_logging(env_filter: EnvFilter) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}

/// Build the pipeline from configuration.
/// `local_only` skips the annotation service and uses the heuristic engine directly.
pub fn build_analyzer(config: &AppConfig, local_only: bool) -> Result<TextAnalyzer, EngineError> {
    let lexicons = match &config.lexicon_path {
        Some(path) => Lexicons::load(path)?,
        None => Lexicons::default(),
    };
    let lexicons = Arc::new(lexicons);

    let synonyms: Arc<dyn SynonymLexicon> = match &config.thesaurus_path {
        Some(path) => Arc::new(Thesaurus::load(path)?),
        None => Arc::new(Thesaurus::builtin()),
    };

    let heuristic = Arc::new(HeuristicEngine::new(Arc::new(lexicons.stopwords.clone())));
    let engine: Arc<dyn LinguisticEngine> = if local_only {
        heuristic
    } else {
        let fallback = config.engine.fallback_to_heuristic.then(|| heuristic.clone());
        let service = SpacyServiceEngine::new(&config.engine, fallback);
        if !service.is_available() {
            warn!(
                url = %config.engine.service_url,
                fallback = config.engine.fallback_to_heuristic,
                "[startup] annotation service not reachable"
            );
        }
        Arc::new(service)
    };

    info!(
        engine = engine.name(),
        lexicon = config.lexicon_path.is_some(),
        thesaurus = config.thesaurus_path.is_some(),
        "[startup] building analyzer"
    );
    TextAnalyzer::new(engine, lexicons, synonyms, config.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("semopt_{}_{}", tag, uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_cleanup_old_logs_keeps_newest() {
        let dir = temp_dir("logs");
        for i in 0..5 {
            fs::write(dir.join(format!("{}2026010{}_000000.log", LOG_PREFIX, i)), "x").unwrap();
        }
        fs::write(dir.join("other.log"), "x").unwrap();

        cleanup_old_logs(&dir, 3);

        let mut left: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.starts_with(LOG_PREFIX))
            .collect();
        left.sort();
        assert_eq!(left.len(), 3);
        assert!(dir.join("other.log").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_build_local_analyzer() {
        let analyzer = build_analyzer(&AppConfig::default(), true).unwrap();
        assert_eq!(analyzer.engine_name(), "heuristic");
        let report = analyzer.analyze("The cat runs fast.", None).unwrap();
        assert!(report.grammar.issues.is_empty());
    }

    #[test]
    fn test_unreachable_service_still_builds_with_fallback() {
        let mut config = AppConfig::default();
        config.engine.service_url = "http://127.0.0.1:9".to_string();
        config.engine.timeout_secs = 1;
        let analyzer = build_analyzer(&config, false).unwrap();
        assert_eq!(analyzer.engine_name(), "spacy-service");
        let report = analyzer.analyze("The cat run fast.", None).unwrap();
        assert_eq!(report.grammar.issues.len(), 1);
    }

    #[test]
    fn test_missing_lexicon_file_is_config_error() {
        let mut config = AppConfig::default();
        config.lexicon_path = Some(PathBuf::from("/nonexistent/semopt/lexicon.json"));
        assert!(matches!(
            build_analyzer(&config, true),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_thesaurus_file_loaded() {
        let dir = temp_dir("thesaurus");
        let path = dir.join("thesaurus.json");
        fs::write(&path, r#"{"dog": [{"lemma": "hound", "pos": "n", "score": 0.9}]}"#).unwrap();
        let mut config = AppConfig::default();
        config.thesaurus_path = Some(path);

        let analyzer = build_analyzer(&config, true).unwrap();
        let outcome = analyzer
            .optimize("The dog runs.", "aggressive", Some(&["zzz".to_string()]))
            .unwrap();
        assert_eq!(outcome.optimized, "The hound runs.");
        let _ = fs::remove_dir_all(&dir);
    }
}
