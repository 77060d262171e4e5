use anyhow::Context;
use semantic_optimizer_lib::api::{analyze_text, optimize_text};
use semantic_optimizer_lib::models::{AnalyzeRequest, OptimizeRequest};
use semantic_optimizer_lib::services::config_store::{AppConfig, ConfigStore};
use semantic_optimizer_lib::services::text_processor::normalize_punctuation;
use semantic_optimizer_lib::{build_analyzer, init_logging};
use std::sync::Arc;

const USAGE: &str = "Usage:
  analyze_text <path.txt> [--guide <academic|business|technical|creative>] [--topics <n>] [--out <json_path>]
  analyze_text <path.txt> --optimize [--level <light|medium|aggressive>] [--keywords <a,b,...>] [--out <json_path>]
  analyze_text --text \"<inline text>\" [...]

Options:
  --lang <code>   request language (only \"en\" is supported)
  --local         skip the annotation service and use the local heuristic engine
  --config <dir>  config directory (defaults to the user config dir)

Notes:
  - Without --keywords, key phrases are extracted automatically and preserved.
  - SEMOPT_ENGINE_URL overrides the annotation service URL.";

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn load_config(args: &[String]) -> anyhow::Result<AppConfig> {
    let dir = parse_arg_value(args, "--config")
        .map(std::path::PathBuf::from)
        .or_else(ConfigStore::default_config_dir);
    let config = match dir {
        Some(dir) => ConfigStore::new(dir).load().map_err(anyhow::Error::msg)?,
        None => AppConfig::default(),
    };
    Ok(config.with_env_overrides())
}

// The analyzer (and its blocking HTTP client) is built before the runtime
// and dropped after it.
fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || has_flag(&args, "--help") {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    init_logging();

    let text = match parse_arg_value(&args, "--text") {
        Some(t) => t,
        None => {
            let raw = std::fs::read_to_string(&args[1]).with_context(|| format!("read file failed: {}", args[1]))?;
            normalize_punctuation(&raw)
        }
    };
    let language = parse_arg_value(&args, "--lang").unwrap_or_else(|| "en".to_string());
    let out_path = parse_arg_value(&args, "--out");

    let config = load_config(&args)?;
    let analyzer = Arc::new(build_analyzer(&config, has_flag(&args, "--local"))?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let output = if has_flag(&args, "--optimize") {
        let keywords = parse_arg_value(&args, "--keywords").map(|k| {
            k.split(',')
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect::<Vec<_>>()
        });
        let request = OptimizeRequest {
            content: text,
            optimization_level: parse_arg_value(&args, "--level")
                .unwrap_or_else(|| config.optimization.default_level.as_str().to_string()),
            preserve_keywords: keywords,
            language,
        };
        let response = runtime
            .block_on(optimize_text(analyzer.clone(), request))
            .map_err(anyhow::Error::msg)?;
        serde_json::to_string_pretty(&response)?
    } else {
        let request = AnalyzeRequest {
            text,
            style_guide: parse_arg_value(&args, "--guide"),
            language,
            num_topics: parse_arg_value(&args, "--topics").and_then(|s| s.parse().ok()),
        };
        let response = runtime
            .block_on(analyze_text(analyzer.clone(), request))
            .map_err(anyhow::Error::msg)?;
        serde_json::to_string_pretty(&response)?
    };
    drop(runtime);

    match out_path {
        Some(path) => {
            std::fs::write(&path, &output).with_context(|| format!("write output failed: {}", path))?;
            eprintln!("Wrote {}", path);
        }
        None => println!("{}", output),
    }
    Ok(())
}
