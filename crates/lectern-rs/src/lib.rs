//! Public SDK surface for Lectern.
//!
//! Re-exports the config, memory and tool crates and wires a loaded
//! `LecternConfig` into a ready-to-use engine and tool context.

/// Re-export for convenience.
pub use lectern_rs_config as config;
/// Re-export for convenience.
pub use lectern_rs_memory as memory;
/// Re-export for convenience.
pub use lectern_rs_tools as tools;

use lectern_rs_config::{EmbeddingConfig, LecternConfig};
use lectern_rs_memory::{
    CapturePolicy, DocumentOptions, EmbeddingBackend, EngineOptions, InsightOptions, MemoryEngine,
    MemoryError, PatternMergePolicy,
};
use lectern_rs_tools::{ToolContext, ToolOutputPolicy};
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

/// Errors raised while turning config into an engine.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The selected embedding provider needs an API key that is not set.
    #[error("embedding api key not set (env={0})")]
    MissingApiKey(String),
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
}

/// Map config onto engine options. Relative store paths resolve against `cwd`.
pub fn engine_options_from_config(
    config: &LecternConfig,
    cwd: &Path,
) -> Result<EngineOptions, SetupError> {
    build_engine_options(config, cwd, |name| std::env::var(name).ok())
}

/// Build the engine and a tool context carrying the configured output policy.
pub fn tool_context_from_config(
    config: &LecternConfig,
    cwd: &Path,
) -> Result<ToolContext, SetupError> {
    let options = engine_options_from_config(config, cwd)?;
    info!(
        "opening memory engine (root={}, dimensions={})",
        options.root.display(),
        options.dimensions
    );
    let engine = Arc::new(MemoryEngine::new(options));
    Ok(ToolContext::new(engine)
        .with_output_policy(ToolOutputPolicy::from(&config.tools.output_policy)))
}

fn build_engine_options(
    config: &LecternConfig,
    cwd: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<EngineOptions, SetupError> {
    let memory = &config.memory;
    let mut options = EngineOptions::new(memory.resolve_path(cwd));
    options.dimensions = memory.dimensions;
    options.embedding = embedding_backend(&memory.embedding, env)?;
    options.capture = CapturePolicy {
        redact_patterns: memory.capture.redact_patterns.clone(),
        detect_secrets: memory.capture.detect_secrets,
        secret_entropy_threshold: memory.capture.secret_entropy_threshold,
        max_content_chars: memory.capture.max_content_chars,
        ..CapturePolicy::default()
    };
    options.capture.validate()?;
    options.pattern_policy = PatternMergePolicy::from_distance(memory.patterns.merge_distance);
    options.insights = InsightOptions {
        memory_volume_threshold: memory.insights.memory_volume_threshold,
        recurring_pattern_frequency: memory.insights.recurring_pattern_frequency,
        list_limit: memory.insights.list_limit,
        ..InsightOptions::default()
    };
    options.documents = DocumentOptions {
        max_results: memory.documents.max_results,
        chunk_size: memory.documents.chunk_size,
        chunk_overlap: memory.documents.chunk_overlap,
    };
    debug!(
        "engine options built (provider={}, pattern_policy={:?})",
        memory.embedding.provider, options.pattern_policy
    );
    Ok(options)
}

fn embedding_backend(
    config: &EmbeddingConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<EmbeddingBackend, SetupError> {
    match config.provider.as_str() {
        "openai" => {
            let api_key = env(&config.api_key_env)
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| SetupError::MissingApiKey(config.api_key_env.clone()))?;
            Ok(EmbeddingBackend::OpenAi {
                base_url: config.base_url.clone(),
                model: config.model.clone(),
                api_key,
            })
        }
        _ => Ok(EmbeddingBackend::Hash),
    }
}

#[cfg(test)]
mod tests {
    use super::{SetupError, build_engine_options};
    use lectern_rs_config::LecternConfig;
    use lectern_rs_memory::{EmbeddingBackend, PatternMergePolicy};
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn maps_config_sections_onto_engine_options() {
        let config = LecternConfig::load_from_str(
            r#"{
                memory: {
                    path: "store",
                    dimensions: 32,
                    patterns: { merge_distance: null },
                    insights: { memory_volume_threshold: 3 },
                    documents: { max_results: 50 },
                    capture: { max_content_chars: 100 },
                },
            }"#,
        )
        .expect("config");
        let options = build_engine_options(&config, Path::new("/work"), no_env).expect("options");
        assert_eq!(options.root, PathBuf::from("/work/store"));
        assert_eq!(options.dimensions, 32);
        assert_eq!(options.pattern_policy, PatternMergePolicy::Nearest);
        assert_eq!(options.insights.memory_volume_threshold, 3);
        assert_eq!(options.insights.list_limit, 20);
        assert_eq!(options.documents.max_results, 50);
        assert_eq!(options.capture.max_content_chars, Some(100));
        assert!(matches!(options.embedding, EmbeddingBackend::Hash));
    }

    #[test]
    fn openai_provider_reads_key_from_named_env() {
        let config = LecternConfig::load_from_str(
            r#"{ memory: { embedding: { provider: "openai", api_key_env: "TEST_KEY" } } }"#,
        )
        .expect("config");
        let options = build_engine_options(&config, Path::new("/work"), |name| {
            (name == "TEST_KEY").then(|| "sk-test".to_string())
        })
        .expect("options");
        match options.embedding {
            EmbeddingBackend::OpenAi { api_key, model, .. } => {
                assert_eq!(api_key, "sk-test");
                assert_eq!(model, "text-embedding-3-small");
            }
            other => panic!("unexpected backend: {other:?}"),
        }

        let err = build_engine_options(&config, Path::new("/work"), no_env).expect_err("no key");
        assert!(matches!(err, SetupError::MissingApiKey(name) if name == "TEST_KEY"));
    }

    #[test]
    fn invalid_redaction_pattern_fails_setup() {
        let config =
            LecternConfig::load_from_str(r#"{ memory: { capture: { redact_patterns: ["("] } } }"#)
                .expect("config");
        let err = build_engine_options(&config, Path::new("/work"), no_env).expect_err("regex");
        assert!(matches!(err, SetupError::Memory(_)));
    }
}
