//! Configuration schema for Lectern.

use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root config.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LecternConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl LecternConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> LecternConfigBuilder {
        LecternConfigBuilder::new()
    }
}

/// Builder for assembling a `LecternConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct LecternConfigBuilder {
    config: LecternConfig,
}

impl LecternConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: LecternConfig::default(),
        }
    }

    /// Replace the memory engine configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the tool configuration.
    pub fn tools(mut self, tools: ToolsConfig) -> Self {
        self.config.tools = tools;
        self
    }

    pub fn build(self) -> LecternConfig {
        self.config
    }
}

/// Memory engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Store directory; `~` expands to the home directory, relative paths
    /// resolve against the working directory.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub capture: MemoryCaptureConfig,
    #[serde(default)]
    pub patterns: PatternsConfig,
    #[serde(default)]
    pub insights: InsightsConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            dimensions: default_dimensions(),
            embedding: EmbeddingConfig::default(),
            capture: MemoryCaptureConfig::default(),
            patterns: PatternsConfig::default(),
            insights: InsightsConfig::default(),
            documents: DocumentsConfig::default(),
        }
    }
}

impl MemoryConfig {
    /// Resolve the store directory for the given working directory.
    pub fn resolve_path(&self, cwd: &Path) -> PathBuf {
        let raw = self.path.as_deref().unwrap_or(DEFAULT_MEMORY_PATH);
        let expanded = match raw.strip_prefix('~') {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => match UserDirs::new() {
                Some(dirs) => dirs.home_dir().join(rest.trim_start_matches('/')),
                None => PathBuf::from(raw),
            },
            _ => PathBuf::from(raw),
        };
        if expanded.is_absolute() {
            expanded
        } else {
            cwd.join(expanded)
        }
    }
}

const DEFAULT_MEMORY_PATH: &str = "~/.lectern/memory";

fn default_dimensions() -> usize {
    384
}

/// Embedding backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// `hash` or `openai`.
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            base_url: default_embedding_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_embedding_provider() -> String {
    "hash".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Capture policy applied to memory content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCaptureConfig {
    #[serde(default)]
    pub redact_patterns: Vec<String>,
    /// Entropy-based secret redaction; off unless enabled.
    #[serde(default)]
    pub detect_secrets: bool,
    #[serde(default = "default_secret_entropy_threshold")]
    pub secret_entropy_threshold: f32,
    #[serde(default)]
    pub max_content_chars: Option<usize>,
}

impl Default for MemoryCaptureConfig {
    fn default() -> Self {
        Self {
            redact_patterns: Vec::new(),
            detect_secrets: false,
            secret_entropy_threshold: default_secret_entropy_threshold(),
            max_content_chars: None,
        }
    }
}

fn default_secret_entropy_threshold() -> f32 {
    3.7
}

/// Pattern consolidation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternsConfig {
    /// Maximum distance for merging into a prior pattern; `null` merges into
    /// the nearest pattern regardless of distance.
    #[serde(default = "default_merge_distance")]
    pub merge_distance: Option<f32>,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            merge_distance: default_merge_distance(),
        }
    }
}

fn default_merge_distance() -> Option<f32> {
    Some(0.3)
}

/// Insight rule settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    #[serde(default = "default_memory_volume_threshold")]
    pub memory_volume_threshold: usize,
    #[serde(default = "default_recurring_pattern_frequency")]
    pub recurring_pattern_frequency: u64,
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            memory_volume_threshold: default_memory_volume_threshold(),
            recurring_pattern_frequency: default_recurring_pattern_frequency(),
            list_limit: default_list_limit(),
        }
    }
}

fn default_memory_volume_threshold() -> usize {
    10
}

fn default_recurring_pattern_frequency() -> u64 {
    5
}

fn default_list_limit() -> usize {
    20
}

/// Document index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_max_results() -> usize {
    20
}

fn default_chunk_size() -> usize {
    400
}

fn default_chunk_overlap() -> usize {
    80
}

/// Global tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolsConfig {
    #[serde(default)]
    pub output_policy: ToolOutputPolicyConfig,
}

/// Output policy for tool results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutputPolicyConfig {
    #[serde(default = "default_max_string_bytes")]
    pub max_string_bytes: usize,
    #[serde(default = "default_max_array_len")]
    pub max_array_len: usize,
    /// Keys dropped from tool output objects.
    #[serde(default = "default_omit_keys")]
    pub omit_keys: Vec<String>,
}

impl Default for ToolOutputPolicyConfig {
    fn default() -> Self {
        Self {
            max_string_bytes: default_max_string_bytes(),
            max_array_len: default_max_array_len(),
            omit_keys: default_omit_keys(),
        }
    }
}

/// Default maximum string size for tool output in bytes.
fn default_max_string_bytes() -> usize {
    32 * 1024
}

fn default_max_array_len() -> usize {
    256
}

fn default_omit_keys() -> Vec<String> {
    vec!["vector".to_string()]
}
