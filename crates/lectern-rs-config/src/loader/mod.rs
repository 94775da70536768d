//! Layered configuration loading.
//!
//! Layers are discovered from well-known locations, schema-checked one by
//! one, then folded together. An optional requirements file seeds the result
//! and pins its leaf values so no later layer can change them.

mod layer_io;
mod merge;
mod schema;

#[cfg(test)]
mod tests;

use crate::{ConfigError, LecternConfig};
use layer_io::LayerStack;
use log::{debug, info};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Config filename looked up in every local layer.
const DEFAULT_CONFIG_FILE: &str = "lectern.json5";
/// Directory holding the user and repo layers.
const DEFAULT_CONFIG_DIR: &str = ".lectern";
const DEFAULT_PROJECT_ROOT_MARKERS: &[&str] = &[".git"];

#[cfg(unix)]
const SYSTEM_REQUIREMENTS_PATH: &str = "/etc/lectern/requirements.json5";

/// Effective config plus the layers that produced it.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub config: LecternConfig,
    /// Loaded layers in application order, requirements first.
    pub layers: Vec<ConfigLayer>,
}

/// Where a config layer came from. Variants are listed lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// Pinned values that later layers cannot override.
    Requirements,
    /// `~/.lectern/lectern.json5`.
    User,
    /// `lectern.json5` at the project root.
    Project,
    /// `lectern.json5` in the working directory.
    Cwd,
    /// `.lectern/lectern.json5` under the project root.
    Repo,
    /// Explicit override files, applied last.
    Runtime,
}

impl ConfigLayerSource {
    /// Short name used in error paths and logs.
    pub fn label(self) -> &'static str {
        match self {
            ConfigLayerSource::Requirements => "requirements",
            ConfigLayerSource::User => "user",
            ConfigLayerSource::Project => "project",
            ConfigLayerSource::Cwd => "cwd",
            ConfigLayerSource::Repo => "repo",
            ConfigLayerSource::Runtime => "runtime",
        }
    }
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: Option<PathBuf>,
}

/// Locations consulted by [`LecternConfig::load_layered_with_options`].
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Directory the local layers are resolved from.
    pub cwd: PathBuf,
    pub user_config_path: Option<PathBuf>,
    pub requirements_path: Option<PathBuf>,
    /// Override files; each must exist.
    pub runtime_paths: Vec<PathBuf>,
    /// Entries whose presence marks a directory as the project root.
    pub project_root_markers: Vec<String>,
}

impl LayeredConfigOptions {
    /// Default user and requirements locations for `cwd`.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: layer_io::default_user_config_path(),
            requirements_path: layer_io::default_requirements_path(),
            runtime_paths: Vec::new(),
            project_root_markers: DEFAULT_PROJECT_ROOT_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }

    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Project, cwd and repo layer candidates in precedence order.
    fn local_candidates(&self, cwd: &Path) -> Vec<(ConfigLayerSource, PathBuf)> {
        let project_root = layer_io::project_root(cwd, &self.project_root_markers);
        let mut candidates = Vec::with_capacity(3);
        if let Some(root) = &project_root {
            debug!("resolved project root (path={})", root.display());
            candidates.push((ConfigLayerSource::Project, root.join(DEFAULT_CONFIG_FILE)));
        }
        candidates.push((ConfigLayerSource::Cwd, cwd.join(DEFAULT_CONFIG_FILE)));
        if let Some(root) = &project_root {
            candidates.push((
                ConfigLayerSource::Repo,
                root.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE),
            ));
        }
        candidates
    }
}

impl LecternConfig {
    /// Load one config file, without layering.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config (path={})", path.display());
        let value = layer_io::read_json5(path)?;
        config_from_value(value, "config")
    }

    /// Parse one config from JSON5 text, without layering.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from text (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Load the layer stack from the default locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load the layer stack: requirements, user, project, cwd, repo, then
    /// runtime overrides. Missing optional layers are skipped; a file reached
    /// through two locations is applied once.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = layer_io::resolve_cwd(&options.cwd)?;
        let mut stack = LayerStack::default();

        if let Some(path) = options.requirements_path.as_deref() {
            stack.push_optional(ConfigLayerSource::Requirements, path)?;
        }
        if let Some(path) = options.user_config_path.as_deref() {
            stack.push_optional(ConfigLayerSource::User, path)?;
        }
        for (source, path) in options.local_candidates(&cwd) {
            stack.push_optional(source, &path)?;
        }
        for path in &options.runtime_paths {
            stack.push_required(ConfigLayerSource::Runtime, path)?;
        }

        let (merged, layers) = stack.finish();
        let config = config_from_value(merged, "effective")?;
        info!(
            "layered config loaded (cwd={}, layers={})",
            cwd.display(),
            layers.len()
        );
        Ok(LayeredConfig { config, layers })
    }

    /// Check the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let memory = &self.memory;
        if memory.dimensions == 0 {
            return Err(invalid("memory.dimensions must be positive"));
        }
        if !matches!(memory.embedding.provider.as_str(), "hash" | "openai") {
            return Err(ConfigError::Invalid(format!(
                "unknown embedding provider: {}",
                memory.embedding.provider
            )));
        }
        if let Some(distance) = memory.patterns.merge_distance {
            if distance.is_nan() || distance < 0.0 {
                return Err(invalid("memory.patterns.merge_distance must be non-negative"));
            }
        }
        let documents = &memory.documents;
        if documents.chunk_size == 0 {
            return Err(invalid("memory.documents.chunk_size must be positive"));
        }
        if documents.chunk_overlap >= documents.chunk_size {
            return Err(invalid(
                "memory.documents.chunk_overlap must be smaller than chunk_size",
            ));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}

fn config_from_value(value: Value, label: &str) -> Result<LecternConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: LecternConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
