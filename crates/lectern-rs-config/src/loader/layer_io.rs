//! Reading layers from disk and folding them into one value.

#[cfg(unix)]
use super::SYSTEM_REQUIREMENTS_PATH;
use super::{ConfigLayer, ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, merge, schema};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Layers collected so far, in application order.
#[derive(Debug, Default)]
pub(super) struct LayerStack {
    requirements: Option<Value>,
    overrides: Vec<Value>,
    layers: Vec<ConfigLayer>,
    seen: HashSet<PathBuf>,
}

impl LayerStack {
    /// Add the layer at `path` if the file exists.
    pub(super) fn push_optional(
        &mut self,
        source: ConfigLayerSource,
        path: &Path,
    ) -> Result<(), ConfigError> {
        if !path.exists() {
            debug!(
                "config layer absent (source={}, path={})",
                source.label(),
                path.display()
            );
            return Ok(());
        }
        self.push_required(source, path)
    }

    /// Add the layer at `path`; a missing file is an error.
    pub(super) fn push_required(
        &mut self,
        source: ConfigLayerSource,
        path: &Path,
    ) -> Result<(), ConfigError> {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if !self.seen.insert(key) {
            debug!(
                "config layer already applied (source={}, path={})",
                source.label(),
                path.display()
            );
            return Ok(());
        }
        let value = read_json5(path)?;
        schema::validate_layer_schema(&value, &format!("{}({})", source.label(), path.display()))?;
        debug!(
            "config layer loaded (source={}, path={})",
            source.label(),
            path.display()
        );
        match source {
            ConfigLayerSource::Requirements => self.requirements = Some(value),
            _ => self.overrides.push(value),
        }
        self.layers.push(ConfigLayer {
            source,
            path: Some(path.to_path_buf()),
        });
        Ok(())
    }

    /// Merged value and layer metadata.
    pub(super) fn finish(self) -> (Value, Vec<ConfigLayer>) {
        let mut merged = Value::Object(Map::new());
        if let Some(requirements) = &self.requirements {
            merge::overlay(&mut merged, requirements);
        }
        for value in &self.overrides {
            merge::overlay_constrained(&mut merged, value, self.requirements.as_ref());
        }
        (merged, self.layers)
    }
}

pub(super) fn read_json5(path: &Path) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path)?;
    Ok(json5::from_str(&contents)?)
}

pub(super) fn default_requirements_path() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        Some(PathBuf::from(SYSTEM_REQUIREMENTS_PATH))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

pub(super) fn default_user_config_path() -> Option<PathBuf> {
    let dirs = UserDirs::new()?;
    Some(
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE),
    )
}

/// Canonical working directory; a directory that does not exist is kept as given.
pub(super) fn resolve_cwd(path: &Path) -> Result<PathBuf, ConfigError> {
    match path.canonicalize() {
        Ok(resolved) => Ok(resolved),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(err) => Err(err.into()),
    }
}

/// Nearest ancestor of `cwd` holding one of the marker entries.
pub(super) fn project_root(cwd: &Path, markers: &[String]) -> Option<PathBuf> {
    cwd.ancestors()
        .find(|dir| markers.iter().any(|marker| dir.join(marker).exists()))
        .map(Path::to_path_buf)
}
