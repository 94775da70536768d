//! Tests for layered configuration loading.

use super::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// Project with a `.git` marker and a nested working directory.
fn project_tree(temp: &TempDir) -> (PathBuf, PathBuf) {
    let project_root = temp.path().join("project");
    fs::create_dir_all(project_root.join(".git")).expect("git");
    let cwd = project_root.join("subdir");
    fs::create_dir_all(&cwd).expect("cwd");
    (project_root, cwd)
}

fn isolated_options(cwd: &Path) -> LayeredConfigOptions {
    let mut options = LayeredConfigOptions::new(cwd);
    options.user_config_path = None;
    options.requirements_path = None;
    options
}

#[test]
fn parse_minimal_config() {
    let config = LecternConfig::load_from_str("{}").expect("config");
    assert_eq!(config.memory.dimensions, 384);
    assert_eq!(config.memory.embedding.provider, "hash");
    assert_eq!(config.memory.patterns.merge_distance, Some(0.3));
    assert_eq!(config.memory.insights.memory_volume_threshold, 10);
    assert!(!config.memory.capture.detect_secrets);
    assert_eq!(config.tools.output_policy.omit_keys, vec!["vector".to_string()]);
}

#[test]
fn rejects_unknown_top_level_key() {
    let err = LecternConfig::load_from_str("{ unexpected: true }").unwrap_err();
    assert!(format!("{err}").contains("unknown key"));
}

#[test]
fn null_merge_distance_means_nearest() {
    let config =
        LecternConfig::load_from_str("{ memory: { patterns: { merge_distance: null } } }")
            .expect("config");
    assert_eq!(config.memory.patterns.merge_distance, None);
}

#[test]
fn rejects_negative_merge_distance() {
    let err = LecternConfig::load_from_str("{ memory: { patterns: { merge_distance: -1 } } }")
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn rejects_overlap_not_smaller_than_chunk_size() {
    let err = LecternConfig::load_from_str(
        "{ memory: { documents: { chunk_size: 10, chunk_overlap: 10 } } }",
    )
    .unwrap_err();
    assert!(format!("{err}").contains("chunk_overlap"));
}

#[test]
fn rejects_unknown_embedding_provider() {
    let err = LecternConfig::load_from_str("{ memory: { embedding: { provider: \"onnx\" } } }")
        .unwrap_err();
    assert!(format!("{err}").contains("onnx"));
}

#[test]
fn resolve_path_joins_relative_paths_to_cwd() {
    let config = LecternConfig::load_from_str("{ memory: { path: \"data/memory\" } }")
        .expect("config");
    assert_eq!(
        config.memory.resolve_path(Path::new("/work")),
        PathBuf::from("/work/data/memory")
    );
}

#[test]
fn layered_config_prefers_repo_over_cwd() {
    let temp = TempDir::new().expect("tmp");
    let (project_root, cwd) = project_tree(&temp);

    let user_config = temp.path().join("user.json5");
    write_json5(&user_config, "{ memory: { dimensions: 8, path: \"user\" } }");
    write_json5(
        &project_root.join(DEFAULT_CONFIG_FILE),
        "{ memory: { path: \"project\" } }",
    );
    write_json5(&cwd.join(DEFAULT_CONFIG_FILE), "{ memory: { path: \"cwd\" } }");
    write_json5(
        &project_root
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE),
        "{ memory: { path: \"repo\" } }",
    );

    let mut options = isolated_options(&cwd);
    options.user_config_path = Some(user_config);

    let layered = LecternConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.memory.path.as_deref(), Some("repo"));
    assert_eq!(layered.config.memory.dimensions, 8);
    let sources: Vec<ConfigLayerSource> =
        layered.layers.iter().map(|layer| layer.source).collect();
    assert_eq!(
        sources,
        vec![
            ConfigLayerSource::User,
            ConfigLayerSource::Project,
            ConfigLayerSource::Cwd,
            ConfigLayerSource::Repo,
        ]
    );
}

#[test]
fn cwd_at_project_root_loads_file_once() {
    let temp = TempDir::new().expect("tmp");
    let (project_root, _) = project_tree(&temp);
    write_json5(
        &project_root.join(DEFAULT_CONFIG_FILE),
        "{ memory: { dimensions: 16 } }",
    );

    let layered =
        LecternConfig::load_layered_with_options(isolated_options(&project_root)).expect("layered");
    assert_eq!(layered.layers.len(), 1);
    assert_eq!(layered.config.memory.dimensions, 16);
}

#[test]
fn requirements_lock_overrides() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project_tree(&temp);

    let requirements = temp.path().join("requirements.json5");
    write_json5(
        &requirements,
        "{ memory: { embedding: { provider: \"hash\" } } }",
    );
    let runtime_config = temp.path().join("runtime.json5");
    write_json5(
        &runtime_config,
        "{ memory: { embedding: { provider: \"openai\", model: \"custom\" } } }",
    );

    let mut options = isolated_options(&cwd).with_runtime_path(&runtime_config);
    options.requirements_path = Some(requirements);

    let layered = LecternConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.memory.embedding.provider, "hash");
    assert_eq!(layered.config.memory.embedding.model, "custom");
}

#[test]
fn runtime_override_wins_without_constraints() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project_tree(&temp);
    write_json5(
        &cwd.join(DEFAULT_CONFIG_FILE),
        "{ memory: { insights: { list_limit: 5 } } }",
    );
    let runtime_config = temp.path().join("runtime.json5");
    write_json5(
        &runtime_config,
        "{ memory: { insights: { list_limit: 50 } } }",
    );

    let options = isolated_options(&cwd).with_runtime_path(&runtime_config);
    let layered = LecternConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.memory.insights.list_limit, 50);
}

#[test]
fn missing_runtime_layer_is_an_error() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project_tree(&temp);
    let options = isolated_options(&cwd).with_runtime_path(temp.path().join("absent.json5"));
    let err = LecternConfig::load_layered_with_options(options).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn invalid_layer_reports_its_source() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project_tree(&temp);
    write_json5(&cwd.join(DEFAULT_CONFIG_FILE), "{ memory: { dimensions: \"x\" } }");

    let err = LecternConfig::load_layered_with_options(isolated_options(&cwd)).unwrap_err();
    match err {
        ConfigError::InvalidField { path, .. } => assert!(path.ends_with("memory.dimensions")),
        other => panic!("unexpected error: {other:?}"),
    }
}
