//! Schema validation for Lectern JSON5 configuration layers.
//!
//! The accepted shape is described by the `ROOT` table below. Every layer is
//! checked on its own before merging, so unknown keys and mistyped values are
//! reported against the file that introduced them.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Expected JSON shape for a config field.
#[derive(Debug, Clone, Copy)]
enum Kind {
    Str,
    Bool,
    UInt,
    Number,
    StrArray,
    Nullable(&'static Kind),
    Object(&'static [(&'static str, Kind)]),
}

const EMBEDDING: &[(&str, Kind)] = &[
    ("provider", Kind::Str),
    ("model", Kind::Str),
    ("base_url", Kind::Str),
    ("api_key_env", Kind::Str),
];

const CAPTURE: &[(&str, Kind)] = &[
    ("redact_patterns", Kind::StrArray),
    ("detect_secrets", Kind::Bool),
    ("secret_entropy_threshold", Kind::Number),
    ("max_content_chars", Kind::Nullable(&Kind::UInt)),
];

const PATTERNS: &[(&str, Kind)] = &[("merge_distance", Kind::Nullable(&Kind::Number))];

const INSIGHTS: &[(&str, Kind)] = &[
    ("memory_volume_threshold", Kind::UInt),
    ("recurring_pattern_frequency", Kind::UInt),
    ("list_limit", Kind::UInt),
];

const DOCUMENTS: &[(&str, Kind)] = &[
    ("max_results", Kind::UInt),
    ("chunk_size", Kind::UInt),
    ("chunk_overlap", Kind::UInt),
];

const MEMORY: &[(&str, Kind)] = &[
    ("path", Kind::Nullable(&Kind::Str)),
    ("dimensions", Kind::UInt),
    ("embedding", Kind::Object(EMBEDDING)),
    ("capture", Kind::Object(CAPTURE)),
    ("patterns", Kind::Object(PATTERNS)),
    ("insights", Kind::Object(INSIGHTS)),
    ("documents", Kind::Object(DOCUMENTS)),
];

const OUTPUT_POLICY: &[(&str, Kind)] = &[
    ("max_string_bytes", Kind::UInt),
    ("max_array_len", Kind::UInt),
    ("omit_keys", Kind::StrArray),
];

const TOOLS: &[(&str, Kind)] = &[("output_policy", Kind::Object(OUTPUT_POLICY))];

const ROOT: &[(&str, Kind)] = &[
    ("$schema", Kind::Str),
    ("memory", Kind::Object(MEMORY)),
    ("tools", Kind::Object(TOOLS)),
];

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    check(value, Kind::Object(ROOT), layer, "")
}

fn check(value: &Value, kind: Kind, layer: &str, path: &str) -> Result<(), ConfigError> {
    match kind {
        Kind::Str if value.is_string() => Ok(()),
        Kind::Str => Err(invalid_field(layer, path, "expected string")),
        Kind::Bool if value.is_boolean() => Ok(()),
        Kind::Bool => Err(invalid_field(layer, path, "expected bool")),
        Kind::UInt if value.is_u64() => Ok(()),
        Kind::UInt => Err(invalid_field(layer, path, "expected non-negative integer")),
        Kind::Number if value.is_number() => Ok(()),
        Kind::Number => Err(invalid_field(layer, path, "expected number")),
        Kind::Nullable(_) if value.is_null() => Ok(()),
        Kind::Nullable(inner) => check(value, *inner, layer, path),
        Kind::StrArray => validate_string_array(value, layer, path),
        Kind::Object(fields) => {
            let Value::Object(map) = value else {
                return Err(invalid_field(layer, path, "expected object"));
            };
            validate_fields(map, fields, layer, path)
        }
    }
}

fn validate_fields(
    map: &Map<String, Value>,
    fields: &[(&str, Kind)],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for (key, value) in map {
        let field_path = join_path(path, key);
        let Some((_, kind)) = fields.iter().find(|(name, _)| *name == key.as_str()) else {
            return Err(invalid_field(layer, &field_path, "unknown key"));
        };
        check(value, *kind, layer, &field_path)?;
    }
    Ok(())
}

fn validate_string_array(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let Value::Array(items) = value else {
        return Err(invalid_field(layer, path, "expected array"));
    };
    match items.iter().position(|item| !item.is_string()) {
        Some(idx) => Err(invalid_field(
            layer,
            &format!("{path}[{idx}]"),
            "expected string",
        )),
        None => Ok(()),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{path}"),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::validate_layer_schema;
    use crate::ConfigError;
    use serde_json::json;

    fn field_error(value: serde_json::Value) -> String {
        match validate_layer_schema(&value, "user") {
            Err(ConfigError::InvalidField { path, .. }) => path,
            other => panic!("expected field error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_full_document() {
        let value = json!({
            "$schema": "https://example.invalid/lectern.json",
            "memory": {
                "path": null,
                "dimensions": 384,
                "embedding": { "provider": "hash" },
                "capture": { "redact_patterns": ["sk-\\w+"], "max_content_chars": null },
                "patterns": { "merge_distance": 0.25 },
                "insights": { "list_limit": 5 },
                "documents": { "chunk_size": 100, "chunk_overlap": 10 }
            },
            "tools": { "output_policy": { "omit_keys": ["vector"] } }
        });
        validate_layer_schema(&value, "user").expect("valid");
    }

    #[test]
    fn reports_unknown_and_mistyped_fields_with_paths() {
        assert_eq!(field_error(json!({ "agents": {} })), "user:agents");
        assert_eq!(
            field_error(json!({ "memory": { "dimensions": -1 } })),
            "user:memory.dimensions"
        );
        assert_eq!(
            field_error(json!({ "memory": { "capture": { "redact_patterns": ["a", 3] } } })),
            "user:memory.capture.redact_patterns[1]"
        );
        assert_eq!(field_error(json!([])), "user:root");
    }
}
