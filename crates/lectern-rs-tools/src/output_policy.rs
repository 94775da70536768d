//! Trimming applied to tool output before it reaches the caller.

use lectern_rs_config::ToolOutputPolicyConfig;
use serde_json::Value;

/// Drops bulky keys and truncates long strings and arrays in tool output.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutputPolicy {
    /// Maximum size of string fields in bytes.
    pub max_string_bytes: usize,
    /// Maximum number of elements in arrays.
    pub max_array_len: usize,
    /// Object keys removed at any depth, matched case-insensitively.
    pub omit_keys: Vec<String>,
}

impl Default for ToolOutputPolicy {
    fn default() -> Self {
        Self::from(&ToolOutputPolicyConfig::default())
    }
}

impl From<&ToolOutputPolicyConfig> for ToolOutputPolicy {
    fn from(config: &ToolOutputPolicyConfig) -> Self {
        Self {
            max_string_bytes: config.max_string_bytes,
            max_array_len: config.max_array_len,
            omit_keys: config.omit_keys.clone(),
        }
    }
}

impl ToolOutputPolicy {
    /// Apply the policy to a JSON value.
    pub fn apply(&self, value: Value) -> Value {
        match value {
            Value::String(text) => Value::String(self.truncate_string(text)),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .take(self.max_array_len)
                    .map(|item| self.apply(item))
                    .collect(),
            ),
            Value::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .filter(|(key, _)| !self.omits(key))
                    .map(|(key, value)| (key, self.apply(value)))
                    .collect(),
            ),
            value => value,
        }
    }

    fn omits(&self, key: &str) -> bool {
        self.omit_keys
            .iter()
            .any(|entry| entry.eq_ignore_ascii_case(key))
    }

    /// Cut at the last char boundary within `max_string_bytes`.
    fn truncate_string(&self, mut text: String) -> String {
        if text.len() <= self.max_string_bytes {
            return text;
        }
        let end = text
            .char_indices()
            .map(|(idx, ch)| idx + ch.len_utf8())
            .take_while(|next| *next <= self.max_string_bytes)
            .last()
            .unwrap_or(0);
        text.truncate(end);
        text
    }
}

#[cfg(test)]
mod tests {
    use super::ToolOutputPolicy;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn policy(max_string_bytes: usize, max_array_len: usize) -> ToolOutputPolicy {
        ToolOutputPolicy {
            max_string_bytes,
            max_array_len,
            omit_keys: vec!["vector".to_string()],
        }
    }

    #[test]
    fn drops_vectors_at_any_depth() {
        let output = policy(64, 8).apply(json!({
            "id": "m1",
            "vector": [0.1, 0.2],
            "hits": [{ "id": "h1", "Vector": [1.0] }],
        }));
        assert_eq!(output, json!({ "id": "m1", "hits": [{ "id": "h1" }] }));
    }

    #[test]
    fn truncates_strings_on_char_boundaries() {
        let output = policy(4, 8).apply(json!({ "content": "héllo" }));
        assert_eq!(output, json!({ "content": "hél" }));
    }

    #[test]
    fn truncates_arrays() {
        let output = policy(64, 2).apply(json!({ "list": ["first", "second", "third"] }));
        assert_eq!(output, json!({ "list": ["first", "second"] }));
    }

    #[test]
    fn default_matches_config_defaults() {
        let policy = ToolOutputPolicy::default();
        assert_eq!(policy.max_string_bytes, 32 * 1024);
        assert_eq!(policy.omit_keys, vec!["vector".to_string()]);
    }
}
