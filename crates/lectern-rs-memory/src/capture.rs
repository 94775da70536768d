//! Capture policy applied to memory content before it is embedded.

use crate::error::MemoryError;
use regex::Regex;

/// Policy for sanitizing memory content.
#[derive(Debug, Clone)]
pub struct CapturePolicy {
    /// Patterns to redact from captured content.
    pub redact_patterns: Vec<String>,
    /// Detect secrets using entropy heuristics. Off by default: long code
    /// identifiers score like keys.
    pub detect_secrets: bool,
    /// Entropy threshold for secret detection.
    pub secret_entropy_threshold: f32,
    /// Optional maximum content length in characters.
    pub max_content_chars: Option<usize>,
    /// Replacement string for redactions.
    pub replacement: String,
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self {
            redact_patterns: Vec::new(),
            detect_secrets: false,
            secret_entropy_threshold: 3.7,
            max_content_chars: None,
            replacement: "[REDACTED]".to_string(),
        }
    }
}

impl CapturePolicy {
    /// Compile the redaction patterns up front so bad patterns fail early.
    pub fn validate(&self) -> Result<(), MemoryError> {
        compile_patterns(&self.redact_patterns).map(|_| ())
    }

    /// Redact, then truncate.
    pub fn apply(&self, content: &str) -> Result<String, MemoryError> {
        let mut content = content.to_string();
        for regex in compile_patterns(&self.redact_patterns)? {
            content = regex
                .replace_all(&content, self.replacement.as_str())
                .to_string();
        }
        if self.detect_secrets {
            content = redact_high_entropy(
                &content,
                self.secret_entropy_threshold,
                self.replacement.as_str(),
            );
        }
        if let Some(max_chars) = self.max_content_chars {
            content = truncate_chars(&content, max_chars);
        }
        Ok(content)
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, MemoryError> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).map_err(|err| MemoryError::Regex(err.to_string())))
        .collect()
}

/// Truncate a string to a maximum character count.
pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect()
}

/// Redact long base64-ish tokens whose entropy reaches the threshold.
fn redact_high_entropy(content: &str, threshold: f32, replacement: &str) -> String {
    let Ok(regex) = Regex::new(r"[A-Za-z0-9+/=_\-]{20,}") else {
        return content.to_string();
    };
    regex
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let token = caps.get(0).map_or("", |m| m.as_str());
            if shannon_entropy(token) >= threshold {
                replacement.to_string()
            } else {
                token.to_string()
            }
        })
        .to_string()
}

fn shannon_entropy(token: &str) -> f32 {
    let bytes = token.as_bytes();
    if bytes.is_empty() {
        return 0.0;
    }
    let mut counts = [0usize; 256];
    for byte in bytes {
        counts[*byte as usize] += 1;
    }
    let len = bytes.len() as f32;
    counts
        .iter()
        .copied()
        .filter(|count| *count > 0)
        .map(|count| {
            let p = count as f32 / len;
            -p * p.log2()
        })
        .sum()
}
