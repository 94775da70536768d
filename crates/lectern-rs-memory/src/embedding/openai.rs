//! OpenAI-compatible embeddings provider using the `/v1/embeddings` endpoint.

use super::EmbeddingProvider;
use crate::error::MemoryError;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dims: usize,
}

fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn embeddings_endpoint(base_url: &str) -> String {
    let normalized = normalize_base_url(base_url);
    if normalized.ends_with("/embeddings") {
        return normalized;
    }
    if normalized.ends_with("/v1") {
        return format!("{normalized}/embeddings");
    }
    format!("{normalized}/v1/embeddings")
}

impl OpenAiEmbeddingProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: normalize_base_url("https://api.openai.com"),
            model: "text-embedding-3-small".to_string(),
            dims: super::DEFAULT_DIMENSIONS,
        }
    }

    pub fn with_model(mut self, model: String, dims: usize) -> Self {
        self.model = model;
        self.dims = dims;
        self
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = normalize_base_url(&url);
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// Order response items by their `index`, falling back to arrival order.
fn ordered_embeddings(response: EmbeddingResponse) -> Vec<Vec<f32>> {
    let mut indexed = response
        .data
        .into_iter()
        .enumerate()
        .map(|(fallback, item)| (item.index.unwrap_or(fallback), item.embedding))
        .collect::<Vec<_>>();
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, vector)| vector).collect()
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| MemoryError::Embedding("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.dims,
        };
        debug!(
            "requesting embeddings (model={}, inputs={})",
            self.model,
            texts.len()
        );
        let response = self
            .client
            .post(embeddings_endpoint(&self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| MemoryError::Embedding(err.to_string()))?
            .json::<EmbeddingResponse>()
            .await
            .map_err(|err| MemoryError::Embedding(err.to_string()))?;
        Ok(ordered_embeddings(response))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

#[cfg(test)]
mod tests {
    use super::{EmbeddingResponse, embeddings_endpoint, ordered_embeddings};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn endpoint_from_host_base_uses_v1_embeddings() {
        assert_eq!(
            embeddings_endpoint("https://api.openai.com/"),
            "https://api.openai.com/v1/embeddings"
        );
    }

    #[test]
    fn endpoint_from_v1_base_appends_embeddings_once() {
        assert_eq!(
            embeddings_endpoint("http://localhost:11434/v1"),
            "http://localhost:11434/v1/embeddings"
        );
    }

    #[test]
    fn endpoint_preserves_explicit_embeddings_url() {
        assert_eq!(
            embeddings_endpoint("https://api.example.com/v1/embeddings"),
            "https://api.example.com/v1/embeddings"
        );
    }

    #[test]
    fn response_items_follow_index_order() {
        let response: EmbeddingResponse = serde_json::from_value(json!({
            "data": [
                { "index": 1, "embedding": [2.0, 3.0] },
                { "index": 0, "embedding": [0.5, 1.5] }
            ]
        }))
        .expect("response");
        assert_eq!(
            ordered_embeddings(response),
            vec![vec![0.5, 1.5], vec![2.0, 3.0]]
        );
    }
}
