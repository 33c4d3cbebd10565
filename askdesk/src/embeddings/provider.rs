use async_trait::async_trait;

use crate::config::EmbeddingsConfig;
use crate::error::Result;
use crate::models::EmbeddingBackend;

use super::api::{ApiConfig, EmbeddingApiClient};
use super::huggingface::HuggingFaceClient;
use super::QueryEmbedder;

/// Facade over the two remote embedding backends.
///
/// Both backends stay constructed for the whole process lifetime; the toggle
/// only decides which one a given call uses. Vectors from the two backends
/// have different dimensionality and must never be mixed in one search.
#[derive(Clone)]
pub struct EmbeddingProvider {
    openai: EmbeddingApiClient,
    huggingface: HuggingFaceClient,
}

impl EmbeddingProvider {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let openai = EmbeddingApiClient::new(ApiConfig::from(&config.openai))?;
        let huggingface = HuggingFaceClient::new(&config.huggingface)?;

        Ok(Self { openai, huggingface })
    }

    pub async fn embed(&self, backend: EmbeddingBackend, text: &str) -> Result<Vec<f32>> {
        match backend {
            EmbeddingBackend::OpenAi => self.openai.embed_one(text).await,
            EmbeddingBackend::HuggingFace => self.huggingface.embed_one(text).await,
        }
    }

    /// Embed the same text with both backends, used by the utility endpoint
    /// that ingestion tooling calls to populate both index fields.
    pub async fn embed_with_both(&self, text: &str) -> Result<(Vec<f32>, Vec<f32>)> {
        let openai = self.openai.embed_one(text).await?;
        let huggingface = self.huggingface.embed_one(text).await?;
        Ok((openai, huggingface))
    }
}

#[async_trait]
impl QueryEmbedder for EmbeddingProvider {
    async fn embed_query(&self, backend: EmbeddingBackend, text: &str) -> Result<Vec<f32>> {
        self.embed(backend, text).await
    }
}
