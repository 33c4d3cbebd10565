pub mod api;
pub mod huggingface;
mod provider;


use async_trait::async_trait;

use crate::error::Result;
use crate::models::EmbeddingBackend;

pub use api::{ApiConfig, EmbeddingApiClient};
pub use huggingface::HuggingFaceClient;
pub use provider::EmbeddingProvider;

/// Seam between the chat pipeline and the embedding backends.
///
/// The rewritten query is passed through unchanged; the caller picks the
/// backend, and the returned vector must only ever be searched against that
/// backend's index field.
#[async_trait]
pub trait QueryEmbedder: Send + Sync {
    async fn embed_query(&self, backend: EmbeddingBackend, text: &str) -> Result<Vec<f32>>;
}
