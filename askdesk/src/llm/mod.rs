pub mod api;
pub mod prompts;
mod provider;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::Result;
use crate::models::ConversationTurn;

pub use api::{CompletionOptions, LlmApiClient};
pub use provider::LlmProvider;

/// A lazy, finite, one-shot sequence of answer fragments. Not restartable:
/// once consumed it cannot be iterated again.
pub type AnswerStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Rewrites a running conversation into one standalone search query.
///
/// The output is opaque text; the caller hands it unchanged to the embedding
/// step. Upstream completion errors propagate and abort the turn.
#[async_trait]
pub trait QueryRewriter: Send + Sync {
    async fn rewrite(&self, turns: &[ConversationTurn], chat_model: &str) -> Result<String>;
}

/// Produces the grounded answer as a stream of text fragments.
///
/// Fragments must be forwarded as they are produced; a mid-stream failure
/// leaves already-emitted fragments in place and surfaces as an error on the
/// next pull.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn stream_answer(
        &self,
        question: &str,
        context: &str,
        chat_model: &str,
    ) -> Result<AnswerStream>;
}
