use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use uuid::Uuid;

use crate::config::SearchConfig;
use crate::db::TranscriptStore;
use crate::embeddings::QueryEmbedder;
use crate::error::Result;
use crate::llm::{AnswerGenerator, QueryRewriter};
use crate::models::{
    BotMessageCreated, BotMessageRecord, InboundChat, KnnRequest, MessageEvent, ModelSelection,
    RatingEvent, ServerEvent, UserMessageRecord,
};
use crate::search::{assemble_context, MissingFieldPolicy, RewriteCache, VectorIndex};

use super::{ChatSession, EventSink};

/// Authenticated-user placeholder until a real identity layer lands.
pub const USER_ID: &str = "H123";

/// One chat turn end to end: rewrite, embed, retrieve, assemble, stream,
/// persist. The streaming path never waits on persistence.
pub struct ChatPipeline {
    rewriter: Arc<dyn QueryRewriter>,
    embedder: Arc<dyn QueryEmbedder>,
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn AnswerGenerator>,
    transcripts: Arc<dyn TranscriptStore>,
    rewrite_cache: RewriteCache,
    context_field: String,
    result_fields: Vec<String>,
    result_limit: u64,
    num_candidates: u64,
    missing_field_policy: MissingFieldPolicy,
}

impl ChatPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rewriter: Arc<dyn QueryRewriter>,
        embedder: Arc<dyn QueryEmbedder>,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn AnswerGenerator>,
        transcripts: Arc<dyn TranscriptStore>,
        rewrite_cache: RewriteCache,
        search: &SearchConfig,
    ) -> Self {
        let mut result_fields = vec![search.context_field.clone()];
        result_fields.extend(search.extra_fields.iter().cloned());

        Self {
            rewriter,
            embedder,
            index,
            generator,
            transcripts,
            rewrite_cache,
            context_field: search.context_field.clone(),
            result_fields,
            result_limit: search.result_limit,
            num_candidates: search.num_candidates,
            missing_field_policy: search.missing_field_policy,
        }
    }

    /// Run one chat turn against `sink`. Upstream failures propagate to the
    /// caller after the fragments already emitted; persistence failures do
    /// not.
    pub async fn handle_message(
        &self,
        session: &mut ChatSession,
        inbound: InboundChat,
        selection: &ModelSelection,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        session.push_user(inbound.query.clone());

        let transformed_query = self.rewrite_query(session, &selection.chat_model).await?;
        tracing::debug!(query = %transformed_query, "Rewrote conversation into search query");

        let user_msg_id = self.spawn_user_record(&inbound, &transformed_query);

        let vector = self
            .embedder
            .embed_query(selection.embedding_backend, &transformed_query)
            .await?;

        let hits = self
            .index
            .knn(&KnnRequest {
                embedding_field: selection.embedding_backend.field_name().to_string(),
                vector,
                fields: self.result_fields.clone(),
                limit: self.result_limit,
                num_candidates: self.num_candidates,
            })
            .await?;

        let assembled = assemble_context(&hits, &self.context_field, self.missing_field_policy)?;
        tracing::debug!(documents = assembled.document_ids.len(), "Assembled context");

        let mut fragments = self
            .generator
            .stream_answer(&transformed_query, &assembled.context, &selection.chat_model)
            .await?;

        // One timestamp per turn; every cumulative frame carries the same
        // value.
        let turn_timestamp = Utc::now().timestamp();

        let mut answer = String::new();
        while let Some(fragment) = fragments.next().await {
            let fragment = fragment?;
            answer.push_str(&fragment);

            // Await the send before pulling the next fragment so cumulative
            // frames reach the client in production order.
            sink.emit(&ServerEvent::Message(MessageEvent {
                timestamp: turn_timestamp,
                message_string: answer.clone(),
                document_ids: assembled.document_ids.clone(),
                documents: assembled.documents.clone(),
            }))
            .await?;
        }

        session.push_assistant(answer.clone());

        let bot_message_id = self
            .persist_bot_message(
                &answer,
                user_msg_id,
                &selection.chat_model,
                assembled.document_ids.clone(),
            )
            .await;

        if let Some(bot_message_id) = bot_message_id {
            sink.emit(&ServerEvent::BotMessageCreation(BotMessageCreated {
                bot_message_id,
            }))
            .await?;
        }

        Ok(())
    }

    /// Apply a rating to an existing bot message. Failures are logged and
    /// absorbed; the client never gets a reply for a rating.
    pub async fn handle_rating(&self, rating: RatingEvent) {
        if let Err(error) = self
            .transcripts
            .set_rating(&rating.bot_message_id, rating.score)
            .await
        {
            tracing::warn!(
                bot_message_id = %rating.bot_message_id,
                error = %error,
                "Failed to record rating"
            );
        }
    }

    async fn rewrite_query(&self, session: &ChatSession, chat_model: &str) -> Result<String> {
        let key = RewriteCache::key_for(session.turns(), chat_model);

        if let Some(cached) = self.rewrite_cache.get(&key) {
            tracing::debug!("Query rewrite cache hit");
            return Ok(cached);
        }

        let rewritten = self.rewriter.rewrite(session.turns(), chat_model).await?;
        self.rewrite_cache.put(key, rewritten.clone());
        Ok(rewritten)
    }

    /// Persist the user message off the streaming path. The generated id is
    /// returned immediately so the bot record can link to it even if the
    /// write later fails.
    fn spawn_user_record(&self, inbound: &InboundChat, transformed_query: &str) -> Option<String> {
        let record = UserMessageRecord {
            id: Uuid::new_v4().to_string(),
            query: inbound.query.clone(),
            transformed_query: transformed_query.to_string(),
            device_type: inbound.device_type.clone(),
            browser_type: inbound.browser_type.clone(),
            user_id: USER_ID.to_string(),
            timestamp: Utc::now(),
        };
        let id = record.id.clone();

        let transcripts = Arc::clone(&self.transcripts);
        tokio::spawn(async move {
            if let Err(error) = transcripts.save_user_message(&record).await {
                tracing::warn!(
                    user_msg_id = %record.id,
                    error = %error,
                    "Failed to persist user message"
                );
            }
        });

        Some(id)
    }

    async fn persist_bot_message(
        &self,
        answer: &str,
        user_msg_id: Option<String>,
        chat_model: &str,
        product_ids: Vec<String>,
    ) -> Option<String> {
        let record = BotMessageRecord {
            id: Uuid::new_v4().to_string(),
            message: answer.to_string(),
            user_msg_id,
            timestamp: Utc::now(),
            chat_model: chat_model.to_string(),
            product_ids,
            rating: None,
        };

        match self.transcripts.save_bot_message(&record).await {
            Ok(()) => Some(record.id),
            Err(error) => {
                tracing::warn!(error = %error, "Failed to persist bot message");
                None
            }
        }
    }
}
