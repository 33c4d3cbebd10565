use std::sync::Arc;

use tokio::sync::RwLock;

use crate::chat::ChatPipeline;
use crate::config::Config;
use crate::db::TranscriptStore;
use crate::embeddings::EmbeddingProvider;
use crate::llm::LlmProvider;
use crate::models::ModelSelection;
use crate::processing::{MetadataTagger, PiiMasker};
use crate::search::{RewriteCache, VectorIndex};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub embeddings: EmbeddingProvider,
    pub llm: Arc<LlmProvider>,
    pub tagger: MetadataTagger,
    pub pii: PiiMasker,
    pub pipeline: Arc<ChatPipeline>,
    /// Process-wide model selection, snapshotted at the start of each turn.
    pub selection: Arc<RwLock<ModelSelection>>,
}

impl AppState {
    pub fn new(
        config: Config,
        embeddings: EmbeddingProvider,
        llm: LlmProvider,
        index: Arc<dyn VectorIndex>,
        transcripts: Arc<dyn TranscriptStore>,
    ) -> Self {
        let config = Arc::new(config);
        let llm = Arc::new(llm);

        let selection = ModelSelection {
            chat_model: config.llm.primary_model.clone(),
            embedding_backend: config.embeddings.default_backend,
        };

        let pipeline = ChatPipeline::new(
            llm.clone(),
            Arc::new(embeddings.clone()),
            index,
            llm.clone(),
            transcripts,
            RewriteCache::new(config.llm.rewrite_cache_size),
            &config.search,
        );

        Self {
            config,
            embeddings,
            tagger: MetadataTagger::new(llm.clone()),
            pii: PiiMasker::new(llm.clone()),
            llm,
            pipeline: Arc::new(pipeline),
            selection: Arc::new(RwLock::new(selection)),
        }
    }
}
