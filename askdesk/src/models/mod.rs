mod chat;
mod search;
mod transcript;

pub use chat::{
    BotMessageCreated, ClientEvent, ConversationTurn, EmbeddingBackend, ErrorEvent, InboundChat,
    MessageEvent, ModelSelection, RatingEvent, Role, ServerEvent,
};
pub use search::{KnnRequest, SearchHit};
pub use transcript::{BotMessageRecord, UserMessageRecord};
