use serde::{Deserialize, Serialize};

/// Who produced a conversation turn. Role only selects the prompt position
/// when the history is replayed to the rewrite model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One prior turn in a chat session. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The two embedding backends. The index stores one embedding field per
/// backend, so the active backend also decides which field a search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    OpenAi,
    HuggingFace,
}

impl EmbeddingBackend {
    /// Name of the index-side vector field holding this backend's embeddings.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "embedding",
            Self::HuggingFace => "embedding_hugging_face",
        }
    }
}

impl std::str::FromStr for EmbeddingBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "huggingface" | "hugging_face" | "hf" => Ok(Self::HuggingFace),
            other => Err(format!("Unknown embedding backend: {other}")),
        }
    }
}

impl std::fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::HuggingFace => write!(f, "huggingface"),
        }
    }
}

/// Process-wide model selection, read at the start of every chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    /// Configured model id, e.g. `openai/gpt-4o`.
    pub chat_model: String,
    pub embedding_backend: EmbeddingBackend,
}

/// Inbound chat payload carried by a `message` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundChat {
    pub query: String,
    #[serde(rename = "browserType")]
    pub browser_type: String,
    #[serde(rename = "deviceType")]
    pub device_type: String,
}

/// Inbound feedback payload carried by a `rating` event. No reply is sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingEvent {
    pub bot_message_id: String,
    pub score: i64,
}

/// Events a client may send over the socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    Message(InboundChat),
    Rating(RatingEvent),
}

/// One streamed answer frame. `message_string` is cumulative: it carries the
/// whole answer produced so far, not just the newest fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub timestamp: i64,
    pub message_string: String,
    pub document_ids: Vec<String>,
    pub documents: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMessageCreated {
    pub bot_message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub message: String,
}

/// Events the server emits over the socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Message(MessageEvent),
    BotMessageCreation(BotMessageCreated),
    Error(ErrorEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_message_event_decodes() {
        let json = r#"{
            "event": "message",
            "data": {"query": "What is the return policy?", "browserType": "chrome", "deviceType": "desktop"}
        }"#;
        let event: ClientEvent = serde_json::from_str(json).expect("deserialize");
        match event {
            ClientEvent::Message(msg) => {
                assert_eq!(msg.query, "What is the return policy?");
                assert_eq!(msg.browser_type, "chrome");
                assert_eq!(msg.device_type, "desktop");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn client_rating_event_decodes() {
        let json = r#"{"event": "rating", "data": {"bot_message_id": "abc", "score": 4}}"#;
        let event: ClientEvent = serde_json::from_str(json).expect("deserialize");
        match event {
            ClientEvent::Rating(rating) => {
                assert_eq!(rating.bot_message_id, "abc");
                assert_eq!(rating.score, 4);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn server_message_event_wire_shape() {
        let event = ServerEvent::Message(MessageEvent {
            timestamp: 1700000000,
            message_string: "partial answer".to_string(),
            document_ids: vec!["doc1".to_string()],
            documents: vec![serde_json::json!({"source": "faq"})],
        });

        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["event"], "message");
        assert_eq!(value["data"]["message_string"], "partial answer");
        assert_eq!(value["data"]["document_ids"][0], "doc1");
    }

    #[test]
    fn server_bot_message_creation_wire_shape() {
        let event = ServerEvent::BotMessageCreation(BotMessageCreated {
            bot_message_id: "bot-1".to_string(),
        });
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["event"], "bot_message_creation");
        assert_eq!(value["data"]["bot_message_id"], "bot-1");
    }

    #[test]
    fn embedding_backend_field_names() {
        assert_eq!(EmbeddingBackend::OpenAi.field_name(), "embedding");
        assert_eq!(
            EmbeddingBackend::HuggingFace.field_name(),
            "embedding_hugging_face"
        );
    }

    #[test]
    fn embedding_backend_parses_aliases() {
        assert_eq!(
            "hugging_face".parse::<EmbeddingBackend>().unwrap(),
            EmbeddingBackend::HuggingFace
        );
        assert_eq!(
            "OpenAI".parse::<EmbeddingBackend>().unwrap(),
            EmbeddingBackend::OpenAi
        );
        assert!("word2vec".parse::<EmbeddingBackend>().is_err());
    }
}
