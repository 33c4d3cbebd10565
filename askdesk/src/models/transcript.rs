use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted record of one inbound user message. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessageRecord {
    pub id: String,
    pub query: String,
    pub transformed_query: String,
    pub device_type: String,
    pub browser_type: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Persisted record of one completed assistant answer.
///
/// `rating` is the only mutable attribute; it is set later by an independent
/// feedback event and overwrites are last-write-wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMessageRecord {
    pub id: String,
    pub message: String,
    pub user_msg_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub chat_model: String,
    pub product_ids: Vec<String>,
    pub rating: Option<i64>,
}
