use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::params;

use crate::db::Database;
use crate::error::{AskdeskError, Result};
use crate::models::{BotMessageRecord, UserMessageRecord};

/// Persistence for chat transcripts.
///
/// Writes happen off the streaming path; callers absorb failures rather than
/// letting them gate a reply. Ratings are last-write-wins partial updates.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn save_user_message(&self, record: &UserMessageRecord) -> Result<()>;

    async fn save_bot_message(&self, record: &BotMessageRecord) -> Result<()>;

    /// Set the rating on an existing bot message. Fails with `NotFound` when
    /// the message does not exist; a rating never creates a record.
    async fn set_rating(&self, bot_message_id: &str, score: i64) -> Result<()>;

    async fn get_bot_message(&self, id: &str) -> Result<Option<BotMessageRecord>>;
}

#[derive(Clone)]
pub struct LibSqlTranscripts {
    database: Database,
}

impl LibSqlTranscripts {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl TranscriptStore for LibSqlTranscripts {
    async fn save_user_message(&self, record: &UserMessageRecord) -> Result<()> {
        let conn = self.database.connect()?;

        conn.execute(
            r#"
            INSERT INTO user_messages (
                id, query, transformed_query, device_type, browser_type, user_id, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.id.clone(),
                record.query.clone(),
                record.transformed_query.clone(),
                record.device_type.clone(),
                record.browser_type.clone(),
                record.user_id.clone(),
                record.timestamp.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    async fn save_bot_message(&self, record: &BotMessageRecord) -> Result<()> {
        let conn = self.database.connect()?;
        let product_ids = serde_json::to_string(&record.product_ids)?;

        conn.execute(
            r#"
            INSERT INTO bot_messages (
                id, message, user_msg_id, timestamp, chat_model, product_ids, rating
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.id.clone(),
                record.message.clone(),
                record.user_msg_id.clone(),
                record.timestamp.to_rfc3339(),
                record.chat_model.clone(),
                product_ids,
                record.rating,
            ],
        )
        .await?;

        Ok(())
    }

    async fn set_rating(&self, bot_message_id: &str, score: i64) -> Result<()> {
        let conn = self.database.connect()?;

        let updated = conn
            .execute(
                "UPDATE bot_messages SET rating = ?2 WHERE id = ?1",
                params![bot_message_id, score],
            )
            .await?;

        if updated == 0 {
            return Err(AskdeskError::NotFound(format!(
                "Bot message not found: {bot_message_id}"
            )));
        }

        Ok(())
    }

    async fn get_bot_message(&self, id: &str) -> Result<Option<BotMessageRecord>> {
        let conn = self.database.connect()?;

        let mut rows = conn
            .query(
                r#"
                SELECT id, message, user_msg_id, timestamp, chat_model, product_ids, rating
                FROM bot_messages
                WHERE id = ?1
                "#,
                params![id],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };

        let timestamp: String = row.get(3)?;
        let timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| AskdeskError::Internal(format!("Invalid stored timestamp: {e}")))?
            .with_timezone(&Utc);

        let product_ids: String = row.get(5)?;
        let product_ids: Vec<String> = serde_json::from_str(&product_ids).unwrap_or_default();

        Ok(Some(BotMessageRecord {
            id: row.get(0)?,
            message: row.get(1)?,
            user_msg_id: row.get(2)?,
            timestamp,
            chat_model: row.get(4)?,
            product_ids,
            rating: row.get(6)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use pretty_assertions::assert_eq;

    async fn test_store() -> LibSqlTranscripts {
        let config = DatabaseConfig {
            url: ":memory:".to_string(),
            auth_token: None,
            local_path: None,
        };
        let database = Database::new(&config).await.expect("in-memory database");
        LibSqlTranscripts::new(database)
    }

    fn bot_record(id: &str) -> BotMessageRecord {
        BotMessageRecord {
            id: id.to_string(),
            message: "Returns are accepted within 30 days.".to_string(),
            user_msg_id: Some("user-1".to_string()),
            timestamp: Utc::now(),
            chat_model: "openai/gpt-4o".to_string(),
            product_ids: vec!["doc1".to_string(), "doc2".to_string()],
            rating: None,
        }
    }

    #[tokio::test]
    async fn test_bot_message_round_trip() {
        let store = test_store().await;
        let record = bot_record("bot-1");

        store.save_bot_message(&record).await.unwrap();

        let fetched = store.get_bot_message("bot-1").await.unwrap().unwrap();
        assert_eq!(fetched.id, record.id);
        assert_eq!(fetched.message, record.message);
        assert_eq!(fetched.user_msg_id, record.user_msg_id);
        assert_eq!(fetched.chat_model, record.chat_model);
        assert_eq!(fetched.product_ids, record.product_ids);
        assert_eq!(fetched.rating, None);
    }

    #[tokio::test]
    async fn test_rating_updates_only_rating() {
        let store = test_store().await;
        let record = bot_record("bot-2");
        store.save_bot_message(&record).await.unwrap();

        store.set_rating("bot-2", 4).await.unwrap();
        store.set_rating("bot-2", 1).await.unwrap();

        let fetched = store.get_bot_message("bot-2").await.unwrap().unwrap();
        assert_eq!(fetched.rating, Some(1));
        assert_eq!(fetched.message, record.message);
        assert_eq!(fetched.product_ids, record.product_ids);
    }

    #[tokio::test]
    async fn test_rating_missing_message_is_not_found() {
        let store = test_store().await;

        let result = store.set_rating("no-such-id", 5).await;
        assert!(matches!(result, Err(AskdeskError::NotFound(_))));

        // A failed rating must not create a record.
        assert!(store.get_bot_message("no-such-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_message_insert() {
        let store = test_store().await;

        let record = UserMessageRecord {
            id: "user-1".to_string(),
            query: "do you ship to Canada?".to_string(),
            transformed_query: "shipping to Canada".to_string(),
            device_type: "desktop".to_string(),
            browser_type: "chrome".to_string(),
            user_id: "H123".to_string(),
            timestamp: Utc::now(),
        };

        store.save_user_message(&record).await.unwrap();
    }
}
