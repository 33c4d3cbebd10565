use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Inbound user messages, immutable after insert
        CREATE TABLE IF NOT EXISTS user_messages (
            id TEXT PRIMARY KEY,
            query TEXT NOT NULL,
            transformed_query TEXT NOT NULL,
            device_type TEXT NOT NULL,
            browser_type TEXT NOT NULL,
            user_id TEXT NOT NULL,
            timestamp TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_user_messages_user_id ON user_messages(user_id);
        CREATE INDEX IF NOT EXISTS idx_user_messages_timestamp ON user_messages(timestamp);

        -- Completed assistant answers; rating is the only mutable column
        CREATE TABLE IF NOT EXISTS bot_messages (
            id TEXT PRIMARY KEY,
            message TEXT NOT NULL,
            user_msg_id TEXT,
            timestamp TEXT NOT NULL,
            chat_model TEXT NOT NULL,
            product_ids TEXT NOT NULL DEFAULT '[]',
            rating INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_bot_messages_user_msg_id ON bot_messages(user_msg_id);
        CREATE INDEX IF NOT EXISTS idx_bot_messages_timestamp ON bot_messages(timestamp);
        "#,
    )
    .await?;

    Ok(())
}
