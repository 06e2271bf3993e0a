use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbConnection;
use crate::domain::models::message::Message;

// Sqlite datetime('now') format, interpreted as UTC.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage for messages and per-user read watermarks.
#[derive(Clone)]
pub struct MessageRepository {
    db: DbConnection,
}

impl MessageRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// The newest `limit` messages in the family, newest first, with
    /// the sender's display name joined in.
    pub async fn list_recent(&self, family_id: &str, limit: i64) -> Result<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT m.*, u.name AS from_user_name FROM messages m \
             LEFT JOIN users u ON u.id = m.from_user_id \
             WHERE m.family_id = ? ORDER BY m.created_at DESC, m.id DESC LIMIT ?",
        )
        .bind(family_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(row_to_message).collect()
    }

    pub async fn get_message(&self, message_id: &str) -> Result<Option<Message>> {
        let row = sqlx::query(
            "SELECT m.*, u.name AS from_user_name FROM messages m \
             LEFT JOIN users u ON u.id = m.from_user_id WHERE m.id = ?",
        )
        .bind(message_id)
        .fetch_optional(self.db.pool())
        .await?;
        row.as_ref().map(row_to_message).transpose()
    }

    pub async fn insert_message(&self, message: &Message) -> Result<()> {
        sqlx::query(
            "INSERT INTO messages (id, family_id, from_user_id, to_user_id, content, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.family_id)
        .bind(&message.from_user_id)
        .bind(&message.to_user_id)
        .bind(&message.content)
        .bind(message.created_at.format(TIMESTAMP_FORMAT).to_string())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn delete_message(&self, message_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(message_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn delete_messages_from(&self, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM messages WHERE from_user_id = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// The viewer's last-read watermark, if any.
    pub async fn get_last_read(
        &self,
        user_id: &str,
        family_id: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        let row = sqlx::query(
            "SELECT last_read_at FROM message_reads WHERE user_id = ? AND family_id = ?",
        )
        .bind(user_id)
        .bind(family_id)
        .fetch_optional(self.db.pool())
        .await?;
        row.map(|r| parse_timestamp(&r.get::<String, _>("last_read_at")))
            .transpose()
    }

    /// Move the watermark forward. Upsert keeps one row per member.
    pub async fn set_last_read(
        &self,
        user_id: &str,
        family_id: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO message_reads (user_id, family_id, last_read_at) VALUES (?, ?, ?) \
             ON CONFLICT (user_id, family_id) DO UPDATE SET last_read_at = excluded.last_read_at",
        )
        .bind(user_id)
        .bind(family_id)
        .bind(at.format(TIMESTAMP_FORMAT).to_string())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn delete_reads_for_user(&self, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM message_reads WHERE user_id = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .with_context(|| format!("Invalid timestamp: {}", raw))?;
    Ok(naive.and_utc())
}

fn row_to_message(row: &SqliteRow) -> Result<Message> {
    let created_at: String = row.get("created_at");
    Ok(Message {
        id: row.get("id"),
        family_id: row.get("family_id"),
        from_user_id: row.get("from_user_id"),
        from_user_name: row.get("from_user_name"),
        to_user_id: row.get("to_user_id"),
        content: row.get("content"),
        created_at: parse_timestamp(&created_at)?,
    })
}
