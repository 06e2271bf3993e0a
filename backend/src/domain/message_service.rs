//! Family messaging: broadcast and directed messages, with unread
//! counts derived from a per-user last-read watermark.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::db::DbConnection;
use crate::domain::ids::generate_id;
use crate::domain::models::message::Message;
use crate::domain::models::user::User;
use crate::domain::visibility::{message_visible, Viewer};
use crate::error::ApiError;
use crate::store::{MessageRepository, UserRepository};

const MAX_PAGE_SIZE: i64 = 50;

#[derive(Clone)]
pub struct MessageService {
    messages: MessageRepository,
    users: UserRepository,
}

impl MessageService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            messages: MessageRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    fn require_family(user: &User) -> Result<&str, ApiError> {
        user.family_id
            .as_deref()
            .ok_or_else(|| ApiError::not_found("You are not in a family yet"))
    }

    /// Recent messages visible to the viewer, newest first, with the
    /// count of visible messages newer than the viewer's watermark.
    /// A message the viewer sent is never counted unread.
    pub async fn list_messages(
        &self,
        user: &User,
        viewer: &Viewer,
        limit: Option<i64>,
    ) -> Result<(Vec<Message>, u32), ApiError> {
        let family_id = Self::require_family(user)?;
        let limit = limit.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let recent = self.messages.list_recent(family_id, limit).await?;
        let watermark = self.messages.get_last_read(&user.id, family_id).await?;

        let visible: Vec<Message> = recent
            .into_iter()
            .filter(|m| message_visible(&m.from_user_id, m.to_user_id.as_deref(), viewer))
            .collect();
        let unread = visible
            .iter()
            .filter(|m| m.from_user_id != user.id)
            .filter(|m| watermark.map_or(true, |mark| m.created_at > mark))
            .count() as u32;

        Ok((visible, unread))
    }

    /// Send a broadcast (`to_user_id == None`) or a directed message
    /// to another family member.
    pub async fn send_message(
        &self,
        user: &User,
        content: &str,
        to_user_id: Option<String>,
    ) -> Result<Message, ApiError> {
        let family_id = Self::require_family(user)?;
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::bad_request("Message content is required"));
        }

        let to_user_id = to_user_id.filter(|id| !id.is_empty());
        if let Some(recipient_id) = &to_user_id {
            let recipient = self
                .users
                .get_user(recipient_id)
                .await?
                .filter(|r| r.family_id.as_deref() == Some(family_id))
                .ok_or_else(|| ApiError::bad_request("Recipient is not in your family"))?;
            if recipient.id == user.id {
                return Err(ApiError::bad_request("You cannot message yourself"));
            }
        }

        let message = Message {
            id: generate_id("msg"),
            family_id: family_id.to_string(),
            from_user_id: user.id.clone(),
            from_user_name: Some(user.name.clone()),
            to_user_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.messages.insert_message(&message).await?;
        info!("Message {} sent in family {}", message.id, family_id);
        Ok(message)
    }

    /// Advance the viewer's read watermark to now.
    pub async fn mark_read(&self, user: &User) -> Result<DateTime<Utc>, ApiError> {
        let family_id = Self::require_family(user)?;
        let now = Utc::now();
        self.messages.set_last_read(&user.id, family_id, now).await?;
        Ok(now)
    }

    /// Only the sender may delete a message.
    pub async fn delete_message(&self, user: &User, message_id: &str) -> Result<(), ApiError> {
        let family_id = Self::require_family(user)?;
        let message = self
            .messages
            .get_message(message_id)
            .await?
            .filter(|m| m.family_id == family_id)
            .ok_or_else(|| ApiError::not_found("Message not found"))?;
        if message.from_user_id != user.id {
            return Err(ApiError::forbidden("Only the sender can delete a message"));
        }
        self.messages.delete_message(&message.id).await?;
        info!("Message {} deleted by sender", message.id);
        Ok(())
    }
}
