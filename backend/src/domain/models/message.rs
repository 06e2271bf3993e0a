use chrono::{DateTime, Utc};
use shared::MessageDto;

/// Domain model for a family message. `to_user_id == None` is a
/// broadcast to the whole family.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub family_id: String,
    pub from_user_id: String,
    /// Sender display name, joined in at query time.
    pub from_user_name: Option<String>,
    pub to_user_id: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn to_dto(&self) -> MessageDto {
        MessageDto {
            id: self.id.clone(),
            family_id: self.family_id.clone(),
            from_user_id: self.from_user_id.clone(),
            from_user_name: self.from_user_name.clone(),
            to_user_id: self.to_user_id.clone(),
            content: self.content.clone(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
