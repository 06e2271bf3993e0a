use serde::{Deserialize, Serialize};
use std::fmt;

pub mod sync;

/// Account role. Parents administer the family; child accounts get a
/// restricted, own-records-only view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Child,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Parent => write!(f, "parent"),
            Role::Child => write!(f, "child"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(Role::Parent),
            "child" => Ok(Role::Child),
            other => Err(anyhow::anyhow!("Unknown role: {}", other)),
        }
    }
}

/// Recurrence frequency accepted on the wire. Stored values that fall
/// outside this enum are treated as "never recurs" when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
        }
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub family_id: Option<String>,
    pub color: Option<String>,
}

/// Family record as returned to members. `parent_invite_code` is the
/// code other parents use to join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyDto {
    pub id: String,
    pub name: String,
    pub parent_invite_code: String,
}

/// A child profile created by a parent. It exists before (and
/// independently of) any child login; linking happens via the
/// profile's own invite code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildProfileDto {
    pub id: String,
    pub name: String,
    pub color: String,
    pub invite_code: String,
    pub linked_user_id: Option<String>,
    pub is_linked: bool,
}

/// Repeating rule attached to an event.
///
/// `days_of_week` uses 0 = Sunday .. 6 = Saturday. Required non-empty
/// for weekly recurrence, ignored for daily. `end_date` (YYYY-MM-DD)
/// is inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceDto {
    pub frequency: Frequency,
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    pub end_date: Option<String>,
}

/// A calendar event.
///
/// `child_id` is a child-profile id; `None` means family-wide. Dates
/// are civil dates (`YYYY-MM-DD`), times are `HH:MM` local clock
/// times and are ignored when `is_all_day` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: String,
    pub family_id: String,
    pub child_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub start_date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_all_day: bool,
    pub color: Option<String>,
    pub created_by: String,
    pub recurrence: Option<RecurrenceDto>,
}

/// A due-dated checklist item ("preparation").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparationDto {
    pub id: String,
    pub family_id: String,
    pub child_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub due_date: String,
    pub is_completed: bool,
    pub created_by: String,
    /// D-day label relative to today: "D-Day", "D-3", "D+2".
    pub d_day: String,
    /// Due within two days (includes today and overdue items).
    pub is_urgent: bool,
    /// Due date strictly before today.
    pub is_overdue: bool,
}

/// A family message, either broadcast (`to_user_id == None`) or
/// directed at one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub family_id: String,
    pub from_user_id: String,
    pub from_user_name: Option<String>,
    pub to_user_id: Option<String>,
    pub content: String,
    /// RFC 3339 server-assigned creation timestamp.
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinFamilyRequest {
    pub invite_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChildProfileRequest {
    pub name: String,
    pub color: Option<String>,
}

/// Create/replace payload for events. Updates replace the event (and
/// its recurrence) wholesale; there is no partial patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub child_id: Option<String>,
    pub start_date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,
    pub color: Option<String>,
    pub recurrence: Option<RecurrenceDto>,
}

/// Create/replace payload for preparations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparationPayload {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub child_id: Option<String>,
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: String,
    pub to_user_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserDto,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: UserDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyResponse {
    pub family: FamilyDto,
    pub members: Vec<UserDto>,
    pub children: Vec<ChildProfileDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildProfileListResponse {
    pub children: Vec<ChildProfileDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    pub events: Vec<EventDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparationListResponse {
    pub preparations: Vec<PreparationDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListResponse {
    pub messages: Vec<MessageDto>,
    /// Messages newer than the viewer's last-read watermark.
    pub unread_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Parent).unwrap(), "\"parent\"");
        assert_eq!(serde_json::to_string(&Role::Child).unwrap(), "\"child\"");
        let parsed: Role = serde_json::from_str("\"child\"").unwrap();
        assert_eq!(parsed, Role::Child);
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
    }

    #[test]
    fn recurrence_uses_camel_case_keys() {
        let rec = RecurrenceDto {
            frequency: Frequency::Weekly,
            days_of_week: vec![1, 3, 5],
            end_date: None,
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"daysOfWeek\""));
        assert!(json.contains("\"endDate\""));
        assert!(json.contains("\"weekly\""));
    }

    #[test]
    fn recurrence_days_default_to_empty() {
        let rec: RecurrenceDto =
            serde_json::from_str(r#"{"frequency":"daily","endDate":null}"#).unwrap();
        assert!(rec.days_of_week.is_empty());
    }

    #[test]
    fn event_payload_all_day_defaults_false() {
        let payload: EventPayload = serde_json::from_str(
            r#"{"title":"Dentist","startDate":"2024-03-01"}"#,
        )
        .unwrap();
        assert!(!payload.is_all_day);
        assert!(payload.recurrence.is_none());
    }
}
