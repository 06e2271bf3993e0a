//! Calendar events: CRUD plus the scoped occurrence listing.

use chrono::NaiveDate;
use shared::{EventPayload, Frequency, RecurrenceDto};
use tracing::info;

use crate::db::DbConnection;
use crate::domain::ids::generate_id;
use crate::domain::models::event::Event;
use crate::domain::models::user::User;
use crate::domain::occurrence;
use crate::domain::recurrence::Recurrence;
use crate::domain::visibility::ViewerScope;
use crate::error::ApiError;
use crate::store::EventRepository;

const DEFAULT_CATEGORY: &str = "general";

#[derive(Clone)]
pub struct EventService {
    events: EventRepository,
}

impl EventService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            events: EventRepository::new(db),
        }
    }

    fn require_family(user: &User) -> Result<&str, ApiError> {
        user.family_id
            .as_deref()
            .ok_or_else(|| ApiError::not_found("You are not in a family yet"))
    }

    /// Events visible under `scope`. With a date, runs the occurrence
    /// query (recurrence expansion, all-day-first ordering); without
    /// one, returns the scoped family list in storage order. A user
    /// with no family has nothing to list, not an error.
    pub async fn list_events(
        &self,
        user: &User,
        scope: &ViewerScope,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Event>, ApiError> {
        let Some(family_id) = user.family_id.as_deref() else {
            return Ok(Vec::new());
        };
        let all = self.events.list_events(family_id).await?;

        match date {
            Some(date) => Ok(occurrence::occurrences_on(&all, date, scope)
                .into_iter()
                .cloned()
                .collect()),
            None => Ok(all
                .into_iter()
                .filter(|event| scope.allows(event.child_id.as_deref()))
                .collect()),
        }
    }

    pub async fn create_event(
        &self,
        user: &User,
        payload: EventPayload,
    ) -> Result<Event, ApiError> {
        let family_id = Self::require_family(user)?;
        let event = build_event(
            generate_id("event"),
            family_id.to_string(),
            user.id.clone(),
            payload,
        )?;
        self.events.insert_event(&event).await?;
        info!("Created event {} in family {}", event.id, family_id);
        Ok(event)
    }

    /// Full replace. The recurrence rule is swapped wholesale; there
    /// is no partial patch for events.
    pub async fn update_event(
        &self,
        user: &User,
        event_id: &str,
        payload: EventPayload,
    ) -> Result<Event, ApiError> {
        let family_id = Self::require_family(user)?;
        let existing = self
            .events
            .get_event(event_id, family_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Event not found"))?;

        let event = build_event(
            existing.id,
            existing.family_id,
            existing.created_by,
            payload,
        )?;
        self.events.replace_event(&event).await?;
        info!("Replaced event {}", event.id);
        Ok(event)
    }

    pub async fn delete_event(&self, user: &User, event_id: &str) -> Result<(), ApiError> {
        let family_id = Self::require_family(user)?;
        let existing = self
            .events
            .get_event(event_id, family_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Event not found"))?;
        self.events.delete_event(&existing.id).await?;
        info!("Deleted event {}", existing.id);
        Ok(())
    }
}

fn build_event(
    id: String,
    family_id: String,
    created_by: String,
    payload: EventPayload,
) -> Result<Event, ApiError> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }
    let start_date = parse_civil_date(&payload.start_date)?;
    let recurrence = payload
        .recurrence
        .map(recurrence_from_dto)
        .transpose()?
        .flatten();

    Ok(Event {
        id,
        family_id,
        child_id: payload.child_id.filter(|id| !id.is_empty()),
        title,
        description: payload.description,
        category: payload
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        start_date,
        start_time: payload.start_time.filter(|t| !t.is_empty()),
        end_time: payload.end_time.filter(|t| !t.is_empty()),
        is_all_day: payload.is_all_day,
        color: payload.color,
        created_by,
        recurrence,
    })
}

/// Validate and convert a wire recurrence. Weekly rules must carry at
/// least one weekday in 0..=6; a weekly rule with no days is rejected
/// rather than stored as a never-matching row.
fn recurrence_from_dto(dto: RecurrenceDto) -> Result<Option<Recurrence>, ApiError> {
    if dto.frequency == Frequency::Weekly {
        if dto.days_of_week.is_empty() {
            return Err(ApiError::bad_request(
                "Weekly recurrence needs at least one weekday",
            ));
        }
        if dto.days_of_week.iter().any(|d| *d > 6) {
            return Err(ApiError::bad_request("Weekdays must be between 0 and 6"));
        }
    }
    let end_date = dto.end_date.as_deref().map(parse_civil_date).transpose()?;
    Ok(Some(Recurrence {
        frequency: dto.frequency.to_string(),
        days_of_week: dto.days_of_week.iter().map(|d| i64::from(*d)).collect(),
        end_date,
    }))
}

fn parse_civil_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(format!("Invalid date: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Role;

    fn parent() -> User {
        User {
            id: "user_parent".to_string(),
            email: "mina@example.com".to_string(),
            password_hash: "x".to_string(),
            name: "Mina".to_string(),
            role: Role::Parent,
            family_id: Some("family_1".to_string()),
            color: None,
        }
    }

    fn payload(title: &str, start_date: &str) -> EventPayload {
        EventPayload {
            title: title.to_string(),
            description: None,
            category: None,
            child_id: None,
            start_date: start_date.to_string(),
            start_time: None,
            end_time: None,
            is_all_day: false,
            color: None,
            recurrence: None,
        }
    }

    async fn setup_test() -> EventService {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        EventService::new(db)
    }

    #[tokio::test]
    async fn test_create_defaults_category() {
        let service = setup_test().await;
        let event = service
            .create_event(&parent(), payload("Dentist", "2024-03-01"))
            .await
            .unwrap();
        assert_eq!(event.category, "general");
        assert_eq!(event.family_id, "family_1");
    }

    #[tokio::test]
    async fn test_create_validation() {
        let service = setup_test().await;

        assert!(matches!(
            service.create_event(&parent(), payload("  ", "2024-03-01")).await,
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            service
                .create_event(&parent(), payload("Dentist", "03/01/2024"))
                .await,
            Err(ApiError::BadRequest(_))
        ));

        let mut bad_weekly = payload("Swim", "2024-03-01");
        bad_weekly.recurrence = Some(RecurrenceDto {
            frequency: Frequency::Weekly,
            days_of_week: vec![],
            end_date: None,
        });
        assert!(matches!(
            service.create_event(&parent(), bad_weekly).await,
            Err(ApiError::BadRequest(_))
        ));

        let mut out_of_range = payload("Swim", "2024-03-01");
        out_of_range.recurrence = Some(RecurrenceDto {
            frequency: Frequency::Weekly,
            days_of_week: vec![1, 7],
            end_date: None,
        });
        assert!(matches!(
            service.create_event(&parent(), out_of_range).await,
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_list_with_date_expands_recurrence() {
        let service = setup_test().await;
        let mut weekly = payload("Swim", "2024-01-01"); // A Monday.
        weekly.recurrence = Some(RecurrenceDto {
            frequency: Frequency::Weekly,
            days_of_week: vec![1],
            end_date: None,
        });
        service.create_event(&parent(), weekly).await.unwrap();

        let next_monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let listed = service
            .list_events(&parent(), &ViewerScope::All, Some(next_monday))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        let tuesday = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert!(service
            .list_events(&parent(), &ViewerScope::All, Some(tuesday))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_without_date_respects_scope() {
        let service = setup_test().await;
        let mut for_child = payload("Piano", "2024-03-01");
        for_child.child_id = Some("child_a".to_string());
        service.create_event(&parent(), for_child).await.unwrap();
        service
            .create_event(&parent(), payload("Family dinner", "2024-03-02"))
            .await
            .unwrap();

        let scope = ViewerScope::OwnerOnly("child_b".to_string());
        let listed = service
            .list_events(&parent(), &scope, None)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Family dinner");
    }

    #[tokio::test]
    async fn test_list_without_family_is_empty() {
        let service = setup_test().await;
        let mut familyless = parent();
        familyless.family_id = None;

        let listed = service
            .list_events(&familyless, &ViewerScope::All, None)
            .await
            .unwrap();
        assert!(listed.is_empty());

        // Writes still require a family.
        assert!(matches!(
            service
                .create_event(&familyless, payload("Dentist", "2024-03-01"))
                .await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_recurrence() {
        let service = setup_test().await;
        let mut weekly = payload("Swim", "2024-01-01");
        weekly.recurrence = Some(RecurrenceDto {
            frequency: Frequency::Weekly,
            days_of_week: vec![1, 3],
            end_date: None,
        });
        let created = service.create_event(&parent(), weekly).await.unwrap();

        let updated = service
            .update_event(&parent(), &created.id, payload("Swim", "2024-01-01"))
            .await
            .unwrap();
        assert!(updated.recurrence.is_none());
        assert_eq!(updated.created_by, created.created_by);
    }

    #[tokio::test]
    async fn test_update_and_delete_check_family() {
        let service = setup_test().await;
        let created = service
            .create_event(&parent(), payload("Dentist", "2024-03-01"))
            .await
            .unwrap();

        let mut outsider = parent();
        outsider.family_id = Some("family_other".to_string());
        assert!(matches!(
            service
                .update_event(&outsider, &created.id, payload("X", "2024-03-01"))
                .await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_event(&outsider, &created.id).await,
            Err(ApiError::NotFound(_))
        ));

        service.delete_event(&parent(), &created.id).await.unwrap();
    }
}
