//! Preparations: due-dated checklist items with the same ownership
//! rule as events.

use chrono::NaiveDate;
use shared::PreparationPayload;
use tracing::info;

use crate::db::DbConnection;
use crate::domain::ids::generate_id;
use crate::domain::models::preparation::Preparation;
use crate::domain::models::user::User;
use crate::domain::visibility::ViewerScope;
use crate::error::ApiError;
use crate::store::PreparationRepository;

const DEFAULT_CATEGORY: &str = "general";

#[derive(Clone)]
pub struct PreparationService {
    preparations: PreparationRepository,
}

impl PreparationService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            preparations: PreparationRepository::new(db),
        }
    }

    fn require_family(user: &User) -> Result<&str, ApiError> {
        user.family_id
            .as_deref()
            .ok_or_else(|| ApiError::not_found("You are not in a family yet"))
    }

    /// Scoped listing, incomplete items first, then due date ascending.
    /// Completed items are hidden unless `show_completed`.
    pub async fn list_preparations(
        &self,
        user: &User,
        scope: &ViewerScope,
        show_completed: bool,
    ) -> Result<Vec<Preparation>, ApiError> {
        let family_id = Self::require_family(user)?;
        let mut items: Vec<Preparation> = self
            .preparations
            .list_preparations(family_id)
            .await?
            .into_iter()
            .filter(|prep| scope.allows(prep.child_id.as_deref()))
            .filter(|prep| show_completed || !prep.is_completed)
            .collect();
        // Repository order is due date; a stable sort on the completed
        // flag keeps that within each group.
        items.sort_by_key(|prep| prep.is_completed);
        Ok(items)
    }

    pub async fn create_preparation(
        &self,
        user: &User,
        payload: PreparationPayload,
    ) -> Result<Preparation, ApiError> {
        let family_id = Self::require_family(user)?;
        let prep = build_preparation(
            generate_id("prep"),
            family_id.to_string(),
            user.id.clone(),
            false,
            payload,
        )?;
        self.preparations.insert_preparation(&prep).await?;
        info!("Created preparation {} in family {}", prep.id, family_id);
        Ok(prep)
    }

    pub async fn update_preparation(
        &self,
        user: &User,
        prep_id: &str,
        payload: PreparationPayload,
    ) -> Result<Preparation, ApiError> {
        let existing = self.fetch(user, prep_id).await?;
        let prep = build_preparation(
            existing.id,
            existing.family_id,
            existing.created_by,
            existing.is_completed,
            payload,
        )?;
        self.preparations.replace_preparation(&prep).await?;
        Ok(prep)
    }

    /// Flip the completed flag.
    pub async fn toggle_completed(
        &self,
        user: &User,
        prep_id: &str,
    ) -> Result<Preparation, ApiError> {
        let mut prep = self.fetch(user, prep_id).await?;
        prep.is_completed = !prep.is_completed;
        self.preparations
            .set_completed(&prep.id, prep.is_completed)
            .await?;
        info!(
            "Preparation {} marked {}",
            prep.id,
            if prep.is_completed { "done" } else { "not done" }
        );
        Ok(prep)
    }

    pub async fn delete_preparation(&self, user: &User, prep_id: &str) -> Result<(), ApiError> {
        let existing = self.fetch(user, prep_id).await?;
        self.preparations.delete_preparation(&existing.id).await?;
        Ok(())
    }

    async fn fetch(&self, user: &User, prep_id: &str) -> Result<Preparation, ApiError> {
        let family_id = Self::require_family(user)?;
        self.preparations
            .get_preparation(prep_id, family_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Preparation not found"))
    }
}

fn build_preparation(
    id: String,
    family_id: String,
    created_by: String,
    is_completed: bool,
    payload: PreparationPayload,
) -> Result<Preparation, ApiError> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }
    let due_date = NaiveDate::parse_from_str(&payload.due_date, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(format!("Invalid date: {}", payload.due_date)))?;

    Ok(Preparation {
        id,
        family_id,
        child_id: payload.child_id.filter(|id| !id.is_empty()),
        title,
        description: payload.description,
        category: payload
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        due_date,
        is_completed,
        created_by,
    })
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

    fn payload(title: &str, due: &str) -> PreparationPayload {
        PreparationPayload {
            title: title.to_string(),
            description: None,
            category: None,
            child_id: None,
            due_date: due.to_string(),
        }
    }

    async fn setup_test() -> PreparationService {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        PreparationService::new(db)
    }

    #[tokio::test]
    async fn test_listing_hides_completed_by_default() {
        let service = setup_test().await;
        let done = service
            .create_preparation(&parent(), payload("Indoor shoes", "2024-03-12"))
            .await
            .unwrap();
        service.toggle_completed(&parent(), &done.id).await.unwrap();
        service
            .create_preparation(&parent(), payload("Art supplies", "2024-03-15"))
            .await
            .unwrap();

        let visible = service
            .list_preparations(&parent(), &ViewerScope::All, false)
            .await
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Art supplies");

        let all = service
            .list_preparations(&parent(), &ViewerScope::All, true)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        // Incomplete first.
        assert_eq!(all[0].title, "Art supplies");
    }

    #[tokio::test]
    async fn test_listing_sorts_incomplete_by_due_date() {
        let service = setup_test().await;
        service
            .create_preparation(&parent(), payload("Later", "2024-03-20"))
            .await
            .unwrap();
        service
            .create_preparation(&parent(), payload("Sooner", "2024-03-12"))
            .await
            .unwrap();

        let listed = service
            .list_preparations(&parent(), &ViewerScope::All, false)
            .await
            .unwrap();
        assert_eq!(listed[0].title, "Sooner");
        assert_eq!(listed[1].title, "Later");
    }

    #[tokio::test]
    async fn test_scope_filters_child_items() {
        let service = setup_test().await;
        let mut for_child = payload("Gym kit", "2024-03-12");
        for_child.child_id = Some("child_a".to_string());
        service.create_preparation(&parent(), for_child).await.unwrap();
        service
            .create_preparation(&parent(), payload("Family picnic", "2024-03-13"))
            .await
            .unwrap();

        let scope = ViewerScope::OwnerOnly("child_b".to_string());
        let listed = service
            .list_preparations(&parent(), &scope, false)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Family picnic");
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let service = setup_test().await;
        let prep = service
            .create_preparation(&parent(), payload("Indoor shoes", "2024-03-12"))
            .await
            .unwrap();

        let toggled = service.toggle_completed(&parent(), &prep.id).await.unwrap();
        assert!(toggled.is_completed);
        let toggled = service.toggle_completed(&parent(), &prep.id).await.unwrap();
        assert!(!toggled.is_completed);
    }

    #[tokio::test]
    async fn test_update_keeps_completion_and_creator() {
        let service = setup_test().await;
        let prep = service
            .create_preparation(&parent(), payload("Indoor shoes", "2024-03-12"))
            .await
            .unwrap();
        service.toggle_completed(&parent(), &prep.id).await.unwrap();

        let updated = service
            .update_preparation(&parent(), &prep.id, payload("Outdoor shoes", "2024-03-14"))
            .await
            .unwrap();
        assert!(updated.is_completed);
        assert_eq!(updated.created_by, prep.created_by);
        assert_eq!(updated.title, "Outdoor shoes");
    }

    #[tokio::test]
    async fn test_family_ownership_enforced() {
        let service = setup_test().await;
        let prep = service
            .create_preparation(&parent(), payload("Indoor shoes", "2024-03-12"))
            .await
            .unwrap();

        let mut outsider = parent();
        outsider.family_id = Some("family_other".to_string());
        assert!(matches!(
            service.delete_preparation(&outsider, &prep.id).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
