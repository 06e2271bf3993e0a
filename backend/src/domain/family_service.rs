//! Family membership and child profiles: invite-code joins, profile
//! CRUD and viewer-scope resolution.

use shared::{CreateChildProfileRequest, Role};
use tracing::info;

use crate::db::DbConnection;
use crate::domain::ids::{
    generate_id, generate_invite_code, CHILD_CODE_PREFIX, LEGACY_PARENT_CODE_PREFIX,
    PARENT_CODE_PREFIX,
};
use crate::domain::models::family::{ChildProfile, Family};
use crate::domain::models::user::User;
use crate::domain::visibility::Viewer;
use crate::error::ApiError;
use crate::store::{FamilyRepository, UserRepository};

/// Child colors, assigned round-robin by profile count.
const COLOR_PALETTE: [&str; 5] = ["#4ECDC4", "#A18CD1", "#FFB347", "#87CEEB", "#FF6B6B"];

const INVITE_CODE_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct FamilyService {
    families: FamilyRepository,
    users: UserRepository,
}

impl FamilyService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            families: FamilyRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    fn require_family(user: &User) -> Result<&str, ApiError> {
        user.family_id
            .as_deref()
            .ok_or_else(|| ApiError::not_found("You are not in a family yet"))
    }

    fn require_parent(user: &User) -> Result<(), ApiError> {
        if user.role != Role::Parent {
            return Err(ApiError::forbidden("Only parents can do that"));
        }
        Ok(())
    }

    /// Family record plus members and child profiles.
    pub async fn family_overview(
        &self,
        user: &User,
    ) -> Result<(Family, Vec<User>, Vec<ChildProfile>), ApiError> {
        let family_id = Self::require_family(user)?;
        let family = self
            .families
            .get_family(family_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Family not found"))?;
        let members = self.users.list_by_family(family_id).await?;
        let children = self.families.list_child_profiles(family_id).await?;
        Ok((family, members, children))
    }

    /// Join via invite code. Parent codes (`HARU`/`PRNT` prefix) add
    /// the caller as a family member; child codes (`CHLD`) are for
    /// child accounts and additionally link the matching profile,
    /// adopting its color.
    pub async fn join_family(&self, user: &User, invite_code: &str) -> Result<Family, ApiError> {
        let code = invite_code.trim().to_uppercase();

        if code.starts_with(PARENT_CODE_PREFIX) || code.starts_with(LEGACY_PARENT_CODE_PREFIX) {
            let family = self
                .families
                .get_family_by_invite_code(&code)
                .await?
                .ok_or_else(|| ApiError::bad_request("Invalid invite code"))?;
            self.users.set_family(&user.id, &family.id).await?;
            info!("User {} joined family {}", user.id, family.id);
            return Ok(family);
        }

        if code.starts_with(CHILD_CODE_PREFIX) {
            if user.role != Role::Child {
                return Err(ApiError::forbidden(
                    "Child invite codes are for child accounts",
                ));
            }
            let profile = self
                .families
                .get_child_profile_by_invite_code(&code)
                .await?
                .ok_or_else(|| ApiError::bad_request("Invalid invite code"))?;
            if profile.linked_user_id.is_some() {
                return Err(ApiError::bad_request("This invite code is already in use"));
            }
            let family = self
                .families
                .get_family(&profile.family_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Family not found"))?;

            self.families.link_child_profile(&profile.id, &user.id).await?;
            self.users.set_family(&user.id, &family.id).await?;
            self.users.set_color(&user.id, &profile.color).await?;
            info!(
                "Child {} linked to profile {} in family {}",
                user.id, profile.id, family.id
            );
            return Ok(family);
        }

        Err(ApiError::bad_request("Invalid invite code"))
    }

    pub async fn list_children(&self, user: &User) -> Result<Vec<ChildProfile>, ApiError> {
        let family_id = Self::require_family(user)?;
        Ok(self.families.list_child_profiles(family_id).await?)
    }

    pub async fn create_child(
        &self,
        user: &User,
        request: CreateChildProfileRequest,
    ) -> Result<ChildProfile, ApiError> {
        Self::require_parent(user)?;
        let family_id = Self::require_family(user)?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::bad_request("Child name is required"));
        }

        let existing = self.families.list_child_profiles(family_id).await?;
        let color = request
            .color
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| COLOR_PALETTE[existing.len() % COLOR_PALETTE.len()].to_string());

        let profile = ChildProfile {
            id: generate_id("child"),
            family_id: family_id.to_string(),
            name,
            color,
            invite_code: self.fresh_child_code().await?,
            linked_user_id: None,
            created_by: user.id.clone(),
        };
        self.families.insert_child_profile(&profile).await?;
        info!("Created child profile {} in family {}", profile.id, family_id);
        Ok(profile)
    }

    pub async fn get_child(&self, user: &User, child_id: &str) -> Result<ChildProfile, ApiError> {
        let family_id = Self::require_family(user)?;
        self.families
            .get_child_profile(child_id, family_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Child profile not found"))
    }

    pub async fn delete_child(&self, user: &User, child_id: &str) -> Result<(), ApiError> {
        Self::require_parent(user)?;
        let profile = self.get_child(user, child_id).await?;
        self.families.delete_child_profile(&profile.id).await?;
        info!("Deleted child profile {}", profile.id);
        Ok(())
    }

    /// Resolve the caller into a [`Viewer`]. Child accounts are pinned
    /// to their linked profile here so the core never sees a user id
    /// where a profile id belongs.
    pub async fn resolve_viewer(
        &self,
        user: &User,
        child_filter: Option<String>,
    ) -> Result<Viewer, ApiError> {
        let linked_profile_id = match user.role {
            Role::Child => self
                .families
                .get_child_profile_for_user(&user.id)
                .await?
                .map(|profile| profile.id),
            Role::Parent => None,
        };
        Ok(Viewer {
            user_id: user.id.clone(),
            role: user.role,
            child_filter,
            linked_profile_id,
        })
    }

    async fn fresh_child_code(&self) -> Result<String, ApiError> {
        for _ in 0..INVITE_CODE_ATTEMPTS {
            let code = generate_invite_code(CHILD_CODE_PREFIX);
            if self
                .families
                .get_child_profile_by_invite_code(&code)
                .await?
                .is_none()
            {
                return Ok(code);
            }
        }
        Err(ApiError::Internal(anyhow::anyhow!(
            "Could not generate a unique invite code"
        )))
    }
}
