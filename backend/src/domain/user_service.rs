//! Account lifecycle: signup, login, lookup and account deletion.

use shared::{Role, SignupRequest};
use tracing::info;

use crate::auth;
use crate::db::DbConnection;
use crate::domain::ids::{generate_id, generate_invite_code, PARENT_CODE_PREFIX};
use crate::domain::models::family::Family;
use crate::domain::models::user::User;
use crate::error::ApiError;
use crate::store::{
    EventRepository, FamilyRepository, MessageRepository, PreparationRepository, UserRepository,
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    families: FamilyRepository,
    events: EventRepository,
    preparations: PreparationRepository,
    messages: MessageRepository,
}

impl UserService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            families: FamilyRepository::new(db.clone()),
            events: EventRepository::new(db.clone()),
            preparations: PreparationRepository::new(db.clone()),
            messages: MessageRepository::new(db),
        }
    }

    /// Create an account. A parent signup also creates a family with a
    /// fresh parent invite code; child accounts start familyless and
    /// join later via an invite code.
    pub async fn signup(&self, request: SignupRequest) -> Result<User, ApiError> {
        let email = request.email.trim().to_lowercase();
        let name = request.name.trim().to_string();

        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::bad_request("A valid email is required"));
        }
        if name.is_empty() {
            return Err(ApiError::bad_request("Name is required"));
        }
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::bad_request(
                "Password must be at least 6 characters",
            ));
        }
        if self.users.get_user_by_email(&email).await?.is_some() {
            return Err(ApiError::bad_request("Email is already registered"));
        }

        let mut user = User {
            id: generate_id("user"),
            email,
            password_hash: auth::hash_password(&request.password),
            name,
            role: request.role,
            family_id: None,
            color: None,
        };

        if request.role == Role::Parent {
            let family = Family {
                id: generate_id("family"),
                name: format!("{}'s family", user.name),
                invite_code: generate_invite_code(PARENT_CODE_PREFIX),
                created_by: user.id.clone(),
            };
            self.families.insert_family(&family).await?;
            user.family_id = Some(family.id);
        }

        self.users.insert_user(&user).await?;
        info!("Created {} account {}", user.role, user.id);
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .get_user_by_email(&email)
            .await?
            .filter(|user| auth::verify_password(password, &user.password_hash))
            .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

        info!("User {} logged in", user.id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, ApiError> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    /// Delete an account and everything it authored. Sequential
    /// deletes, not a transaction; a crash mid-way leaves orphans
    /// rather than a broken account.
    pub async fn delete_account(&self, user_id: &str) -> Result<(), ApiError> {
        let user = self.get_user(user_id).await?;

        self.messages.delete_messages_from(user_id).await?;
        self.messages.delete_reads_for_user(user_id).await?;
        self.preparations.delete_preparations_created_by(user_id).await?;
        self.events.delete_events_created_by(user_id).await?;
        self.families.unlink_child_profiles_for_user(user_id).await?;
        self.users.delete_user(user_id).await?;

        info!("Deleted account {} ({})", user.id, user.email);
        Ok(())
    }
}
