//! REST surface: axum handlers grouped per resource, all nested under
//! `/api`. Responses use the envelope `{ "success": true, "message":
//! ..., ...data }`; errors map through [`ApiError`](crate::error::ApiError).

pub mod auth;
pub mod children;
pub mod events;
pub mod family;
pub mod messages;
pub mod preparations;
pub mod version;

use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::auth::TokenKeys;
use crate::db::DbConnection;
use crate::domain::event_service::EventService;
use crate::domain::family_service::FamilyService;
use crate::domain::message_service::MessageService;
use crate::domain::preparation_service::PreparationService;
use crate::domain::user_service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub token_keys: TokenKeys,
    pub users: UserService,
    pub families: FamilyService,
    pub events: EventService,
    pub preparations: PreparationService,
    pub messages: MessageService,
}

impl AppState {
    pub fn new(db: DbConnection, token_keys: TokenKeys) -> Self {
        Self {
            token_keys,
            users: UserService::new(db.clone()),
            families: FamilyService::new(db.clone()),
            events: EventService::new(db.clone()),
            preparations: PreparationService::new(db.clone()),
            messages: MessageService::new(db),
        }
    }
}

/// Success envelope; `data` fields are flattened beside `success`.
#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        message: None,
        data,
    })
}

pub fn ok_with_message<T: Serialize>(message: impl Into<String>, data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        message: Some(message.into()),
        data,
    })
}

/// Envelope with no payload, for deletes and acknowledgements.
pub fn ok_message(message: impl Into<String>) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": message.into() }))
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/delete", delete(auth::delete_account))
        .route("/family", get(family::get_family).post(family::join_family))
        .route("/children", get(children::list).post(children::create))
        .route(
            "/children/:id",
            get(children::get_one).delete(children::remove),
        )
        .route("/events", get(events::list).post(events::create))
        .route("/events/:id", put(events::update).delete(events::remove))
        .route(
            "/preparations",
            get(preparations::list).post(preparations::create),
        )
        .route(
            "/preparations/:id",
            put(preparations::update)
                .patch(preparations::toggle)
                .delete(preparations::remove),
        )
        .route("/messages", get(messages::list).post(messages::send))
        .route("/messages/read", put(messages::mark_read))
        .route("/messages/:id", delete(messages::remove))
        .route("/version", get(version::get_version))
        .with_state(state)
}
