use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{EventDto, EventListResponse, EventPayload};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::rest::{ok, ok_message, ok_with_message, AppState, Envelope};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    /// Single-date occurrence filter, YYYY-MM-DD.
    pub date: Option<String>,
    /// Parent-selected child-profile filter.
    pub child_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub event: EventDto,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Envelope<EventListResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let viewer = state.families.resolve_viewer(&user, query.child_id).await?;
    let date = query
        .date
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| ApiError::bad_request(format!("Invalid date: {}", raw)))
        })
        .transpose()?;

    let events = state.events.list_events(&user, &viewer.scope(), date).await?;
    Ok(ok(EventListResponse {
        events: events.iter().map(|e| e.to_dto()).collect(),
    }))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<EventPayload>,
) -> Result<Json<Envelope<EventResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let event = state.events.create_event(&user, payload).await?;
    Ok(ok_with_message(
        "Event created",
        EventResponse {
            event: event.to_dto(),
        },
    ))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<EventPayload>,
) -> Result<Json<Envelope<EventResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let event = state.events.update_event(&user, &event_id, payload).await?;
    Ok(ok_with_message(
        "Event updated",
        EventResponse {
            event: event.to_dto(),
        },
    ))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    state.events.delete_event(&user, &event_id).await?;
    Ok(ok_message("Event deleted"))
}
