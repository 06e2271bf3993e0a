use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{PreparationDto, PreparationListResponse, PreparationPayload};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::rest::{ok, ok_message, ok_with_message, AppState, Envelope};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPreparationsQuery {
    pub child_id: Option<String>,
    #[serde(default)]
    pub show_completed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparationResponse {
    pub preparation: PreparationDto,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListPreparationsQuery>,
) -> Result<Json<Envelope<PreparationListResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let viewer = state.families.resolve_viewer(&user, query.child_id).await?;
    let items = state
        .preparations
        .list_preparations(&user, &viewer.scope(), query.show_completed)
        .await?;

    let today = Utc::now().date_naive();
    Ok(ok(PreparationListResponse {
        preparations: items.iter().map(|p| p.to_dto(today)).collect(),
    }))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PreparationPayload>,
) -> Result<Json<Envelope<PreparationResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let prep = state.preparations.create_preparation(&user, payload).await?;
    Ok(ok_with_message(
        "Preparation created",
        PreparationResponse {
            preparation: prep.to_dto(Utc::now().date_naive()),
        },
    ))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(prep_id): Path<String>,
    Json(payload): Json<PreparationPayload>,
) -> Result<Json<Envelope<PreparationResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let prep = state
        .preparations
        .update_preparation(&user, &prep_id, payload)
        .await?;
    Ok(ok_with_message(
        "Preparation updated",
        PreparationResponse {
            preparation: prep.to_dto(Utc::now().date_naive()),
        },
    ))
}

pub async fn toggle(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(prep_id): Path<String>,
) -> Result<Json<Envelope<PreparationResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let prep = state.preparations.toggle_completed(&user, &prep_id).await?;
    Ok(ok(PreparationResponse {
        preparation: prep.to_dto(Utc::now().date_naive()),
    }))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(prep_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    state.preparations.delete_preparation(&user, &prep_id).await?;
    Ok(ok_message("Preparation deleted"))
}
