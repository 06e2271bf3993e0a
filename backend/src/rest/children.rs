use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use shared::{ChildProfileDto, ChildProfileListResponse, CreateChildProfileRequest};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::rest::{ok, ok_message, ok_with_message, AppState, Envelope};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildProfileResponse {
    pub child: ChildProfileDto,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Envelope<ChildProfileListResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let children = state.families.list_children(&user).await?;
    Ok(ok(ChildProfileListResponse {
        children: children.iter().map(|c| c.to_dto()).collect(),
    }))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateChildProfileRequest>,
) -> Result<Json<Envelope<ChildProfileResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let profile = state.families.create_child(&user, request).await?;
    Ok(ok_with_message(
        "Child profile created",
        ChildProfileResponse {
            child: profile.to_dto(),
        },
    ))
}

pub async fn get_one(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(child_id): Path<String>,
) -> Result<Json<Envelope<ChildProfileResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let profile = state.families.get_child(&user, &child_id).await?;
    Ok(ok(ChildProfileResponse {
        child: profile.to_dto(),
    }))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(child_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    state.families.delete_child(&user, &child_id).await?;
    Ok(ok_message("Child profile deleted"))
}
