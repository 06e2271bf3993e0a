use axum::extract::State;
use axum::Json;
use shared::{FamilyResponse, JoinFamilyRequest};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::rest::{ok, ok_with_message, AppState, Envelope};

pub async fn get_family(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Envelope<FamilyResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let (family, members, children) = state.families.family_overview(&user).await?;
    Ok(ok(FamilyResponse {
        family: family.to_dto(),
        members: members.iter().map(|m| m.to_dto()).collect(),
        children: children.iter().map(|c| c.to_dto()).collect(),
    }))
}

pub async fn join_family(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<JoinFamilyRequest>,
) -> Result<Json<Envelope<FamilyResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    state.families.join_family(&user, &request.invite_code).await?;

    // Re-read so the response reflects the new membership.
    let user = state.users.get_user(&auth.user_id).await?;
    let (family, members, children) = state.families.family_overview(&user).await?;
    Ok(ok_with_message(
        "Joined the family",
        FamilyResponse {
            family: family.to_dto(),
            members: members.iter().map(|m| m.to_dto()).collect(),
            children: children.iter().map(|c| c.to_dto()).collect(),
        },
    ))
}
