use axum::extract::State;
use axum::Json;
use shared::{AuthResponse, LoginRequest, MeResponse, SignupRequest};

use crate::auth::{issue_token, AuthUser};
use crate::error::ApiError;
use crate::rest::{ok, ok_message, ok_with_message, AppState, Envelope};

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<Envelope<AuthResponse>>, ApiError> {
    let user = state.users.signup(request).await?;
    let token = issue_token(&state.token_keys, &user.id, &user.email, user.role)?;
    Ok(ok_with_message(
        "Account created",
        AuthResponse {
            user: user.to_dto(),
            token,
        },
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Envelope<AuthResponse>>, ApiError> {
    let user = state.users.login(&request.email, &request.password).await?;
    let token = issue_token(&state.token_keys, &user.id, &user.email, user.role)?;
    Ok(ok(AuthResponse {
        user: user.to_dto(),
        token,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Envelope<MeResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    Ok(ok(MeResponse {
        user: user.to_dto(),
    }))
}

pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.users.delete_account(&auth.user_id).await?;
    Ok(ok_message("Account deleted"))
}
