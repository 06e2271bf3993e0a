use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use shared::{MessageDto, MessageListResponse, SendMessageRequest};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::rest::{ok, ok_message, ok_with_message, AppState, Envelope};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message_sent: MessageDto,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Envelope<MessageListResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let viewer = state.families.resolve_viewer(&user, None).await?;
    let (messages, unread_count) = state
        .messages
        .list_messages(&user, &viewer, query.limit)
        .await?;

    Ok(ok(MessageListResponse {
        messages: messages.iter().map(|m| m.to_dto()).collect(),
        unread_count,
    }))
}

pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<Envelope<MessageResponse>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let message = state
        .messages
        .send_message(&user, &request.content, request.to_user_id)
        .await?;
    Ok(ok_with_message(
        "Message sent",
        MessageResponse {
            message_sent: message.to_dto(),
        },
    ))
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    state.messages.mark_read(&user).await?;
    Ok(ok_message("Messages marked as read"))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    state.messages.delete_message(&user, &message_id).await?;
    Ok(ok_message("Message deleted"))
}
