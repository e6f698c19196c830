use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::conversations::{
    MarkReadResponse, MessagePageQuery, MessageResponse, SendMessageRequest, TotalUnreadResponse,
    UnreadCountResponse,
};
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Appends a message to a conversation the caller participates in.
///
/// # Errors
/// Returns `AppError::Validation` if the content is empty or too long.
/// Returns `AppError::Forbidden` if the caller is not a participant.
pub async fn send_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    let message = state.message_service.append(conversation_id, auth_user.user_id, &payload.content).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::for_viewer(message, auth_user.user_id))))
}

/// # Errors
/// Returns `AppError::Forbidden` if the caller is not a participant.
pub async fn list_messages(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
    Query(query): Query<MessagePageQuery>,
) -> Result<Json<Vec<MessageResponse>>> {
    let messages =
        state.message_service.list_messages(conversation_id, auth_user.user_id, query.after, query.limit).await?;
    Ok(Json(messages.into_iter().map(|m| MessageResponse::for_viewer(m, auth_user.user_id)).collect()))
}

/// # Errors
/// Returns `AppError::Forbidden` if the caller is not a participant.
pub async fn mark_read(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<MarkReadResponse>> {
    let marked = state.message_service.mark_read(conversation_id, auth_user.user_id).await?;
    Ok(Json(MarkReadResponse { marked }))
}

/// # Errors
/// Returns `AppError::Forbidden` if the caller is not a participant.
pub async fn unread_count(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<UnreadCountResponse>> {
    state.message_service.authorize_reader(conversation_id, auth_user.user_id).await?;
    let unread_count = state.aggregate_service.unread_count(conversation_id, auth_user.user_id).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

/// Badge count across every conversation the caller is in.
///
/// # Errors
/// Returns `AppError::StoreUnavailable` if the store cannot be reached.
pub async fn total_unread(auth_user: AuthUser, State(state): State<AppState>) -> Result<Json<TotalUnreadResponse>> {
    let (total, by_conversation) = state.aggregate_service.total_unread(auth_user.user_id).await?;
    Ok(Json(TotalUnreadResponse { total, by_conversation }))
}
