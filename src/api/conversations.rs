use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::conversations::{ConversationResponse, ConversationSummary, ResolveConversationRequest};
use crate::error::Result;
use crate::services::conversation_service::ResolveRequest;
use axum::{Json, extract::State};
use time::OffsetDateTime;

/// Returns the conversation between the caller and a counterpart, creating it on first use.
///
/// # Errors
/// Returns `AppError::Validation` if the counterpart is the caller.
/// Returns `AppError::NotFound` if the referenced listing does not exist.
pub async fn resolve_conversation(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ResolveConversationRequest>,
) -> Result<Json<ConversationResponse>> {
    let conversation = state
        .conversation_service
        .resolve(ResolveRequest {
            listing_id: payload.listing_id,
            participant: auth_user.user_id,
            counterpart: payload.counterpart_id,
            item_title: payload.item_title,
            item_type: payload.item_type,
        })
        .await?;
    Ok(Json(conversation.into()))
}

/// # Errors
/// Returns `AppError::Database` if the query fails.
pub async fn list_conversations(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ConversationSummary>>> {
    let overviews = state.conversation_service.list_for_user(auth_user.user_id).await?;
    let now = OffsetDateTime::now_utc();
    Ok(Json(overviews.into_iter().map(|overview| ConversationSummary::from_overview(overview, now)).collect()))
}
