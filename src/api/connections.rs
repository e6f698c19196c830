use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::connections::{ConnectionRequest, ConnectionResponse, ListConnectionsQuery, RespondRequest};
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// # Errors
/// Returns `AppError::Conflict` if the users are already connected or a request is pending.
pub async fn request_connection(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ConnectionRequest>,
) -> Result<impl IntoResponse> {
    let connection = state.connection_service.request(auth_user.user_id, payload.recipient_id).await?;
    Ok((StatusCode::CREATED, Json(ConnectionResponse::from(connection))))
}

/// # Errors
/// Returns `AppError::Forbidden` if the caller is not the recipient.
pub async fn respond_to_connection(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RespondRequest>,
) -> Result<Json<ConnectionResponse>> {
    let connection = state.connection_service.respond(id, auth_user.user_id, payload.decision.into()).await?;
    Ok(Json(connection.into()))
}

/// # Errors
/// Returns `AppError::Database` if the query fails.
pub async fn list_connections(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListConnectionsQuery>,
) -> Result<Json<Vec<ConnectionResponse>>> {
    let connections =
        state.connection_service.list_for_user(auth_user.user_id, query.status.map(Into::into)).await?;
    Ok(Json(connections.into_iter().map(Into::into).collect()))
}
