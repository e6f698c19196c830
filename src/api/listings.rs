use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::listings::{
    CreateListingRequest, ListingResponse, ResponseCountsQuery, ResponseCountsResponse, TransitionRequest,
};
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Posts a new listing owned by the caller.
///
/// # Errors
/// Returns `AppError::Validation` if a field is malformed.
pub async fn create_listing(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateListingRequest>,
) -> Result<impl IntoResponse> {
    let listing = state.listing_service.create(auth_user.user_id, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(ListingResponse::from(listing))))
}

/// # Errors
/// Returns `AppError::NotFound` if the listing does not exist.
pub async fn get_listing(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingResponse>> {
    let listing = state.listing_service.get(id).await?;
    Ok(Json(listing.into()))
}

/// # Errors
/// Returns `AppError::Database` if the query fails.
pub async fn list_user_listings(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ListingResponse>>> {
    let listings = state.listing_service.list_by_user(user_id).await?;
    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

/// Moves a listing along its lifecycle.
///
/// # Errors
/// Returns `AppError::InvalidTransition` if the move is not allowed from the current status.
/// Returns `AppError::Forbidden` if the caller does not own the listing.
pub async fn transition_listing(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> Result<Json<ListingResponse>> {
    let listing = state.listing_service.transition(id, auth_user.user_id, payload.status.into()).await?;
    Ok(Json(listing.into()))
}

/// Returns how many live applications each listing has. Unknown ids report zero.
///
/// # Errors
/// Returns `AppError::StoreUnavailable` if the store cannot be reached.
pub async fn response_counts(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ResponseCountsQuery>,
) -> Result<Json<ResponseCountsResponse>> {
    let counts = state.aggregate_service.response_counts(&query.listing_ids()).await?;
    Ok(Json(ResponseCountsResponse { counts }))
}
