use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::applications::{AcceptanceResponse, ApplicationResponse, SubmitApplicationRequest};
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Applies to an open listing.
///
/// # Errors
/// Returns `AppError::Conflict` if the listing is not open or the caller already has a pending application.
/// Returns `AppError::Validation` if the caller owns the listing.
pub async fn submit_application(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
    Json(payload): Json<SubmitApplicationRequest>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.submit(listing_id, auth_user.user_id, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(ApplicationResponse::from(application))))
}

/// # Errors
/// Returns `AppError::Forbidden` if the caller does not own the listing.
pub async fn list_listing_applications(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationResponse>>> {
    let applications = state.application_service.list_for_listing(listing_id, auth_user.user_id).await?;
    Ok(Json(applications.into_iter().map(Into::into).collect()))
}

/// # Errors
/// Returns `AppError::Database` if the query fails.
pub async fn list_my_applications(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ApplicationResponse>>> {
    let applications = state.application_service.list_by_applicant(auth_user.user_id).await?;
    Ok(Json(applications.into_iter().map(Into::into).collect()))
}

/// Accepts an application and starts work on its listing.
///
/// # Errors
/// Returns `AppError::Conflict` if the application or listing has already been resolved.
pub async fn accept_application(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AcceptanceResponse>> {
    let acceptance = state.application_service.accept(id, auth_user.user_id).await?;
    Ok(Json(acceptance.into()))
}

/// # Errors
/// Returns `AppError::Conflict` if the application is no longer pending.
pub async fn reject_application(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationResponse>> {
    let application = state.application_service.reject(id, auth_user.user_id).await?;
    Ok(Json(application.into()))
}
