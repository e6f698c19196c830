use crate::api::schemas::listings::ListingResponse;
use crate::domain::application::{Application, ApplicationPayload, ApplicationStatus};
use crate::services::application_service::Acceptance;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub message: String,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub contact_info: String,
}

impl From<SubmitApplicationRequest> for ApplicationPayload {
    fn from(req: SubmitApplicationRequest) -> Self {
        Self { message: req.message, availability: req.availability, contact_info: req.contact_info }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Accepted,
    Rejected,
}

impl From<ApplicationStatus> for Status {
    fn from(status: ApplicationStatus) -> Self {
        match status {
            ApplicationStatus::Pending => Self::Pending,
            ApplicationStatus::Accepted => Self::Accepted,
            ApplicationStatus::Rejected => Self::Rejected,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub applicant_id: Uuid,
    pub message: String,
    pub availability: String,
    pub contact_info: String,
    pub status: Status,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Application> for ApplicationResponse {
    fn from(app: Application) -> Self {
        Self {
            id: app.id,
            listing_id: app.listing_id,
            applicant_id: app.applicant_id,
            message: app.message,
            availability: app.availability,
            contact_info: app.contact_info,
            status: app.status.into(),
            created_at: app.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptanceResponse {
    pub application: ApplicationResponse,
    pub listing: ListingResponse,
    pub rejected_competitors: u64,
}

impl From<Acceptance> for AcceptanceResponse {
    fn from(acceptance: Acceptance) -> Self {
        Self {
            application: acceptance.application.into(),
            listing: acceptance.listing.into(),
            rejected_competitors: acceptance.rejected_competitors,
        }
    }
}
