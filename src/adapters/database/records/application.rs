use crate::domain::application::Application;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct ApplicationRecord {
    pub(crate) id: Uuid,
    pub(crate) listing_id: Uuid,
    pub(crate) applicant_id: Uuid,
    pub(crate) message: String,
    pub(crate) availability: String,
    pub(crate) contact_info: String,
    pub(crate) status: String,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
}

impl TryFrom<ApplicationRecord> for Application {
    type Error = String;

    fn try_from(record: ApplicationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            listing_id: record.listing_id,
            applicant_id: record.applicant_id,
            message: record.message,
            availability: record.availability,
            contact_info: record.contact_info,
            status: record.status.parse()?,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct ResponseCountRecord {
    pub(crate) listing_id: Uuid,
    pub(crate) count: i64,
}
