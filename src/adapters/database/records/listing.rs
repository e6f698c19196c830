use crate::domain::listing::Listing;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct ListingRecord {
    pub(crate) id: Uuid,
    pub(crate) owner_id: Uuid,
    pub(crate) kind: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) category: String,
    pub(crate) availability: String,
    pub(crate) location: String,
    pub(crate) is_paid: bool,
    pub(crate) price: Option<i64>,
    pub(crate) status: String,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
}

impl TryFrom<ListingRecord> for Listing {
    type Error = String;

    fn try_from(record: ListingRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            owner_id: record.owner_id,
            kind: record.kind.parse()?,
            title: record.title,
            description: record.description,
            category: record.category,
            availability: record.availability,
            location: record.location,
            is_paid: record.is_paid,
            price: record.price,
            status: record.status.parse()?,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}
