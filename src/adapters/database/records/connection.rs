use crate::domain::connection::Connection;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct ConnectionRecord {
    pub(crate) id: Uuid,
    pub(crate) requester_id: Uuid,
    pub(crate) recipient_id: Uuid,
    pub(crate) status: String,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
}

impl TryFrom<ConnectionRecord> for Connection {
    type Error = String;

    fn try_from(record: ConnectionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            requester_id: record.requester_id,
            recipient_id: record.recipient_id,
            status: record.status.parse()?,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}
