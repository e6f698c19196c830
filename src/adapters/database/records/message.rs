use crate::domain::message::Message;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct MessageRecord {
    pub(crate) id: Uuid,
    pub(crate) seq: i64,
    pub(crate) conversation_id: Uuid,
    pub(crate) sender_id: Uuid,
    pub(crate) content: String,
    pub(crate) read_by: Vec<Uuid>,
    pub(crate) created_at: OffsetDateTime,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            seq: record.seq,
            conversation_id: record.conversation_id,
            sender_id: record.sender_id,
            content: record.content,
            read_by: record.read_by,
            created_at: record.created_at,
        }
    }
}
