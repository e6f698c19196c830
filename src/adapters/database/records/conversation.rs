use crate::domain::conversation::{Conversation, ConversationOverview, Profile};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct ConversationRecord {
    pub(crate) id: Uuid,
    pub(crate) listing_id: Option<Uuid>,
    pub(crate) participant_a: Uuid,
    pub(crate) participant_b: Uuid,
    pub(crate) item_title: String,
    pub(crate) item_type: String,
    pub(crate) last_message_at: Option<OffsetDateTime>,
    pub(crate) last_message: Option<String>,
    pub(crate) created_at: OffsetDateTime,
}

impl From<ConversationRecord> for Conversation {
    fn from(record: ConversationRecord) -> Self {
        Self {
            id: record.id,
            listing_id: record.listing_id,
            participant_a: record.participant_a,
            participant_b: record.participant_b,
            item_title: record.item_title,
            item_type: record.item_type,
            last_message_at: record.last_message_at,
            last_message: record.last_message,
            created_at: record.created_at,
        }
    }
}

/// A conversation row joined with the counterpart's profile and the viewer's unread count.
#[derive(Debug, FromRow)]
pub struct ConversationOverviewRecord {
    #[sqlx(flatten)]
    pub(crate) conversation: ConversationRecord,
    pub(crate) counterpart_id: Uuid,
    pub(crate) counterpart_name: Option<String>,
    pub(crate) counterpart_avatar: Option<String>,
    pub(crate) unread_count: i64,
}

impl From<ConversationOverviewRecord> for ConversationOverview {
    fn from(record: ConversationOverviewRecord) -> Self {
        Self {
            conversation: record.conversation.into(),
            counterpart: Profile {
                user_id: record.counterpart_id,
                display_name: record.counterpart_name,
                avatar_url: record.counterpart_avatar,
            },
            unread_count: record.unread_count,
        }
    }
}
