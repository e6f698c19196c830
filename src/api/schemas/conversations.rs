use crate::domain::conversation::{Conversation, ConversationOverview, format_relative_age};
use crate::domain::message::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveConversationRequest {
    pub listing_id: Option<Uuid>,
    pub counterpart_id: Uuid,
    pub item_title: Option<String>,
    pub item_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: Uuid,
    pub listing_id: Option<Uuid>,
    pub participant_ids: [Uuid; 2],
    pub item_title: String,
    pub item_type: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_message_at: Option<OffsetDateTime>,
    pub last_message: Option<String>,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            listing_id: c.listing_id,
            participant_ids: [c.participant_a, c.participant_b],
            item_title: c.item_title,
            item_type: c.item_type,
            last_message_at: c.last_message_at,
            last_message: c.last_message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counterpart {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: ConversationResponse,
    pub counterpart: Counterpart,
    pub unread_count: i64,
    /// Display label such as "3h ago"; absent until the first message.
    pub last_message_age: Option<String>,
}

impl ConversationSummary {
    #[must_use]
    pub fn from_overview(overview: ConversationOverview, now: OffsetDateTime) -> Self {
        let last_message_age = overview.conversation.last_message_at.map(|at| format_relative_age(now, at));
        Self {
            conversation: overview.conversation.into(),
            counterpart: Counterpart {
                id: overview.counterpart.user_id,
                display_name: overview.counterpart.display_name,
                avatar_url: overview.counterpart.avatar_url,
            },
            unread_count: overview.unread_count,
            last_message_age,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagePageQuery {
    pub after: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub seq: i64,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    /// Whether the requesting user has seen the message. Always true for their own messages.
    pub read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl MessageResponse {
    #[must_use]
    pub fn for_viewer(message: Message, viewer: Uuid) -> Self {
        Self {
            read: message.sender_id == viewer || message.is_read_by(viewer),
            id: message.id,
            seq: message.seq,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            content: message.content,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub marked: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalUnreadResponse {
    pub total: i64,
    pub by_conversation: HashMap<Uuid, i64>,
}
