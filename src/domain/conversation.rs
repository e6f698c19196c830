use time::macros::format_description;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Namespace for deriving conversation ids from their canonical key.
const CONVERSATION_NAMESPACE: Uuid = Uuid::from_u128(0x5c1e_a7d2_83b4_4f6e_9a10_2d7c_e4b1_f093);

pub const DIRECT_ITEM_TITLE: &str = "Direct message";
pub const DIRECT_ITEM_TYPE: &str = "direct";

/// Identifies a conversation independently of which participant asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub listing_id: Option<Uuid>,
    pub participant_a: Uuid,
    pub participant_b: Uuid,
}

impl ConversationKey {
    /// Orders the pair so that `participant_a < participant_b`.
    ///
    /// # Errors
    /// Returns an error if both participants are the same user.
    pub fn new(listing_id: Option<Uuid>, first: Uuid, second: Uuid) -> Result<Self, String> {
        if first == second {
            return Err("A conversation needs two different participants".into());
        }
        let (participant_a, participant_b) = if first < second { (first, second) } else { (second, first) };
        Ok(Self { listing_id, participant_a, participant_b })
    }

    #[must_use]
    pub fn canonical(&self) -> String {
        match self.listing_id {
            Some(listing_id) => format!("listing:{listing_id}:{}:{}", self.participant_a, self.participant_b),
            None => format!("direct:{}:{}", self.participant_a, self.participant_b),
        }
    }

    #[must_use]
    pub fn conversation_id(&self) -> Uuid {
        Uuid::new_v5(&CONVERSATION_NAMESPACE, self.canonical().as_bytes())
    }
}

#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: Uuid,
    pub listing_id: Option<Uuid>,
    pub participant_a: Uuid,
    pub participant_b: Uuid,
    pub item_title: String,
    pub item_type: String,
    pub last_message_at: Option<OffsetDateTime>,
    pub last_message: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Conversation {
    #[must_use]
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.participant_a == user_id || self.participant_b == user_id
    }
}

/// Public profile fields supplied by the profile store.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A conversation as seen by one of its participants.
#[derive(Debug, Clone)]
pub struct ConversationOverview {
    pub conversation: Conversation,
    pub counterpart: Profile,
    pub unread_count: i64,
}

/// Formats how long ago `then` was, relative to `now`.
#[must_use]
pub fn format_relative_age(now: OffsetDateTime, then: OffsetDateTime) -> String {
    let age = now - then;
    if age < Duration::HOUR {
        "Just now".to_string()
    } else if age < Duration::DAY {
        format!("{}h ago", age.whole_hours())
    } else if age < Duration::WEEK {
        format!("{}d ago", age.whole_days())
    } else {
        then.format(format_description!("[month repr:short] [day padding:none]"))
            .unwrap_or_else(|_| then.date().to_string())
    }
}
