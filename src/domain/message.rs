use time::OffsetDateTime;
use uuid::Uuid;

const PREVIEW_CHARS: usize = 120;

#[derive(Debug, Clone)]
pub struct Message {
    pub id: Uuid,
    pub seq: i64,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub read_by: Vec<Uuid>,
    pub created_at: OffsetDateTime,
}

impl Message {
    #[must_use]
    pub fn is_read_by(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.read_by.contains(&user_id)
    }

    /// Shortened content stored on the conversation for list views.
    #[must_use]
    pub fn preview(&self) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
        if chars.next().is_some() { format!("{head}…") } else { head }
    }
}

/// Keyset cursor over a conversation's log.
#[derive(Debug, Clone, Copy, Default)]
pub struct Page {
    pub after_seq: Option<i64>,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            seq: 1,
            conversation_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            content: content.into(),
            read_by: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_preview_short_content_unchanged() {
        assert_eq!(message("hi").preview(), "hi");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(200);
        let preview = message(&long).preview();
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 1);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn test_sender_has_read_own_message() {
        let msg = message("hello");
        assert!(msg.is_read_by(msg.sender_id));
        assert!(!msg.is_read_by(Uuid::new_v4()));
    }
}
