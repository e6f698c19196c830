use crate::adapters::database::records::{ConversationOverviewRecord, ConversationRecord};
use crate::domain::conversation::{Conversation, ConversationKey, ConversationOverview};
use crate::error::{AppError, Result};
use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct ConversationRepository {}

impl ConversationRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Creates the conversation for `key` unless it already exists, then returns the stored row.
    ///
    /// # Errors
    /// Returns `AppError::Database` if either statement fails.
    #[tracing::instrument(level = "debug", skip(self, conn, item_title, item_type), err)]
    pub(crate) async fn get_or_create(
        &self,
        conn: &mut PgConnection,
        key: &ConversationKey,
        item_title: &str,
        item_type: &str,
    ) -> Result<Conversation> {
        let id = key.conversation_id();

        let inserted = sqlx::query(
            r#"
            INSERT INTO conversations (id, listing_id, participant_a, participant_b, item_title, item_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(key.listing_id)
        .bind(key.participant_a)
        .bind(key.participant_b)
        .bind(item_title)
        .bind(item_type)
        .execute(&mut *conn)
        .await?;

        if inserted.rows_affected() == 1 {
            tracing::debug!(conversation_id = %id, "Conversation materialized");
        }

        // A separate statement so that a row committed by a concurrent resolver is visible.
        self.find_by_id(conn, id).await?.ok_or(AppError::Internal)
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn find_by_id(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<Conversation>> {
        let record = sqlx::query_as::<_, ConversationRecord>("SELECT * FROM conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(record.map(Into::into))
    }

    /// Lists a user's conversations, most recently active first, with the counterpart's profile
    /// and the user's unread count.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn list_for_user(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<Vec<ConversationOverview>> {
        let records = sqlx::query_as::<_, ConversationOverviewRecord>(
            r#"
            SELECT
                c.*,
                cp.counterpart_id,
                p.display_name AS counterpart_name,
                p.avatar_url AS counterpart_avatar,
                (
                    SELECT COUNT(*)
                    FROM messages m
                    WHERE m.conversation_id = c.id
                      AND m.sender_id <> $1
                      AND NOT ($1 = ANY(m.read_by))
                ) AS unread_count
            FROM conversations c
            CROSS JOIN LATERAL (
                SELECT CASE WHEN c.participant_a = $1 THEN c.participant_b ELSE c.participant_a END AS counterpart_id
            ) cp
            LEFT JOIN profiles p ON p.user_id = cp.counterpart_id
            WHERE c.participant_a = $1 OR c.participant_b = $1
            ORDER BY c.last_message_at DESC NULLS LAST, c.created_at DESC, c.id
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Records the latest message on the conversation, but only if it is newer than what is
    /// already stored. Returns whether the summary moved forward.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn, preview), err)]
    pub(crate) async fn advance_last_message(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        at: OffsetDateTime,
        preview: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_at = $2, last_message = $3
            WHERE id = $1 AND (last_message_at IS NULL OR last_message_at < $2)
            "#,
        )
        .bind(id)
        .bind(at)
        .bind(preview)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
