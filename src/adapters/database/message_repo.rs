use crate::adapters::database::records::MessageRecord;
use crate::domain::message::{Message, Page};
use crate::error::Result;
use sqlx::PgConnection;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct MessageRepository {}

impl MessageRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Appends a message to a conversation's log.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, content), err)]
    pub(crate) async fn create(
        &self,
        conn: &mut PgConnection,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, seq, conversation_id, sender_id, content, read_by, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(conn)
        .await?;

        Ok(record.into())
    }

    /// Fetches a page of messages in log order.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn fetch_page(&self, conn: &mut PgConnection, conversation_id: Uuid, page: Page) -> Result<Vec<Message>> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, seq, conversation_id, sender_id, content, read_by, created_at
            FROM messages
            WHERE conversation_id = $1
              AND ($2::BIGINT IS NULL OR seq > $2)
            ORDER BY seq ASC
            LIMIT $3
            "#,
        )
        .bind(conversation_id)
        .bind(page.after_seq)
        .bind(page.limit)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn count_unread(&self, conn: &mut PgConnection, conversation_id: Uuid, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE conversation_id = $1 AND sender_id <> $2 AND NOT ($2 = ANY(read_by))
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(conn)
        .await?;

        Ok(count)
    }

    /// Unread counts for every conversation the user takes part in that has any unread message.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn count_unread_by_conversation(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<HashMap<Uuid, i64>> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT m.conversation_id, COUNT(*)
            FROM messages m
            JOIN conversations c ON c.id = m.conversation_id
            WHERE (c.participant_a = $1 OR c.participant_b = $1)
              AND m.sender_id <> $1
              AND NOT ($1 = ANY(m.read_by))
            GROUP BY m.conversation_id
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Adds the user to `read_by` on every message they have not read yet. Returns how many changed.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn mark_read(&self, conn: &mut PgConnection, conversation_id: Uuid, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_by = array_append(read_by, $2)
            WHERE conversation_id = $1 AND sender_id <> $2 AND NOT ($2 = ANY(read_by))
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}
