use crate::adapters::database::records::{ConnectionRecord, decode, decode_all};
use crate::domain::connection::{Connection, ConnectionStatus};
use crate::error::Result;
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct ConnectionRepository {}

impl ConnectionRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Finds the connection between two users, whichever of them sent the request.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn find_between(&self, conn: &mut PgConnection, a: Uuid, b: Uuid) -> Result<Option<Connection>> {
        let record = sqlx::query_as::<_, ConnectionRecord>(
            r#"
            SELECT * FROM connections
            WHERE (requester_id = $1 AND recipient_id = $2)
               OR (requester_id = $2 AND recipient_id = $1)
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(conn)
        .await?;

        record.map(decode).transpose()
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn find_by_id(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<Connection>> {
        let record = sqlx::query_as::<_, ConnectionRecord>("SELECT * FROM connections WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        record.map(decode).transpose()
    }

    /// Inserts a pending connection.
    ///
    /// # Errors
    /// Returns `AppError::Conflict` if a row for the same unordered pair already exists.
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn create(&self, conn: &mut PgConnection, requester_id: Uuid, recipient_id: Uuid) -> Result<Connection> {
        let record = sqlx::query_as::<_, ConnectionRecord>(
            r#"
            INSERT INTO connections (id, requester_id, recipient_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(requester_id)
        .bind(recipient_id)
        .fetch_one(conn)
        .await?;

        decode(record)
    }

    /// Turns a rejected connection back into a pending request in the new direction.
    /// Returns `None` if the row is no longer rejected.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn reopen_rejected(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        requester_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<Option<Connection>> {
        let record = sqlx::query_as::<_, ConnectionRecord>(
            r#"
            UPDATE connections
            SET requester_id = $2, recipient_id = $3, status = 'pending', updated_at = NOW()
            WHERE id = $1 AND status = 'rejected'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(requester_id)
        .bind(recipient_id)
        .fetch_optional(conn)
        .await?;

        record.map(decode).transpose()
    }

    /// Resolves a pending connection. Returns `None` if it was already resolved.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn resolve_pending(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        to: ConnectionStatus,
    ) -> Result<Option<Connection>> {
        let record = sqlx::query_as::<_, ConnectionRecord>(
            r#"
            UPDATE connections
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(to.as_str())
        .fetch_optional(conn)
        .await?;

        record.map(decode).transpose()
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn list_for_user(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        status: Option<ConnectionStatus>,
    ) -> Result<Vec<Connection>> {
        let records = sqlx::query_as::<_, ConnectionRecord>(
            r#"
            SELECT * FROM connections
            WHERE (requester_id = $1 OR recipient_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY updated_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(status.map(ConnectionStatus::as_str))
        .fetch_all(conn)
        .await?;

        decode_all(records)
    }
}
