use crate::adapters::database::records::{ApplicationRecord, ResponseCountRecord, decode, decode_all};
use crate::domain::application::{Application, ApplicationPayload, ApplicationStatus};
use crate::error::Result;
use sqlx::PgConnection;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct ApplicationRepository {}

impl ApplicationRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Inserts a pending application.
    ///
    /// # Errors
    /// Returns `AppError::Conflict` if the applicant already has a pending application on the listing.
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, payload), err)]
    pub(crate) async fn create(
        &self,
        conn: &mut PgConnection,
        listing_id: Uuid,
        applicant_id: Uuid,
        payload: &ApplicationPayload,
    ) -> Result<Application> {
        let record = sqlx::query_as::<_, ApplicationRecord>(
            r#"
            INSERT INTO applications (id, listing_id, applicant_id, message, availability, contact_info)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing_id)
        .bind(applicant_id)
        .bind(&payload.message)
        .bind(&payload.availability)
        .bind(&payload.contact_info)
        .fetch_one(conn)
        .await?;

        decode(record)
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn find_by_id(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<Application>> {
        let record = sqlx::query_as::<_, ApplicationRecord>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        record.map(decode).transpose()
    }

    /// Locks an application row for the rest of the transaction.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn find_by_id_for_update(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<Application>> {
        let record = sqlx::query_as::<_, ApplicationRecord>("SELECT * FROM applications WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        record.map(decode).transpose()
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn has_pending(&self, conn: &mut PgConnection, listing_id: Uuid, applicant_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM applications
                WHERE listing_id = $1 AND applicant_id = $2 AND status = 'pending'
            )
            "#,
        )
        .bind(listing_id)
        .bind(applicant_id)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn has_accepted(&self, conn: &mut PgConnection, listing_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE listing_id = $1 AND status = 'accepted')",
        )
        .bind(listing_id)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// Resolves a pending application. Returns `None` if it was no longer pending.
    ///
    /// # Errors
    /// Returns `AppError::Conflict` if accepting would create a second winner for the listing.
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn resolve_pending(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        to: ApplicationStatus,
    ) -> Result<Option<Application>> {
        let record = sqlx::query_as::<_, ApplicationRecord>(
            r#"
            UPDATE applications
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

    /// Rejects every pending application on a listing except `winner_id`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn reject_competing(&self, conn: &mut PgConnection, listing_id: Uuid, winner_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = 'rejected', updated_at = NOW()
            WHERE listing_id = $1 AND id <> $2 AND status = 'pending'
            "#,
        )
        .bind(listing_id)
        .bind(winner_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn list_for_listing(&self, conn: &mut PgConnection, listing_id: Uuid) -> Result<Vec<Application>> {
        let records = sqlx::query_as::<_, ApplicationRecord>(
            "SELECT * FROM applications WHERE listing_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(listing_id)
        .fetch_all(conn)
        .await?;

        decode_all(records)
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn list_by_applicant(&self, conn: &mut PgConnection, applicant_id: Uuid) -> Result<Vec<Application>> {
        let records = sqlx::query_as::<_, ApplicationRecord>(
            "SELECT * FROM applications WHERE applicant_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(applicant_id)
        .fetch_all(conn)
        .await?;

        decode_all(records)
    }

    /// Counts non-rejected applications per listing. Listings without any are absent from the map.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, listing_ids), fields(count = listing_ids.len()), err)]
    pub(crate) async fn count_responses(
        &self,
        conn: &mut PgConnection,
        listing_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, i64>> {
        if listing_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ResponseCountRecord>(
            r#"
            SELECT listing_id, COUNT(*) AS count
            FROM applications
            WHERE listing_id = ANY($1) AND status <> 'rejected'
            GROUP BY listing_id
            "#,
        )
        .bind(listing_ids)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(|row| (row.listing_id, row.count)).collect())
    }
}
