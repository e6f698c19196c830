use crate::adapters::database::records::{ListingRecord, decode, decode_all};
use crate::domain::listing::{Listing, ListingStatus, NewListing};
use crate::error::Result;
use sqlx::PgConnection;
use uuid::Uuid;

/// Row lock taken while reading a listing inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLock {
    None,
    /// Blocks status changes but not other readers.
    Share,
    /// Serializes writers that change the listing's status.
    Update,
}

#[derive(Clone, Debug, Default)]
pub struct ListingRepository {}

impl ListingRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Inserts a new listing in the `open` state.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, listing), err)]
    pub(crate) async fn create(&self, conn: &mut PgConnection, owner_id: Uuid, listing: &NewListing) -> Result<Listing> {
        let record = sqlx::query_as::<_, ListingRecord>(
            r#"
            INSERT INTO listings
                (id, owner_id, kind, title, description, category, availability, location, is_paid, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(listing.kind.as_str())
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(&listing.category)
        .bind(&listing.availability)
        .bind(&listing.location)
        .bind(listing.is_paid)
        .bind(listing.price)
        .fetch_one(conn)
        .await?;

        decode(record)
    }

    /// Finds a listing, optionally locking its row for the rest of the transaction.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn find_by_id(&self, conn: &mut PgConnection, id: Uuid, lock: RowLock) -> Result<Option<Listing>> {
        let sql = match lock {
            RowLock::None => "SELECT * FROM listings WHERE id = $1",
            RowLock::Share => "SELECT * FROM listings WHERE id = $1 FOR SHARE",
            RowLock::Update => "SELECT * FROM listings WHERE id = $1 FOR UPDATE",
        };

        let record = sqlx::query_as::<_, ListingRecord>(sql).bind(id).fetch_optional(conn).await?;

        record.map(decode).transpose()
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn list_by_owner(&self, conn: &mut PgConnection, owner_id: Uuid) -> Result<Vec<Listing>> {
        let records = sqlx::query_as::<_, ListingRecord>(
            "SELECT * FROM listings WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(conn)
        .await?;

        decode_all(records)
    }

    /// Moves a listing from `from` to `to`. Returns `None` if the listing was no longer in `from`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn update_status(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        from: ListingStatus,
        to: ListingStatus,
    ) -> Result<Option<Listing>> {
        let record = sqlx::query_as::<_, ListingRecord>(
            r#"
            UPDATE listings
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(conn)
        .await?;

        record.map(decode).transpose()
    }
}
