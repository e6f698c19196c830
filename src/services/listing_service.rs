use crate::adapters::database::DbPool;
use crate::adapters::database::application_repo::ApplicationRepository;
use crate::adapters::database::listing_repo::{ListingRepository, RowLock};
use crate::domain::listing::{Listing, ListingStatus, NewListing, TransitionGuard};
use crate::error::{AppError, Result};
use uuid::Uuid;

pub(crate) fn invalid_transition(from: ListingStatus, to: ListingStatus) -> AppError {
    AppError::InvalidTransition { from: from.to_string(), to: to.to_string() }
}

#[derive(Clone, Debug)]
pub struct ListingService {
    pool: DbPool,
    repo: ListingRepository,
    applications: ApplicationRepository,
}

impl ListingService {
    #[must_use]
    pub const fn new(pool: DbPool, repo: ListingRepository, applications: ApplicationRepository) -> Self {
        Self { pool, repo, applications }
    }

    /// Posts a new open listing.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if any field is malformed.
    #[tracing::instrument(err(level = "warn"), skip(self, listing), fields(owner_id = %owner_id, kind = %listing.kind))]
    pub async fn create(&self, owner_id: Uuid, listing: NewListing) -> Result<Listing> {
        let listing = listing.normalized().map_err(AppError::Validation)?;

        let mut conn = self.pool.acquire().await?;
        let created = self.repo.create(&mut conn, owner_id, &listing).await?;

        tracing::info!(listing_id = %created.id, "Listing created");
        Ok(created)
    }

    /// # Errors
    /// Returns `AppError::NotFound` if the listing does not exist.
    #[tracing::instrument(err(level = "debug"), skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Listing> {
        let mut conn = self.pool.acquire().await?;
        self.repo.find_by_id(&mut conn, id, RowLock::None).await?.ok_or(AppError::NotFound)
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Listing>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.list_by_owner(&mut conn, user_id).await
    }

    /// Moves a listing to `target`. The owner asking for the current status is a no-op.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the listing does not exist.
    /// Returns `AppError::InvalidTransition` if the move is not in the lifecycle table or its guard fails.
    /// Returns `AppError::Forbidden` if the actor does not own the listing.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(listing_id = %id, target = %target))]
    pub async fn transition(&self, id: Uuid, actor_id: Uuid, target: ListingStatus) -> Result<Listing> {
        let mut tx = self.pool.begin().await?;

        let listing = self.repo.find_by_id(&mut tx, id, RowLock::Update).await?.ok_or(AppError::NotFound)?;

        if listing.owner_id != actor_id {
            return Err(AppError::Forbidden("Only the owner can change a listing's status".into()));
        }

        if listing.status == target {
            return Ok(listing);
        }

        let guard = listing.status.guard_for(target).ok_or_else(|| invalid_transition(listing.status, target))?;

        if guard == TransitionGuard::OwnerWithAcceptedApplication && !self.applications.has_accepted(&mut tx, id).await?
        {
            return Err(invalid_transition(listing.status, target));
        }

        let updated = self
            .repo
            .update_status(&mut tx, id, listing.status, target)
            .await?
            .ok_or_else(|| AppError::Conflict("Listing was modified concurrently".into()))?;

        tx.commit().await?;

        tracing::info!(from = %listing.status, to = %updated.status, "Listing status changed");
        Ok(updated)
    }
}
