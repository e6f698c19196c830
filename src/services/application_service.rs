use crate::adapters::database::DbPool;
use crate::adapters::database::application_repo::ApplicationRepository;
use crate::adapters::database::listing_repo::{ListingRepository, RowLock};
use crate::config::MatchingConfig;
use crate::domain::application::{Application, ApplicationPayload, ApplicationStatus};
use crate::domain::listing::{Listing, ListingStatus};
use crate::error::{AppError, Result};
use opentelemetry::{KeyValue, global, metrics::Counter};
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    submitted_total: Counter<u64>,
    accepted_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("skillswap-server");
        Self {
            submitted_total: meter
                .u64_counter("skillswap_applications_submitted_total")
                .with_description("Application submissions by outcome")
                .build(),
            accepted_total: meter
                .u64_counter("skillswap_applications_accepted_total")
                .with_description("Accept attempts by outcome, including lost races")
                .build(),
        }
    }
}

/// The outcome of a successful arbitration.
#[derive(Debug, Clone)]
pub struct Acceptance {
    pub application: Application,
    pub listing: Listing,
    pub rejected_competitors: u64,
}

#[derive(Clone, Debug)]
pub struct ApplicationService {
    pool: DbPool,
    listings: ListingRepository,
    repo: ApplicationRepository,
    config: MatchingConfig,
    metrics: Metrics,
}

impl ApplicationService {
    #[must_use]
    pub fn new(pool: DbPool, listings: ListingRepository, repo: ApplicationRepository, config: MatchingConfig) -> Self {
        Self { pool, listings, repo, config, metrics: Metrics::new() }
    }

    /// Records an application against an open listing.
    ///
    /// Not idempotent: a retried call that already succeeded fails with `Conflict`, which callers can
    /// treat as confirmation.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the listing does not exist.
    /// Returns `AppError::Conflict` if the listing is not open or the applicant already has a pending application.
    /// Returns `AppError::Validation` if the applicant owns the listing or the payload is malformed.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, payload),
        fields(listing_id = %listing_id, applicant_id = %applicant_id)
    )]
    pub async fn submit(&self, listing_id: Uuid, applicant_id: Uuid, payload: ApplicationPayload) -> Result<Application> {
        let payload = payload.normalized().map_err(AppError::Validation)?;

        let result = self.insert_application(listing_id, applicant_id, &payload).await;

        let status = if result.is_ok() { "success" } else { "failure" };
        self.metrics.submitted_total.add(1, &[KeyValue::new("status", status)]);

        let application = result?;
        tracing::info!(application_id = %application.id, "Application submitted");
        Ok(application)
    }

    async fn insert_application(
        &self,
        listing_id: Uuid,
        applicant_id: Uuid,
        payload: &ApplicationPayload,
    ) -> Result<Application> {
        let mut tx = self.pool.begin().await?;

        // Holding a share lock keeps an accept from resolving the listing underneath us.
        let listing =
            self.listings.find_by_id(&mut tx, listing_id, RowLock::Share).await?.ok_or(AppError::NotFound)?;

        if listing.owner_id == applicant_id {
            return Err(AppError::Validation("You cannot apply to your own listing".into()));
        }
        if listing.status != ListingStatus::Open {
            return Err(AppError::Conflict(format!("Listing is {}, not open", listing.status)));
        }
        if self.repo.has_pending(&mut tx, listing_id, applicant_id).await? {
            return Err(AppError::Conflict("You already have a pending application for this listing".into()));
        }

        let application = self.repo.create(&mut tx, listing_id, applicant_id, payload).await?;
        tx.commit().await?;
        Ok(application)
    }

    /// Accepts one application as the listing's winner.
    ///
    /// Within a single transaction this locks the listing, accepts the application, rejects the other
    /// pending applications (unless disabled) and moves the listing to `in_progress`. Concurrent calls for
    /// the same listing queue on the listing lock; every caller after the winner sees `Conflict`.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the application or listing does not exist.
    /// Returns `AppError::Forbidden` if the actor does not own the listing.
    /// Returns `AppError::Conflict` if the application is no longer pending or the listing is no longer open.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(application_id = %application_id))]
    pub async fn accept(&self, application_id: Uuid, actor_id: Uuid) -> Result<Acceptance> {
        let result = self.arbitrate(application_id, actor_id).await;

        let status = match &result {
            Ok(_) => "success",
            Err(AppError::Conflict(_)) => "conflict",
            Err(_) => "failure",
        };
        self.metrics.accepted_total.add(1, &[KeyValue::new("status", status)]);

        let acceptance = result?;
        tracing::info!(
            listing_id = %acceptance.listing.id,
            rejected_competitors = acceptance.rejected_competitors,
            "Application accepted"
        );
        Ok(acceptance)
    }

    async fn arbitrate(&self, application_id: Uuid, actor_id: Uuid) -> Result<Acceptance> {
        let mut tx = self.pool.begin().await?;

        let listing_id = self.repo.find_by_id(&mut tx, application_id).await?.ok_or(AppError::NotFound)?.listing_id;

        // Listing first, then application: every arbiter takes the locks in the same order.
        let listing = self.listings.find_by_id(&mut tx, listing_id, RowLock::Update).await?.ok_or(AppError::NotFound)?;
        let application =
            self.repo.find_by_id_for_update(&mut tx, application_id).await?.ok_or(AppError::NotFound)?;

        if listing.owner_id != actor_id {
            return Err(AppError::Forbidden("Only the listing owner can accept applications".into()));
        }
        if application.status != ApplicationStatus::Pending {
            return Err(AppError::Conflict(format!("Application is already {}", application.status)));
        }
        if listing.status != ListingStatus::Open {
            return Err(AppError::Conflict("Listing has already been resolved".into()));
        }

        let application = self
            .repo
            .resolve_pending(&mut tx, application_id, ApplicationStatus::Accepted)
            .await?
            .ok_or_else(|| AppError::Conflict("Application has already been resolved".into()))?;

        let rejected_competitors = if self.config.reject_competing_applications {
            self.repo.reject_competing(&mut tx, listing_id, application_id).await?
        } else {
            0
        };

        let listing = self
            .listings
            .update_status(&mut tx, listing_id, ListingStatus::Open, ListingStatus::InProgress)
            .await?
            .ok_or_else(|| AppError::Conflict("Listing has already been resolved".into()))?;

        tx.commit().await?;

        Ok(Acceptance { application, listing, rejected_competitors })
    }

    /// Rejects a single pending application. The listing is left as it is.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the application or listing does not exist.
    /// Returns `AppError::Forbidden` if the actor does not own the listing.
    /// Returns `AppError::Conflict` if the application is not pending.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(application_id = %application_id))]
    pub async fn reject(&self, application_id: Uuid, actor_id: Uuid) -> Result<Application> {
        let mut conn = self.pool.acquire().await?;

        let application = self.repo.find_by_id(&mut conn, application_id).await?.ok_or(AppError::NotFound)?;
        let listing = self
            .listings
            .find_by_id(&mut conn, application.listing_id, RowLock::None)
            .await?
            .ok_or(AppError::NotFound)?;

        if listing.owner_id != actor_id {
            return Err(AppError::Forbidden("Only the listing owner can reject applications".into()));
        }

        let rejected = self
            .repo
            .resolve_pending(&mut conn, application_id, ApplicationStatus::Rejected)
            .await?
            .ok_or_else(|| AppError::Conflict("Application is not pending".into()))?;

        tracing::info!(listing_id = %listing.id, "Application rejected");
        Ok(rejected)
    }

    /// Lists every application on a listing for its owner.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the listing does not exist.
    /// Returns `AppError::Forbidden` if the actor does not own the listing.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list_for_listing(&self, listing_id: Uuid, actor_id: Uuid) -> Result<Vec<Application>> {
        let mut conn = self.pool.acquire().await?;

        let listing = self.listings.find_by_id(&mut conn, listing_id, RowLock::None).await?.ok_or(AppError::NotFound)?;
        if listing.owner_id != actor_id {
            return Err(AppError::Forbidden("Only the listing owner can view its applications".into()));
        }

        self.repo.list_for_listing(&mut conn, listing_id).await
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list_by_applicant(&self, applicant_id: Uuid) -> Result<Vec<Application>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.list_by_applicant(&mut conn, applicant_id).await
    }
}
