use crate::adapters::database::DbPool;
use crate::adapters::database::connection_repo::ConnectionRepository;
use crate::domain::connection::{Connection, ConnectionStatus, Decision};
use crate::error::{AppError, Result};
use opentelemetry::{KeyValue, global, metrics::Counter};
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    requested_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("skillswap-server");
        Self {
            requested_total: meter
                .u64_counter("skillswap_connections_requested_total")
                .with_description("Connection requests by outcome")
                .build(),
        }
    }
}

/// Tracks bilateral relationships between users.
///
/// A pair of users has at most one connection row, regardless of who asked first. A request
/// between users whose previous request was rejected reopens that row in the new direction
/// instead of inserting a second one.
#[derive(Clone, Debug)]
pub struct ConnectionService {
    pool: DbPool,
    repo: ConnectionRepository,
    metrics: Metrics,
}

impl ConnectionService {
    #[must_use]
    pub fn new(pool: DbPool, repo: ConnectionRepository) -> Self {
        Self { pool, repo, metrics: Metrics::new() }
    }

    /// Sends a connection request from `requester_id` to `recipient_id`.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if both ids are the same user.
    /// Returns `AppError::Conflict` if a pending or accepted connection already exists in either direction.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self),
        fields(requester_id = %requester_id, recipient_id = %recipient_id)
    )]
    pub async fn request(&self, requester_id: Uuid, recipient_id: Uuid) -> Result<Connection> {
        if requester_id == recipient_id {
            return Err(AppError::Validation("You cannot connect to yourself".into()));
        }

        let result = self.open_request(requester_id, recipient_id).await;

        let outcome = match &result {
            Ok((_, true)) => "reopened",
            Ok((_, false)) => "created",
            Err(AppError::Conflict(_)) => "conflict",
            Err(_) => "failure",
        };
        self.metrics.requested_total.add(1, &[KeyValue::new("outcome", outcome)]);

        let (connection, reopened) = result?;
        tracing::info!(connection_id = %connection.id, reopened, "Connection requested");
        Ok(connection)
    }

    async fn open_request(&self, requester_id: Uuid, recipient_id: Uuid) -> Result<(Connection, bool)> {
        let mut conn = self.pool.acquire().await?;

        match self.repo.find_between(&mut conn, requester_id, recipient_id).await? {
            Some(existing) if existing.status.blocks_new_request() => {
                Err(AppError::Conflict(format!("A {} connection already exists between these users", existing.status)))
            }
            Some(existing) => {
                let reopened = self
                    .repo
                    .reopen_rejected(&mut conn, existing.id, requester_id, recipient_id)
                    .await?
                    .ok_or_else(|| AppError::Conflict("Connection was modified concurrently".into()))?;
                Ok((reopened, true))
            }
            // The pair index turns a concurrent insert for the same pair into a conflict.
            None => Ok((self.repo.create(&mut conn, requester_id, recipient_id).await?, false)),
        }
    }

    /// Accepts or rejects a pending request. Only the recipient may respond, and only once.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the connection does not exist.
    /// Returns `AppError::Forbidden` if the actor is not the recipient.
    /// Returns `AppError::Conflict` if the connection has already been resolved.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(connection_id = %connection_id))]
    pub async fn respond(&self, connection_id: Uuid, actor_id: Uuid, decision: Decision) -> Result<Connection> {
        let mut conn = self.pool.acquire().await?;

        let connection = self.repo.find_by_id(&mut conn, connection_id).await?.ok_or(AppError::NotFound)?;

        if connection.recipient_id != actor_id {
            return Err(AppError::Forbidden("Only the recipient can respond to a connection request".into()));
        }
        if connection.status != ConnectionStatus::Pending {
            return Err(AppError::Conflict(format!("Connection is already {}", connection.status)));
        }

        let updated = self
            .repo
            .resolve_pending(&mut conn, connection_id, decision.resulting_status())
            .await?
            .ok_or_else(|| AppError::Conflict("Connection has already been resolved".into()))?;

        tracing::info!(status = %updated.status, "Connection resolved");
        Ok(updated)
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list_for_user(&self, user_id: Uuid, status: Option<ConnectionStatus>) -> Result<Vec<Connection>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.list_for_user(&mut conn, user_id, status).await
    }
}
