use crate::adapters::database::DbPool;
use crate::adapters::database::application_repo::ApplicationRepository;
use crate::adapters::database::message_repo::MessageRepository;
use crate::error::{AppError, Result};
use backon::{ExponentialBuilder, Retryable};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use uuid::Uuid;

/// Read-only paths get one extra attempt when the store is briefly unavailable.
fn read_retry() -> ExponentialBuilder {
    ExponentialBuilder::default().with_min_delay(Duration::from_millis(50)).with_max_times(1)
}

/// Computes derived counts on demand. Holds no state of its own.
#[derive(Clone, Debug)]
pub struct AggregateService {
    pool: DbPool,
    applications: ApplicationRepository,
    messages: MessageRepository,
}

impl AggregateService {
    #[must_use]
    pub const fn new(pool: DbPool, applications: ApplicationRepository, messages: MessageRepository) -> Self {
        Self { pool, applications, messages }
    }

    /// Counts non-rejected applications for each requested listing.
    ///
    /// Every requested id appears in the result. Ids that are unknown, or not valid UUIDs at all,
    /// map to zero.
    ///
    /// # Errors
    /// Returns `AppError::StoreUnavailable` if the store stays unreachable after a retry.
    #[tracing::instrument(err(level = "warn"), skip(self, listing_ids), fields(count = listing_ids.len()))]
    pub async fn response_counts(&self, listing_ids: &[String]) -> Result<BTreeMap<String, i64>> {
        let parsed: Vec<Uuid> = listing_ids.iter().filter_map(|id| Uuid::parse_str(id.trim()).ok()).collect();

        let counts = (|| async {
            let mut conn = self.pool.acquire().await?;
            self.applications.count_responses(&mut conn, &parsed).await
        })
        .retry(read_retry())
        .when(AppError::is_transient)
        .notify(|e, delay| tracing::warn!(error = %e, ?delay, "Retrying response counts"))
        .await?;

        Ok(listing_ids
            .iter()
            .map(|raw| {
                let count = Uuid::parse_str(raw.trim()).ok().and_then(|id| counts.get(&id).copied()).unwrap_or(0);
                (raw.clone(), count)
            })
            .collect())
    }

    /// Messages in the conversation that the user did not send and has not read.
    ///
    /// # Errors
    /// Returns `AppError::StoreUnavailable` if the store stays unreachable after a retry.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn unread_count(&self, conversation_id: Uuid, user_id: Uuid) -> Result<i64> {
        (|| async {
            let mut conn = self.pool.acquire().await?;
            self.messages.count_unread(&mut conn, conversation_id, user_id).await
        })
        .retry(read_retry())
        .when(AppError::is_transient)
        .notify(|e, delay| tracing::warn!(error = %e, ?delay, "Retrying unread count"))
        .await
    }

    /// Unread messages across all of the user's conversations.
    ///
    /// # Errors
    /// Returns `AppError::StoreUnavailable` if the store stays unreachable after a retry.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn total_unread(&self, user_id: Uuid) -> Result<(i64, HashMap<Uuid, i64>)> {
        let per_conversation = (|| async {
            let mut conn = self.pool.acquire().await?;
            self.messages.count_unread_by_conversation(&mut conn, user_id).await
        })
        .retry(read_retry())
        .when(AppError::is_transient)
        .notify(|e, delay| tracing::warn!(error = %e, ?delay, "Retrying unread totals"))
        .await?;

        Ok((per_conversation.values().sum(), per_conversation))
    }
}
