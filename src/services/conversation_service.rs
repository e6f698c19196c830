use crate::adapters::database::DbPool;
use crate::adapters::database::conversation_repo::ConversationRepository;
use crate::adapters::database::listing_repo::{ListingRepository, RowLock};
use crate::domain::conversation::{
    Conversation, ConversationKey, ConversationOverview, DIRECT_ITEM_TITLE, DIRECT_ITEM_TYPE,
};
use crate::error::{AppError, Result};
use sqlx::PgConnection;
use uuid::Uuid;

/// What a caller asks to be resolved.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub listing_id: Option<Uuid>,
    pub participant: Uuid,
    pub counterpart: Uuid,
    pub item_title: Option<String>,
    pub item_type: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ConversationService {
    pool: DbPool,
    repo: ConversationRepository,
    listings: ListingRepository,
}

impl ConversationService {
    #[must_use]
    pub const fn new(pool: DbPool, repo: ConversationRepository, listings: ListingRepository) -> Self {
        Self { pool, repo, listings }
    }

    /// Returns the conversation for a listing and a pair of users, creating it on first use.
    ///
    /// The id is derived from the listing and the sorted pair, so both participants resolve to the
    /// same conversation whichever of them asks.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if both participants are the same user.
    /// Returns `AppError::NotFound` if a listing id is given and the listing does not exist.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, request),
        fields(listing_id = ?request.listing_id, conversation_id = tracing::field::Empty)
    )]
    pub async fn resolve(&self, request: ResolveRequest) -> Result<Conversation> {
        let key = ConversationKey::new(request.listing_id, request.participant, request.counterpart)
            .map_err(AppError::Validation)?;
        tracing::Span::current().record("conversation_id", tracing::field::display(key.conversation_id()));

        let mut conn = self.pool.acquire().await?;

        let (item_title, item_type) = match request.listing_id {
            Some(listing_id) => self.listing_item(&mut conn, listing_id).await?,
            None => (
                non_blank(request.item_title).unwrap_or_else(|| DIRECT_ITEM_TITLE.to_string()),
                non_blank(request.item_type).unwrap_or_else(|| DIRECT_ITEM_TYPE.to_string()),
            ),
        };

        self.repo.get_or_create(&mut conn, &key, &item_title, &item_type).await
    }

    /// The listing's own title and kind label the conversation.
    async fn listing_item(&self, conn: &mut PgConnection, listing_id: Uuid) -> Result<(String, String)> {
        let listing = self.listings.find_by_id(conn, listing_id, RowLock::None).await?.ok_or(AppError::NotFound)?;
        Ok((listing.title, listing.kind.to_string()))
    }

    /// Lists the user's conversations, most recent activity first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ConversationOverview>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.list_for_user(&mut conn, user_id).await
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
