use crate::adapters::database::DbPool;
use crate::adapters::database::conversation_repo::ConversationRepository;
use crate::adapters::database::message_repo::MessageRepository;
use crate::config::MessagingConfig;
use crate::domain::conversation::Conversation;
use crate::domain::message::{Message, Page};
use crate::error::{AppError, Result};
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    sent_total: Counter<u64>,
    fetch_batch_size: Histogram<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("skillswap-server");
        Self {
            sent_total: meter
                .u64_counter("skillswap_messages_sent_total")
                .with_description("Total messages appended to conversations")
                .build(),
            fetch_batch_size: meter
                .u64_histogram("skillswap_message_fetch_batch_size")
                .with_description("Number of messages returned in a single page")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MessageService {
    pool: DbPool,
    conversations: ConversationRepository,
    repo: MessageRepository,
    config: MessagingConfig,
    metrics: Metrics,
}

impl MessageService {
    #[must_use]
    pub fn new(
        pool: DbPool,
        conversations: ConversationRepository,
        repo: MessageRepository,
        config: MessagingConfig,
    ) -> Self {
        Self { pool, conversations, repo, config, metrics: Metrics::new() }
    }

    async fn conversation_for(&self, conn: &mut PgConnection, conversation_id: Uuid, user_id: Uuid) -> Result<Conversation> {
        let conversation = self.conversations.find_by_id(conn, conversation_id).await?.ok_or(AppError::NotFound)?;
        if !conversation.has_participant(user_id) {
            return Err(AppError::Forbidden("You are not a participant in this conversation".into()));
        }
        Ok(conversation)
    }

    /// Appends a message and moves the conversation summary forward.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the conversation does not exist.
    /// Returns `AppError::Forbidden` if the sender is not a participant.
    /// Returns `AppError::Validation` if the content is empty or too long.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, content),
        fields(conversation_id = %conversation_id, sender_id = %sender_id)
    )]
    pub async fn append(&self, conversation_id: Uuid, sender_id: Uuid, content: &str) -> Result<Message> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Message cannot be empty".into()));
        }
        if content.chars().count() > self.config.max_message_length {
            return Err(AppError::Validation(format!(
                "Message is too long (max {} characters)",
                self.config.max_message_length
            )));
        }

        let result = self.store(conversation_id, sender_id, content).await;

        let status = if result.is_ok() { "success" } else { "failure" };
        self.metrics.sent_total.add(1, &[KeyValue::new("status", status)]);

        let message = result?;
        tracing::debug!(message_id = %message.id, seq = message.seq, "Message appended");
        Ok(message)
    }

    async fn store(&self, conversation_id: Uuid, sender_id: Uuid, content: &str) -> Result<Message> {
        let mut tx = self.pool.begin().await?;

        self.conversation_for(&mut tx, conversation_id, sender_id).await?;
        let message = self.repo.create(&mut tx, conversation_id, sender_id, content).await?;

        let advanced = self
            .conversations
            .advance_last_message(&mut tx, conversation_id, message.created_at, &message.preview())
            .await?;
        if !advanced {
            tracing::debug!("Conversation summary already newer, left unchanged");
        }

        tx.commit().await?;
        Ok(message)
    }

    /// Returns a page of the conversation's log, oldest first.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the conversation does not exist.
    /// Returns `AppError::Forbidden` if the user is not a participant.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(conversation_id = %conversation_id))]
    pub async fn list_messages(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        after_seq: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Message>> {
        let page = Page {
            after_seq,
            limit: limit.unwrap_or(self.config.default_page_size).clamp(1, self.config.max_page_size.max(1)),
        };

        let mut conn = self.pool.acquire().await?;
        self.conversation_for(&mut conn, conversation_id, user_id).await?;
        let messages = self.repo.fetch_page(&mut conn, conversation_id, page).await?;

        self.metrics.fetch_batch_size.record(messages.len() as u64, &[]);
        Ok(messages)
    }

    /// Marks every message the user has not read yet as read. Returns how many were marked.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the conversation does not exist.
    /// Returns `AppError::Forbidden` if the user is not a participant.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(conversation_id = %conversation_id))]
    pub async fn mark_read(&self, conversation_id: Uuid, user_id: Uuid) -> Result<u64> {
        let mut conn = self.pool.acquire().await?;
        self.conversation_for(&mut conn, conversation_id, user_id).await?;

        let marked = self.repo.mark_read(&mut conn, conversation_id, user_id).await?;
        tracing::debug!(marked, "Conversation marked read");
        Ok(marked)
    }

    /// Ensures the user may read the conversation's state.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the conversation does not exist.
    /// Returns `AppError::Forbidden` if the user is not a participant.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(conversation_id = %conversation_id))]
    pub async fn authorize_reader(&self, conversation_id: Uuid, user_id: Uuid) -> Result<Conversation> {
        let mut conn = self.pool.acquire().await?;
        self.conversation_for(&mut conn, conversation_id, user_id).await
    }
}
