pub mod application;
pub mod connection;
pub mod conversation;
pub mod listing;
pub mod message;

pub use application::{ApplicationRecord, ResponseCountRecord};
pub use connection::ConnectionRecord;
pub use conversation::{ConversationOverviewRecord, ConversationRecord};
pub use listing::ListingRecord;
pub use message::MessageRecord;

use crate::error::AppError;

/// Converts a row into its domain type, treating unreadable enum columns as an internal fault.
pub(crate) fn decode<R, T>(record: R) -> Result<T, AppError>
where
    T: TryFrom<R, Error = String>,
{
    T::try_from(record).map_err(|e| {
        tracing::error!(error = %e, "Stored row failed to decode");
        AppError::Internal
    })
}

pub(crate) fn decode_all<R, T>(records: Vec<R>) -> Result<Vec<T>, AppError>
where
    T: TryFrom<R, Error = String>,
{
    records.into_iter().map(decode).collect()
}
