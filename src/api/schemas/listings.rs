use crate::domain::listing::{Listing, ListingKind, ListingStatus, NewListing};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Offer,
    Request,
}

impl From<Kind> for ListingKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Offer => Self::Offer,
            Kind::Request => Self::Request,
        }
    }
}

impl From<ListingKind> for Kind {
    fn from(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Offer => Self::Offer,
            ListingKind::Request => Self::Request,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl From<Status> for ListingStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Open => Self::Open,
            Status::InProgress => Self::InProgress,
            Status::Completed => Self::Completed,
            Status::Cancelled => Self::Cancelled,
        }
    }
}

impl From<ListingStatus> for Status {
    fn from(status: ListingStatus) -> Self {
        match status {
            ListingStatus::Open => Self::Open,
            ListingStatus::InProgress => Self::InProgress,
            ListingStatus::Completed => Self::Completed,
            ListingStatus::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub kind: Kind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_paid: bool,
    pub price: Option<i64>,
}

impl From<CreateListingRequest> for NewListing {
    fn from(req: CreateListingRequest) -> Self {
        Self {
            kind: req.kind.into(),
            title: req.title,
            description: req.description,
            category: req.category,
            availability: req.availability,
            location: req.location,
            is_paid: req.is_paid,
            price: req.price,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: Status,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: Kind,
    pub title: String,
    pub description: String,
    pub category: String,
    pub availability: String,
    pub location: String,
    pub is_paid: bool,
    pub price: Option<i64>,
    pub status: Status,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id,
            owner_id: listing.owner_id,
            kind: listing.kind.into(),
            title: listing.title,
            description: listing.description,
            category: listing.category,
            availability: listing.availability,
            location: listing.location,
            is_paid: listing.is_paid,
            price: listing.price,
            status: listing.status.into(),
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

/// Query for `GET /listings/response-counts`: a comma-separated list of listing ids.
#[derive(Debug, Deserialize)]
pub struct ResponseCountsQuery {
    #[serde(default)]
    pub ids: String,
}

impl ResponseCountsQuery {
    /// Splits the id list, dropping blanks and duplicates.
    #[must_use]
    pub fn listing_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> =
            self.ids.split(',').map(str::trim).filter(|id| !id.is_empty()).map(ToString::to_string).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseCountsResponse {
    pub counts: BTreeMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_ids_split_and_dedup() {
        let query = ResponseCountsQuery { ids: " b , a,,b, placeholder ".into() };
        assert_eq!(query.listing_ids(), vec!["a", "b", "placeholder"]);
    }

    #[test]
    fn test_listing_ids_empty() {
        let query = ResponseCountsQuery { ids: String::new() };
        assert!(query.listing_ids().is_empty());
    }

    #[test]
    fn test_status_wire_names() {
        let req: TransitionRequest = serde_json::from_str(r#"{"status":"in_progress"}"#).unwrap();
        assert_eq!(req.status, Status::InProgress);
    }
}
