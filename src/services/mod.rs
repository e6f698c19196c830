pub mod aggregate_service;
pub mod application_service;
pub mod connection_service;
pub mod conversation_service;
pub mod health_service;
pub mod listing_service;
pub mod message_service;
