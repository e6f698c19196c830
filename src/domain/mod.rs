pub mod application;
pub mod auth;
pub mod connection;
pub mod conversation;
pub mod listing;
pub mod message;
