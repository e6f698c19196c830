pub mod applications;
pub mod connections;
pub mod conversations;
pub mod health;
pub mod listings;
