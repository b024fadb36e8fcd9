pub mod credentials;
pub mod error;
pub mod events_service;
pub mod identity;
pub mod repo;
pub mod timezone;
pub mod users_service;
