pub mod entity;
pub mod memory;
pub mod migrations;
pub mod sea_orm_repo;

pub use memory::{InMemoryEventsRepository, InMemoryUsersRepository};
pub use sea_orm_repo::{SeaOrmEventsRepository, SeaOrmUsersRepository};
