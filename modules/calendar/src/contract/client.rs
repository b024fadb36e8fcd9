use async_trait::async_trait;

use crate::contract::context::RequestCtx;
use crate::contract::model::{Event, EventPatch, Filters, NewEvent, NewUser, User, UserPatch};

/// Public API trait for the calendar module that other crates can use.
///
/// Errors are [`CalendarError`](crate::contract::error::CalendarError) values
/// wrapped in `anyhow`; downcast to inspect them.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// List events, optionally narrowed by day/month/year of their UTC start time
    async fn list_events(&self, ctx: &RequestCtx, filters: Filters) -> anyhow::Result<Vec<Event>>;

    /// Get an event by ID
    async fn get_event(&self, ctx: &RequestCtx, id: i64) -> anyhow::Result<Event>;

    /// Create a new event; times are in the caller's timezone
    async fn add_event(&self, ctx: &RequestCtx, new_event: NewEvent) -> anyhow::Result<Event>;

    /// Update an event with partial data
    async fn update_event(
        &self,
        ctx: &RequestCtx,
        id: i64,
        patch: EventPatch,
    ) -> anyhow::Result<Event>;

    /// Delete an event by ID
    async fn delete_event(&self, ctx: &RequestCtx, id: i64) -> anyhow::Result<()>;

    /// Register a new account
    async fn add_user(&self, ctx: &RequestCtx, new_user: NewUser) -> anyhow::Result<User>;

    /// Update the caller's own account
    async fn update_user(&self, ctx: &RequestCtx, id: i64, patch: UserPatch)
        -> anyhow::Result<User>;

    /// Delete the caller's own account
    async fn delete_user(&self, ctx: &RequestCtx, id: i64) -> anyhow::Result<()>;

    /// Check a login/password pair
    async fn login_user(&self, ctx: &RequestCtx, login: &str, password: &str)
        -> anyhow::Result<()>;

    /// Get a user by login
    async fn get_user_by_login(&self, ctx: &RequestCtx, login: &str) -> anyhow::Result<User>;
}
