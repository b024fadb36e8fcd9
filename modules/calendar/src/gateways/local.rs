use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::CalendarApi,
    context::RequestCtx,
    error::CalendarError,
    model::{Event, EventPatch, Filters, NewEvent, NewUser, User, UserPatch},
};
use crate::domain::{error::DomainError, events_service::EventsService, users_service::UsersService};

/// Local implementation of the CalendarApi trait that delegates to the domain services
pub struct CalendarLocalClient {
    events: Arc<EventsService>,
    users: Arc<UsersService>,
}

impl CalendarLocalClient {
    pub fn new(events: Arc<EventsService>, users: Arc<UsersService>) -> Self {
        Self { events, users }
    }
}

#[async_trait]
impl CalendarApi for CalendarLocalClient {
    async fn list_events(&self, ctx: &RequestCtx, filters: Filters) -> anyhow::Result<Vec<Event>> {
        self.events
            .get_events(ctx, filters)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn get_event(&self, ctx: &RequestCtx, id: i64) -> anyhow::Result<Event> {
        self.events
            .get_event(ctx, id)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn add_event(&self, ctx: &RequestCtx, new_event: NewEvent) -> anyhow::Result<Event> {
        self.events
            .add_event(ctx, new_event)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn update_event(
        &self,
        ctx: &RequestCtx,
        id: i64,
        patch: EventPatch,
    ) -> anyhow::Result<Event> {
        self.events
            .update_event(ctx, id, patch)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn delete_event(&self, ctx: &RequestCtx, id: i64) -> anyhow::Result<()> {
        self.events
            .delete_event(ctx, id)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn add_user(&self, ctx: &RequestCtx, new_user: NewUser) -> anyhow::Result<User> {
        self.users
            .add_user(ctx, new_user)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn update_user(
        &self,
        ctx: &RequestCtx,
        id: i64,
        patch: UserPatch,
    ) -> anyhow::Result<User> {
        self.users
            .update_user(ctx, id, patch)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn delete_user(&self, ctx: &RequestCtx, id: i64) -> anyhow::Result<()> {
        self.users
            .delete_user(ctx, id)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn login_user(
        &self,
        ctx: &RequestCtx,
        login: &str,
        password: &str,
    ) -> anyhow::Result<()> {
        self.users
            .login_user(ctx, login, password)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn get_user_by_login(&self, ctx: &RequestCtx, login: &str) -> anyhow::Result<User> {
        self.users
            .get_user_by_login(ctx, login)
            .await
            .map_err(map_domain_error_to_anyhow)
    }
}

/// Map domain errors to contract errors wrapped in anyhow
fn map_domain_error_to_anyhow(domain_error: DomainError) -> anyhow::Error {
    anyhow::Error::new(CalendarError::from(domain_error))
}
