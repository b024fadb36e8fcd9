#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use calendar::config::CalendarConfig;
use calendar::contract::context::RequestCtx;
use calendar::contract::model::{Filters, NewUser};
use calendar::domain::repo::{
    EventChanges, EventDraft, EventsRepository, StoredEvent, StoredUser, UserChanges, UserDraft,
    UsersRepository,
};
use calendar::domain::users_service::{UsersService, UsersServiceConfig};
use calendar::infra::storage::InMemoryUsersRepository;
use calendar::{CalendarModule, StorageBackend};

/// Cheapest cost bcrypt accepts; keeps tests fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_config() -> CalendarConfig {
    CalendarConfig {
        bcrypt_cost: TEST_BCRYPT_COST,
        ..Default::default()
    }
}

pub fn in_memory_module() -> CalendarModule {
    CalendarModule::new(&test_config(), StorageBackend::InMemory)
}

/// Fresh private SQLite database with the schema applied.
pub async fn sqlite_memory() -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    // One long-lived connection; every new connection would see an empty database.
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(opts).await?;
    CalendarModule::migrate(&conn).await?;
    Ok(conn)
}

pub fn users_service() -> UsersService {
    users_service_over(Arc::new(InMemoryUsersRepository::new()))
}

pub fn new_user(login: &str, password: &str, timezone: &str) -> NewUser {
    NewUser {
        login: login.to_string(),
        password: password.to_string(),
        timezone: timezone.to_string(),
    }
}

pub fn ctx(login: &str, timezone: &str) -> RequestCtx {
    RequestCtx::new(login, timezone)
}

/// Events repository double that counts every call and stores nothing.
#[derive(Default)]
pub struct CountingEventsRepository {
    calls: AtomicUsize,
    pub rows: Vec<StoredEvent>,
}

impl CountingEventsRepository {
    pub fn with_rows(rows: Vec<StoredEvent>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            rows,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventsRepository for CountingEventsRepository {
    async fn list(&self) -> Result<Vec<StoredEvent>> {
        self.hit();
        Ok(self.rows.clone())
    }

    async fn list_filtered(&self, filters: Filters) -> Result<Vec<StoredEvent>> {
        self.hit();
        Ok(self
            .rows
            .iter()
            .filter(|e| filters.matches(&e.start_time))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredEvent>> {
        self.hit();
        Ok(self.rows.iter().find(|e| e.id == id).cloned())
    }

    async fn insert(&self, draft: EventDraft) -> Result<StoredEvent> {
        self.hit();
        Ok(StoredEvent {
            id: 1,
            name: draft.name,
            start_time: draft.start_time,
            end_time: draft.end_time,
            description: draft.description,
            alert_time: draft.alert_time,
        })
    }

    async fn update(&self, _id: i64, _changes: EventChanges) -> Result<Option<StoredEvent>> {
        self.hit();
        Ok(None)
    }

    async fn delete(&self, _id: i64) -> Result<bool> {
        self.hit();
        Ok(false)
    }
}

/// Events repository whose every call fails, as a broken database would.
pub struct FailingEventsRepository;

#[async_trait]
impl EventsRepository for FailingEventsRepository {
    async fn list(&self) -> Result<Vec<StoredEvent>> {
        anyhow::bail!("connection refused")
    }

    async fn list_filtered(&self, _filters: Filters) -> Result<Vec<StoredEvent>> {
        anyhow::bail!("connection refused")
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<StoredEvent>> {
        anyhow::bail!("connection refused")
    }

    async fn insert(&self, _draft: EventDraft) -> Result<StoredEvent> {
        anyhow::bail!("connection refused")
    }

    async fn update(&self, _id: i64, _changes: EventChanges) -> Result<Option<StoredEvent>> {
        anyhow::bail!("connection refused")
    }

    async fn delete(&self, _id: i64) -> Result<bool> {
        anyhow::bail!("connection refused")
    }
}

/// Users repository whose existence check always misses, as it does for the
/// losing side of two concurrent registrations. Writes go to the wrapped store.
pub struct StaleLoginCheck(pub Arc<dyn UsersRepository>);

#[async_trait]
impl UsersRepository for StaleLoginCheck {
    async fn find_by_login(&self, login: &str) -> Result<Option<StoredUser>> {
        self.0.find_by_login(login).await
    }

    async fn login_exists(&self, _login: &str) -> Result<bool> {
        Ok(false)
    }

    async fn insert(&self, draft: UserDraft) -> Result<StoredUser> {
        self.0.insert(draft).await
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<StoredUser>> {
        self.0.update(id, changes).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.0.delete(id).await
    }
}

pub fn users_service_over(repo: Arc<dyn UsersRepository>) -> UsersService {
    UsersService::new(
        repo,
        UsersServiceConfig {
            bcrypt_cost: TEST_BCRYPT_COST,
        },
    )
}
