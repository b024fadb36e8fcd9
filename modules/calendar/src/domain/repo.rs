use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::contract::model::{Filters, User};

/// Event as persisted; every time is UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    pub id: i64,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: Option<String>,
    pub alert_time: Option<DateTime<Utc>>,
}

/// Validated, UTC-normalized event ready for insertion. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: Option<String>,
    pub alert_time: Option<DateTime<Utc>>,
}

/// Columns to overwrite on update; `None` leaves the stored value as is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventChanges {
    pub name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub alert_time: Option<DateTime<Utc>>,
}

impl EventChanges {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the set fields onto a stored row.
    pub fn apply_to(self, row: &mut StoredEvent) {
        if let Some(name) = self.name {
            row.name = name;
        }
        if let Some(start_time) = self.start_time {
            row.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            row.end_time = end_time;
        }
        if let Some(description) = self.description {
            row.description = Some(description);
        }
        if let Some(alert_time) = self.alert_time {
            row.alert_time = Some(alert_time);
        }
    }
}

/// User as persisted, including the password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub timezone: String,
}

impl std::fmt::Debug for StoredUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredUser")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl From<StoredUser> for User {
    fn from(u: StoredUser) -> Self {
        Self {
            id: u.id,
            login: u.login,
            timezone: u.timezone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub login: String,
    pub password_hash: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserChanges {
    pub login: Option<String>,
    pub password_hash: Option<String>,
    pub timezone: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(self, row: &mut StoredUser) {
        if let Some(login) = self.login {
            row.login = login;
        }
        if let Some(password_hash) = self.password_hash {
            row.password_hash = password_hash;
        }
        if let Some(timezone) = self.timezone {
            row.timezone = timezone;
        }
    }
}

/// Port for the domain layer: event persistence.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait EventsRepository: Send + Sync {
    /// All events ordered by id.
    async fn list(&self) -> anyhow::Result<Vec<StoredEvent>>;
    /// Events whose UTC start time matches every non-zero filter field.
    async fn list_filtered(&self, filters: Filters) -> anyhow::Result<Vec<StoredEvent>>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<StoredEvent>>;
    /// Insert and return the row with its assigned id.
    async fn insert(&self, draft: EventDraft) -> anyhow::Result<StoredEvent>;
    /// Returns `None` when no event has this id.
    async fn update(&self, id: i64, changes: EventChanges) -> anyhow::Result<Option<StoredEvent>>;
    /// Returns true if a row was deleted.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

/// Raised by [`UsersRepository::insert`] and [`UsersRepository::update`] when the
/// login is already held by another row. Returned as the root error so callers can
/// `downcast_ref` it out of the `anyhow::Error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("login '{0}' violates unique constraint")]
pub struct DuplicateLogin(pub String);

/// Port for the domain layer: user persistence.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_login(&self, login: &str) -> anyhow::Result<Option<StoredUser>>;
    async fn login_exists(&self, login: &str) -> anyhow::Result<bool>;
    async fn insert(&self, draft: UserDraft) -> anyhow::Result<StoredUser>;
    /// Returns `None` when no user has this id.
    async fn update(&self, id: i64, changes: UserChanges) -> anyhow::Result<Option<StoredUser>>;
    /// Returns true if a row was deleted.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}
