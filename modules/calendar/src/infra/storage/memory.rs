//! In-process repositories used when no database is configured (and in tests).

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::contract::model::Filters;
use crate::domain::repo::{
    DuplicateLogin, EventChanges, EventDraft, EventsRepository, StoredEvent, StoredUser,
    UserChanges, UserDraft, UsersRepository,
};

/// Rows keyed by id, with a monotonically increasing id sequence.
#[derive(Debug)]
struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEventsRepository {
    table: RwLock<Table<StoredEvent>>,
}

impl InMemoryEventsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventsRepository for InMemoryEventsRepository {
    async fn list(&self) -> anyhow::Result<Vec<StoredEvent>> {
        Ok(self.table.read().rows.values().cloned().collect())
    }

    async fn list_filtered(&self, filters: Filters) -> anyhow::Result<Vec<StoredEvent>> {
        Ok(self
            .table
            .read()
            .rows
            .values()
            .filter(|e| filters.matches(&e.start_time))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<StoredEvent>> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn insert(&self, draft: EventDraft) -> anyhow::Result<StoredEvent> {
        let mut table = self.table.write();
        let row = StoredEvent {
            id: table.allocate_id(),
            name: draft.name,
            start_time: draft.start_time,
            end_time: draft.end_time,
            description: draft.description,
            alert_time: draft.alert_time,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, changes: EventChanges) -> anyhow::Result<Option<StoredEvent>> {
        let mut table = self.table.write();
        Ok(table.rows.get_mut(&id).map(|row| {
            changes.apply_to(row);
            row.clone()
        }))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.table.write().rows.remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUsersRepository {
    table: RwLock<Table<StoredUser>>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn find_by_login(&self, login: &str) -> anyhow::Result<Option<StoredUser>> {
        Ok(self
            .table
            .read()
            .rows
            .values()
            .find(|u| u.login == login)
            .cloned())
    }

    async fn login_exists(&self, login: &str) -> anyhow::Result<bool> {
        Ok(self.table.read().rows.values().any(|u| u.login == login))
    }

    async fn insert(&self, draft: UserDraft) -> anyhow::Result<StoredUser> {
        let mut table = self.table.write();
        // Same guarantee as the unique index on the SQL side.
        if table.rows.values().any(|u| u.login == draft.login) {
            return Err(DuplicateLogin(draft.login).into());
        }
        let row = StoredUser {
            id: table.allocate_id(),
            login: draft.login,
            password_hash: draft.password_hash,
            timezone: draft.timezone,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> anyhow::Result<Option<StoredUser>> {
        let mut table = self.table.write();
        if let Some(ref login) = changes.login {
            if table.rows.values().any(|u| u.id != id && &u.login == login) {
                return Err(DuplicateLogin(login.clone()).into());
            }
        }
        Ok(table.rows.get_mut(&id).map(|row| {
            changes.apply_to(row);
            row.clone()
        }))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.table.write().rows.remove(&id).is_some())
    }
}
