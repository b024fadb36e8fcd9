//! SeaORM-backed repository implementations for the domain ports.
//!
//! Both structs are generic over `C: ConnectionTrait`, so they can be built
//! with a `DatabaseConnection` or a transactional connection.

use anyhow::Context;
use sea_orm::{
    sea_query::{Expr, SimpleExpr},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbBackend, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
};

use crate::contract::model::{DatePart, Filters};
use crate::domain::repo::{
    DuplicateLogin, EventChanges, EventDraft, EventsRepository, StoredEvent, StoredUser,
    UserChanges, UserDraft, UsersRepository,
};
use crate::infra::storage::entity::event::{
    ActiveModel as EventAM, Column as EventColumn, Entity as EventEntity,
};
use crate::infra::storage::entity::user::{
    ActiveModel as UserAM, Column as UserColumn, Entity as UserEntity,
};

/// SeaORM events repository.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// `<part of start_time in UTC> = ?` for the connection's backend.
fn start_time_part_eq(backend: DbBackend, part: DatePart, value: i32) -> SimpleExpr {
    let sql = match backend {
        DbBackend::Postgres => match part {
            DatePart::Day => "EXTRACT(DAY FROM start_time AT TIME ZONE 'UTC') = ?",
            DatePart::Month => "EXTRACT(MONTH FROM start_time AT TIME ZONE 'UTC') = ?",
            DatePart::Year => "EXTRACT(YEAR FROM start_time AT TIME ZONE 'UTC') = ?",
        },
        // Stored as text with an explicit +00:00 offset.
        DbBackend::Sqlite => match part {
            DatePart::Day => "CAST(strftime('%d', start_time) AS INTEGER) = ?",
            DatePart::Month => "CAST(strftime('%m', start_time) AS INTEGER) = ?",
            DatePart::Year => "CAST(strftime('%Y', start_time) AS INTEGER) = ?",
        },
        DbBackend::MySql => match part {
            DatePart::Day => "EXTRACT(DAY FROM start_time) = ?",
            DatePart::Month => "EXTRACT(MONTH FROM start_time) = ?",
            DatePart::Year => "EXTRACT(YEAR FROM start_time) = ?",
        },
    };
    Expr::cust_with_values(sql, [value])
}

#[async_trait::async_trait]
impl<C> EventsRepository for SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn list(&self) -> anyhow::Result<Vec<StoredEvent>> {
        let rows = EventEntity::find()
            .order_by_asc(EventColumn::Id)
            .all(&self.conn)
            .await
            .context("list failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_filtered(&self, filters: Filters) -> anyhow::Result<Vec<StoredEvent>> {
        let backend = self.conn.get_database_backend();
        let condition = filters
            .constrained_parts()
            .fold(Condition::all(), |cond, (part, value)| {
                cond.add(start_time_part_eq(backend, part, value))
            });

        let rows = EventEntity::find()
            .filter(condition)
            .order_by_asc(EventColumn::Id)
            .all(&self.conn)
            .await
            .context("list_filtered failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<StoredEvent>> {
        let found = EventEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, draft: EventDraft) -> anyhow::Result<StoredEvent> {
        let m = EventAM {
            name: Set(draft.name),
            start_time: Set(draft.start_time),
            end_time: Set(draft.end_time),
            description: Set(draft.description),
            alert_time: Set(draft.alert_time),
            ..Default::default()
        };
        let inserted = m.insert(&self.conn).await.context("insert failed")?;
        Ok(inserted.into())
    }

    async fn update(&self, id: i64, changes: EventChanges) -> anyhow::Result<Option<StoredEvent>> {
        let Some(current) = EventEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("update lookup failed")?
        else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(current.into()));
        }

        let mut m = current.into_active_model();
        if let Some(name) = changes.name {
            m.name = Set(name);
        }
        if let Some(start_time) = changes.start_time {
            m.start_time = Set(start_time);
        }
        if let Some(end_time) = changes.end_time {
            m.end_time = Set(end_time);
        }
        if let Some(description) = changes.description {
            m.description = Set(Some(description));
        }
        if let Some(alert_time) = changes.alert_time {
            m.alert_time = Set(Some(alert_time));
        }
        let updated = m.update(&self.conn).await.context("update failed")?;
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let res = EventEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }
}

/// SeaORM users repository.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_login(&self, login: &str) -> anyhow::Result<Option<StoredUser>> {
        let found = UserEntity::find()
            .filter(UserColumn::Login.eq(login))
            .one(&self.conn)
            .await
            .context("find_by_login failed")?;
        Ok(found.map(Into::into))
    }

    async fn login_exists(&self, login: &str) -> anyhow::Result<bool> {
        let count = UserEntity::find()
            .filter(UserColumn::Login.eq(login))
            .count(&self.conn)
            .await
            .context("login_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, draft: UserDraft) -> anyhow::Result<StoredUser> {
        let login = draft.login.clone();
        let m = UserAM {
            login: Set(draft.login),
            password_hash: Set(draft.password_hash),
            timezone: Set(draft.timezone),
            ..Default::default()
        };
        let inserted = m
            .insert(&self.conn)
            .await
            .map_err(|e| unique_login_violation(e, &login, "insert failed"))?;
        Ok(inserted.into())
    }

    async fn update(&self, id: i64, changes: UserChanges) -> anyhow::Result<Option<StoredUser>> {
        let Some(current) = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("update lookup failed")?
        else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(current.into()));
        }

        let new_login = changes.login.clone();
        let mut m = current.into_active_model();
        if let Some(login) = changes.login {
            m.login = Set(login);
        }
        if let Some(password_hash) = changes.password_hash {
            m.password_hash = Set(password_hash);
        }
        if let Some(timezone) = changes.timezone {
            m.timezone = Set(timezone);
        }
        let updated = m.update(&self.conn).await.map_err(|e| match &new_login {
            Some(login) => unique_login_violation(e, login, "update failed"),
            None => anyhow::Error::new(e).context("update failed"),
        })?;
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let res = UserEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }
}

/// Turn a unique index hit on `users.login` into [`DuplicateLogin`]; other errors keep their context.
fn unique_login_violation(err: DbErr, login: &str, what: &'static str) -> anyhow::Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DuplicateLogin(login.to_string()).into(),
        _ => anyhow::Error::new(err).context(what),
    }
}
