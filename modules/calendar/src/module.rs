use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::CalendarConfig;
use crate::contract::client::CalendarApi;
use crate::domain::events_service::{EventsService, EventsServiceConfig};
use crate::domain::repo::{EventsRepository, UsersRepository};
use crate::domain::users_service::{UsersService, UsersServiceConfig};
use crate::gateways::local::CalendarLocalClient;
use crate::infra::storage::{
    migrations::Migrator, InMemoryEventsRepository, InMemoryUsersRepository,
    SeaOrmEventsRepository, SeaOrmUsersRepository,
};

/// Where events and users are persisted.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// Process-local maps; contents are lost on exit.
    InMemory,
    /// SQL database through SeaORM. Run [`CalendarModule::migrate`] first.
    Database(DatabaseConnection),
}

/// Composition root: one instance per process, cheap to clone.
#[derive(Clone)]
pub struct CalendarModule {
    events: Arc<EventsService>,
    users: Arc<UsersService>,
}

impl CalendarModule {
    pub fn new(cfg: &CalendarConfig, storage: StorageBackend) -> Self {
        info!("Initializing calendar module");
        debug!(
            "Loaded calendar config: bcrypt_cost={}, max_name_length={}",
            cfg.bcrypt_cost, cfg.max_name_length
        );

        // Wire repositories (infra) to domain services (ports)
        let (events_repo, users_repo): (Arc<dyn EventsRepository>, Arc<dyn UsersRepository>) =
            match storage {
                StorageBackend::InMemory => {
                    info!("Using in-memory storage");
                    (
                        Arc::new(InMemoryEventsRepository::new()),
                        Arc::new(InMemoryUsersRepository::new()),
                    )
                }
                StorageBackend::Database(conn) => {
                    info!("Using database storage");
                    (
                        Arc::new(SeaOrmEventsRepository::new(conn.clone())),
                        Arc::new(SeaOrmUsersRepository::new(conn)),
                    )
                }
            };

        let events = EventsService::new(
            events_repo,
            EventsServiceConfig {
                max_name_length: cfg.max_name_length,
            },
        );
        let users = UsersService::new(
            users_repo,
            UsersServiceConfig {
                bcrypt_cost: cfg.bcrypt_cost,
            },
        );

        Self {
            events: Arc::new(events),
            users: Arc::new(users),
        }
    }

    /// Apply pending schema migrations.
    pub async fn migrate(conn: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running calendar database migrations");
        Migrator::up(conn, None).await?;
        info!("Calendar database migrations completed successfully");
        Ok(())
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering calendar REST routes");
        let router = routes::register_routes(router, self.events.clone(), self.users.clone());
        info!("Calendar REST routes registered successfully");
        router
    }

    /// Local in-process client for other crates.
    pub fn client(&self) -> Arc<dyn CalendarApi> {
        Arc::new(CalendarLocalClient::new(
            self.events.clone(),
            self.users.clone(),
        ))
    }

    pub fn events(&self) -> Arc<EventsService> {
        self.events.clone()
    }

    pub fn users(&self) -> Arc<UsersService> {
        self.users.clone()
    }
}
