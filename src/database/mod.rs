use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::config::Config;

pub mod error;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;
pub mod types;
pub mod utils;

pub use error::{StoreError, StoreResult};
pub use store::{AttendanceLog, RosterStore};

use memory::{InMemoryAttendanceLog, InMemoryRoster};
use repositories::{AttendanceRepository, RosterRepository};

/// Open the connection pool and bring the schema up to date.
pub async fn init_database(config: &Config) -> Result<PgPool> {
    log::info!(
        "Connecting to database {}",
        utils::redact_credentials(&config.database_url)
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_acquire_timeout_secs))
        .connect(&config.database_url)
        .await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Migrations completed successfully");

    Ok(pool)
}

/// The two collections the service works against.
#[derive(Clone)]
pub struct Stores {
    pub roster: Arc<dyn RosterStore>,
    pub attendance: Arc<dyn AttendanceLog>,
}

impl Stores {
    pub fn new(roster: Arc<dyn RosterStore>, attendance: Arc<dyn AttendanceLog>) -> Self {
        Self { roster, attendance }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(RosterRepository::new(pool.clone())),
            Arc::new(AttendanceRepository::new(pool)),
        )
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryRoster::new()),
            Arc::new(InMemoryAttendanceLog::new()),
        )
    }

    /// Pick the backend from `DATABASE_URL`; `memory:` selects the in-memory store.
    pub async fn connect(config: &Config) -> Result<Self> {
        if config.uses_memory_store() {
            log::warn!("Using in-memory store; data is lost on shutdown");
            return Ok(Self::in_memory());
        }

        let pool = init_database(config).await?;
        Ok(Self::postgres(pool))
    }
}
