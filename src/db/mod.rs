//! Persistence: the `Store` seam, its PostgreSQL implementation and an in-memory one.

mod baselines;
mod builds;
mod executions;
pub mod memory;
mod screenshots;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseSettings;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;
use crate::models::{Baseline, Build, Execution, Screenshot};

pub use memory::MemoryStore;

/// Records the services read and write.
///
/// `insert_baseline` and `update_baseline` must enforce uniqueness of
/// `(view, fingerprint)` atomically and report a violation as `AppError::Conflict`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> AppResult<()>;

    async fn insert_build(&self, build: &Build) -> AppResult<()>;
    async fn get_build(&self, id: Uuid) -> AppResult<Option<Build>>;

    /// Insert or replace `execution` and overwrite `build` in one atomic write.
    /// `NotFound` if the build does not exist.
    async fn commit_execution(&self, execution: &Execution, build: &Build) -> AppResult<()>;
    async fn get_execution(&self, id: Uuid) -> AppResult<Option<Execution>>;
    async fn list_executions(&self, build_id: Uuid) -> AppResult<Vec<Execution>>;

    async fn insert_screenshot(&self, screenshot: &Screenshot) -> AppResult<()>;
    async fn get_screenshot(&self, id: Uuid) -> AppResult<Option<Screenshot>>;
    /// Up to `limit` most recent captured screenshots of one target taken strictly
    /// before `before`, returned oldest first.
    async fn list_prior_captures(
        &self,
        view: &str,
        fingerprint: &str,
        before: DateTime<Utc>,
        limit: usize,
    ) -> AppResult<Vec<Screenshot>>;

    async fn insert_baseline(&self, baseline: &Baseline) -> AppResult<()>;
    async fn get_baseline(&self, id: Uuid) -> AppResult<Option<Baseline>>;
    async fn list_baselines(&self, view: Option<&str>) -> AppResult<Vec<Baseline>>;
    async fn update_baseline(&self, baseline: &Baseline) -> AppResult<()>;
}

/// PostgreSQL connection pool.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to the database described by `settings`.
    pub async fn new(settings: &DatabaseSettings) -> AppResult<Self> {
        let mut options = ConnectOptions::new(settings.url.clone());
        options
            .max_connections(settings.max_connections)
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Apply pending migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Failed to run migrations: {}", e)))?;
        info!("Database migrations complete");
        Ok(())
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}

/// Map a write error, surfacing unique violations as conflicts.
fn write_error(e: DbErr, context: &str, conflict: impl FnOnce() -> String) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(conflict()),
        _ => AppError::Database(format!("Failed to {}: {}", context, e)),
    }
}

fn to_json<T: serde::Serialize>(value: &T, what: &str) -> AppResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Database(format!("Failed to encode {}: {}", what, e)))
}

fn from_json<T: serde::de::DeserializeOwned>(value: serde_json::Value, what: &str) -> AppResult<T> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Database(format!("Corrupt {} column: {}", what, e)))
}

fn to_db_dim(value: Option<u32>) -> Option<i32> {
    value.and_then(|v| i32::try_from(v).ok())
}

fn from_db_dim(value: Option<i32>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

#[async_trait]
impl Store for DbPool {
    async fn ping(&self) -> AppResult<()> {
        self.conn
            .ping()
            .await
            .map_err(|e| AppError::Database(format!("Database ping failed: {}", e)))
    }

    async fn insert_build(&self, build: &Build) -> AppResult<()> {
        self.create_build(build).await
    }

    async fn get_build(&self, id: Uuid) -> AppResult<Option<Build>> {
        self.get_build_by_id(id).await
    }

    async fn commit_execution(&self, execution: &Execution, build: &Build) -> AppResult<()> {
        self.save_execution_with_build(execution, build).await
    }

    async fn get_execution(&self, id: Uuid) -> AppResult<Option<Execution>> {
        self.get_execution_by_id(id).await
    }

    async fn list_executions(&self, build_id: Uuid) -> AppResult<Vec<Execution>> {
        self.list_executions_by_build(build_id).await
    }

    async fn insert_screenshot(&self, screenshot: &Screenshot) -> AppResult<()> {
        self.create_screenshot(screenshot).await
    }

    async fn get_screenshot(&self, id: Uuid) -> AppResult<Option<Screenshot>> {
        self.get_screenshot_by_id(id).await
    }

    async fn list_prior_captures(
        &self,
        view: &str,
        fingerprint: &str,
        before: DateTime<Utc>,
        limit: usize,
    ) -> AppResult<Vec<Screenshot>> {
        self.find_prior_captures(view, fingerprint, before, limit).await
    }

    async fn insert_baseline(&self, baseline: &Baseline) -> AppResult<()> {
        self.create_baseline(baseline).await
    }

    async fn get_baseline(&self, id: Uuid) -> AppResult<Option<Baseline>> {
        self.get_baseline_by_id(id).await
    }

    async fn list_baselines(&self, view: Option<&str>) -> AppResult<Vec<Baseline>> {
        self.find_baselines(view).await
    }

    async fn update_baseline(&self, baseline: &Baseline) -> AppResult<()> {
        self.save_baseline(baseline).await
    }
}
