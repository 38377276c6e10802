//! Diesel-backed Postgres repository.
//!
//! Wraps an r2d2 connection pool and implements every repository trait with
//! blocking Diesel queries dispatched through `spawn_blocking`. Transient
//! failures (pool checkout, serialization conflicts, dropped connections)
//! are retried with exponential backoff, and embedded migrations run once
//! at startup.
//!
//! Connection settings come from [`PostgresConfig::from_env`]:
//! `DATABASE_URL` or `PG_DATABASE_URL` is required; `PG_POOL_MAX`,
//! `PG_POOL_MIN`, `PG_CONN_TIMEOUT_SEC`, `PG_IDLE_TIMEOUT_SEC`,
//! `PG_MAX_RETRIES`, and `PG_RETRY_DELAY_MS` tune the pool and retry
//! policy.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::db::repository::{
    ErrorContext, GoalRepository, HealthCheckRepository, ReadingLogRepository, RepositoryError,
    RepositoryResult,
};
use crate::models::{
    NewReadingGoal, NewReadingLog, ReadingGoal, ReadingGoalId, ReadingLog, UpdateReadingGoal,
    UserId,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;
type PgPooled = PooledConnection<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Connection and retry settings for the Postgres backend.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connection_timeout_sec: u64,
    pub idle_timeout_sec: u64,
    /// Retry attempts for transient failures.
    pub max_retries: u32,
    /// First retry delay; doubles on every subsequent attempt.
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Read settings from the environment.
    ///
    /// `DATABASE_URL` (or `PG_DATABASE_URL`) must be set; the pool and
    /// retry knobs fall back to the [`Default`] values when absent or
    /// unparseable.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        Ok(Self {
            database_url,
            max_pool_size: env_parse("PG_POOL_MAX", 10),
            min_pool_size: env_parse("PG_POOL_MIN", 1),
            connection_timeout_sec: env_parse("PG_CONN_TIMEOUT_SEC", 30),
            idle_timeout_sec: env_parse("PG_IDLE_TIMEOUT_SEC", 600),
            max_retries: env_parse("PG_MAX_RETRIES", 3),
            retry_delay_ms: env_parse("PG_RETRY_DELAY_MS", 100),
        })
    }

    /// Default settings against the given connection URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Snapshot of pool state and query counters, for monitoring surfaces.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    pub connections_in_use: u32,
    pub idle_connections: u32,
    pub total_connections: u32,
    pub max_size: u32,
    pub total_queries: u64,
    pub failed_queries: u64,
    pub retried_operations: u64,
}

/// Repository over a pooled Postgres connection.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })
}

fn checkout(pool: &PgPool, attempt: u32) -> RepositoryResult<PgPooled> {
    pool.get().map_err(|e| {
        RepositoryError::connection_with_context(
            e.to_string(),
            ErrorContext::new("get_connection")
                .with_details(format!("attempt={}", attempt + 1))
                .retryable(),
        )
    })
}

impl PostgresRepository {
    /// Build the connection pool and apply pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        let mut conn = pool.get().map_err(|e| {
            RepositoryError::connection_with_context(
                e.to_string(),
                ErrorContext::new("get_connection_for_migrations"),
            )
        })?;
        run_migrations(&mut conn)?;
        drop(conn);

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run a blocking Diesel operation on a pooled connection.
    ///
    /// The operation moves to the blocking thread pool. Retryable errors
    /// (see [`RepositoryError::is_retryable`]) are attempted again up to
    /// `max_retries` times with doubling delay; the closure must be `Clone`
    /// so each attempt starts fresh.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let mut backoff = Duration::from_millis(self.config.retry_delay_ms);
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(backoff);
                    backoff *= 2;
                }

                let mut conn = match checkout(&pool, attempt) {
                    Ok(conn) => conn,
                    Err(e) if attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(value) => return Ok(value),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Current pool state and cumulative query counters.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    /// Whether the database currently answers queries.
    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }

    /// Health probe with latency, as `(healthy, latency_ms, error)`.
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        let outcome = self.health_check().await;
        let latency = Some(start.elapsed().as_millis() as u64);

        match outcome {
            Ok(true) => (true, latency, None),
            Ok(false) => (
                false,
                latency,
                Some("Health check returned false".to_string()),
            ),
            Err(e) => (false, latency, Some(e.to_string())),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

#[async_trait]
impl ReadingLogRepository for PostgresRepository {
    async fn create_reading_log(&self, new_log: &NewReadingLog) -> RepositoryResult<ReadingLog> {
        let new_log = new_log.clone();
        self.with_conn(move |conn| {
            let row: ReadingLogRow = diesel::insert_into(reading_logs::table)
                .values(NewReadingLogRow::from(&new_log))
                .returning(ReadingLogRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?;
            Ok(row.into())
        })
        .await
    }

    async fn get_reading_logs(&self, user_id: UserId) -> RepositoryResult<Vec<ReadingLog>> {
        let user_id = user_id.value();
        self.with_conn(move |conn| {
            let rows: Vec<ReadingLogRow> = reading_logs::table
                .filter(reading_logs::user_id.eq(user_id))
                .order((reading_logs::date.desc(), reading_logs::created_at.desc()))
                .select(ReadingLogRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(ReadingLog::from).collect())
        })
        .await
    }

    async fn get_recent_reading_logs(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> RepositoryResult<Vec<ReadingLog>> {
        let user_id = user_id.value();
        self.with_conn(move |conn| {
            let rows: Vec<ReadingLogRow> = reading_logs::table
                .filter(reading_logs::user_id.eq(user_id))
                .order((reading_logs::date.desc(), reading_logs::created_at.desc()))
                .limit(limit)
                .select(ReadingLogRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(ReadingLog::from).collect())
        })
        .await
    }

    async fn get_reading_logs_in_range(
        &self,
        user_id: UserId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<Vec<ReadingLog>> {
        let user_id = user_id.value();
        self.with_conn(move |conn| {
            let rows: Vec<ReadingLogRow> = reading_logs::table
                .filter(reading_logs::user_id.eq(user_id))
                .filter(reading_logs::date.ge(start_date))
                .filter(reading_logs::date.le(end_date))
                .order((reading_logs::date.asc(), reading_logs::created_at.asc()))
                .select(ReadingLogRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(ReadingLog::from).collect())
        })
        .await
    }

    async fn get_reading_logs_by_juz(
        &self,
        user_id: UserId,
        juz_number: i32,
    ) -> RepositoryResult<Vec<ReadingLog>> {
        let user_id = user_id.value();
        self.with_conn(move |conn| {
            let rows: Vec<ReadingLogRow> = reading_logs::table
                .filter(reading_logs::user_id.eq(user_id))
                .filter(reading_logs::juz_number.eq(juz_number))
                .order((reading_logs::date.desc(), reading_logs::created_at.desc()))
                .select(ReadingLogRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(ReadingLog::from).collect())
        })
        .await
    }

    async fn delete_reading_logs(&self, user_id: UserId) -> RepositoryResult<usize> {
        let user_id = user_id.value();
        self.with_conn(move |conn| {
            diesel::delete(reading_logs::table.filter(reading_logs::user_id.eq(user_id)))
                .execute(conn)
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl GoalRepository for PostgresRepository {
    async fn get_active_reading_goal(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<ReadingGoal>> {
        let user_id = user_id.value();
        self.with_conn(move |conn| {
            let row: Option<ReadingGoalRow> = reading_goals::table
                .filter(reading_goals::user_id.eq(user_id))
                .filter(reading_goals::is_active.eq(true))
                .order(reading_goals::created_at.desc())
                .select(ReadingGoalRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?;
            Ok(row.map(ReadingGoal::from))
        })
        .await
    }

    async fn get_reading_goals(&self, user_id: UserId) -> RepositoryResult<Vec<ReadingGoal>> {
        let user_id = user_id.value();
        self.with_conn(move |conn| {
            let rows: Vec<ReadingGoalRow> = reading_goals::table
                .filter(reading_goals::user_id.eq(user_id))
                .order((reading_goals::created_at.desc(), reading_goals::id.desc()))
                .select(ReadingGoalRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(ReadingGoal::from).collect())
        })
        .await
    }

    async fn create_reading_goal(&self, new_goal: &NewReadingGoal) -> RepositoryResult<ReadingGoal> {
        let new_goal = new_goal.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                // A newly activated goal supersedes every sibling
                if new_goal.is_active {
                    diesel::update(
                        reading_goals::table
                            .filter(reading_goals::user_id.eq(new_goal.user_id.value())),
                    )
                    .set(reading_goals::is_active.eq(false))
                    .execute(tx)
                    .map_err(map_diesel_error)?;
                }

                let inserted: ReadingGoalRow = diesel::insert_into(reading_goals::table)
                    .values(NewReadingGoalRow::from(&new_goal))
                    .returning(ReadingGoalRow::as_returning())
                    .get_result(tx)
                    .map_err(map_diesel_error)?;

                Ok(inserted.into())
            })
        })
        .await
    }

    async fn update_reading_goal(
        &self,
        goal_id: ReadingGoalId,
        changes: &UpdateReadingGoal,
    ) -> RepositoryResult<ReadingGoal> {
        let changes = changes.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let row: Option<ReadingGoalRow> = reading_goals::table
                    .find(goal_id.value())
                    .select(ReadingGoalRow::as_select())
                    .first(tx)
                    .optional()
                    .map_err(map_diesel_error)?;

                let row = row.ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        "Reading goal not found",
                        ErrorContext::new("update_reading_goal")
                            .with_entity("reading_goal")
                            .with_entity_id(goal_id.to_string()),
                    )
                })?;

                let mut goal: ReadingGoal = row.into();
                changes.apply_to(&mut goal);

                let updated: ReadingGoalRow = diesel::update(
                    reading_goals::table.find(goal_id.value()),
                )
                .set((
                    reading_goals::total_pages.eq(goal.total_pages),
                    reading_goals::daily_target.eq(goal.daily_target),
                    reading_goals::weekly_target.eq(goal.weekly_target),
                    reading_goals::is_active.eq(goal.is_active),
                ))
                .returning(ReadingGoalRow::as_returning())
                .get_result(tx)
                .map_err(map_diesel_error)?;

                if updated.is_active {
                    diesel::update(
                        reading_goals::table
                            .filter(reading_goals::user_id.eq(updated.user_id))
                            .filter(reading_goals::id.ne(updated.id)),
                    )
                    .set(reading_goals::is_active.eq(false))
                    .execute(tx)
                    .map_err(map_diesel_error)?;
                }

                Ok(updated.into())
            })
        })
        .await
    }
}

#[async_trait]
impl HealthCheckRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }
}
