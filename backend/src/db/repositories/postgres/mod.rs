//! Postgres repository implementation using Diesel.
//!
//! Three tables back the roster: `shifts`, `assignments` and
//! `recurring_series` (see the embedded migrations).
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::db::repository::{
    check_target_hints, AssignmentRepository, ErrorContext, RepositoryError, RepositoryResult,
    SeriesRepository, ShiftRepository,
};
use crate::models::{
    AssignmentId, AssignmentPatch, AssignmentRequest, BatchOutcome, BulkClearKind, ClearWindow,
    FailedRequest, ModifyScope, RecurringSeries, ScheduleAssignment, SeriesId, ShiftDefinition,
    ShiftDraft, ShiftId,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
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

/// Parse an optional numeric environment variable, falling back on absence
/// or garbage.
fn env_or<T: FromStr>(name: &str, fallback: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(fallback)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// Only the database URL is required; see the module docs for the rest.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    pub connections_in_use: u32,
    pub idle_connections: u32,
    pub total_connections: u32,
    pub max_size: u32,
    /// Total statements attempted
    pub total_queries: u64,
    pub failed_queries: u64,
    pub retried_operations: u64,
}

#[derive(Debug, Default)]
struct QueryCounters {
    total: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    counters: Arc<QueryCounters>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
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

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                RepositoryError::internal_with_context(
                    format!("Migration failed: {}", e),
                    ErrorContext::new("run_migrations"),
                )
            })?;
        }
        log::info!(
            "Postgres roster repository ready (pool max={}, min={})",
            config.max_pool_size,
            config.min_pool_size
        );

        Ok(Self {
            pool,
            config,
            counters: Arc::new(QueryCounters::default()),
        })
    }

    /// Run `f` on a pooled connection inside `spawn_blocking`, retrying
    /// retryable failures with exponential backoff.
    ///
    /// `f` may run more than once, so it must be safe to repeat.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);
        let counters = self.counters.clone();

        task::spawn_blocking(move || {
            let mut attempt = 0;
            loop {
                let result = match pool.get() {
                    Ok(mut conn) => {
                        counters.total.fetch_add(1, Ordering::Relaxed);
                        f.clone()(&mut conn)
                    }
                    Err(e) => Err(RepositoryError::timeout_with_context(
                        e.to_string(),
                        ErrorContext::new("get_connection")
                            .with_details(format!("attempt={}", attempt + 1)),
                    )),
                };

                match result {
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::warn!("{} failed (attempt {}), retrying: {}", operation, attempt + 1, e);
                        counters.retried.fetch_add(1, Ordering::Relaxed);
                        std::thread::sleep(delay);
                        delay *= 2;
                        attempt += 1;
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        return Err(e.with_operation(operation));
                    }
                    Ok(value) => return Ok(value),
                }
            }
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Current pool state and query statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.counters.total.load(Ordering::Relaxed),
            failed_queries: self.counters.failed.load(Ordering::Relaxed),
            retried_operations: self.counters.retried.load(Ordering::Relaxed),
        }
    }

    /// Health plus round-trip latency in milliseconds.
    pub async fn health_check_detailed(&self) -> (bool, u64, Option<String>) {
        let start = Instant::now();
        let outcome = self.health_check().await;
        let latency = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(healthy) => (healthy, latency, None),
            Err(e) => (false, latency, Some(e.to_string())),
        }
    }
}

fn map_diesel_error(err: DieselError) -> RepositoryError {
    RepositoryError::from(err)
}

fn load_target(
    conn: &mut PgConnection,
    operation: &str,
    id: AssignmentId,
) -> RepositoryResult<ScheduleAssignment> {
    assignments::table
        .find(id.value())
        .select(AssignmentRow::as_select())
        .first::<AssignmentRow>(conn)
        .optional()
        .map_err(map_diesel_error)?
        .map(ScheduleAssignment::from)
        .ok_or_else(|| RepositoryError::entity_not_found(operation, "assignment", id))
}

/// Ids of the rows a scoped operation on `target` touches.
fn scoped_ids(
    conn: &mut PgConnection,
    target: &ScheduleAssignment,
    scope: ModifyScope,
) -> RepositoryResult<Vec<i64>> {
    let mut query = assignments::table
        .select(assignments::assignment_id)
        .into_boxed();

    query = match (scope.effective_for(target), &target.recurring_group_id) {
        (ModifyScope::Following, Some(group)) => query
            .filter(assignments::recurring_group_id.eq(group.as_str().to_string()))
            .filter(assignments::work_date.ge(target.date)),
        (ModifyScope::All, Some(group)) => {
            query.filter(assignments::recurring_group_id.eq(group.as_str().to_string()))
        }
        _ => query.filter(assignments::assignment_id.eq(target.id.value())),
    };

    query.load::<i64>(conn).map_err(map_diesel_error)
}

fn shift_exists(conn: &mut PgConnection, id: ShiftId) -> RepositoryResult<bool> {
    diesel::select(diesel::dsl::exists(
        shifts::table.filter(shifts::shift_id.eq(id.value())),
    ))
    .get_result(conn)
    .map_err(map_diesel_error)
}

/// Insert one batch row. Every failure is reported against the row; none
/// aborts the batch.
fn insert_request(
    conn: &mut PgConnection,
    request: &AssignmentRequest,
) -> Result<ScheduleAssignment, String> {
    match shift_exists(conn, request.shift_id) {
        Ok(true) => {}
        Ok(false) => return Err(format!("shift {} does not exist", request.shift_id)),
        Err(e) => return Err(e.to_string()),
    }

    diesel::insert_into(assignments::table)
        .values(NewAssignmentRow::from(request))
        .returning(AssignmentRow::as_returning())
        .get_result::<AssignmentRow>(conn)
        .map(ScheduleAssignment::from)
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => format!(
                "user {} already works shift {} on {}",
                request.user_id, request.shift_id, request.date
            ),
            other => map_diesel_error(other).to_string(),
        })
}

// ==================== Assignment Repository ====================

#[async_trait]
impl AssignmentRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_assignments(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduleAssignment>> {
        self.with_conn("list_assignments", move |conn| {
            let rows = assignments::table
                .filter(assignments::work_date.between(start_date, end_date))
                .order((
                    assignments::work_date.asc(),
                    assignments::user_id.asc(),
                    assignments::assignment_id.asc(),
                ))
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(ScheduleAssignment::from).collect())
        })
        .await
    }

    async fn get_assignment(&self, id: AssignmentId) -> RepositoryResult<ScheduleAssignment> {
        self.with_conn("get_assignment", move |conn| {
            load_target(conn, "get_assignment", id)
        })
        .await
    }

    async fn create_assignments(
        &self,
        requests: &[AssignmentRequest],
    ) -> RepositoryResult<BatchOutcome> {
        let requests = requests.to_vec();
        let pool = self.pool.clone();
        let counters = self.counters.clone();

        // Not routed through `with_conn`: rows already written must never be
        // re-attempted.
        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::timeout_with_context(
                    e.to_string(),
                    ErrorContext::new("create_assignments"),
                )
            })?;

            let mut outcome = BatchOutcome::default();
            for request in requests {
                counters.total.fetch_add(1, Ordering::Relaxed);
                match insert_request(&mut conn, &request) {
                    Ok(row) => outcome.created.push(row),
                    Err(reason) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        outcome.failed.push(FailedRequest { request, reason });
                    }
                }
            }
            Ok(outcome)
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("create_assignments"),
            )
        })?
    }

    async fn update_assignment(
        &self,
        id: AssignmentId,
        patch: AssignmentPatch,
        scope: ModifyScope,
        recurring_group_id: Option<&SeriesId>,
        date: Option<NaiveDate>,
    ) -> RepositoryResult<usize> {
        if patch.is_empty() {
            return Err(RepositoryError::validation_with_context(
                "update needs a new user or a new shift",
                ErrorContext::new("update_assignment").with_entity_id(id),
            ));
        }
        let group = recurring_group_id.cloned();

        self.with_conn("update_assignment", move |conn| {
            conn.transaction(|tx| {
                let target = load_target(tx, "update_assignment", id)?;
                check_target_hints("update_assignment", &target, group.as_ref(), date)?;
                if let Some(shift_id) = patch.shift_id {
                    if !shift_exists(tx, shift_id)? {
                        return Err(RepositoryError::validation_with_context(
                            format!("shift {} does not exist", shift_id),
                            ErrorContext::new("update_assignment").with_entity("shift"),
                        ));
                    }
                }

                let ids = scoped_ids(tx, &target, scope)?;
                diesel::update(assignments::table.filter(assignments::assignment_id.eq_any(&ids)))
                    .set(AssignmentChangeset::from(patch))
                    .execute(tx)
                    .map_err(map_diesel_error)
            })
        })
        .await
    }

    async fn delete_assignment(
        &self,
        id: AssignmentId,
        scope: ModifyScope,
        recurring_group_id: Option<&SeriesId>,
        date: Option<NaiveDate>,
    ) -> RepositoryResult<usize> {
        let group = recurring_group_id.cloned();

        self.with_conn("delete_assignment", move |conn| {
            conn.transaction(|tx| {
                let target = load_target(tx, "delete_assignment", id)?;
                check_target_hints("delete_assignment", &target, group.as_ref(), date)?;
                let ids = scoped_ids(tx, &target, scope)?;
                diesel::delete(assignments::table.filter(assignments::assignment_id.eq_any(&ids)))
                    .execute(tx)
                    .map_err(map_diesel_error)
            })
        })
        .await
    }

    async fn bulk_clear(
        &self,
        kind: BulkClearKind,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> RepositoryResult<usize> {
        let window = ClearWindow::resolve(kind, start_date, end_date).map_err(|msg| {
            RepositoryError::validation_with_context(msg, ErrorContext::new("bulk_clear"))
        })?;

        self.with_conn("bulk_clear", move |conn| {
            let removed = match window {
                ClearWindow::Between { start, end } => diesel::delete(
                    assignments::table.filter(assignments::work_date.between(start, end)),
                )
                .execute(conn),
                ClearWindow::After(today) => {
                    diesel::delete(assignments::table.filter(assignments::work_date.gt(today)))
                        .execute(conn)
                }
            };
            removed.map_err(map_diesel_error)
        })
        .await
    }
}

// ==================== Shift Repository ====================

#[async_trait]
impl ShiftRepository for PostgresRepository {
    async fn list_shift_definitions(&self) -> RepositoryResult<Vec<ShiftDefinition>> {
        self.with_conn("list_shift_definitions", |conn| {
            shifts::table
                .order((shifts::start_minute.asc(), shifts::shift_id.asc()))
                .select(ShiftRow::as_select())
                .load::<ShiftRow>(conn)
                .map_err(map_diesel_error)?
                .into_iter()
                .map(ShiftDefinition::try_from)
                .collect()
        })
        .await
    }

    async fn get_shift(&self, id: ShiftId) -> RepositoryResult<ShiftDefinition> {
        self.with_conn("get_shift", move |conn| {
            shifts::table
                .find(id.value())
                .select(ShiftRow::as_select())
                .first::<ShiftRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::entity_not_found("get_shift", "shift", id))
                .and_then(ShiftDefinition::try_from)
        })
        .await
    }

    async fn create_shift(&self, draft: &ShiftDraft) -> RepositoryResult<ShiftDefinition> {
        let row = NewShiftRow::from(draft);
        self.with_conn("create_shift", move |conn| {
            diesel::insert_into(shifts::table)
                .values(&row)
                .returning(ShiftRow::as_returning())
                .get_result::<ShiftRow>(conn)
                .map_err(map_diesel_error)
                .and_then(ShiftDefinition::try_from)
        })
        .await
    }

    async fn update_shift(
        &self,
        id: ShiftId,
        draft: &ShiftDraft,
    ) -> RepositoryResult<ShiftDefinition> {
        let row = NewShiftRow::from(draft);
        self.with_conn("update_shift", move |conn| {
            diesel::update(shifts::table.find(id.value()))
                .set(&row)
                .returning(ShiftRow::as_returning())
                .get_result::<ShiftRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::entity_not_found("update_shift", "shift", id))
                .and_then(ShiftDefinition::try_from)
        })
        .await
    }

    async fn delete_shift(&self, id: ShiftId) -> RepositoryResult<()> {
        self.with_conn("delete_shift", move |conn| {
            let removed = diesel::delete(shifts::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if removed == 0 {
                return Err(RepositoryError::entity_not_found("delete_shift", "shift", id));
            }
            Ok(())
        })
        .await
    }
}

// ==================== Series Repository ====================

#[async_trait]
impl SeriesRepository for PostgresRepository {
    async fn store_series(&self, series: &RecurringSeries) -> RepositoryResult<()> {
        let row = SeriesRow::from(series);
        self.with_conn("store_series", move |conn| {
            diesel::insert_into(recurring_series::table)
                .values(&row)
                .execute(conn)
                .map(|_| ())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_series(&self, id: &SeriesId) -> RepositoryResult<RecurringSeries> {
        let id = id.clone();
        self.with_conn("get_series", move |conn| {
            recurring_series::table
                .find(id.as_str())
                .select(SeriesRow::as_select())
                .first::<SeriesRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::entity_not_found("get_series", "series", &id))
                .and_then(RecurringSeries::try_from)
        })
        .await
    }
}
