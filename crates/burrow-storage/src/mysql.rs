use async_trait::async_trait;
use burrow_core::repository::{Repository, Result, UrlRecord};
use burrow_core::{Clock, ShortCode, StorageError, SystemClock};
use jiff::Timestamp;
use sqlx::migrate::Migrator;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::sync::Arc;
use tracing::{debug, trace};

/// Schema migrations for the `short_urls` table.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// MySQL implementation of the repository contract.
///
/// Timestamps are stored as Unix milliseconds. The `UNIQUE` index on
/// `short_code` is the uniqueness backstop for concurrent allocations: an
/// insert over a valid record is reported as [`StorageError::Conflict`],
/// while a leftover expired row is cleared and the insert retried once.
/// Whether a row has expired is judged by the repository's [`Clock`].
#[derive(Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MySqlRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlRepository")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used to decide whether a stored row has expired.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Operation(format!("failed to run migrations: {e}")))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    async fn try_insert(&self, record: &UrlRecord) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO short_urls (short_code, long_url, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(record.code.as_str())
        .bind(&record.long_url)
        .bind(record.created_at.as_millisecond())
        .bind(record.expires_at.map(|ts| ts.as_millisecond()))
        .execute(&self.pool)
        .await
        .map(|_| ())
    }

    /// Removes the row under `code` if it has expired. Returns whether one was removed.
    async fn purge_expired(&self, code: &ShortCode) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM short_urls
            WHERE short_code = ?
              AND expires_at IS NOT NULL
              AND expires_at <= ?
            "#,
        )
        .bind(code.as_str())
        .bind(self.clock.now().as_millisecond())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn parse_millis(column: &str, millis: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(millis).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{millis}': {e}"))
    })
}

/// Drops sub-millisecond precision so a saved record compares equal to
/// what a later read returns.
fn truncate_to_millis(ts: Timestamp) -> Result<Timestamp> {
    parse_millis("created_at", ts.as_millisecond())
}

fn row_to_record(row: MySqlRow) -> Result<UrlRecord> {
    let code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let long_url: String = row.try_get("long_url").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let expires_at: Option<i64> = row.try_get("expires_at").map_err(map_sqlx_error)?;

    let code = ShortCode::new(code)
        .map_err(|e| StorageError::InvalidData(format!("stored short code is invalid: {e}")))?;

    Ok(UrlRecord {
        code,
        long_url,
        created_at: parse_millis("created_at", created_at)?,
        expires_at: expires_at
            .map(|value| parse_millis("expires_at", value))
            .transpose()?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        trace!(code = %code, "looking up record in mysql");

        let row = sqlx::query(
            r#"
            SELECT short_code, long_url, created_at, expires_at
            FROM short_urls
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(row_to_record).transpose()
    }

    async fn save(&self, record: UrlRecord) -> Result<UrlRecord> {
        let record = UrlRecord {
            created_at: truncate_to_millis(record.created_at)?,
            ..record
        };

        match self.try_insert(&record).await {
            Ok(()) => return Ok(record),
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(map_sqlx_error(err)),
        }

        if !self.purge_expired(&record.code).await? {
            return Err(StorageError::Conflict(record.code.to_string()));
        }
        debug!(code = %record.code, "purged expired row before insert");

        match self.try_insert(&record).await {
            Ok(()) => Ok(record),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(record.code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn delete_by_code(&self, code: &ShortCode) -> Result<bool> {
        let result = sqlx::query("DELETE FROM short_urls WHERE short_code = ?")
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, record: &UrlRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM short_urls
            WHERE short_code = ?
              AND created_at = ?
            "#,
        )
        .bind(record.code.as_str())
        .bind(record.created_at.as_millisecond())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
