use thiserror::Error;

#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("failed to start container: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// MySQL never accepted a connection while the container booted.
    #[error("mysql unreachable after {attempts} attempts: {source}")]
    MySqlUnreachable {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to apply migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, TestInfraError>;
