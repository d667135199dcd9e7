use crate::{Result, TestInfraError};
use sqlx::migrate::Migrator;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use std::time::Duration;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;
const USER: &str = "burrow";
const PASSWORD: &str = "burrow";

#[derive(Debug, Clone, TypedBuilder)]
pub struct MySqlSettings {
    #[builder(default = "8.4".to_string(), setter(into))]
    image_tag: String,
    #[builder(default = "burrow".to_string(), setter(into))]
    database: String,
    #[builder(default = 5)]
    max_connections: u32,
    /// Connection attempts before giving up on a booting server.
    #[builder(default = 20)]
    connect_attempts: u32,
    #[builder(default = Duration::from_millis(500))]
    retry_interval: Duration,
}

impl Default for MySqlSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Disposable MySQL server that hands out pools ready for the repository.
///
/// The image logs "ready for connections" once for its init server before
/// the real one comes up, so [`MySqlServer::pool`] keeps retrying until a
/// connection succeeds.
pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
    settings: MySqlSettings,
    database_url: String,
}

impl MySqlServer {
    pub async fn start() -> Result<Self> {
        Self::with_settings(MySqlSettings::default()).await
    }

    pub async fn with_settings(settings: MySqlSettings) -> Result<Self> {
        let container = GenericImage::new("mysql", settings.image_tag.as_str())
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
            .with_env_var("MYSQL_DATABASE", settings.database.as_str())
            .with_env_var("MYSQL_USER", USER)
            .with_env_var("MYSQL_PASSWORD", PASSWORD)
            .with_env_var("MYSQL_ROOT_PASSWORD", "root")
            .start()
            .await?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(MYSQL_PORT).await?;
        let database_url = format!(
            "mysql://{USER}:{PASSWORD}@{host}:{port}/{}",
            settings.database
        );

        Ok(Self {
            container,
            settings,
            database_url,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Opens a connection pool once the server accepts connections.
    pub async fn pool(&self) -> Result<MySqlPool> {
        let attempts = self.settings.connect_attempts.max(1);
        let mut attempt = 1;

        loop {
            let connected = MySqlPoolOptions::new()
                .max_connections(self.settings.max_connections)
                .connect(&self.database_url)
                .await;

            match connected {
                Ok(pool) => return Ok(pool),
                Err(source) if attempt >= attempts => {
                    return Err(TestInfraError::MySqlUnreachable { attempts, source });
                }
                Err(_) => {
                    attempt += 1;
                    tokio::time::sleep(self.settings.retry_interval).await;
                }
            }
        }
    }

    /// Opens a pool and brings its schema up to date with `migrator`.
    pub async fn migrated_pool(&self, migrator: &Migrator) -> Result<MySqlPool> {
        let pool = self.pool().await?;
        migrator.run(&pool).await?;
        Ok(pool)
    }

    pub fn container(&self) -> &ContainerAsync<GenericImage> {
        &self.container
    }
}
