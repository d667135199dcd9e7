mod app;
mod cli;
mod error;
mod handlers;
mod model;
mod state;

use std::sync::Arc;

use anyhow::Context;
use burrow_cache::{MokaUrlCache, RedisUrlCache};
use burrow_core::{Repository, UrlCache};
use burrow_generator::RandomGenerator;
use burrow_redirector::RedirectorService;
use burrow_shortener::ShortenerService;
use burrow_storage::{InMemoryRepository, MySqlRepository};
use clap::Parser;
use tracing::{info, warn};

use crate::app::App;
use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};
use crate::model::UrlValidator;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    burrow_telemetry::init(config.log_format.into())?;

    info!(
        listen_addr = %config.listen_addr,
        public_base_url = %config.public_base_url,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        "starting gateway server"
    );

    match config.storage {
        StorageBackendArg::InMemory => {
            with_cache(&config, Arc::new(InMemoryRepository::new())).await
        }
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn).await?;
            repository.migrate().await?;
            info!("mysql schema is up to date");
            with_cache(&config, Arc::new(repository)).await
        }
    }
}

async fn with_cache<R: Repository>(config: &CLI, repository: Arc<R>) -> anyhow::Result<()> {
    match config.cache {
        CacheBackendArg::Moka => {
            run_server(
                config,
                repository,
                MokaUrlCache::with_capacity(config.cache_capacity),
            )
            .await
        }
        CacheBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("redis url is required when cache backend is redis")?;
            let cache = RedisUrlCache::connect(redis_url).await?;
            run_server(config, repository, cache).await
        }
    }
}

async fn run_server<R: Repository, C: UrlCache>(
    config: &CLI,
    repository: Arc<R>,
    cache: C,
) -> anyhow::Result<()> {
    let shortener =
        ShortenerService::from_shared(Arc::clone(&repository), RandomGenerator::from_os_rng())
            .with_settings(config.allocator_settings());
    let redirector = RedirectorService::from_shared(repository, Arc::new(cache))
        .with_ttl_policy(config.ttl_policy());

    let state = AppState::builder()
        .shortener(Arc::new(shortener))
        .redirector(Arc::new(redirector))
        .base_url(config.public_base_url.as_str())
        .validator(Arc::new(UrlValidator::new()?))
        .build();

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
