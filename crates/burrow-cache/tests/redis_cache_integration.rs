use std::time::Duration;

use burrow_cache::{RedisUrlCache, UrlCache};
use burrow_core::ShortCode;
use burrow_test_infra::redis::RedisServer;
use redis::AsyncCommands;

/// Test fixture that manages a Redis container using test-infra.
struct Fixture {
    _redis: RedisServer,
    conn: redis::aio::MultiplexedConnection,
}

impl Fixture {
    async fn start() -> Self {
        let redis = RedisServer::new().await.expect("start redis");
        let conn = redis.connection().await.expect("connect redis");
        Self {
            _redis: redis,
            conn,
        }
    }

    fn cache(&self) -> RedisUrlCache {
        RedisUrlCache::new(self.conn.clone())
    }
}

fn code(s: &str) -> ShortCode {
    ShortCode::new(s).unwrap()
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn get_set_round_trip() {
    let fixture = Fixture::start().await;
    let cache = fixture.cache();
    let c = code("test12");

    assert!(cache.get_url(&c).await.unwrap().is_none());

    cache
        .set_url(&c, "https://example.com", Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(
        cache.get_url(&c).await.unwrap().as_deref(),
        Some("https://example.com")
    );
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn set_applies_ttl() {
    let fixture = Fixture::start().await;
    let cache = fixture.cache();
    let c = code("ttl123");

    cache
        .set_url(&c, "https://example.com", Duration::from_secs(7200))
        .await
        .unwrap();

    let mut conn = fixture.conn.clone();
    let ttl: i64 = conn.ttl(cache.cache_key(&c)).await.unwrap();
    assert!((7190..=7200).contains(&ttl), "unexpected ttl {ttl}");
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn entry_expires_in_redis() {
    let fixture = Fixture::start().await;
    let cache = fixture.cache();
    let c = code("exp123");

    cache
        .set_url(&c, "https://example.com", Duration::from_secs(1))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert!(cache.get_url(&c).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn del_reports_presence() {
    let fixture = Fixture::start().await;
    let cache = fixture.cache();
    let c = code("del123");

    cache
        .set_url(&c, "https://example.com", Duration::from_secs(60))
        .await
        .unwrap();

    assert!(cache.del(&c).await.unwrap());
    assert!(!cache.del(&c).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn custom_prefix_is_used_for_keys() {
    let fixture = Fixture::start().await;
    let cache = RedisUrlCache::with_prefix(fixture.conn.clone(), "brw:url:");
    let c = code("pre123");

    cache
        .set_url(&c, "https://example.com", Duration::from_secs(60))
        .await
        .unwrap();

    let mut conn = fixture.conn.clone();
    let raw: Option<String> = conn.get("brw:url:pre123").await.unwrap();
    assert_eq!(raw.as_deref(), Some("https://example.com"));
}
