//! Tests against a live Redis server.
//!
//! Ignored unless the `redis-tests` feature is enabled. Point
//! `IDPOOL_TEST_REDIS_URL` at a disposable server and run
//! `cargo test --features redis-tests`.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use idpool::{
    AppConfig, GenerationStrategy, IdGenerator, IdPoolContext, IdRange, RoomIdManager,
    SequentialIdManager,
};

use crate::helpers::unique_name;

async fn redis_context() -> IdPoolContext {
    let url = std::env::var("IDPOOL_TEST_REDIS_URL")
        .unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let mut config = AppConfig::from_toml(
        r#"
        [store]
        provider = "redis"

        [store.redis]
        key_prefix = "idpool-test:"

        [sequential_ids]
        min_value = 100000
        max_value = 100002
        "#,
    )
    .unwrap();
    config.store.redis.url = url;
    IdPoolContext::from_config(config)
        .await
        .expect("Failed to connect to test Redis")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[cfg_attr(not(feature = "redis-tests"), ignore = "requires a Redis server")]
async fn test_redis_room_ids_unique_under_concurrency() {
    let context = redis_context().await;
    assert!(context.health_check().await.unwrap());
    let rooms = Arc::new(context.room_ids(&unique_name("rooms")).unwrap());

    let tasks = (0..8).map(|_| {
        let rooms = Arc::clone(&rooms);
        tokio::spawn(async move {
            let mut ids = Vec::new();
            for _ in 0..10 {
                ids.push(rooms.next_available_id().await.unwrap());
            }
            ids
        })
    });

    let mut seen = HashSet::new();
    for result in join_all(tasks).await {
        for id in result.unwrap() {
            assert!(seen.insert(id));
        }
    }
    assert_eq!(rooms.count_used_ids().await.unwrap(), 80);
    rooms.purge().await.unwrap();
}

#[tokio::test]
#[cfg_attr(not(feature = "redis-tests"), ignore = "requires a Redis server")]
async fn test_redis_sequential_exhaustion_and_reuse() {
    let context = redis_context().await;
    let pool = context.sequential_ids(&unique_name("seq")).await.unwrap();

    for expected in 100_000..=100_002 {
        assert_eq!(pool.next_id().await.unwrap(), expected);
    }
    assert!(pool.next_id().await.unwrap_err().is_pool_exhausted());
    assert_eq!(pool.current_counter().await.unwrap(), Some(100_002));

    pool.release_id(100_001).await.unwrap();
    assert_eq!(pool.next_id().await.unwrap(), 100_001);
    pool.purge().await.unwrap();
}

#[tokio::test]
#[cfg_attr(not(feature = "redis-tests"), ignore = "requires a Redis server")]
async fn test_redis_counter() {
    let context = redis_context().await;
    let counter = context.counter(&unique_name("counter")).await.unwrap();
    assert_eq!(counter.next_id().await.unwrap(), 1);
    assert_eq!(counter.next_id().await.unwrap(), 2);
    assert_eq!(counter.current_next_id().await.unwrap(), 3);
}

#[tokio::test]
#[cfg_attr(not(feature = "redis-tests"), ignore = "requires a Redis server")]
async fn test_redis_release_queues_once_and_claim_dequeues() {
    let context = redis_context().await;
    let name = unique_name("single");
    let builder = || {
        RoomIdManager::builder(context.store().store(), name.as_str())
            .with_range(100_000, 100_000)
            .with_random_attempts(2)
            .with_backoff(std::time::Duration::ZERO)
    };
    let fresh = builder()
        .with_strategy(GenerationStrategy::PreferNew)
        .build()
        .unwrap();
    let reusing = builder().build().unwrap();

    reusing.release_id(100_000).await.unwrap();
    reusing.release_id(100_000).await.unwrap();
    assert_eq!(reusing.count_released_ids().await.unwrap(), 1);

    assert_eq!(fresh.next_available_id().await.unwrap(), 100_000);
    assert_eq!(fresh.count_released_ids().await.unwrap(), 0);
    assert!(reusing.next_available_id().await.unwrap_err().is_pool_exhausted());
    fresh.purge().await.unwrap();
}

#[tokio::test]
#[cfg_attr(not(feature = "redis-tests"), ignore = "requires a Redis server")]
async fn test_redis_sequential_near_largest_supported_id() {
    let context = redis_context().await;
    let top = IdRange::MAX_ID;
    let pool = SequentialIdManager::builder(context.store().store(), unique_name("top"))
        .with_range(top - 1, top)
        .build()
        .await
        .unwrap();

    assert_eq!(pool.next_id().await.unwrap(), top - 1);
    assert_eq!(pool.next_id().await.unwrap(), top);
    assert!(pool.next_id().await.unwrap_err().is_pool_exhausted());
    assert_eq!(pool.current_counter().await.unwrap(), Some(top));
    pool.purge().await.unwrap();
}
