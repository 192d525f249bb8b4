//! Integration tests for sequential id pools.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use idpool::IdGenerator;

use crate::helpers::{TestApp, unique_name};

const SMALL_POOL: &str = r#"
[sequential_ids]
min_value = 1
max_value = 50
max_released_ids = 10
"#;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_allocations_drain_pool_exactly() {
    let app = TestApp::with_config(SMALL_POOL);
    let pool = Arc::new(app.context.sequential_ids(&unique_name("seq")).await.unwrap());

    let tasks = (0..10).map(|_| {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move {
            let mut ids = Vec::new();
            let mut exhausted = 0;
            for _ in 0..6 {
                match pool.next_id().await {
                    Ok(id) => ids.push(id),
                    Err(e) if e.is_pool_exhausted() => exhausted += 1,
                    Err(e) => panic!("unexpected error: {e}"),
                }
            }
            (ids, exhausted)
        })
    });

    let mut seen = HashSet::new();
    let mut exhausted = 0;
    for result in join_all(tasks).await {
        let (ids, misses) = result.unwrap();
        exhausted += misses;
        for id in ids {
            assert!(seen.insert(id), "sequential id {id} allocated twice");
        }
    }

    assert_eq!(seen, (1..=50).collect::<HashSet<i64>>());
    assert_eq!(exhausted, 10);
    assert_eq!(pool.current_counter().await.unwrap(), Some(50));
}

#[tokio::test]
async fn test_release_cap_drops_oldest() {
    let app = TestApp::with_config(SMALL_POOL);
    let pool = app.context.sequential_ids(&unique_name("cap")).await.unwrap();

    for _ in 0..15 {
        pool.next_id().await.unwrap();
    }
    for id in 1..=15 {
        pool.release_id(id).await.unwrap();
    }

    assert_eq!(pool.count_released_ids().await.unwrap(), 10);
    assert_eq!(pool.released_ids().await.unwrap(), (6..=15).collect::<Vec<_>>());
    assert_eq!(pool.next_id().await.unwrap(), 6);
    assert_eq!(pool.current_next_id().await.unwrap(), 16);
}

#[tokio::test]
async fn test_pools_sharing_a_name_share_state() {
    let app = TestApp::with_config(SMALL_POOL);
    let name = unique_name("shared");
    let first = app.context.sequential_ids(&name).await.unwrap();
    let second = app.context.sequential_ids(&name).await.unwrap();

    assert_eq!(first.next_id().await.unwrap(), 1);
    assert_eq!(second.next_id().await.unwrap(), 2);
    second.release_id(1).await.unwrap();
    assert_eq!(first.next_id().await.unwrap(), 1);
}

#[tokio::test]
async fn test_survives_script_cache_flush() {
    let app = TestApp::with_config(SMALL_POOL);
    let pool = app.context.sequential_ids(&unique_name("flush")).await.unwrap();
    assert_eq!(pool.next_id().await.unwrap(), 1);

    app.store.flush_scripts().await;
    pool.release_id(1).await.unwrap();
    app.store.flush_scripts().await;
    assert_eq!(pool.next_id().await.unwrap(), 1);
    assert_eq!(pool.next_id().await.unwrap(), 2);
}

#[tokio::test]
async fn test_double_release_never_duplicates() {
    let app = TestApp::with_config(SMALL_POOL);
    let pool = app.context.sequential_ids(&unique_name("twice")).await.unwrap();
    assert_eq!(pool.next_id().await.unwrap(), 1);

    pool.release_id(1).await.unwrap();
    pool.release_id(1).await.unwrap();
    assert_eq!(pool.count_released_ids().await.unwrap(), 1);

    assert_eq!(pool.next_id().await.unwrap(), 1);
    assert_eq!(pool.next_id().await.unwrap(), 2);
    assert_eq!(pool.count_released_ids().await.unwrap(), 0);
}
