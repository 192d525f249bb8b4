//! Integration tests for the atomic counter.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use idpool::IdGenerator;

use crate::helpers::{TestApp, unique_name};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_counter_values_are_distinct() {
    let app = TestApp::with_config("[counter]\ninitial_value = 1000");
    let counter = Arc::new(app.context.counter(&unique_name("counter")).await.unwrap());

    let tasks = (0..8).map(|_| {
        let counter = Arc::clone(&counter);
        tokio::spawn(async move {
            let mut ids = Vec::new();
            for _ in 0..25 {
                ids.push(counter.next_id().await.unwrap());
            }
            ids
        })
    });

    let mut seen = HashSet::new();
    for result in join_all(tasks).await {
        for id in result.unwrap() {
            assert!(seen.insert(id), "duplicate counter value {id}");
        }
    }

    let expected: HashSet<i64> = (1000..1200).collect();
    assert_eq!(seen, expected);
    assert_eq!(counter.current_next_id().await.unwrap(), 1200);
}

#[tokio::test]
async fn test_counters_sharing_a_key_share_state() {
    let app = TestApp::new();
    let key = unique_name("shared");
    let first = app.context.counter(&key).await.unwrap();
    let second = app.context.counter(&key).await.unwrap();

    assert_eq!(first.next_id().await.unwrap(), 1);
    assert_eq!(second.next_id().await.unwrap(), 2);
    assert_eq!(first.current_next_id().await.unwrap(), 3);
}

#[tokio::test]
async fn test_counter_survives_script_cache_flush() {
    let app = TestApp::new();
    let counter = app.context.counter(&unique_name("flush")).await.unwrap();
    assert_eq!(counter.next_id().await.unwrap(), 1);

    app.store.flush_scripts().await;
    assert_eq!(counter.next_id().await.unwrap(), 2);
}

#[tokio::test]
async fn test_context_init_from_default_files() {
    let context = idpool::IdPoolContext::init("test").await.unwrap();
    assert_eq!(context.config().store.provider, "memory");
    assert!(context.health_check().await.unwrap());

    let counter = context.counter(&unique_name("init")).await.unwrap();
    assert_eq!(counter.next_id().await.unwrap(), 1);
}
