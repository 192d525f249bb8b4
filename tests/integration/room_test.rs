//! Integration tests for random room id pools.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use idpool::ErrorKind;

use crate::helpers::{TestApp, unique_name};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_allocations_are_unique() {
    let app = TestApp::new();
    let rooms = Arc::new(app.context.room_ids(&unique_name("rooms")).unwrap());

    let tasks = (0..10).map(|_| {
        let rooms = Arc::clone(&rooms);
        tokio::spawn(async move {
            let mut ids = Vec::new();
            for _ in 0..20 {
                ids.push(rooms.next_available_id().await.unwrap());
            }
            ids
        })
    });

    let mut seen = HashSet::new();
    for result in join_all(tasks).await {
        for id in result.unwrap() {
            assert!((100_000..=999_999).contains(&id));
            assert!(seen.insert(id), "room id {id} allocated twice");
        }
    }
    assert_eq!(seen.len(), 200);
    assert_eq!(rooms.count_used_ids().await.unwrap(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_release_and_allocate() {
    let app = TestApp::with_config(
        r#"
        [room_ids]
        min_value = 1000
        max_value = 9999
        "#,
    );
    let rooms = Arc::new(app.context.room_ids(&unique_name("churn")).unwrap());

    let tasks = (0..8).map(|_| {
        let rooms = Arc::clone(&rooms);
        tokio::spawn(async move {
            let mut held = Vec::new();
            for round in 0..30 {
                held.push(rooms.next_available_id().await.unwrap());
                if round % 3 == 2 {
                    let id = held.remove(0);
                    rooms.release_id(id).await.unwrap();
                }
            }
            held
        })
    });

    let mut held = HashSet::new();
    for result in join_all(tasks).await {
        for id in result.unwrap() {
            assert!(held.insert(id), "room id {id} held twice");
        }
    }

    let used: HashSet<i64> = rooms.used_ids().await.unwrap().into_iter().collect();
    assert_eq!(used, held);
    for id in rooms.released_ids().await.unwrap() {
        assert!(!used.contains(&id), "room id {id} queued while in use");
    }
}

#[tokio::test]
async fn test_pools_are_independent() {
    let app = TestApp::with_config(
        r#"
        [room_ids]
        min_value = 100000
        max_value = 100000
        random_attempts = 2
        retry_backoff_ms = 0
        "#,
    );
    let red = app.context.room_ids(&unique_name("red")).unwrap();
    let blue = app.context.room_ids(&unique_name("blue")).unwrap();

    assert_eq!(red.next_available_id().await.unwrap(), 100_000);
    assert_eq!(blue.next_available_id().await.unwrap(), 100_000);

    let err = red.next_available_id().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PoolExhausted);

    red.release_id(100_000).await.unwrap();
    assert_eq!(blue.count_released_ids().await.unwrap(), 0);
    assert_eq!(red.next_available_id().await.unwrap(), 100_000);
}

#[tokio::test]
async fn test_released_ids_come_back_in_order() {
    let app = TestApp::new();
    let rooms = app.context.room_ids(&unique_name("order")).unwrap();

    let mut ids = Vec::new();
    for _ in 0..4 {
        ids.push(rooms.next_available_id().await.unwrap());
    }
    for id in ids.iter().rev() {
        rooms.release_id(*id).await.unwrap();
    }

    for id in ids.iter().rev() {
        assert_eq!(rooms.next_available_id().await.unwrap(), *id);
    }
    assert_eq!(rooms.count_released_ids().await.unwrap(), 0);
}

#[tokio::test]
async fn test_store_outage_surfaces_as_transient() {
    let app = TestApp::new();
    let rooms = app.context.room_ids(&unique_name("outage")).unwrap();
    rooms.next_available_id().await.unwrap();

    app.store.set_unavailable(true);
    let err = rooms.next_available_id().await.unwrap_err();
    assert!(err.is_retryable());

    app.store.set_unavailable(false);
    rooms.next_available_id().await.unwrap();
}
