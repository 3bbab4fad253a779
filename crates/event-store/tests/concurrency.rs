//! Concurrency tests for the in-memory event store.

use event_store::{
    AggregateId, EventEnvelope, EventStore, EventStoreError, InMemoryEventStore, Version,
};

fn make_event(aggregate_id: &str, version: i64) -> EventEnvelope {
    EventEnvelope::builder()
        .aggregate_id(AggregateId::new(aggregate_id))
        .aggregate_type("Cart")
        .event_type("ItemAdded")
        .version(Version::new(version))
        .payload_raw(serde_json::json!({"product_id": "SKU-001", "quantity": 2}))
        .build()
}

#[tokio::test]
async fn sequential_appends_yield_contiguous_versions() {
    let store = InMemoryEventStore::new();
    let id = AggregateId::new("cart-1");

    for v in 1..=50 {
        let new_version = store
            .save_events(&id, vec![make_event("cart-1", v)], Version::new(v - 1))
            .await
            .unwrap();
        assert_eq!(new_version, Version::new(v));
    }

    let events = store.events_after(&id, Version::initial()).await.unwrap();
    let versions: Vec<i64> = events.iter().map(|e| e.version.as_i64()).collect();
    assert_eq!(versions, (1..=50).collect::<Vec<i64>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_appenders_win_exactly_one_slot() {
    let store = InMemoryEventStore::new();
    let id = AggregateId::new("cart-1");

    // Seed version 1 so the contested slot is version 2.
    store
        .save_events(&id, vec![make_event("cart-1", 1)], Version::initial())
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        let id = id.clone();
        tasks.push(tokio::spawn(async move {
            store
                .save_events(&id, vec![make_event("cart-1", 2)], Version::first())
                .await
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(version) => {
                assert_eq!(version, Version::new(2));
                successes += 1;
            }
            Err(EventStoreError::ConcurrencyConflict { expected, actual, .. }) => {
                assert_eq!(expected, Version::first());
                assert_eq!(actual, Version::new(2));
                conflicts += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 7);

    // The losing writers retry with the refreshed expected version.
    store
        .save_events(&id, vec![make_event("cart-1", 3)], Version::new(2))
        .await
        .unwrap();

    let events = store.events_after(&id, Version::initial()).await.unwrap();
    let versions: Vec<i64> = events.iter().map(|e| e.version.as_i64()).collect();
    assert_eq!(versions, vec![1, 2, 3]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unrelated_streams_do_not_conflict() {
    let store = InMemoryEventStore::new();

    let mut tasks = Vec::new();
    for cart in 0..10 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            let key = format!("cart-{cart}");
            let id = AggregateId::new(key.clone());
            for v in 1..=10 {
                store
                    .save_events(&id, vec![make_event(&key, v)], Version::new(v - 1))
                    .await
                    .unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.event_count().await, 100);
    for cart in 0..10 {
        let id = AggregateId::new(format!("cart-{cart}"));
        assert_eq!(
            store.stream_version(&id).await.unwrap(),
            Some(Version::new(10))
        );
    }
}
