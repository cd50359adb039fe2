//! End-to-end scenarios across primitives, driven by the in-memory store.
//!
//! Each test wires several independent handles to one shared store, the way
//! separate processes would share one Redis instance.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use turnstile_coordination::DistributedLock;
use turnstile_coordination::ExecutionGuard;
use turnstile_coordination::LockConfig;
use turnstile_coordination::MessageQueue;
use turnstile_coordination::RateLimiterConfig;
use turnstile_coordination::SlidingWindowLimiter;
use turnstile_core::MemoryStore;

#[tokio::test]
async fn lock_hands_over_between_independent_handles() {
    let store = MemoryStore::new();
    // Two handles over one store, as two processes would hold them.
    let process_a = DistributedLock::new(Arc::clone(&store));
    let process_b = DistributedLock::with_config(store, LockConfig {
        poll_interval: Duration::from_millis(10),
    });

    let held = process_a.try_acquire("migrate", Duration::from_secs(5)).await.unwrap().unwrap();
    assert!(process_b.try_acquire("migrate", Duration::from_secs(5)).await.unwrap().is_none());

    let waiter = tokio::spawn(async move {
        process_b
            .acquire("migrate", Duration::from_secs(5), true, Some(Duration::from_secs(2)))
            .await
    });

    tokio::time::sleep(Duration::from_millis(40)).await;
    process_a.release(&held).await.unwrap();

    let token = waiter.await.unwrap().unwrap().expect("waiter acquires after release");
    assert_eq!(token.name(), "migrate");
}

#[tokio::test]
async fn guarded_work_feeds_the_queue_exactly_once() {
    let store = MemoryStore::new();
    let guard = Arc::new(ExecutionGuard::new(Arc::clone(&store)));
    let results = Arc::new(MessageQueue::with_name(store, "results"));

    let mut handles = Vec::new();
    for worker in 0..4u32 {
        let guard = Arc::clone(&guard);
        let results = Arc::clone(&results);
        handles.push(tokio::spawn(async move {
            guard
                .run("rollup", Duration::from_secs(5), false, None, move || async move {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    results.publish(&json!({"worker": worker})).await
                })
                .await
        }));
    }

    let mut completed = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            completed += 1;
        }
    }
    assert_eq!(completed, 1, "only one worker runs the rollup");

    // Exactly one result was published.
    assert!(results.consume::<serde_json::Value>().await.unwrap().is_some());
    assert!(results.consume::<serde_json::Value>().await.unwrap().is_none());
}

#[tokio::test]
async fn limiter_gates_publishers_sharing_one_key() {
    let store = MemoryStore::new();
    let limiter = SlidingWindowLimiter::new(Arc::clone(&store), RateLimiterConfig::new(3, Duration::from_secs(3)));
    let queue = MessageQueue::with_name(store, "outbound");

    let mut published = 0;
    for i in 0..10 {
        if limiter.admit("outbound").await.unwrap() {
            queue.publish(&json!({"seq": i})).await.unwrap();
            published += 1;
        }
    }
    assert_eq!(published, 3);

    // The queue holds the admitted messages in publish order.
    for i in 0..3 {
        assert_eq!(queue.consume::<serde_json::Value>().await.unwrap(), Some(json!({"seq": i})));
    }
    assert_eq!(queue.consume::<serde_json::Value>().await.unwrap(), None);
}
