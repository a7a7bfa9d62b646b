use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;
use crate::foundation::error::SteadycamError;

#[tokio::test]
async fn never_exceeds_capacity() {
    let queue = Arc::new(BoundedQueue::new("test", 2));
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..6 {
        let queue = Arc::clone(&queue);
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        tasks.spawn(async move {
            queue
                .submit(async {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                })
                .await
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }
    assert_eq!(peak.load(Ordering::SeqCst), 2);
    assert_eq!(queue.in_flight(), 0);
}

#[tokio::test]
async fn errors_pass_through_and_release_the_slot() {
    let queue = BoundedQueue::new("test", 1);
    let err = queue
        .submit(async { Err::<(), _>(SteadycamError::process("boom")) })
        .await
        .unwrap_err();
    assert!(matches!(err, SteadycamError::ProcessExecution(_)));
    assert_eq!(queue.submit(async { Ok(7) }).await.unwrap(), 7);
}

#[tokio::test]
async fn zero_capacity_still_admits_one() {
    let queue = BoundedQueue::new("test", 0);
    assert_eq!(queue.submit(async { Ok("ran") }).await.unwrap(), "ran");
    assert_eq!(queue.in_flight(), 0);
}
