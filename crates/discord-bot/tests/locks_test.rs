use contestbot_discord_bot::locks::KeyedLocks;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_same_key_waits_for_holder() {
    let locks = Arc::new(KeyedLocks::<u64>::new());
    let held = locks.lock(&1).await;

    let waiter = {
        let locks = locks.clone();
        tokio::spawn(async move {
            let _guard = locks.lock(&1).await;
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    drop(held);
    timeout(Duration::from_secs(1), waiter)
        .await
        .expect("Waiter never acquired the lock")
        .expect("Waiter panicked");
}

#[tokio::test]
async fn test_different_keys_do_not_block() {
    let locks = KeyedLocks::<u64>::new();
    let _first = locks.lock(&1).await;

    let second = timeout(Duration::from_millis(100), locks.lock(&2)).await;

    assert!(second.is_ok());
}

#[tokio::test]
async fn test_idle_keys_are_pruned() {
    let locks = KeyedLocks::<u64>::new();

    drop(locks.lock(&1).await);
    drop(locks.lock(&2).await);
    let _held = locks.lock(&3).await;

    assert_eq!(locks.len().await, 1);
}
