use std::time::{Duration, Instant};

use contestbot_core::tracking::ExpiringSet;

#[test]
fn test_take_consumes_once() {
    let mut expected = ExpiringSet::new(Duration::from_secs(60), 16);
    expected.insert(42u64);

    assert!(expected.take(&42));
    assert!(!expected.take(&42));
}

#[test]
fn test_duplicates_are_counted() {
    let mut expected = ExpiringSet::new(Duration::from_secs(60), 16);
    expected.insert((1u64, 7u64));
    expected.insert((1u64, 7u64));

    assert!(expected.take(&(1, 7)));
    assert!(expected.take(&(1, 7)));
    assert!(!expected.take(&(1, 7)));
}

#[test]
fn test_entries_expire() {
    let mut expected = ExpiringSet::new(Duration::from_secs(10), 16);
    let start = Instant::now();
    expected.insert_at(1u64, start);
    expected.insert_at(2u64, start + Duration::from_secs(5));

    assert!(!expected.take_at(&1, start + Duration::from_secs(11)));
    assert!(expected.take_at(&2, start + Duration::from_secs(11)));
}

#[test]
fn test_capacity_evicts_oldest() {
    let mut expected = ExpiringSet::new(Duration::from_secs(60), 2);
    expected.insert(1u64);
    expected.insert(2u64);
    expected.insert(3u64);

    assert_eq!(expected.len(), 2);
    assert!(!expected.take(&1));
    assert!(expected.take(&2));
    assert!(expected.take(&3));
    assert!(expected.is_empty());
}
