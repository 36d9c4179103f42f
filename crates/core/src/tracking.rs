use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Events the bot expects to see because it caused them, such as deleting a
/// replaced submission or retracting a moved vote.
///
/// Entries expire after `ttl` and the oldest entry is evicted once `capacity`
/// is reached, so an expectation that is never observed cannot leak.
#[derive(Debug)]
pub struct ExpiringSet<T> {
    entries: VecDeque<(T, Instant)>,
    ttl: Duration,
    capacity: usize,
}

impl<T: PartialEq> ExpiringSet<T> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn insert(&mut self, item: T) {
        self.insert_at(item, Instant::now());
    }

    /// Consumes one unexpired entry equal to `item`.
    pub fn take(&mut self, item: &T) -> bool {
        self.take_at(item, Instant::now())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert_at(&mut self, item: T, now: Instant) {
        self.evict_expired(now);
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((item, now));
    }

    pub fn take_at(&mut self, item: &T, now: Instant) -> bool {
        self.evict_expired(now);
        match self.entries.iter().position(|(entry, _)| entry == item) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn evict_expired(&mut self, now: Instant) {
        while let Some((_, inserted)) = self.entries.front() {
            if now.saturating_duration_since(*inserted) < self.ttl {
                break;
            }
            self.entries.pop_front();
        }
    }
}
