use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

/// Opaque key handed to the UI so a later button press can find its session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct Inner<T> {
    entries: HashMap<String, T>,
    order: VecDeque<String>,
}

/// Bounded in-memory store with FIFO eviction.
///
/// Reads never refresh an entry; once the store is full, each insert evicts
/// the oldest insert. The map and the insertion queue sit behind one mutex so
/// they are always updated together.
pub struct SessionStore<T> {
    name: &'static str,
    capacity: usize,
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> SessionStore<T> {
    /// `capacity` below 1 is raised to 1.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name,
            capacity,
            inner: Mutex::new(Inner {
                entries: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity + 1),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // A panic while holding the lock cannot leave map and queue out of
        // step: every mutation below completes before the guard drops.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn remember(&self, entry: T) -> SessionToken {
        let token = SessionToken::generate();
        let mut inner = self.lock();
        inner.entries.insert(token.0.clone(), entry);
        inner.order.push_back(token.0.clone());
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
                tracing::trace!(store = self.name, token = %oldest, "Evicted session");
            }
        }
        token
    }

    pub fn lookup(&self, token: &str) -> Option<T> {
        self.lock().entries.get(token).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_remember_then_lookup() {
        let store = SessionStore::new("test", 3);
        let token = store.remember("links".to_string());

        assert_eq!(store.lookup(token.as_str()), Some("links".to_string()));
        assert_eq!(store.lookup("missing"), None);
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = SessionStore::new("test", 10);
        let a = store.remember(1);
        let b = store.remember(1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_insert_past_capacity_evicts_oldest() {
        let capacity = 4;
        let store = SessionStore::new("test", capacity);
        let tokens: Vec<SessionToken> = (0..=capacity).map(|i| store.remember(i)).collect();

        assert_eq!(store.lookup(tokens[0].as_str()), None);
        for (i, token) in tokens.iter().enumerate().skip(1) {
            assert_eq!(store.lookup(token.as_str()), Some(i));
        }
        assert_eq!(store.len(), capacity);
    }

    #[test]
    fn test_reads_do_not_refresh_entries() {
        let store = SessionStore::new("test", 2);
        let first = store.remember("a");
        let _second = store.remember("b");

        assert_eq!(store.lookup(first.as_str()), Some("a"));
        let _third = store.remember("c");

        assert_eq!(store.lookup(first.as_str()), None);
    }

    #[test]
    fn test_zero_capacity_keeps_latest_entry() {
        let store = SessionStore::new("test", 0);
        let a = store.remember("a");
        let b = store.remember("b");

        assert_eq!(store.capacity(), 1);
        assert_eq!(store.lookup(a.as_str()), None);
        assert_eq!(store.lookup(b.as_str()), Some("b"));
    }

    #[test]
    fn test_concurrent_inserts_respect_capacity() {
        let store = Arc::new(SessionStore::new("test", 50));
        let handles: Vec<_> = (0..8)
            .map(|thread| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..100)
                        .map(|i| store.remember(thread * 1000 + i))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let tokens: Vec<SessionToken> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(store.len(), 50);
        let resolvable = tokens
            .iter()
            .filter(|token| store.lookup(token.as_str()).is_some())
            .count();
        assert_eq!(resolvable, 50);
    }
}
