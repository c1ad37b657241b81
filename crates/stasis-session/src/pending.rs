//! Pending TTL renewals awaiting the next flush.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Renewal requests queued between flushes, keyed by session id.
///
/// Many tasks may `put` concurrently while one flusher drains. A second
/// `put` for the same session before a flush overwrites the TTL, so each
/// session is renewed at most once per flush. The lock is held only for a
/// single insert or remove and never across an `.await`.
#[derive(Debug, Default)]
pub struct PendingRenewals {
    entries: Mutex<HashMap<String, u64>>,
}

impl PendingRenewals {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a renewal, replacing any pending TTL for the same session.
    pub fn put(&self, session_id: &str, ttl_secs: u64) {
        self.entries.lock().insert(session_id.to_string(), ttl_secs);
    }

    /// Remove and return one arbitrary entry.
    ///
    /// Drain order is unspecified.
    pub fn drain_one(&self) -> Option<(String, u64)> {
        let mut entries = self.entries.lock();
        let key = entries.keys().next()?.clone();
        entries.remove_entry(&key)
    }

    /// Pending TTL for a session, if queued.
    pub fn get(&self, session_id: &str) -> Option<u64> {
        self.entries.lock().get(session_id).copied()
    }

    /// Whether a renewal is queued for the session.
    pub fn contains(&self, session_id: &str) -> bool {
        self.entries.lock().contains_key(session_id)
    }

    /// Number of queued renewals.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_put_overwrites() {
        let pending = PendingRenewals::new();
        pending.put("session-1", 30);
        pending.put("session-1", 60);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending.get("session-1"), Some(60));
    }

    #[test]
    fn test_drain_until_empty() {
        let pending = PendingRenewals::new();
        pending.put("session-1", 30);
        pending.put("session-2", 40);
        pending.put("session-3", 50);

        let mut drained = HashSet::new();
        while let Some((id, ttl)) = pending.drain_one() {
            drained.insert((id, ttl));
        }

        assert_eq!(drained.len(), 3);
        assert!(drained.contains(&("session-2".to_string(), 40)));
        assert!(pending.is_empty());
        assert!(pending.drain_one().is_none());
    }

    #[test]
    fn test_concurrent_puts_are_not_lost() {
        let pending = Arc::new(PendingRenewals::new());
        let drained = Arc::new(Mutex::new(HashSet::new()));

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let pending = Arc::clone(&pending);
                thread::spawn(move || {
                    for i in 0..250 {
                        pending.put(&format!("session-{t}-{i}"), 60);
                    }
                })
            })
            .collect();

        let drainer = {
            let pending = Arc::clone(&pending);
            let drained = Arc::clone(&drained);
            thread::spawn(move || {
                for _ in 0..500 {
                    if let Some((id, _)) = pending.drain_one() {
                        drained.lock().insert(id);
                    }
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        drainer.join().unwrap();

        // Whatever the drainer did not take must still be queued.
        let mut seen = drained.lock().clone();
        while let Some((id, _)) = pending.drain_one() {
            seen.insert(id);
        }
        assert_eq!(seen.len(), 1000);
    }
}
