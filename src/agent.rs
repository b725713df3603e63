//! Atomic publication of validated configuration snapshots.
//!
//! A single writer loads and validates a fresh value, then swaps it in with
//! [`Agent::set`], or runs both steps under the writer lock with
//! [`Agent::reload`]. Readers call [`Agent::get`] and keep the `Arc` they receive
//! for as long as they need a consistent view.

use arc_swap::ArcSwapOption;
use std::sync::{Arc, Mutex, PoisonError};

/// Holder of the last successfully published snapshot.
pub struct Agent<T> {
    current: ArcSwapOption<T>,
    writer: Mutex<()>,
}

impl<T> Agent<T> {
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            writer: Mutex::new(()),
        }
    }

    /// The current snapshot, or `None` if nothing was published yet.
    pub fn get(&self) -> Option<Arc<T>> {
        self.current.load_full()
    }

    /// Publish a new snapshot, replacing the previous one.
    pub fn set(&self, value: T) {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.current.store(Some(Arc::new(value)));
    }

    /// Build a snapshot with `load` and publish it if it succeeds.
    ///
    /// Reloads are serialized, so snapshots are published in the order their
    /// loads ran. On error the current snapshot is left in place.
    pub fn reload<E>(&self, load: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        // The guarded state is `()`, so a poisoned lock carries nothing stale.
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let value = Arc::new(load()?);
        self.current.store(Some(Arc::clone(&value)));
        Ok(value)
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }
}

impl<T> Default for Agent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Agent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readers_keep_old_snapshot() {
        let agent = Agent::new();
        assert!(agent.get().is_none());

        agent.set(vec![1, 2, 3]);
        let before = agent.get().unwrap();
        agent.set(vec![4]);

        assert_eq!(*before, vec![1, 2, 3]);
        assert_eq!(*agent.get().unwrap(), vec![4]);
    }

    #[test]
    fn test_failed_reload_keeps_snapshot() {
        let agent = Agent::new();
        agent.reload(|| Ok::<_, String>(1)).unwrap();
        let err = agent.reload(|| Err::<i32, _>("bad".to_string())).unwrap_err();
        assert_eq!(err, "bad");
        assert_eq!(*agent.get().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_reloads_do_not_overlap() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::Duration;

        let agent = Arc::new(Agent::new());
        let active = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let agent = Arc::clone(&agent);
                let active = Arc::clone(&active);
                std::thread::spawn(move || {
                    agent
                        .reload(|| {
                            assert_eq!(active.fetch_add(1, Ordering::SeqCst), 0);
                            std::thread::sleep(Duration::from_millis(10));
                            active.fetch_sub(1, Ordering::SeqCst);
                            Ok::<_, String>(i)
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(agent.get().is_some());
    }
}
