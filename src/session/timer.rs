//! Deferred transitions tagged with the session that scheduled them
//!
//! A restart bumps the generation, so a transition scheduled by a superseded
//! session can never fire into the session started afterwards. Time is passed
//! in by the caller's event loop; nothing here reads the clock.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
struct Scheduled<T> {
    generation: u64,
    due: Instant,
    payload: T,
}

/// Queue of pending transitions for one test-run owner
#[derive(Clone, Debug)]
pub struct DeferredTransitions<T> {
    generation: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> DeferredTransitions<T> {
    pub fn new() -> Self {
        DeferredTransitions {
            generation: 0,
            pending: Vec::new(),
        }
    }

    /// Current session generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Schedule `payload` to fire `delay` after `now`, tagged with the current generation
    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) {
        self.pending.push(Scheduled {
            generation: self.generation,
            due: now + delay,
            payload,
        });
    }

    /// Supersede the current session: everything scheduled so far is dropped
    pub fn cancel_all(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending.clear();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.iter().any(|s| s.generation == self.generation)
    }

    /// Take the earliest transition due at `now`, discarding stale ones
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let generation = self.generation;
        self.pending.retain(|s| s.generation == generation);

        let (index, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= now)
            .min_by_key(|(_, s)| s.due)?;

        Some(self.pending.remove(index).payload)
    }
}

impl<T> Default for DeferredTransitions<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_when_due() {
        let t0 = Instant::now();
        let mut q = DeferredTransitions::new();
        q.schedule(t0, Duration::from_millis(500), "advance");

        assert_eq!(q.poll(t0), None);
        assert_eq!(q.poll(t0 + Duration::from_millis(499)), None);
        assert!(q.is_pending());
        assert_eq!(q.poll(t0 + Duration::from_millis(500)), Some("advance"));
        assert!(!q.is_pending());
        assert_eq!(q.poll(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_cancel_supersedes_session() {
        let t0 = Instant::now();
        let mut q = DeferredTransitions::new();
        q.schedule(t0, Duration::from_millis(100), 1);
        let before = q.generation();
        q.cancel_all();
        assert_ne!(q.generation(), before);
        assert_eq!(q.poll(t0 + Duration::from_secs(1)), None);

        q.schedule(t0, Duration::from_millis(100), 2);
        assert_eq!(q.poll(t0 + Duration::from_secs(1)), Some(2));
    }

    #[test]
    fn test_earliest_first() {
        let t0 = Instant::now();
        let mut q = DeferredTransitions::new();
        q.schedule(t0, Duration::from_millis(300), 'b');
        q.schedule(t0, Duration::from_millis(100), 'a');
        let later = t0 + Duration::from_secs(1);
        assert_eq!(q.poll(later), Some('a'));
        assert_eq!(q.poll(later), Some('b'));
    }
}
