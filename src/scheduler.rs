//! Single-threaded delayed-callback queue for the UI loop.
//!
//! The egui loop has no `after(ms, callback)`; instead each frame asks the
//! scheduler which ticks are due, runs them, and requests a repaint at the
//! next deadline. Times are passed in explicitly so the queue is testable
//! without sleeping.
//!
//! After `cancel_all()` the queue is empty and refuses new entries, so
//! nothing fires after teardown.

use std::time::{Duration, Instant};

#[derive(Debug)]
struct Entry<T> {
    due: Instant,
    seq: u64,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_seq: u64,
    cancelled: bool,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
            cancelled: false,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to fire `delay` after `now`. Ignored once cancelled.
    pub fn schedule(&mut self, now: Instant, delay: Duration, task: T) -> bool {
        if self.cancelled {
            return false;
        }
        self.entries.push(Entry {
            due: now + delay,
            seq: self.next_seq,
            task,
        });
        self.next_seq += 1;
        true
    }

    /// Remove and return every task due at `now`, earliest first
    /// (equal deadlines in scheduling order).
    ///
    /// Tasks scheduled while handling the batch wait for the next call.
    pub fn take_due(&mut self, now: Instant) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) = self.entries.drain(..).partition(|e| e.due <= now);
        self.entries = pending;
        due.sort_by_key(|e| (e.due, e.seq));
        due.into_iter().map(|e| e.task).collect()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_deadline_where(|_| true)
    }

    /// Earliest pending deadline among tasks matching `keep`
    pub fn next_deadline_where(&self, keep: impl Fn(&T) -> bool) -> Option<Instant> {
        self.entries.iter().filter(|e| keep(&e.task)).map(|e| e.due).min()
    }

    /// Drop every pending task and refuse new ones.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
        self.cancelled = true;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    /// Test: Due ordering
    /// Validates: only due tasks returned, earliest first, FIFO on ties
    #[test]
    fn test_take_due_order() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();

        s.schedule(t0, 200 * MS, "load");
        s.schedule(t0, 10 * MS, "collect");
        s.schedule(t0, 10 * MS, "collect-2");
        s.schedule(t0, 100 * MS, "play");

        assert!(s.take_due(t0).is_empty());
        assert_eq!(s.take_due(t0 + 100 * MS), vec!["collect", "collect-2", "play"]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.next_deadline(), Some(t0 + 200 * MS));
    }

    /// Test: Zero delay reschedule
    /// Validates: a task re-queued at the same instant does not fire in the same batch
    #[test]
    fn test_reschedule_waits_for_next_batch() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(t0, Duration::ZERO, 1);

        let batch = s.take_due(t0);
        assert_eq!(batch, vec![1]);
        s.schedule(t0, Duration::ZERO, 2);

        assert_eq!(s.len(), 1);
        assert_eq!(s.take_due(t0), vec![2]);
    }

    /// Test: Cancellation
    /// Validates: pending tasks dropped, later schedules refused
    #[test]
    fn test_cancel_all() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(t0, MS, ());

        s.cancel_all();
        assert!(s.is_empty());
        assert!(!s.schedule(t0, MS, ()));
        assert!(s.take_due(t0 + 10 * MS).is_empty());
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn test_next_deadline_where() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(t0, 10 * MS, "collect");
        s.schedule(t0, 66 * MS, "play");

        assert_eq!(s.next_deadline(), Some(t0 + 10 * MS));
        assert_eq!(s.next_deadline_where(|t| *t != "collect"), Some(t0 + 66 * MS));
        assert_eq!(s.next_deadline_where(|t| *t == "load"), None);
    }
}
