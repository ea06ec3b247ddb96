//! Timer APIs
//!
//! One-shot `setTimeout` equivalents driven by the document timeline
//! instead of the wall clock. Owners poll `take_due` after the host
//! advances time.

use std::collections::HashMap;

/// Handle returned by `schedule`, used to cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u32);

#[derive(Debug)]
struct Timer<T> {
    due_ms: f64,
    task: T,
}

/// Pending one-shot timers carrying a task payload
#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u32,
    timers: HashMap<TimerHandle, Timer<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            timers: HashMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: f64, delay_ms: u64, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.insert(
            handle,
            Timer {
                due_ms: now_ms + delay_ms as f64,
                task,
            },
        );
        handle
    }

    /// Cancel a timer; returns false if it already fired or was cancelled
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.timers.remove(&handle).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }

    pub fn has_pending(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Remove and return every task due at `now_ms`, earliest first.
    /// Timers due at the same instant fire in scheduling order.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<T> {
        let mut due: Vec<(f64, TimerHandle)> = self
            .timers
            .iter()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .map(|(h, t)| (t.due_ms, *h))
            .collect();
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        due.into_iter()
            .filter_map(|(_, handle)| self.timers.remove(&handle))
            .map(|t| t.task)
            .collect()
    }

    /// Time until the next timer fires
    pub fn time_until_next(&self, now_ms: f64) -> Option<f64> {
        self.timers
            .values()
            .map(|t| (t.due_ms - now_ms).max(0.0))
            .min_by(f64::total_cmp)
    }
}
