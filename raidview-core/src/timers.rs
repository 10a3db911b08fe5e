//! Cancellable scheduled tasks on a virtual clock
//!
//! Models the host's timeout facility. Time only moves when the owner
//! advances it, so delayed behavior is fully deterministic.
//!
//! Global invariants enforced:
//! - A cancelled timer never fires
//! - Due timers fire in deadline order; equal deadlines fire in scheduling order
//! - Each timer fires at most once

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Work to perform when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    HideTooltip,
    AnimateProgress,
}

#[derive(Debug, Clone)]
struct Scheduled {
    id: TimerId,
    due_ms: u64,
    task: Task,
}

/// Virtual-clock timer queue
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now_ms: u64,
    next_id: u64,
    pending: Vec<Scheduled>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, delay_ms: u64, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            id,
            due_ms: self.now_ms.saturating_add(delay_ms),
            task,
        });
        id
    }

    /// Cancel a pending timer; returns false if it already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|s| s.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Deadline of a pending timer
    pub fn due_at(&self, id: TimerId) -> Option<u64> {
        self.pending.iter().find(|s| s.id == id).map(|s| s.due_ms)
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to its deadline.
    ///
    /// Callers loop on this so tasks scheduled by a fired task are honored
    /// within the same advance.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, Task)> {
        let position = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_ms <= until_ms)
            .min_by_key(|(_, s)| (s.due_ms, s.id))
            .map(|(i, _)| i)?;
        let fired = self.pending.remove(position);
        self.now_ms = self.now_ms.max(fired.due_ms);
        Some((fired.id, fired.task))
    }

    /// Move the clock forward to `until` once all due timers are drained
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    /// Advance by `ms`, returning every task that came due
    pub fn advance(&mut self, ms: u64) -> Vec<(TimerId, Task)> {
        let until = self.now_ms.saturating_add(ms);
        let mut fired = Vec::new();
        while let Some(entry) = self.pop_due(until) {
            fired.push(entry);
        }
        self.settle(until);
        fired
    }
}
