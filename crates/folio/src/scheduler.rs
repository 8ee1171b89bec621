//! Scheduler
//!
//! Virtual-clock timer queue for every deferred action (focus delays,
//! debounced resize, simulated deliveries, auto-close, toast expiry).
//! Each scheduling call returns a handle that can cancel the task before
//! it fires. Time only moves when the host advances it.

use folio_dom::NodeId;

use crate::submission::SubmissionId;

/// Cancellation token for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// Deferred work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Move focus into the chat form once the panel has settled
    FocusChatInput,
    /// Resize burst is over
    ResizeSettled,
    /// Trailing run for scroll events the throttle rejected
    ScrollSettled,
    /// Simulated transport resolved
    Delivery(SubmissionId),
    /// Close the chat panel after a successful send
    ChatAutoClose,
    /// Start a toast's exit transition
    HideToast(NodeId),
    /// Drop a toast from the document
    RemoveToast(NodeId),
}

#[derive(Debug, Clone)]
struct Scheduled {
    handle: TaskHandle,
    due_at: u64,
    task: Task,
}

/// Timer queue
#[derive(Debug, Default)]
pub struct Scheduler {
    /// Current time (ms)
    now: u64,
    next_id: u64,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time (ms since the scheduler started)
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Run `task` once `delay_ms` have elapsed
    pub fn schedule(&mut self, delay_ms: u64, task: Task) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            handle,
            due_at: self.now + delay_ms,
            task,
        });
        handle
    }

    /// Cancel a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.handle != handle);
        before != self.pending.len()
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|s| s.handle == handle)
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Pop the earliest task due at or before `deadline`, moving the clock
    /// to its due time. Ties run in scheduling order.
    pub fn next_due(&mut self, deadline: u64) -> Option<(TaskHandle, Task)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_at <= deadline)
            .min_by_key(|(_, s)| (s.due_at, s.handle))
            .map(|(i, _)| i)?;
        let scheduled = self.pending.remove(index);
        self.now = self.now.max(scheduled.due_at);
        Some((scheduled.handle, scheduled.task))
    }

    /// Move the clock forward to `deadline` (never backwards)
    pub fn finish_at(&mut self, deadline: u64) {
        self.now = self.now.max(deadline);
    }

    /// Advance by `delta_ms` and return every task that came due, in order.
    ///
    /// Tasks scheduled while the caller processes the result are not
    /// included; use `next_due` in a loop when tasks can schedule tasks.
    pub fn advance(&mut self, delta_ms: u64) -> Vec<(TaskHandle, Task)> {
        let deadline = self.now + delta_ms;
        let mut due = Vec::new();
        while let Some(entry) = self.next_due(deadline) {
            due.push(entry);
        }
        self.finish_at(deadline);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_fires_after_delay() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(100, Task::ChatAutoClose);

        assert!(scheduler.advance(50).is_empty());
        let due = scheduler.advance(60);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].1, Task::ChatAutoClose);
        assert_eq!(scheduler.now(), 110);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(10, Task::FocusChatInput);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(scheduler.advance(20).is_empty());
    }

    #[test]
    fn test_due_order_then_fifo() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(30, Task::ResizeSettled);
        scheduler.schedule(10, Task::FocusChatInput);
        scheduler.schedule(10, Task::ChatAutoClose);

        let order: Vec<Task> = scheduler.advance(30).into_iter().map(|(_, t)| t).collect();
        assert_eq!(order, vec![Task::FocusChatInput, Task::ChatAutoClose, Task::ResizeSettled]);
    }

    #[test]
    fn test_next_due_moves_clock_to_due_time() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(40, Task::ResizeSettled);
        assert!(scheduler.next_due(100).is_some());
        assert_eq!(scheduler.now(), 40);
        // Scheduled from inside a task: relative to the task's due time.
        scheduler.schedule(40, Task::ResizeSettled);
        assert!(scheduler.next_due(100).is_some());
        assert_eq!(scheduler.now(), 80);
        scheduler.finish_at(100);
        assert_eq!(scheduler.now(), 100);
    }
}
