//! Timer scheduler on a virtual clock.
//!
//! Provides `after()` and `every()` style tasks for the engine. Time only
//! moves when the host advances it, so tests drive animations with a fake
//! clock and browser hosts forward their own timer ticks.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::Duration;

/// Handle for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// A scheduled task
#[derive(Debug)]
struct ScheduledTask<T> {
    /// When the task should run
    run_at: Duration,
    id: TaskId,
    payload: T,
    /// If Some, this is a repeating task with the given interval
    repeat_interval: Option<Duration>,
}

impl<T> PartialEq for ScheduledTask<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.run_at == other.run_at
    }
}

impl<T> Eq for ScheduledTask<T> {}

impl<T> PartialOrd for ScheduledTask<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ScheduledTask<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior (earliest first, then oldest task)
        other
            .run_at
            .cmp(&self.run_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// One due execution of a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firing<T> {
    pub id: TaskId,
    pub at: Duration,
    pub payload: T,
}

/// The scheduler that runs timed callbacks
#[derive(Debug)]
pub struct Scheduler<T> {
    tasks: BinaryHeap<ScheduledTask<T>>,
    /// Tasks not yet cancelled or completed; heap entries outside it are stale
    live: HashSet<TaskId>,
    next_id: u64,
    now: Duration,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            tasks: BinaryHeap::new(),
            live: HashSet::new(),
            next_id: 0,
            now: Duration::ZERO,
        }
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Add a one-shot task
    pub fn schedule_after(&mut self, delay: Duration, payload: T) -> TaskId {
        self.push(delay, payload, None)
    }

    /// Add a repeating task; the first run is one interval from now
    pub fn schedule_every(&mut self, interval: Duration, payload: T) -> TaskId {
        let interval = interval.max(Duration::from_millis(1));
        self.push(interval, payload, Some(interval))
    }

    fn push(&mut self, delay: Duration, payload: T, repeat_interval: Option<Duration>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        self.tasks.push(ScheduledTask {
            run_at: self.now + delay,
            id,
            payload,
            repeat_interval,
        });
        id
    }

    /// Stop a task. Returns true only for the call that actually stopped it.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.live.remove(&id)
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.live.contains(&id)
    }

    /// Number of tasks that will still fire
    pub fn active_count(&self) -> usize {
        self.live.len()
    }

    /// Check if there are pending tasks
    pub fn has_pending(&self) -> bool {
        !self.live.is_empty()
    }

    /// Get duration until next task
    pub fn time_until_next(&mut self) -> Option<Duration> {
        self.discard_stale();
        self.tasks
            .peek()
            .map(|task| task.run_at.saturating_sub(self.now))
    }

    fn discard_stale(&mut self) {
        while let Some(task) = self.tasks.peek() {
            if self.live.contains(&task.id) {
                break;
            }
            self.tasks.pop();
        }
    }

    /// Move the clock forward without running anything
    pub fn advance_clock(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

impl<T: Clone> Scheduler<T> {
    /// Pop the next task due at or before `until`, moving the clock to its
    /// run time. Repeating tasks are re-armed before they are returned, so a
    /// caller that cancels in response stops all further runs.
    pub fn pop_due(&mut self, until: Duration) -> Option<Firing<T>> {
        self.discard_stale();
        if self.tasks.peek()?.run_at > until {
            return None;
        }
        let task = self.tasks.pop()?;
        self.now = self.now.max(task.run_at);

        let firing = Firing {
            id: task.id,
            at: task.run_at,
            payload: task.payload.clone(),
        };
        let repeat_interval = task.repeat_interval;
        match repeat_interval {
            Some(interval) => self.tasks.push(ScheduledTask {
                run_at: task.run_at + interval,
                ..task
            }),
            None => {
                self.live.remove(&task.id);
            }
        }
        Some(firing)
    }

    /// Run the clock to `until`, returning every firing in order.
    pub fn advance_to(&mut self, until: Duration) -> Vec<Firing<T>> {
        let mut fired = Vec::new();
        while let Some(firing) = self.pop_due(until) {
            fired.push(firing);
        }
        self.advance_clock(until);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_after(ms(50), "once");

        assert!(scheduler.advance_to(ms(49)).is_empty());
        let fired = scheduler.advance_to(ms(100));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, id);
        assert_eq!(fired[0].at, ms(50));
        assert!(!scheduler.is_active(id));
        assert!(scheduler.advance_to(ms(1000)).is_empty());
    }

    #[test]
    fn test_repeating_until_cancelled() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_every(ms(16), ());

        let fired = scheduler.advance_to(ms(64));
        let times: Vec<_> = fired.iter().map(|f| f.at).collect();
        assert_eq!(times, [ms(16), ms(32), ms(48), ms(64)]);

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert_eq!(scheduler.active_count(), 0);
        assert!(scheduler.advance_to(ms(1000)).is_empty());
        assert_eq!(scheduler.now(), ms(1000));
    }

    #[test]
    fn test_interleaved_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_every(ms(10), 'a');
        scheduler.schedule_after(ms(15), 'b');
        scheduler.schedule_every(ms(10), 'c');

        let order: String = scheduler.advance_to(ms(20)).into_iter().map(|f| f.payload).collect();
        assert_eq!(order, "acbac");
    }

    #[test]
    fn test_cancel_inside_drain_stops_rearmed_task() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_every(ms(5), ());
        let mut runs = 0;
        while let Some(firing) = scheduler.pop_due(ms(100)) {
            runs += 1;
            if runs == 3 {
                scheduler.cancel(firing.id);
            }
        }
        assert_eq!(runs, 3);
        assert!(!scheduler.is_active(id));
        assert_eq!(scheduler.time_until_next(), None);
    }

    #[test]
    fn test_time_until_next() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(ms(30), ());
        scheduler.advance_to(ms(10));
        assert_eq!(scheduler.time_until_next(), Some(ms(20)));
    }
}
