//! Virtual clock timers
//!
//! Every delayed step of the machine (reel reveal, reward drops) is a timer
//! here rather than a wall-clock callback, so tests can fast-forward time.
//! Timers carry a plain `Task` value; the machine decides what a task does.

use serde::{Deserialize, Serialize};

/// Identifies a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Work a timer performs when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Stop the reels and resolve the pending spin
    RevealSpin,
    /// Drop one coin of a reward batch
    DropRewardCoin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    id: TimerId,
    due_ms: u64,
    /// Re-arm interval for repeating timers
    interval_ms: Option<u64>,
    task: Task,
}

/// Single-threaded timer queue driven by `advance`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now_ms: u64,
    next_id: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    fn arm(&mut self, due_ms: u64, interval_ms: Option<u64>, task: Task) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Timer {
            id,
            due_ms,
            interval_ms,
            task,
        });
        id
    }

    /// Fire `task` once, `delay_ms` from now
    pub fn after(&mut self, delay_ms: u64, task: Task) -> TimerId {
        self.arm(self.now_ms + delay_ms, None, task)
    }

    /// Fire `task` every `interval_ms`, first one interval from now
    pub fn every(&mut self, interval_ms: u64, task: Task) -> TimerId {
        let interval_ms = interval_ms.max(1);
        self.arm(self.now_ms + interval_ms, Some(interval_ms), task)
    }

    /// Disarm a timer. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Move the clock forward, returning every firing that came due
    ///
    /// Firings are ordered by due time, then by timer id. A repeating timer
    /// can fire several times in one large step.
    pub fn advance(&mut self, dt_ms: u64) -> Vec<(TimerId, Task)> {
        let target = self.now_ms + dt_ms;
        let mut fired = Vec::new();
        while let Some(firing) = self.pop_due(target) {
            fired.push(firing);
        }
        fired
    }

    /// Move the clock forward one firing at a time
    ///
    /// Unlike `advance`, the caller handles each firing before the next one is
    /// computed, so a handler may cancel timers that are also due in this step.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, Task)> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i);

        let Some(index) = index else {
            self.now_ms = self.now_ms.max(until_ms);
            return None;
        };

        let timer = &mut self.timers[index];
        let fired = (timer.id, timer.task);
        self.now_ms = self.now_ms.max(timer.due_ms);
        match timer.interval_ms {
            Some(interval) => timer.due_ms += interval,
            None => {
                self.timers.swap_remove(index);
            }
        }
        Some(fired)
    }
}
