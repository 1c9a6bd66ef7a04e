//! Spin state machine
//!
//! Idle -> Spinning -> Revealing -> Idle. Only `Idle` accepts a new spin;
//! a trigger in any other phase is dropped. A started spin always runs to
//! its reveal, there is no abort path.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::reward::{RewardTable, SpinOutcome, resolve_with_rng};
use super::scheduler::{Scheduler, Task, TimerId};

/// Current phase of the slot machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpinPhase {
    /// Ready for a coin
    #[default]
    Idle,
    /// Reels spinning, waiting for the reveal timer
    Spinning { started_at_ms: u64, reveal_timer: TimerId },
    /// Outcome resolved, not yet applied
    Revealing { outcome: SpinOutcome },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpinSequencer {
    phase: SpinPhase,
    /// Most recent resolved outcome
    last_outcome: Option<SpinOutcome>,
}

impl SpinSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    /// Guard against overlapping spins
    pub fn is_spinning(&self) -> bool {
        self.phase != SpinPhase::Idle
    }

    pub fn last_outcome(&self) -> Option<SpinOutcome> {
        self.last_outcome
    }

    /// Start a spin if the machine is idle, arming the reveal timer
    pub fn try_begin(&mut self, scheduler: &mut Scheduler, spin_duration_ms: u32) -> bool {
        if self.is_spinning() {
            log::debug!("Spin ignored, machine busy ({:?})", self.phase);
            return false;
        }
        let reveal_timer = scheduler.after(u64::from(spin_duration_ms), Task::RevealSpin);
        self.phase = SpinPhase::Spinning {
            started_at_ms: scheduler.now_ms(),
            reveal_timer,
        };
        true
    }

    /// Stop the reels: resolve the pending spin exactly once
    ///
    /// Returns `None` if `timer` is not the pending reveal.
    pub fn reveal<R: Rng>(
        &mut self,
        timer: TimerId,
        table: &RewardTable,
        win_rate: f64,
        rng: &mut R,
    ) -> Option<SpinOutcome> {
        match self.phase {
            SpinPhase::Spinning { reveal_timer, .. } if reveal_timer == timer => {
                let outcome = resolve_with_rng(table, win_rate, rng);
                self.phase = SpinPhase::Revealing { outcome };
                self.last_outcome = Some(outcome);
                Some(outcome)
            }
            _ => {
                log::warn!("Unexpected reveal {:?} in phase {:?}", timer, self.phase);
                None
            }
        }
    }

    /// Return to idle so the next coin can spin
    pub fn finish(&mut self) {
        self.phase = SpinPhase::Idle;
    }
}
