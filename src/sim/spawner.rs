//! Reward coin batches
//!
//! A payout becomes a one-shot stream of coin drops: one per interval, capped
//! so a jackpot cannot flood the simulation. Only the spawn count is capped,
//! the payout shown to the player is not.

use serde::{Deserialize, Serialize};

use super::scheduler::{Scheduler, Task, TimerId};
use crate::error::MachineError;

/// A payout still dropping coins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBatch {
    pub timer: TimerId,
    /// Coins left to drop
    pub remaining: u32,
    /// Coins dropped so far
    pub dropped: u32,
}

/// Active reward batches, each on its own repeating timer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSpawner {
    batches: Vec<RewardBatch>,
}

/// Number of coins a payout of `amount` puts into the simulation
pub fn drop_count(amount: u32, physical_cap: u32) -> u32 {
    amount.min(physical_cap)
}

impl BatchSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> &[RewardBatch] {
        &self.batches
    }

    pub fn is_idle(&self) -> bool {
        self.batches.is_empty()
    }

    /// Coins still owed across every batch
    pub fn coins_pending(&self) -> u32 {
        self.batches.iter().map(|b| b.remaining).sum()
    }

    /// Start dropping coins for a payout of `amount`
    ///
    /// Returns how many coins will drop. Nothing is scheduled for zero.
    pub fn spawn_batch(
        &mut self,
        scheduler: &mut Scheduler,
        amount: i64,
        physical_cap: u32,
        interval_ms: u32,
    ) -> Result<u32, MachineError> {
        if amount < 0 {
            return Err(MachineError::InvalidArgument {
                name: "amount",
                reason: format!("payout {amount} is negative"),
            });
        }
        let amount = u32::try_from(amount).unwrap_or(u32::MAX);
        let count = drop_count(amount, physical_cap);
        if count == 0 {
            return Ok(0);
        }

        let timer = scheduler.every(u64::from(interval_ms), Task::DropRewardCoin);
        self.batches.push(RewardBatch {
            timer,
            remaining: count,
            dropped: 0,
        });
        log::debug!(
            "Reward batch {:?}: {} coins for payout {} every {}ms",
            timer,
            count,
            amount,
            interval_ms
        );
        Ok(count)
    }

    /// Handle one firing of a batch timer
    ///
    /// Returns true when the caller should drop a coin now. The timer is
    /// cancelled as soon as the batch's last coin is handed out.
    pub fn take_drop(&mut self, scheduler: &mut Scheduler, timer: TimerId) -> bool {
        let Some(index) = self.batches.iter().position(|b| b.timer == timer) else {
            // Stale firing for a batch that already finished
            scheduler.cancel(timer);
            return false;
        };

        let batch = &mut self.batches[index];
        batch.remaining -= 1;
        batch.dropped += 1;
        if batch.remaining == 0 {
            scheduler.cancel(timer);
            log::debug!("Reward batch {:?} finished ({} coins)", timer, batch.dropped);
            self.batches.remove(index);
        }
        true
    }
}
