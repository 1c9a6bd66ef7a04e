//! Machine state and the operations that drive it
//!
//! Everything that used to be a page-level global (the spin guard, the coin
//! list) is a field here, so several machines can run side by side.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::coins::{CoinOrigin, CoinTracker};
use super::layout::{Playfield, Pusher};
use super::reward::{RewardTier, SpinOutcome};
use super::scheduler::{Scheduler, Task, TimerId};
use super::sequencer::SpinSequencer;
use super::spawner::BatchSpawner;
use super::world::{OutcomeDisplay, PhysicsWorld};
use crate::error::MachineError;
use crate::settings::MachineConfig;

/// Running totals for the HUD
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub spins: u32,
    pub wins: u32,
    pub jackpots: u32,
    /// Sum of displayed payouts (never capped)
    pub total_payout: u64,
    pub coins_inserted: u32,
    pub reward_coins_dropped: u32,
    pub coins_pruned: u32,
}

/// One coin pusher cabinet
#[derive(Debug, Clone)]
pub struct Machine {
    /// Seed for reproducibility
    pub seed: u64,
    pub config: MachineConfig,
    pub field: Playfield,
    pub pusher: Pusher,
    pub coins: CoinTracker,
    pub sequencer: SpinSequencer,
    pub spawner: BatchSpawner,
    pub scheduler: Scheduler,
    pub stats: SessionStats,
    rng: Pcg32,
}

impl Machine {
    /// Create an empty machine; call `start` to lay out the initial pile
    pub fn new(config: MachineConfig, field: Playfield, seed: u64) -> Result<Self, MachineError> {
        config.validate()?;
        Ok(Self {
            seed,
            pusher: Pusher::new(config.pusher_speed),
            config,
            field,
            coins: CoinTracker::new(),
            sequencer: SpinSequencer::new(),
            spawner: BatchSpawner::new(),
            scheduler: Scheduler::new(),
            stats: SessionStats::default(),
            rng: Pcg32::seed_from_u64(seed),
        })
    }

    /// Fill the decks and place the pusher
    pub fn start<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        self.coins.fill_initial(
            world,
            &self.field,
            &self.config.material,
            self.config.initial_upper_coins,
            self.config.initial_lower_coins,
            &mut self.rng,
        );
        world.set_pusher_position(self.pusher.position(&self.field));
        log::info!(
            "Machine started ({} variant, seed {})",
            self.config.variant.as_str(),
            self.seed
        );
    }

    /// Player inserts a coin: drop it and spin, unless a spin is running
    ///
    /// Returns false (and changes nothing) while the reels are busy.
    pub fn insert_coin<W: PhysicsWorld + ?Sized, D: OutcomeDisplay + ?Sized>(
        &mut self,
        world: &mut W,
        display: &mut D,
    ) -> bool {
        if !self
            .sequencer
            .try_begin(&mut self.scheduler, self.config.spin_duration_ms)
        {
            return false;
        }

        let pos = self.field.insert_drop_point(&mut self.rng);
        if self
            .coins
            .insert(world, pos, &self.config.material, CoinOrigin::Inserted)
            .is_some()
        {
            self.stats.coins_inserted += 1;
        }
        self.stats.spins += 1;
        display.show_spinning();
        log::info!("Coin inserted at x={:.0}, spin #{}", pos.x, self.stats.spins);
        true
    }

    /// Schedule the reward coins for a payout
    pub fn spawn_batch(&mut self, amount: i64) -> Result<u32, MachineError> {
        self.spawner.spawn_batch(
            &mut self.scheduler,
            amount,
            self.config.physical_cap,
            self.config.drop_interval_ms,
        )
    }

    /// Run one timer firing
    pub fn handle_task<W: PhysicsWorld + ?Sized, D: OutcomeDisplay + ?Sized>(
        &mut self,
        world: &mut W,
        display: &mut D,
        timer: TimerId,
        task: Task,
    ) {
        match task {
            Task::RevealSpin => self.reveal(display, timer),
            Task::DropRewardCoin => self.drop_reward_coin(world, timer),
        }
    }

    fn reveal<D: OutcomeDisplay + ?Sized>(&mut self, display: &mut D, timer: TimerId) {
        let Some(outcome) = self.sequencer.reveal(
            timer,
            &self.config.rewards,
            self.config.win_rate,
            &mut self.rng,
        ) else {
            return;
        };
        // Guard resets before anything can fail
        self.sequencer.finish();
        self.record(&outcome);

        if let Err(e) = display.display_outcome(&outcome) {
            log::warn!("{}", e);
        }

        if outcome.won {
            match self.spawn_batch(i64::from(outcome.payout)) {
                Ok(count) => log::info!(
                    "{} win! payout {} ({} coins)",
                    outcome.tier.as_str(),
                    outcome.payout,
                    count
                ),
                Err(e) => log::error!("Reward batch rejected: {}", e),
            }
        } else {
            log::info!("No win");
        }
    }

    fn record(&mut self, outcome: &SpinOutcome) {
        if outcome.won {
            self.stats.wins += 1;
            self.stats.total_payout += u64::from(outcome.payout);
        }
        if outcome.tier == RewardTier::Jackpot {
            self.stats.jackpots += 1;
        }
    }

    fn drop_reward_coin<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, timer: TimerId) {
        if !self.spawner.take_drop(&mut self.scheduler, timer) {
            return;
        }
        let pos = self.field.reward_drop_point(&mut self.rng);
        if self
            .coins
            .insert(world, pos, &self.config.material, CoinOrigin::Reward)
            .is_some()
        {
            self.stats.reward_coins_dropped += 1;
        }
    }

    /// Release coins that fell off the ledge
    pub fn prune<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> u32 {
        let limit = self.field.ledge_y(self.config.prune_margin);
        let pruned = self.coins.prune(world, limit);
        self.stats.coins_pruned += pruned;
        pruned
    }

    /// The window changed size
    pub fn resize(&mut self, field: Playfield) {
        log::info!(
            "Playfield resized: {:.0}x{:.0} -> {:.0}x{:.0}",
            self.field.width,
            self.field.height,
            field.width,
            field.height
        );
        self.field = field;
    }

    /// Release every coin and start over with a new seed
    ///
    /// Pending timers are discarded, so a spin in flight never reveals.
    pub fn reset<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, seed: u64) {
        self.coins.clear(world);
        self.sequencer = SpinSequencer::new();
        self.spawner = BatchSpawner::new();
        self.scheduler = Scheduler::new();
        self.stats = SessionStats::default();
        self.pusher = Pusher::new(self.config.pusher_speed);
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.start(world);
    }
}
