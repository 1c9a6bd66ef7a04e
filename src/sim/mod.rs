//! Deterministic machine module
//!
//! All machine logic lives here. This module must be pure and deterministic:
//! - Virtual clock only (no wall-clock timers)
//! - Seeded RNG only
//! - Stable iteration order (coins in insertion order, timers by due time then id)
//! - No rendering or platform dependencies; physics is reached through `PhysicsWorld`

pub mod coins;
pub mod layout;
pub mod reward;
pub mod scheduler;
pub mod sequencer;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod world;

pub use coins::{Coin, CoinOrigin, CoinTracker};
pub use layout::{Playfield, Pusher, Rect};
pub use reward::{RewardTable, RewardTier, SpinOutcome, resolve, resolve_with_rng};
pub use scheduler::{Scheduler, Task, TimerId};
pub use sequencer::{SpinPhase, SpinSequencer};
pub use spawner::{BatchSpawner, RewardBatch, drop_count};
pub use state::{Machine, SessionStats};
pub use tick::{FixedStep, TickInput, TickReport, tick};
pub use world::{
    BodyHandle, CoinMaterial, HeadlessWorld, NullDisplay, OutcomeDisplay, PhysicsWorld,
    RecordingDisplay,
};
