//! Coin Pusher - A coin pusher arcade machine with a slot machine reward loop
//!
//! Core modules:
//! - `sim`: Deterministic machine logic (reward draws, spin sequencing, coin bookkeeping)
//! - `settings`: Machine configuration and variant presets
//! - `error`: Error type shared by the whole crate
//! - `web`: wasm-bindgen surface for a JavaScript physics host

pub mod error;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::MachineError;
pub use settings::{MachineConfig, VariantPreset};

/// Machine configuration constants
pub mod consts {
    /// Fixed simulation step in milliseconds (100 Hz, divides every timer interval)
    pub const SIM_STEP_MS: u32 = 10;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame fed to the simulation; anything slower is dropped time
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Playfield never grows wider than this (pixels)
    pub const MAX_PLAYFIELD_WIDTH: f32 = 600.0;
    /// Share of the window height the playfield occupies
    pub const PLAYFIELD_HEIGHT_SHARE: f32 = 0.65;

    /// Upper (narrow) deck width as a share of the playfield width
    pub const UPPER_DECK_SHARE: f32 = 0.6;
    /// Side guards span this share of the playfield height
    pub const GUARD_HEIGHT_SHARE: f32 = 0.6;

    /// Pusher geometry
    pub const PUSHER_HEIGHT: f32 = 60.0;
    pub const PUSHER_SIDE_GAP: f32 = 10.0;
    pub const PUSHER_REST_SHARE: f32 = 0.12;
    pub const PUSHER_SWING_SHARE: f32 = 0.08;

    /// Coin diameter (pixels)
    pub const COIN_SIZE: f32 = 18.0;

    /// Inserted coins land this far inside a guard, plus up to `INNER_LANE_SPREAD`
    pub const INNER_LANE_INSET: f32 = 20.0;
    pub const INNER_LANE_SPREAD: f32 = 40.0;
    /// Inserted coins drop from this share of the playfield height
    pub const INSERT_DROP_SHARE: f32 = 0.05;
    /// Reward coins drop from this fixed height
    pub const REWARD_DROP_Y: f32 = 50.0;
}
