//! Playfield geometry
//!
//! Screen coordinates: x grows right, y grows down toward the ledge. The
//! upper deck is a narrow strip between two side guards where the pusher
//! sweeps; the lower deck spans the full width and ends at the ledge.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Axis-aligned rectangle given by its centre and size (host engines build
/// static bodies this way)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

/// Playfield dimensions and derived regions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Fit the playfield into a browser window
    pub fn from_window(window_width: f32, window_height: f32) -> Self {
        Self::new(
            window_width.min(MAX_PLAYFIELD_WIDTH),
            window_height * PLAYFIELD_HEIGHT_SHARE,
        )
    }

    pub fn upper_width(&self) -> f32 {
        self.width * UPPER_DECK_SHARE
    }

    /// Width of each side guard
    pub fn guard_width(&self) -> f32 {
        (self.width - self.upper_width()) / 2.0
    }

    /// Left and right side guards
    pub fn guards(&self) -> [Rect; 2] {
        let guard = self.guard_width();
        let size = Vec2::new(guard, self.height * GUARD_HEIGHT_SHARE);
        let y = size.y / 2.0;
        [
            Rect {
                center: Vec2::new(guard / 2.0, y),
                size,
            },
            Rect {
                center: Vec2::new(self.width - guard / 2.0, y),
                size,
            },
        ]
    }

    /// Coins below this line have left the playfield
    pub fn ledge_y(&self, margin: f32) -> f32 {
        self.height + margin
    }

    /// Random x in the left or right inner lane, just inside a guard
    pub fn inner_drop_x<R: Rng>(&self, rng: &mut R) -> f32 {
        let guard = self.guard_width();
        let spread = rng.random::<f32>() * INNER_LANE_SPREAD;
        if rng.random::<f32>() > 0.5 {
            guard + INNER_LANE_INSET + spread
        } else {
            self.width - guard - INNER_LANE_INSET - spread
        }
    }

    /// Where an inserted coin starts
    pub fn insert_drop_point<R: Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(self.inner_drop_x(rng), self.height * INSERT_DROP_SHARE)
    }

    /// Where a reward coin starts
    pub fn reward_drop_point<R: Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(self.inner_drop_x(rng), REWARD_DROP_Y)
    }

    /// Random point on the upper deck, between the guards
    pub fn upper_deck_point<R: Rng>(&self, rng: &mut R) -> Vec2 {
        let guard = self.guard_width();
        Vec2::new(
            random_between(rng, guard + 20.0, self.width - guard - 20.0),
            random_between(rng, self.height * 0.15, self.height * 0.4),
        )
    }

    /// Random point on the lower (full width) deck
    pub fn lower_deck_point<R: Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            random_between(rng, 20.0, self.width - 20.0),
            random_between(rng, self.height * 0.5, self.height * 0.9),
        )
    }
}

/// Uniform in [lo, hi], tolerating a degenerate range on tiny playfields
fn random_between<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        return lo;
    }
    lo + rng.random::<f32>() * (hi - lo)
}

/// The kinematic pusher sweeping the upper deck
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pusher {
    /// Oscillation phase (radians)
    pub phase: f32,
    /// Phase advance (radians per second)
    pub speed: f32,
}

impl Pusher {
    pub fn new(speed: f32) -> Self {
        Self { phase: 0.0, speed }
    }

    /// Advance the oscillation by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.phase = (self.phase + self.speed * dt) % std::f32::consts::TAU;
    }

    /// Centre of the pusher for the current phase
    pub fn position(&self, field: &Playfield) -> Vec2 {
        let y = field.height * PUSHER_REST_SHARE + self.phase.sin() * field.height * PUSHER_SWING_SHARE;
        Vec2::new(field.width / 2.0, y)
    }

    /// Pusher body size
    pub fn size(&self, field: &Playfield) -> Vec2 {
        Vec2::new(field.upper_width() - PUSHER_SIDE_GAP, PUSHER_HEIGHT)
    }
}
