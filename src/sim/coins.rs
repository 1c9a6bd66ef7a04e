//! Coin bookkeeping
//!
//! The tracker owns the list of live coins; the physics world owns their
//! bodies. A coin and its body always leave together.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::layout::Playfield;
use super::world::{BodyHandle, CoinMaterial, PhysicsWorld};

/// Why a coin entered the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinOrigin {
    /// Placed on the decks when the machine starts
    InitialFill,
    /// Inserted by the player
    Inserted,
    /// Dropped by a slot machine payout
    Reward,
}

/// A tracked coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    /// Body in the physics world (lookup only)
    pub body: BodyHandle,
    pub origin: CoinOrigin,
    /// Position at the last sync with the world
    pub pos: Vec2,
}

/// Live coins, in insertion order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinTracker {
    coins: Vec<Coin>,
    next_id: u32,
}

impl Default for CoinTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinTracker {
    pub fn new() -> Self {
        Self {
            coins: Vec::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.coins.iter()
    }

    /// Create a body at `pos` and start tracking it
    ///
    /// Nothing is tracked when the world refuses the body.
    pub fn insert<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        pos: Vec2,
        material: &CoinMaterial,
        origin: CoinOrigin,
    ) -> Option<&Coin> {
        let Some(body) = world.create_body(pos, material) else {
            log::warn!(
                "World refused a {:?} coin at ({:.0}, {:.0}), skipping it",
                origin,
                pos.x,
                pos.y
            );
            return None;
        };
        let id = self.next_id;
        self.next_id += 1;
        self.coins.push(Coin {
            id,
            body,
            origin,
            pos,
        });
        self.coins.last()
    }

    /// Scatter the starting pile over both decks
    pub fn fill_initial<W: PhysicsWorld + ?Sized, R: Rng>(
        &mut self,
        world: &mut W,
        field: &Playfield,
        material: &CoinMaterial,
        upper: u32,
        lower: u32,
        rng: &mut R,
    ) {
        for _ in 0..upper {
            let pos = field.upper_deck_point(rng);
            self.insert(world, pos, material, CoinOrigin::InitialFill);
        }
        for _ in 0..lower {
            let pos = field.lower_deck_point(rng);
            self.insert(world, pos, material, CoinOrigin::InitialFill);
        }
        log::info!("Initial fill: {} upper + {} lower coins", upper, lower);
    }

    /// Release every coin below `limit_y`, returning how many left
    ///
    /// One pass over the list: each coin is looked at exactly once, whatever
    /// is removed around it. A coin whose body the world no longer knows is
    /// dropped without a destroy call.
    pub fn prune<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, limit_y: f32) -> u32 {
        let mut pruned = 0;
        self.coins.retain_mut(|coin| match world.body_position(coin.body) {
            Some(pos) if pos.y > limit_y => {
                world.destroy_body(coin.body);
                pruned += 1;
                false
            }
            Some(pos) => {
                coin.pos = pos;
                true
            }
            None => {
                log::debug!("Coin {} lost its body, untracking", coin.id);
                pruned += 1;
                false
            }
        });
        if pruned > 0 {
            log::debug!("Pruned {} coins, {} remain", pruned, self.coins.len());
        }
        pruned
    }

    /// Release every coin (machine reset)
    pub fn clear<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        for coin in self.coins.drain(..) {
            world.destroy_body(coin.body);
        }
    }
}
