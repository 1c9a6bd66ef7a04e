//! Host collaborators
//!
//! The machine never simulates physics or draws anything itself. It talks to
//! the host through `PhysicsWorld` (bodies and the pusher) and
//! `OutcomeDisplay` (reels and payout text).

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::reward::SpinOutcome;
use crate::consts::COIN_SIZE;
use crate::error::MachineError;

/// Opaque handle to a body owned by the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

impl BodyHandle {
    /// Handle from a host-side numeric id; only whole numbers in `u32` range
    pub fn from_host_id(id: f64) -> Option<Self> {
        if id.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&id) {
            Some(Self(id as u32))
        } else {
            None
        }
    }
}

/// Coin body tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoinMaterial {
    pub radius: f32,
    /// Bounciness
    pub restitution: f32,
    /// Lower is slicker
    pub friction: f32,
    /// Weight
    pub density: f32,
}

impl Default for CoinMaterial {
    fn default() -> Self {
        Self {
            radius: COIN_SIZE / 2.0,
            restitution: 0.3,
            friction: 0.005,
            density: 0.05,
        }
    }
}

/// Physics engine the machine runs on
pub trait PhysicsWorld {
    /// Create a circular coin body at `pos`, or `None` if the engine refused
    fn create_body(&mut self, pos: Vec2, material: &CoinMaterial) -> Option<BodyHandle>;
    /// Release a body and whatever the host draws for it
    fn destroy_body(&mut self, handle: BodyHandle);
    /// Live position, or `None` if the handle is no longer valid
    fn body_position(&self, handle: BodyHandle) -> Option<Vec2>;
    /// Move the kinematic pusher
    fn set_pusher_position(&mut self, pos: Vec2);
}

/// Where spin results are shown
pub trait OutcomeDisplay {
    /// Reels started spinning
    fn show_spinning(&mut self);
    /// Reels stopped on `outcome`
    fn display_outcome(&mut self, outcome: &SpinOutcome) -> Result<(), MachineError>;
}

/// Display that shows nothing
#[derive(Debug, Default)]
pub struct NullDisplay;

impl OutcomeDisplay for NullDisplay {
    fn show_spinning(&mut self) {}

    fn display_outcome(&mut self, _outcome: &SpinOutcome) -> Result<(), MachineError> {
        Ok(())
    }
}

/// Display that remembers every call (for headless runs and tests)
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub spins_shown: u32,
    pub outcomes: Vec<SpinOutcome>,
    /// Fail every `display_outcome` call with this message
    pub fail_with: Option<String>,
}

impl OutcomeDisplay for RecordingDisplay {
    fn show_spinning(&mut self) {
        self.spins_shown += 1;
    }

    fn display_outcome(&mut self, outcome: &SpinOutcome) -> Result<(), MachineError> {
        self.outcomes.push(*outcome);
        match &self.fail_with {
            Some(msg) => Err(MachineError::Display(msg.clone())),
            None => Ok(()),
        }
    }
}

/// Body in the headless world
#[derive(Debug, Clone, Copy)]
struct HeadlessBody {
    pos: Vec2,
    vel: Vec2,
}

/// Gravity-only world without collisions
///
/// Enough to watch coins fall off the ledge when no real engine is attached.
#[derive(Debug, Clone)]
pub struct HeadlessWorld {
    bodies: BTreeMap<BodyHandle, HeadlessBody>,
    next_handle: u32,
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    pub pusher: Vec2,
    /// Bodies released through `destroy_body`
    pub destroyed: u32,
    /// Refuse every `create_body` call
    pub reject_bodies: bool,
}

impl Default for HeadlessWorld {
    fn default() -> Self {
        Self::new(980.0)
    }
}

impl HeadlessWorld {
    pub fn new(gravity: f32) -> Self {
        Self {
            bodies: BTreeMap::new(),
            next_handle: 1,
            gravity,
            pusher: Vec2::ZERO,
            destroyed: 0,
            reject_bodies: false,
        }
    }

    /// Integrate every body by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            body.vel.y += self.gravity * dt;
            body.pos += body.vel * dt;
        }
    }

    /// Teleport a body (tests place coins past the ledge this way)
    pub fn place(&mut self, handle: BodyHandle, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.pos = pos;
            body.vel = Vec2::ZERO;
        }
    }

    /// Drop a body behind the machine's back, as a host engine might
    pub fn remove_externally(&mut self, handle: BodyHandle) {
        self.bodies.remove(&handle);
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl PhysicsWorld for HeadlessWorld {
    fn create_body(&mut self, pos: Vec2, _material: &CoinMaterial) -> Option<BodyHandle> {
        if self.reject_bodies {
            return None;
        }
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, HeadlessBody { pos, vel: Vec2::ZERO });
        Some(handle)
    }

    fn destroy_body(&mut self, handle: BodyHandle) {
        if self.bodies.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.pos)
    }

    fn set_pusher_position(&mut self, pos: Vec2) {
        self.pusher = pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_world_falls() {
        let mut world = HeadlessWorld::new(100.0);
        let handle = world
            .create_body(Vec2::new(10.0, 0.0), &CoinMaterial::default())
            .unwrap();
        world.step(1.0);
        let pos = world.body_position(handle).unwrap();
        assert!((pos.y - 100.0).abs() < 0.001);
        assert_eq!(pos.x, 10.0);
    }

    #[test]
    fn test_destroy_and_external_removal() {
        let mut world = HeadlessWorld::default();
        let a = world.create_body(Vec2::ZERO, &CoinMaterial::default()).unwrap();
        let b = world.create_body(Vec2::ZERO, &CoinMaterial::default()).unwrap();
        world.destroy_body(a);
        world.remove_externally(b);
        // Unknown handles are ignored
        world.destroy_body(b);
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.destroyed, 1);
        assert!(world.body_position(b).is_none());
    }

    #[test]
    fn test_host_ids_must_be_whole_u32() {
        assert_eq!(BodyHandle::from_host_id(0.0), Some(BodyHandle(0)));
        assert_eq!(BodyHandle::from_host_id(42.0), Some(BodyHandle(42)));
        assert_eq!(
            BodyHandle::from_host_id(f64::from(u32::MAX)),
            Some(BodyHandle(u32::MAX))
        );
        assert_eq!(BodyHandle::from_host_id(-1.0), None);
        assert_eq!(BodyHandle::from_host_id(3.5), None);
        assert_eq!(BodyHandle::from_host_id(4_294_967_296.0), None);
        assert_eq!(BodyHandle::from_host_id(f64::NAN), None);
        assert_eq!(BodyHandle::from_host_id(f64::INFINITY), None);
    }

    #[test]
    fn test_rejecting_world_creates_nothing() {
        let mut world = HeadlessWorld::default();
        world.reject_bodies = true;
        assert!(world.create_body(Vec2::ZERO, &CoinMaterial::default()).is_none());
        assert_eq!(world.body_count(), 0);
    }
}
