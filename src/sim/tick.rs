//! Fixed timestep machine tick
//!
//! Advances the machine by one step: due timers first, then player input,
//! then the pusher, then pruning.

use super::state::Machine;
use super::world::{OutcomeDisplay, PhysicsWorld};
use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, SIM_STEP_MS};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Insert-coin button pressed
    pub insert_coin: bool,
}

/// What happened during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub timers_fired: u32,
    /// A spin started this tick
    pub spin_started: bool,
    pub coins_pruned: u32,
}

/// Turns variable frame times into whole simulation steps
///
/// Leftover time never exceeds one step, so a slow page runs the machine
/// slower than wall time instead of building a backlog it replays later.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStep {
    accumulator_ms: f64,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame of wall time, returning how many steps to run
    pub fn steps(&mut self, dt_ms: f64) -> u32 {
        let step = f64::from(SIM_STEP_MS);
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.accumulator_ms += dt_ms.min(MAX_FRAME_MS);
        }

        let mut substeps = 0;
        while self.accumulator_ms >= step && substeps < MAX_SUBSTEPS {
            self.accumulator_ms -= step;
            substeps += 1;
        }
        self.accumulator_ms = self.accumulator_ms.min(step);
        substeps
    }

    /// Time carried into the next frame
    pub fn leftover_ms(&self) -> f64 {
        self.accumulator_ms
    }

    pub fn reset(&mut self) {
        self.accumulator_ms = 0.0;
    }
}

/// Advance the machine by `dt_ms`
pub fn tick<W: PhysicsWorld + ?Sized, D: OutcomeDisplay + ?Sized>(
    machine: &mut Machine,
    world: &mut W,
    display: &mut D,
    input: &TickInput,
    dt_ms: u32,
) -> TickReport {
    let mut report = TickReport::default();

    // Timers run one at a time so a finishing batch can cancel itself
    let until = machine.scheduler.now_ms() + u64::from(dt_ms);
    while let Some((timer, task)) = machine.scheduler.pop_due(until) {
        machine.handle_task(world, display, timer, task);
        report.timers_fired += 1;
    }

    if input.insert_coin {
        report.spin_started = machine.insert_coin(world, display);
    }

    machine.pusher.advance(dt_ms as f32 / 1000.0);
    world.set_pusher_position(machine.pusher.position(&machine.field));

    report.coins_pruned = machine.prune(world);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_STEP_MS;
    use crate::settings::MachineConfig;
    use crate::sim::layout::Playfield;
    use crate::sim::world::{HeadlessWorld, RecordingDisplay};

    fn machine(seed: u64) -> Machine {
        Machine::new(MachineConfig::default(), Playfield::new(600.0, 650.0), seed).unwrap()
    }

    #[test]
    fn test_tick_spin_reveals_after_duration() {
        let mut world = HeadlessWorld::new(0.0);
        let mut display = RecordingDisplay::default();
        let mut m = machine(12345);

        let insert = TickInput { insert_coin: true };
        let report = tick(&mut m, &mut world, &mut display, &insert, SIM_STEP_MS);
        assert!(report.spin_started);

        // 1500ms spin: 149 more steps stay spinning, the 150th reveals
        for _ in 0..149 {
            tick(&mut m, &mut world, &mut display, &TickInput::default(), SIM_STEP_MS);
        }
        assert!(m.sequencer.is_spinning());
        assert!(display.outcomes.is_empty());

        let report = tick(&mut m, &mut world, &mut display, &TickInput::default(), SIM_STEP_MS);
        assert_eq!(report.timers_fired, 1);
        assert_eq!(display.outcomes.len(), 1);
        assert!(!m.sequencer.is_spinning());
    }

    #[test]
    fn test_tick_moves_pusher() {
        let mut world = HeadlessWorld::new(0.0);
        let mut display = RecordingDisplay::default();
        let mut m = machine(1);
        tick(&mut m, &mut world, &mut display, &TickInput::default(), 500);
        let first = world.pusher;
        tick(&mut m, &mut world, &mut display, &TickInput::default(), 500);
        assert_ne!(first.y, world.pusher.y);
        assert_eq!(world.pusher.x, 300.0);
    }

    #[test]
    fn test_tick_prunes_fallen_coins() {
        let mut world = HeadlessWorld::new(0.0);
        let mut display = RecordingDisplay::default();
        let mut m = machine(1);
        m.start(&mut world);
        let handles: Vec<_> = m.coins.iter().take(3).map(|c| c.body).collect();
        for handle in handles {
            world.place(handle, glam::Vec2::new(300.0, 2000.0));
        }
        let report = tick(&mut m, &mut world, &mut display, &TickInput::default(), SIM_STEP_MS);
        assert_eq!(report.coins_pruned, 3);
        assert_eq!(m.coins.len(), 67);
        assert_eq!(m.stats.coins_pruned, 3);
    }

    #[test]
    fn test_determinism() {
        // Two machines with same seed should produce identical results
        let run = |seed: u64| {
            let mut world = HeadlessWorld::default();
            let mut display = RecordingDisplay::default();
            let mut m = machine(seed);
            m.start(&mut world);
            for step in 0..3000u32 {
                let input = TickInput {
                    insert_coin: step % 170 == 0,
                };
                world.step(SIM_STEP_MS as f32 / 1000.0);
                tick(&mut m, &mut world, &mut display, &input, SIM_STEP_MS);
            }
            (display.outcomes, m.stats.clone(), m.coins.len())
        };
        assert_eq!(run(99999), run(99999));
    }

    #[test]
    fn test_fixed_step_leftover_stays_bounded() {
        let mut clock = FixedStep::new();
        // Slow frames: each one can run at most MAX_SUBSTEPS steps
        for _ in 0..50 {
            assert_eq!(clock.steps(100.0), MAX_SUBSTEPS);
            assert!(clock.leftover_ms() <= f64::from(SIM_STEP_MS));
        }
        // Once frames speed up there is no backlog to replay
        assert_eq!(clock.steps(16.0), 2);
    }

    #[test]
    fn test_fixed_step_carries_fractions() {
        let mut clock = FixedStep::new();
        assert_eq!(clock.steps(16.0), 1);
        assert!((clock.leftover_ms() - 6.0).abs() < 1e-9);
        assert_eq!(clock.steps(16.0), 2);
        assert!((clock.leftover_ms() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_step_ignores_bad_frames() {
        let mut clock = FixedStep::new();
        assert_eq!(clock.steps(-5.0), 0);
        assert_eq!(clock.steps(f64::NAN), 0);
        assert_eq!(clock.steps(f64::INFINITY), 0);
        assert_eq!(clock.leftover_ms(), 0.0);
    }
}
