use coin_pusher::consts::SIM_STEP_MS;
use coin_pusher::sim::{
    CoinOrigin, HeadlessWorld, Machine, Playfield, RecordingDisplay, RewardTier, SpinOutcome,
    TickInput, resolve, tick,
};
use coin_pusher::{MachineConfig, VariantPreset};

fn empty_machine(preset: VariantPreset, seed: u64) -> Machine {
    let mut config = MachineConfig::from_preset(preset);
    config.initial_upper_coins = 0;
    config.initial_lower_coins = 0;
    Machine::new(config, Playfield::new(600.0, 650.0), seed).unwrap()
}

fn run_ms(
    m: &mut Machine,
    world: &mut HeadlessWorld,
    display: &mut RecordingDisplay,
    ms: u32,
    insert_every_step: bool,
) {
    for _ in 0..ms / SIM_STEP_MS {
        let input = TickInput {
            insert_coin: insert_every_step,
        };
        tick(m, world, display, &input, SIM_STEP_MS);
    }
}

#[test]
fn jackpot_draws_resolve_per_variant() {
    for (preset, payout) in [
        (VariantPreset::Classic, 1000),
        (VariantPreset::Compact, 300),
        (VariantPreset::Deluxe, 500),
    ] {
        let outcome = resolve(&preset.reward_table(), 0.3, 0.1, 0.97);
        assert_eq!(
            outcome,
            SpinOutcome {
                won: true,
                tier: RewardTier::Jackpot,
                payout
            }
        );
    }
}

#[test]
fn mashing_the_button_spins_once_per_cycle() {
    let mut world = HeadlessWorld::new(0.0);
    let mut display = RecordingDisplay::default();
    let mut m = empty_machine(VariantPreset::Classic, 4242);
    m.config.win_rate = 0.0;

    // Press every step for 1.5s: one coin, one pending spin
    run_ms(&mut m, &mut world, &mut display, 1490, true);
    assert_eq!(m.stats.spins, 1);
    assert_eq!(m.coins.len(), 1);
    assert!(display.outcomes.is_empty());

    // The reveal lands, and the very next press starts a second spin
    run_ms(&mut m, &mut world, &mut display, 20, true);
    assert_eq!(display.outcomes, vec![SpinOutcome::LOSS]);
    assert_eq!(m.stats.spins, 2);
}

#[test]
fn losing_spin_never_spawns() {
    let mut world = HeadlessWorld::new(0.0);
    let mut display = RecordingDisplay::default();
    let mut m = empty_machine(VariantPreset::Classic, 1);
    m.config.win_rate = 0.0;

    tick(&mut m, &mut world, &mut display, &TickInput { insert_coin: true }, SIM_STEP_MS);
    run_ms(&mut m, &mut world, &mut display, 10_000, false);

    assert_eq!(display.outcomes, vec![SpinOutcome::LOSS]);
    assert_eq!(m.stats.reward_coins_dropped, 0);
    assert!(m.coins.iter().all(|c| c.origin == CoinOrigin::Inserted));
    assert_eq!(m.scheduler.pending(), 0);
}

#[test]
fn compact_cabinet_caps_and_paces_rewards() {
    let mut world = HeadlessWorld::new(0.0);
    let mut display = RecordingDisplay::default();
    let mut m = empty_machine(VariantPreset::Compact, 77);
    m.config.win_rate = 1.0;
    // Every win is a jackpot (300), well above the cap of 40
    m.config.rewards.jackpot_threshold = 0.0;
    m.config.rewards.medium_threshold = 0.0;

    tick(&mut m, &mut world, &mut display, &TickInput { insert_coin: true }, SIM_STEP_MS);
    // Reveal at 1000ms after the insert, then one drop every 80ms
    run_ms(&mut m, &mut world, &mut display, 1000, false);
    assert_eq!(display.outcomes[0].payout, 300);
    assert_eq!(m.stats.reward_coins_dropped, 0);

    run_ms(&mut m, &mut world, &mut display, 800, false);
    assert_eq!(m.stats.reward_coins_dropped, 10);

    run_ms(&mut m, &mut world, &mut display, 10_000, false);
    assert_eq!(m.stats.reward_coins_dropped, 40);
    assert_eq!(m.stats.total_payout, 300);
    assert!(m.spawner.is_idle());
    assert_eq!(m.scheduler.pending(), 0);
}

#[test]
fn fallen_coins_leave_tracker_and_world_together() {
    let mut world = HeadlessWorld::default();
    let mut display = RecordingDisplay::default();
    let mut config = MachineConfig::default();
    config.win_rate = 0.0;
    let mut m = Machine::new(config, Playfield::new(600.0, 650.0), 9).unwrap();
    m.start(&mut world);

    // Gravity-only world: everything eventually falls past the ledge
    for _ in 0..500 {
        world.step(SIM_STEP_MS as f32 / 1000.0);
        tick(&mut m, &mut world, &mut display, &TickInput::default(), SIM_STEP_MS);
        assert_eq!(m.coins.len(), world.body_count());
    }
    assert!(m.coins.is_empty());
    assert_eq!(m.stats.coins_pruned, 70);
}
