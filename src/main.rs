//! Coin Pusher entry point
//!
//! The web build is driven from JavaScript through `coin_pusher::web`. Natively
//! the machine runs headless on a gravity-only world, which is handy for
//! checking payout tuning from a terminal.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Coin Pusher (native) starting...");
    log::info!("Native mode runs headless - serve the wasm build for the playable cabinet");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let preset = args
        .first()
        .and_then(|s| coin_pusher::VariantPreset::from_str(s))
        .unwrap_or_default();
    let seed = args
        .get(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(12345);

    match headless::run(preset, seed, 100) {
        Ok(stats) => {
            println!("\n{} cabinet, seed {}", preset.as_str(), seed);
            println!("  spins:          {}", stats.spins);
            println!("  wins:           {}", stats.wins);
            println!("  jackpots:       {}", stats.jackpots);
            println!("  total payout:   {}", stats.total_payout);
            println!("  reward coins:   {}", stats.reward_coins_dropped);
            println!("  coins pruned:   {}", stats.coins_pruned);
        }
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is coin_pusher::web, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use coin_pusher::consts::SIM_STEP_MS;
    use coin_pusher::sim::{
        HeadlessWorld, Machine, NullDisplay, Playfield, SessionStats, TickInput, tick,
    };
    use coin_pusher::{MachineConfig, MachineError, VariantPreset};

    /// Play `spins` spins back to back, inserting a coin whenever the reels are free
    pub fn run(preset: VariantPreset, seed: u64, spins: u32) -> Result<SessionStats, MachineError> {
        let config = MachineConfig::from_preset(preset);
        let mut machine = Machine::new(config, Playfield::from_window(600.0, 1000.0), seed)?;
        let mut world = HeadlessWorld::default();
        let mut display = NullDisplay;
        machine.start(&mut world);

        let dt = SIM_STEP_MS as f32 / 1000.0;
        while machine.stats.spins < spins
            || machine.sequencer.is_spinning()
            || !machine.spawner.is_idle()
        {
            let input = TickInput {
                insert_coin: machine.stats.spins < spins,
            };
            world.step(dt);
            tick(&mut machine, &mut world, &mut display, &input, SIM_STEP_MS);
        }

        Ok(machine.stats.clone())
    }
}
