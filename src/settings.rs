//! Machine configuration and variant presets
//!
//! Persisted in LocalStorage on the web so operators can retune a cabinet
//! without a rebuild.

use serde::{Deserialize, Serialize};

use crate::error::MachineError;
use crate::sim::reward::RewardTable;
use crate::sim::world::CoinMaterial;

/// Cabinet variants shipped with the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VariantPreset {
    #[default]
    Classic,
    Compact,
    Deluxe,
}

impl VariantPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantPreset::Classic => "Classic",
            VariantPreset::Compact => "Compact",
            VariantPreset::Deluxe => "Deluxe",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(VariantPreset::Classic),
            "compact" | "mini" => Some(VariantPreset::Compact),
            "deluxe" => Some(VariantPreset::Deluxe),
            _ => None,
        }
    }

    /// Reward table for this cabinet
    pub fn reward_table(&self) -> RewardTable {
        match self {
            VariantPreset::Classic => RewardTable {
                jackpot_threshold: 0.95,
                jackpot_payout: 1000,
                medium_threshold: 0.70,
                medium_payout: 100,
                small_payout: 20,
            },
            VariantPreset::Compact => RewardTable {
                jackpot_threshold: 0.90,
                jackpot_payout: 300,
                medium_threshold: 0.60,
                medium_payout: 100,
                small_payout: 20,
            },
            VariantPreset::Deluxe => RewardTable {
                jackpot_threshold: 0.95,
                jackpot_payout: 500,
                medium_threshold: 0.70,
                medium_payout: 100,
                small_payout: 20,
            },
        }
    }

    /// How long the reels spin before the outcome is revealed
    pub fn spin_duration_ms(&self) -> u32 {
        match self {
            VariantPreset::Classic => 1500,
            VariantPreset::Compact => 1000,
            VariantPreset::Deluxe => 1200,
        }
    }

    /// Most reward coins a single payout may put into the simulation
    pub fn physical_cap(&self) -> u32 {
        match self {
            VariantPreset::Classic => 50,
            VariantPreset::Compact => 40,
            VariantPreset::Deluxe => 45,
        }
    }

    /// Delay between reward coin drops
    pub fn drop_interval_ms(&self) -> u32 {
        match self {
            VariantPreset::Classic => 100,
            VariantPreset::Compact => 80,
            VariantPreset::Deluxe => 90,
        }
    }
}

/// Full machine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Preset this config was derived from
    pub variant: VariantPreset,

    // === Slot machine ===
    /// Probability that a spin wins anything
    pub win_rate: f64,
    /// Tier thresholds and payouts
    pub rewards: RewardTable,
    /// Reel spin time before reveal
    pub spin_duration_ms: u32,

    // === Reward drops ===
    /// Cap on reward coins per payout
    pub physical_cap: u32,
    /// Delay between reward coin drops
    pub drop_interval_ms: u32,

    // === Playfield ===
    /// Coins are pruned once they fall this far below the playfield
    pub prune_margin: f32,
    /// Coins placed on the upper deck at start
    pub initial_upper_coins: u32,
    /// Coins placed on the lower deck at start
    pub initial_lower_coins: u32,
    /// Pusher oscillation speed (radians per second)
    pub pusher_speed: f32,
    /// Coin body tuning
    #[serde(default)]
    pub material: CoinMaterial,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::from_preset(VariantPreset::default())
    }
}

impl MachineConfig {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "coin_pusher_config";

    /// Create a config from a cabinet preset
    pub fn from_preset(preset: VariantPreset) -> Self {
        Self {
            variant: preset,
            win_rate: 0.3,
            rewards: preset.reward_table(),
            spin_duration_ms: preset.spin_duration_ms(),
            physical_cap: preset.physical_cap(),
            drop_interval_ms: preset.drop_interval_ms(),
            prune_margin: 50.0,
            initial_upper_coins: 30,
            initial_lower_coins: 40,
            pusher_speed: 1.2,
            material: CoinMaterial::default(),
        }
    }

    /// Apply a preset's slot machine and drop tuning, keeping playfield tuning
    pub fn apply_preset(&mut self, preset: VariantPreset) {
        self.variant = preset;
        self.rewards = preset.reward_table();
        self.spin_duration_ms = preset.spin_duration_ms();
        self.physical_cap = preset.physical_cap();
        self.drop_interval_ms = preset.drop_interval_ms();
    }

    /// Check every invariant the machine relies on
    pub fn validate(&self) -> Result<(), MachineError> {
        if !(0.0..=1.0).contains(&self.win_rate) {
            return Err(MachineError::InvalidConfig {
                field: "win_rate",
                reason: format!("{} is not a probability", self.win_rate),
            });
        }
        self.rewards.validate()?;
        if self.drop_interval_ms == 0 {
            return Err(MachineError::InvalidConfig {
                field: "drop_interval_ms",
                reason: "must be positive".to_string(),
            });
        }
        if !self.prune_margin.is_finite() || self.prune_margin < 0.0 {
            return Err(MachineError::InvalidConfig {
                field: "prune_margin",
                reason: format!("{} must be finite and non-negative", self.prune_margin),
            });
        }
        if !self.pusher_speed.is_finite() {
            return Err(MachineError::InvalidConfig {
                field: "pusher_speed",
                reason: "must be finite".to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, MachineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, MachineError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded {} config from LocalStorage", config.variant.as_str());
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Config saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
