//! Slot machine reward resolution
//!
//! A spin is decided by two uniform draws in [0, 1): the first decides win or
//! lose, the second (drawn only on a win) picks the tier. Tier bands are
//! checked from the top down with strict `>`, so a draw sitting exactly on a
//! threshold falls into the lower band.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::MachineError;

/// Reward category of a spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RewardTier {
    #[default]
    None,
    Small,
    Medium,
    Jackpot,
}

impl RewardTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardTier::None => "None",
            RewardTier::Small => "Small",
            RewardTier::Medium => "Medium",
            RewardTier::Jackpot => "Jackpot",
        }
    }

    /// Reel symbol shown three times for a win of this tier
    pub fn symbol(&self) -> &'static str {
        match self {
            RewardTier::Jackpot => "💎",
            RewardTier::Medium => "7️⃣",
            RewardTier::Small => "🍒",
            RewardTier::None => "🌀",
        }
    }
}

/// Reels shown after a losing spin
pub const LOSING_REELS: [&str; 3] = ["🍋", "🍇", "🔔"];

/// Tier thresholds and payouts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardTable {
    /// Tier draw above this is a jackpot
    pub jackpot_threshold: f64,
    pub jackpot_payout: u32,
    /// Tier draw above this (and not a jackpot) is a medium win
    pub medium_threshold: f64,
    pub medium_payout: u32,
    /// Everything else that wins
    pub small_payout: u32,
}

impl RewardTable {
    /// Thresholds must be ordered probabilities and every tier must pay
    pub fn validate(&self) -> Result<(), MachineError> {
        for (field, value) in [
            ("jackpot_threshold", self.jackpot_threshold),
            ("medium_threshold", self.medium_threshold),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(MachineError::InvalidConfig {
                    field,
                    reason: format!("{value} is outside [0, 1)"),
                });
            }
        }
        if self.medium_threshold > self.jackpot_threshold {
            return Err(MachineError::InvalidConfig {
                field: "medium_threshold",
                reason: format!(
                    "{} is above jackpot threshold {}",
                    self.medium_threshold, self.jackpot_threshold
                ),
            });
        }
        for (field, value) in [
            ("jackpot_payout", self.jackpot_payout),
            ("medium_payout", self.medium_payout),
            ("small_payout", self.small_payout),
        ] {
            if value == 0 {
                return Err(MachineError::InvalidConfig {
                    field,
                    reason: "winning tiers must pay out".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Tier for a tier draw (only meaningful after a win)
    pub fn tier_for(&self, draw: f64) -> RewardTier {
        if draw > self.jackpot_threshold {
            RewardTier::Jackpot
        } else if draw > self.medium_threshold {
            RewardTier::Medium
        } else {
            RewardTier::Small
        }
    }

    /// Fixed payout of a tier
    pub fn payout(&self, tier: RewardTier) -> u32 {
        match tier {
            RewardTier::None => 0,
            RewardTier::Small => self.small_payout,
            RewardTier::Medium => self.medium_payout,
            RewardTier::Jackpot => self.jackpot_payout,
        }
    }
}

/// Result of one spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SpinOutcome {
    pub won: bool,
    pub tier: RewardTier,
    pub payout: u32,
}

impl SpinOutcome {
    pub const LOSS: SpinOutcome = SpinOutcome {
        won: false,
        tier: RewardTier::None,
        payout: 0,
    };

    /// Symbols on the three reels
    pub fn reels(&self) -> [&'static str; 3] {
        if self.won {
            [self.tier.symbol(); 3]
        } else {
            LOSING_REELS
        }
    }
}

/// Resolve a spin from its two draws
pub fn resolve(table: &RewardTable, win_rate: f64, win_draw: f64, tier_draw: f64) -> SpinOutcome {
    if win_draw >= win_rate {
        return SpinOutcome::LOSS;
    }
    let tier = table.tier_for(tier_draw);
    SpinOutcome {
        won: true,
        tier,
        payout: table.payout(tier),
    }
}

/// Resolve a spin, drawing the tier only when the spin wins
pub fn resolve_with_rng<R: Rng>(
    table: &RewardTable,
    win_rate: f64,
    rng: &mut R,
) -> SpinOutcome {
    let win_draw: f64 = rng.random();
    if win_draw >= win_rate {
        return SpinOutcome::LOSS;
    }
    let tier_draw: f64 = rng.random();
    resolve(table, win_rate, win_draw, tier_draw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::VariantPreset;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn classic() -> RewardTable {
        VariantPreset::Classic.reward_table()
    }

    fn presets() -> impl Strategy<Value = VariantPreset> {
        prop_oneof![
            Just(VariantPreset::Classic),
            Just(VariantPreset::Compact),
            Just(VariantPreset::Deluxe),
        ]
    }

    #[test]
    fn test_jackpot_end_to_end() {
        let outcome = resolve(&classic(), 0.3, 0.1, 0.97);
        assert_eq!(
            outcome,
            SpinOutcome {
                won: true,
                tier: RewardTier::Jackpot,
                payout: 1000
            }
        );
        assert_eq!(outcome.reels(), ["💎"; 3]);
    }

    #[test]
    fn test_loss_end_to_end() {
        let outcome = resolve(&classic(), 0.3, 0.5, 0.97);
        assert_eq!(outcome, SpinOutcome::LOSS);
        assert_eq!(outcome.reels(), LOSING_REELS);
    }

    #[test]
    fn test_threshold_falls_to_lower_band() {
        let table = classic();
        assert_eq!(table.tier_for(0.95), RewardTier::Medium);
        assert_eq!(table.tier_for(0.70), RewardTier::Small);
        assert_eq!(table.tier_for(0.0), RewardTier::Small);
        // Win draw exactly at the rate loses
        assert!(!resolve(&table, 0.3, 0.3, 0.99).won);
    }

    #[test]
    fn test_variant_payouts() {
        for (preset, jackpot) in [
            (VariantPreset::Classic, 1000),
            (VariantPreset::Compact, 300),
            (VariantPreset::Deluxe, 500),
        ] {
            let outcome = resolve(&preset.reward_table(), 0.3, 0.1, 0.97);
            assert_eq!(outcome.payout, jackpot);
        }
        // Compact's lower thresholds move 0.65 into the medium band
        let compact = VariantPreset::Compact.reward_table();
        assert_eq!(compact.tier_for(0.65), RewardTier::Medium);
        assert_eq!(classic().tier_for(0.65), RewardTier::Small);
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut table = classic();
        table.medium_threshold = 0.99;
        assert!(matches!(
            table.validate(),
            Err(MachineError::InvalidConfig { field: "medium_threshold", .. })
        ));
        let mut table = classic();
        table.small_payout = 0;
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_rng_win_rate_is_roughly_thirty_percent() {
        let mut rng = Pcg32::seed_from_u64(42);
        let table = classic();
        let wins = (0..10_000)
            .filter(|_| resolve_with_rng(&table, 0.3, &mut rng).won)
            .count();
        assert!((2700..3300).contains(&wins), "wins = {}", wins);
    }

    proptest! {
        #[test]
        fn prop_win_iff_below_rate(d1 in 0.0f64..1.0, d2 in 0.0f64..1.0) {
            let outcome = resolve(&classic(), 0.3, d1, d2);
            prop_assert_eq!(outcome.won, d1 < 0.3);
            if !outcome.won {
                prop_assert_eq!(outcome.tier, RewardTier::None);
                prop_assert_eq!(outcome.payout, 0);
            } else {
                prop_assert!(outcome.tier != RewardTier::None);
                prop_assert_eq!(outcome.payout, classic().payout(outcome.tier));
            }
        }

        #[test]
        fn prop_bands_partition_unit_interval(preset in presets(), d2 in 0.0f64..1.0) {
            let table = preset.reward_table();
            prop_assert!(table.validate().is_ok());
            let bands = [
                d2 > table.jackpot_threshold,
                d2 > table.medium_threshold && d2 <= table.jackpot_threshold,
                d2 <= table.medium_threshold,
            ];
            prop_assert_eq!(bands.iter().filter(|b| **b).count(), 1);
            let expected = if bands[0] {
                RewardTier::Jackpot
            } else if bands[1] {
                RewardTier::Medium
            } else {
                RewardTier::Small
            };
            prop_assert_eq!(table.tier_for(d2), expected);
        }
    }
}
