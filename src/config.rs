//! Engine configuration
//!
//! All policy knobs live in one immutable struct handed to each component at
//! construction. Nothing reads the environment after startup.

use serde::{Deserialize, Serialize};
use std::env;

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Balance minted on account creation (cents). The only money-creation
    /// point outside admin grants.
    pub initial_balance: i64,
    /// Minimum wager (cents)
    pub min_bet: i64,
    /// Maximum wager (cents)
    pub max_bet: i64,
    /// Display grouping: how many cents make one coin
    pub cents_per_coin: i64,
    /// Display name of the coin unit
    pub coin_name: String,
    /// Display name of the cent unit
    pub cent_name: String,
    pub heist: HeistConfig,
    pub retry: RetryConfig,
}

/// Policy for the unilateral heist attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeistConfig {
    /// Probability the attempt succeeds, in [0, 1]
    pub success_chance: f64,
    /// Upper bound on loot as a fraction of the target's balance
    pub max_loot_fraction: f64,
    /// Failed-attempt penalty range (cents), inclusive
    pub penalty_min: i64,
    pub penalty_max: i64,
    /// Minimum seconds between attempts by the same actor
    pub cooldown_secs: i64,
}

/// Bounded retry policy for transient store failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts before surfacing the failure (>= 1)
    pub max_attempts: u32,
    /// Fixed delay between attempts, milliseconds
    pub backoff_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000,
            min_bet: 10,
            max_bet: 100_000,
            cents_per_coin: 100,
            coin_name: "coins".to_string(),
            cent_name: "cents".to_string(),
            heist: HeistConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for HeistConfig {
    fn default() -> Self {
        Self {
            success_chance: 0.35,
            max_loot_fraction: 0.10,
            penalty_min: 50,
            penalty_max: 500,
            cooldown_secs: 3600,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 50,
        }
    }
}

impl EngineConfig {
    /// Build a config from environment variables, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let defaults = Self::default();

        Self {
            initial_balance: env_i64("LEDGER_INITIAL_BALANCE", defaults.initial_balance),
            min_bet: env_i64("LEDGER_MIN_BET", defaults.min_bet),
            max_bet: env_i64("LEDGER_MAX_BET", defaults.max_bet),
            cents_per_coin: env_i64("LEDGER_CENTS_PER_COIN", defaults.cents_per_coin),
            coin_name: env::var("LEDGER_COIN_NAME").unwrap_or(defaults.coin_name),
            cent_name: env::var("LEDGER_CENT_NAME").unwrap_or(defaults.cent_name),
            heist: HeistConfig {
                success_chance: env_f64("LEDGER_HEIST_CHANCE", defaults.heist.success_chance),
                max_loot_fraction: env_f64(
                    "LEDGER_HEIST_LOOT_FRACTION",
                    defaults.heist.max_loot_fraction,
                ),
                penalty_min: env_i64("LEDGER_HEIST_PENALTY_MIN", defaults.heist.penalty_min),
                penalty_max: env_i64("LEDGER_HEIST_PENALTY_MAX", defaults.heist.penalty_max),
                cooldown_secs: env_i64("LEDGER_HEIST_COOLDOWN_SECS", defaults.heist.cooldown_secs),
            },
            retry: defaults.retry,
        }
    }

    /// Sanity-check relationships between knobs
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_balance < 0 {
            return Err("initial_balance must be >= 0".into());
        }
        if self.min_bet <= 0 || self.max_bet < self.min_bet {
            return Err("bet bounds must satisfy 0 < min_bet <= max_bet".into());
        }
        if self.cents_per_coin <= 0 {
            return Err("cents_per_coin must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.heist.success_chance) {
            return Err("heist.success_chance must be in [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.heist.max_loot_fraction) {
            return Err("heist.max_loot_fraction must be in [0, 1]".into());
        }
        if self.heist.penalty_min < 0 || self.heist.penalty_max < self.heist.penalty_min {
            return Err("heist penalty range must satisfy 0 <= min <= max".into());
        }
        if self.retry.max_attempts == 0 {
            return Err("retry.max_attempts must be >= 1".into());
        }
        Ok(())
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_bet_bounds_rejected() {
        let mut config = EngineConfig::default();
        config.max_bet = config.min_bet - 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_heist_chance_rejected() {
        let mut config = EngineConfig::default();
        config.heist.success_chance = 1.5;
        assert!(config.validate().is_err());
    }
}
