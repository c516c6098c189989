//! Display-side cents/coins conversion
//!
//! The engine works in cents throughout; this is presentation glue for
//! callers that render amounts.

use crate::config::EngineConfig;

#[derive(Debug, Clone)]
pub struct CurrencyFormatter {
    cents_per_coin: i64,
    coin_name: String,
    cent_name: String,
}

impl CurrencyFormatter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            cents_per_coin: config.cents_per_coin.max(1),
            coin_name: config.coin_name.clone(),
            cent_name: config.cent_name.clone(),
        }
    }

    pub fn coins_to_cents(&self, coins: i64) -> i64 {
        coins * self.cents_per_coin
    }

    /// Split cents into whole coins and the remainder.
    pub fn cents_to_coins(&self, cents: i64) -> (i64, i64) {
        (cents / self.cents_per_coin, cents % self.cents_per_coin)
    }

    pub fn format(&self, cents: i64) -> String {
        let (coins, rest) = self.cents_to_coins(cents);
        format!(
            "{} {} and {} {}",
            coins, self.coin_name, rest, self.cent_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter() -> CurrencyFormatter {
        CurrencyFormatter::new(&EngineConfig {
            cents_per_coin: 100,
            coin_name: "coins".into(),
            cent_name: "cents".into(),
            ..EngineConfig::default()
        })
    }

    #[test]
    fn test_split_and_join() {
        let fmt = formatter();
        assert_eq!(fmt.cents_to_coins(250), (2, 50));
        assert_eq!(fmt.cents_to_coins(99), (0, 99));
        assert_eq!(fmt.coins_to_cents(3), 300);
    }

    #[test]
    fn test_format() {
        let fmt = formatter();
        assert_eq!(fmt.format(1234), "12 coins and 34 cents");
        assert_eq!(fmt.format(0), "0 coins and 0 cents");
    }
}
