//! Read-only projections over the ledger's stored facts
//!
//! Nothing here mutates state or needs more than read-committed
//! consistency; these are the queries behind the stats/leaderboard/history
//! surfaces.

use crate::error::EngineResult;
use crate::models::{Account, TxRecord};
use crate::store::LedgerDb;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeStats {
    pub total_trades: i64,
    pub completed_trades: i64,
    pub cancelled_trades: i64,
    pub avg_trade_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStats {
    pub total_games: i64,
    pub avg_bet_amount: Option<f64>,
    pub highest_bet: Option<i64>,
}

/// One day's absolute transaction volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyVolume {
    /// Day in `YYYY-MM-DD`
    pub day: String,
    /// Sum of absolute amounts moved that day (cents)
    pub volume: i64,
    pub tx_count: i64,
}

pub struct Analytics {
    db: LedgerDb,
}

impl Analytics {
    pub fn new(db: LedgerDb) -> Self {
        Self { db }
    }

    /// Sum of all balances — the total circulating supply.
    pub async fn total_supply(&self) -> EngineResult<i64> {
        self.db.total_supply().await
    }

    /// Top accounts by balance.
    pub async fn richest(&self, limit: usize) -> EngineResult<Vec<Account>> {
        self.db.richest(limit).await
    }

    pub async fn trade_stats(&self) -> EngineResult<TradeStats> {
        let (total_trades, completed_trades, cancelled_trades, avg_trade_amount) =
            self.db.trade_counts().await?;
        Ok(TradeStats {
            total_trades,
            completed_trades,
            cancelled_trades,
            avg_trade_amount,
        })
    }

    pub async fn game_stats(&self) -> EngineResult<GameStats> {
        let (total_games, avg_bet_amount, highest_bet) = self.db.game_counts().await?;
        Ok(GameStats {
            total_games,
            avg_bet_amount,
            highest_bet,
        })
    }

    /// Per-day volume over the trailing `days` days, oldest day first.
    pub async fn daily_volume(&self, days: u32) -> EngineResult<Vec<DailyVolume>> {
        let rows = self.db.daily_volume(days).await?;
        Ok(rows
            .into_iter()
            .map(|(day, volume, tx_count)| DailyVolume {
                day,
                volume,
                tx_count,
            })
            .collect())
    }

    /// A user's most recent log entries, newest first.
    pub async fn history(&self, user_id: i64, limit: usize) -> EngineResult<Vec<TxRecord>> {
        self.db.transaction_history(user_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::models::TxKind;

    async fn seeded() -> (LedgerDb, Analytics) {
        let db = LedgerDb::in_memory(RetryConfig::default()).unwrap();
        db.create_account(1, 1000).await.unwrap();
        db.create_account(2, 2000).await.unwrap();
        db.create_account(3, 500).await.unwrap();
        (db.clone(), Analytics::new(db))
    }

    #[tokio::test]
    async fn test_supply_and_richest() {
        let (_db, analytics) = seeded().await;

        assert_eq!(analytics.total_supply().await.unwrap(), 3500);

        let top = analytics.richest(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].user_id, 2);
        assert_eq!(top[1].user_id, 1);
    }

    #[tokio::test]
    async fn test_stats_on_empty_tables() {
        let db = LedgerDb::in_memory(RetryConfig::default()).unwrap();
        let analytics = Analytics::new(db);

        let trades = analytics.trade_stats().await.unwrap();
        assert_eq!(trades.total_trades, 0);
        assert_eq!(trades.avg_trade_amount, None);

        let games = analytics.game_stats().await.unwrap();
        assert_eq!(games.total_games, 0);
        assert_eq!(games.highest_bet, None);

        assert!(analytics.daily_volume(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_a_pure_read() {
        let (db, analytics) = seeded().await;
        db.apply_delta(1, 100, TxKind::Update).await.unwrap();
        db.apply_delta(1, -50, TxKind::Update).await.unwrap();

        let first = analytics.history(1, 10).await.unwrap();
        let second = analytics.history(1, 10).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first[0].amount, -50);
        assert_eq!(first[0].kind, TxKind::Update);
        // Repeated reads with no intervening mutation are identical
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_game_stats_track_bets() {
        let (db, analytics) = seeded().await;
        db.create_game("coinflip", 1, 100).await.unwrap();
        db.create_game("coinflip", 2, 300).await.unwrap();

        let stats = analytics.game_stats().await.unwrap();
        assert_eq!(stats.total_games, 2);
        assert_eq!(stats.avg_bet_amount, Some(200.0));
        assert_eq!(stats.highest_bet, Some(300));
    }
}
