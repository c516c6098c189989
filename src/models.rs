//! Record types shared by the store, engines, and callers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's currency holding, keyed by the external user id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub user_id: i64,
    /// Smallest currency unit ("cents"); never fractional, never negative
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    /// Unix seconds of the last heist attempt, if any
    pub last_heist_at: Option<i64>,
}

/// Immutable append-only log entry; one per balance mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxRecord {
    pub id: i64,
    pub user_id: i64,
    /// Signed delta applied to the balance
    pub amount: i64,
    pub kind: TxKind,
    pub timestamp: DateTime<Utc>,
}

/// Transaction log tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    /// Direct delta (admin grant/deduct, balance clear)
    Update,
    TradeSent,
    TradeReceived,
    GameWon,
    GameLost,
    /// Heist: actor's gain on success
    HeistLoot,
    /// Heist: target's loss on success
    HeistHit,
    /// Heist: actor's loss on failure
    HeistPenalty,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Update => "update",
            TxKind::TradeSent => "trade_sent",
            TxKind::TradeReceived => "trade_received",
            TxKind::GameWon => "game_won",
            TxKind::GameLost => "game_lost",
            TxKind::HeistLoot => "heist_loot",
            TxKind::HeistHit => "heist_hit",
            TxKind::HeistPenalty => "heist_penalty",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "update" => Some(TxKind::Update),
            "trade_sent" => Some(TxKind::TradeSent),
            "trade_received" => Some(TxKind::TradeReceived),
            "game_won" => Some(TxKind::GameWon),
            "game_lost" => Some(TxKind::GameLost),
            "heist_loot" => Some(TxKind::HeistLoot),
            "heist_hit" => Some(TxKind::HeistHit),
            "heist_penalty" => Some(TxKind::HeistPenalty),
            _ => None,
        }
    }
}

/// A two-party transfer offer awaiting explicit acceptance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub amount: i64,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
}

/// Trade lifecycle; `Pending` is the only non-terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Pending => "pending",
            TradeStatus::Completed => "completed",
            TradeStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TradeStatus::Pending),
            "completed" => Some(TradeStatus::Completed),
            "cancelled" => Some(TradeStatus::Cancelled),
            _ => None,
        }
    }
}

/// An open wager; settles atomically when a second participant joins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub game_type: String,
    pub creator_id: i64,
    pub bet_amount: i64,
    pub status: GameStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Open,
    Settled,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Open => "open",
            GameStatus::Settled => "settled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(GameStatus::Open),
            "settled" => Some(GameStatus::Settled),
            _ => None,
        }
    }
}

/// Result of a settled game join
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameOutcome {
    pub game_id: i64,
    pub winner_id: i64,
    pub loser_id: i64,
    /// Amount transferred loser -> winner (the bet)
    pub pot: i64,
}

/// Result of a heist attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum HeistOutcome {
    /// Loot moved target -> actor
    Success { loot: i64 },
    /// Penalty deducted from the actor; `None` when unaffordable (skipped)
    Failed { penalty: Option<i64> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            TradeStatus::Pending,
            TradeStatus::Completed,
            TradeStatus::Cancelled,
        ] {
            assert_eq!(TradeStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TradeStatus::parse("unknown"), None);
    }

    #[test]
    fn test_tx_kind_tags_are_stable() {
        // Tags are persisted; renaming one breaks existing ledgers
        assert_eq!(TxKind::Update.as_str(), "update");
        assert_eq!(TxKind::TradeSent.as_str(), "trade_sent");
        assert_eq!(TxKind::TradeReceived.as_str(), "trade_received");
        assert_eq!(TxKind::parse("game_won"), Some(TxKind::GameWon));
    }
}
