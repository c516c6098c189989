//! SQLite-backed ledger store
//!
//! Single source of truth for accounts, the transaction log, trades, and
//! games. Every cross-row mutation (trade settlement, game settlement,
//! heist) runs as one SQL transaction; debits are guarded so a balance can
//! never go negative no matter how calls interleave. Status transitions are
//! conditional updates, which is what resolves double-accept/double-join
//! races to exactly one winner.

use crate::config::{HeistConfig, RetryConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Account, Game, GameOutcome, GameStatus, HeistOutcome, Trade, TradeStatus, TxKind, TxRecord,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Pre-rolled randomness for a heist attempt. The engine rolls the dice;
/// the store applies the outcome deterministically inside the transaction.
#[derive(Debug, Clone, Copy)]
pub struct HeistRoll {
    pub success: bool,
    /// Uniform in [0, 1]; scales the loot within its cap
    pub loot_fraction: f64,
    /// Penalty to charge on failure (cents)
    pub penalty: i64,
}

/// Ledger database handle. Cheap to clone; all clones share one connection.
#[derive(Clone)]
pub struct LedgerDb {
    conn: Arc<Mutex<Connection>>,
    retry: RetryConfig,
}

impl LedgerDb {
    /// Open (or create) a ledger database at `db_path`.
    pub fn new(db_path: &str, retry: RetryConfig) -> EngineResult<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn, retry)
    }

    /// Open a throwaway in-memory ledger. Useful for tests and dry runs.
    pub fn in_memory(retry: RetryConfig) -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, retry)
    }

    fn from_connection(conn: Connection, retry: RetryConfig) -> EngineResult<Self> {
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        conn.busy_timeout(Duration::from_secs(5))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                user_id INTEGER PRIMARY KEY,
                balance INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                last_heist_at INTEGER
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount INTEGER NOT NULL,
                type TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS trades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id INTEGER NOT NULL,
                receiver_id INTEGER NOT NULL,
                amount INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL,
                FOREIGN KEY (sender_id) REFERENCES accounts(user_id),
                FOREIGN KEY (receiver_id) REFERENCES accounts(user_id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS active_games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_type TEXT NOT NULL,
                creator_id INTEGER NOT NULL,
                bet_amount INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'open',
                created_at TEXT NOT NULL,
                FOREIGN KEY (creator_id) REFERENCES accounts(user_id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_transactions_user ON transactions(user_id, id DESC)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_trades_receiver_status ON trades(receiver_id, status)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_games_type_status ON active_games(game_type, status)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            retry,
        })
    }

    /// Run `op` against the connection, retrying transient busy/locked
    /// failures with fixed backoff up to the configured attempt count.
    /// Logical failures are never retried.
    async fn with_conn<T, F>(&self, op: F) -> EngineResult<T>
    where
        F: Fn(&mut Connection) -> EngineResult<T>,
    {
        let mut attempt = 1u32;
        loop {
            let result = {
                let mut conn = self.conn.lock().await;
                op(&mut conn)
            };
            match result {
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts => {
                    warn!(attempt, error = %err, "transient store failure, retrying");
                    tokio::time::sleep(Duration::from_millis(self.retry.backoff_ms)).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    // ---- accounts ----

    /// Insert-if-absent account creation. The one mint point: the new
    /// account starts at `initial_balance`.
    pub async fn create_account(&self, user_id: i64, initial_balance: i64) -> EngineResult<Account> {
        self.with_conn(|conn| {
            let now = Utc::now();
            let inserted = conn.execute(
                "INSERT INTO accounts (user_id, balance, created_at) VALUES (?1, ?2, ?3)",
                params![user_id, initial_balance, now.to_rfc3339()],
            );
            match inserted {
                Ok(_) => Ok(Account {
                    user_id,
                    balance: initial_balance,
                    created_at: now,
                    last_heist_at: None,
                }),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ffi::ErrorCode::ConstraintViolation =>
                {
                    Err(EngineError::AlreadyExists)
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    pub async fn get_account(&self, user_id: i64) -> EngineResult<Option<Account>> {
        self.with_conn(|conn| {
            let account = conn
                .query_row(
                    "SELECT user_id, balance, created_at, last_heist_at
                     FROM accounts WHERE user_id = ?1",
                    [user_id],
                    row_to_account,
                )
                .optional()?;
            Ok(account)
        })
        .await
    }

    pub async fn get_balance(&self, user_id: i64) -> EngineResult<Option<i64>> {
        self.with_conn(|conn| {
            let balance = conn
                .query_row(
                    "SELECT balance FROM accounts WHERE user_id = ?1",
                    [user_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(balance)
        })
        .await
    }

    /// Atomically add `delta` to the balance and append one log entry, as a
    /// single unit. Guarded: fails `InsufficientFunds` (and changes nothing)
    /// if the result would be negative. Returns the new balance.
    pub async fn apply_delta(&self, user_id: i64, delta: i64, kind: TxKind) -> EngineResult<i64> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            if !guarded_delta(&tx, user_id, delta)? {
                return if account_exists(&tx, user_id)? {
                    Err(EngineError::InsufficientFunds)
                } else {
                    Err(EngineError::NotFound("account"))
                };
            }
            log_entry(&tx, user_id, delta, kind)?;

            let balance: i64 = tx.query_row(
                "SELECT balance FROM accounts WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )?;
            tx.commit()?;
            Ok(balance)
        })
        .await
    }

    /// Zero an account's balance, logging the removal as one `update`
    /// entry. Returns the amount removed. Read and write share one
    /// transaction, so a concurrent delta cannot slip between them.
    pub async fn clear_balance(&self, user_id: i64) -> EngineResult<i64> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let balance: i64 = tx
                .query_row(
                    "SELECT balance FROM accounts WHERE user_id = ?1",
                    [user_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or(EngineError::NotFound("account"))?;

            if balance != 0 {
                tx.execute(
                    "UPDATE accounts SET balance = 0 WHERE user_id = ?1",
                    [user_id],
                )?;
                log_entry(&tx, user_id, -balance, TxKind::Update)?;
            }
            tx.commit()?;
            Ok(balance)
        })
        .await
    }

    // ---- trades ----

    pub async fn create_trade(
        &self,
        sender_id: i64,
        receiver_id: i64,
        amount: i64,
    ) -> EngineResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO trades (sender_id, receiver_id, amount, status, created_at)
                 VALUES (?1, ?2, ?3, 'pending', ?4)",
                params![sender_id, receiver_id, amount, Utc::now().to_rfc3339()],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    pub async fn get_trade(&self, trade_id: i64) -> EngineResult<Option<Trade>> {
        self.with_conn(|conn| {
            let trade = conn
                .query_row(
                    "SELECT id, sender_id, receiver_id, amount, status, created_at
                     FROM trades WHERE id = ?1",
                    [trade_id],
                    row_to_trade,
                )
                .optional()?;
            Ok(trade)
        })
        .await
    }

    /// Pending trades addressed to `receiver_id`, newest first.
    pub async fn pending_trades_for(&self, receiver_id: i64) -> EngineResult<Vec<Trade>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, sender_id, receiver_id, amount, status, created_at
                 FROM trades WHERE receiver_id = ?1 AND status = 'pending'
                 ORDER BY created_at DESC, id DESC",
            )?;
            let trades = stmt
                .query_map([receiver_id], row_to_trade)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(trades)
        })
        .await
    }

    /// Settle a pending trade: flip it to `completed`, move the funds, and
    /// append the paired log entries, all in one transaction.
    ///
    /// The conditional status update means that of any number of concurrent
    /// accept/decline calls, exactly one wins; the rest see `NotFound`. An
    /// insufficient sender rolls the whole transaction back and leaves the
    /// trade `pending`.
    pub async fn settle_trade(&self, trade_id: i64) -> EngineResult<Trade> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            let trade = tx
                .query_row(
                    "SELECT id, sender_id, receiver_id, amount, status, created_at
                     FROM trades WHERE id = ?1 AND status = 'pending'",
                    [trade_id],
                    row_to_trade,
                )
                .optional()?
                .ok_or(EngineError::NotFound("trade"))?;

            let flipped = tx.execute(
                "UPDATE trades SET status = 'completed' WHERE id = ?1 AND status = 'pending'",
                [trade_id],
            )?;
            if flipped == 0 {
                return Err(EngineError::NotFound("trade"));
            }

            if !guarded_delta(&tx, trade.sender_id, -trade.amount)? {
                // Rolls back the status flip; the trade stays pending
                return Err(EngineError::InsufficientFunds);
            }
            if !guarded_delta(&tx, trade.receiver_id, trade.amount)? {
                return Err(EngineError::Fatal(format!(
                    "receiver account {} missing during trade settlement",
                    trade.receiver_id
                )));
            }

            log_entry(&tx, trade.sender_id, -trade.amount, TxKind::TradeSent)?;
            log_entry(&tx, trade.receiver_id, trade.amount, TxKind::TradeReceived)?;

            tx.commit()?;
            debug!(trade_id, amount = trade.amount, "trade settled");
            Ok(Trade {
                status: TradeStatus::Completed,
                ..trade
            })
        })
        .await
    }

    /// Flip a pending trade to `cancelled`. No funds move. Same race rule as
    /// settlement: the conditional update admits exactly one winner.
    pub async fn cancel_trade(&self, trade_id: i64) -> EngineResult<()> {
        self.with_conn(|conn| {
            let flipped = conn.execute(
                "UPDATE trades SET status = 'cancelled' WHERE id = ?1 AND status = 'pending'",
                [trade_id],
            )?;
            if flipped == 0 {
                return Err(EngineError::NotFound("trade"));
            }
            Ok(())
        })
        .await
    }

    // ---- games ----

    pub async fn create_game(
        &self,
        game_type: &str,
        creator_id: i64,
        bet_amount: i64,
    ) -> EngineResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO active_games (game_type, creator_id, bet_amount, status, created_at)
                 VALUES (?1, ?2, ?3, 'open', ?4)",
                params![game_type, creator_id, bet_amount, Utc::now().to_rfc3339()],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    pub async fn get_game(&self, game_id: i64) -> EngineResult<Option<Game>> {
        self.with_conn(|conn| {
            let game = conn
                .query_row(
                    "SELECT id, game_type, creator_id, bet_amount, status, created_at
                     FROM active_games WHERE id = ?1",
                    [game_id],
                    row_to_game,
                )
                .optional()?;
            Ok(game)
        })
        .await
    }

    /// Open games of the given type, newest first.
    pub async fn open_games(&self, game_type: &str) -> EngineResult<Vec<Game>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, game_type, creator_id, bet_amount, status, created_at
                 FROM active_games WHERE game_type = ?1 AND status = 'open'
                 ORDER BY created_at DESC, id DESC",
            )?;
            let games = stmt
                .query_map([game_type], row_to_game)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(games)
        })
        .await
    }

    /// Settle an open game: flip it to `settled` and move the bet from loser
    /// to winner with paired log entries, all in one transaction. Only the
    /// first settlement on a game succeeds; later ones see `NotFound`.
    pub async fn settle_game(
        &self,
        game_id: i64,
        winner_id: i64,
        loser_id: i64,
    ) -> EngineResult<GameOutcome> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            let bet: i64 = tx
                .query_row(
                    "SELECT bet_amount FROM active_games WHERE id = ?1 AND status = 'open'",
                    [game_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or(EngineError::NotFound("game"))?;

            let flipped = tx.execute(
                "UPDATE active_games SET status = 'settled' WHERE id = ?1 AND status = 'open'",
                [game_id],
            )?;
            if flipped == 0 {
                return Err(EngineError::NotFound("game"));
            }

            if !guarded_delta(&tx, loser_id, -bet)? {
                // Loser can no longer cover the bet; roll everything back
                return Err(EngineError::InsufficientFunds);
            }
            if !guarded_delta(&tx, winner_id, bet)? {
                return Err(EngineError::Fatal(format!(
                    "winner account {winner_id} missing during game settlement"
                )));
            }

            log_entry(&tx, winner_id, bet, TxKind::GameWon)?;
            log_entry(&tx, loser_id, -bet, TxKind::GameLost)?;

            tx.commit()?;
            debug!(game_id, winner_id, loser_id, bet, "game settled");
            Ok(GameOutcome {
                game_id,
                winner_id,
                loser_id,
                pot: bet,
            })
        })
        .await
    }

    /// Execute a pre-rolled heist attempt. Cooldown check, loot sizing,
    /// transfer (or penalty) and the cooldown stamp all commit together.
    ///
    /// The attempt consumes the actor's cooldown whether it succeeds or
    /// fails. A target whose loot cap rounds below one cent resolves through
    /// the failure branch. An unaffordable penalty is skipped rather than
    /// driving the actor negative.
    pub async fn execute_heist(
        &self,
        actor_id: i64,
        target_id: i64,
        policy: &HeistConfig,
        roll: HeistRoll,
    ) -> EngineResult<HeistOutcome> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let now = Utc::now().timestamp();

            let last_heist: Option<i64> = tx
                .query_row(
                    "SELECT last_heist_at FROM accounts WHERE user_id = ?1",
                    [actor_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or(EngineError::NotFound("account"))?;

            if let Some(last) = last_heist {
                let elapsed = now - last;
                if elapsed < policy.cooldown_secs {
                    return Err(EngineError::CooldownActive {
                        remaining_secs: policy.cooldown_secs - elapsed,
                    });
                }
            }

            let target_balance: i64 = tx
                .query_row(
                    "SELECT balance FROM accounts WHERE user_id = ?1",
                    [target_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or(EngineError::NotFound("account"))?;

            tx.execute(
                "UPDATE accounts SET last_heist_at = ?1 WHERE user_id = ?2",
                params![now, actor_id],
            )?;

            let loot_cap = (target_balance as f64 * policy.max_loot_fraction).floor() as i64;
            let outcome = if roll.success && loot_cap >= 1 {
                let loot = ((loot_cap as f64 * roll.loot_fraction).round() as i64)
                    .clamp(1, target_balance);
                if !guarded_delta(&tx, target_id, -loot)? {
                    return Err(EngineError::Fatal(format!(
                        "target account {target_id} missing during heist"
                    )));
                }
                guarded_delta(&tx, actor_id, loot)?;
                log_entry(&tx, target_id, -loot, TxKind::HeistHit)?;
                log_entry(&tx, actor_id, loot, TxKind::HeistLoot)?;
                HeistOutcome::Success { loot }
            } else {
                let penalty = roll.penalty.max(0);
                if penalty > 0 && guarded_delta(&tx, actor_id, -penalty)? {
                    log_entry(&tx, actor_id, -penalty, TxKind::HeistPenalty)?;
                    HeistOutcome::Failed {
                        penalty: Some(penalty),
                    }
                } else {
                    // Unaffordable (or zero) penalty: skip it
                    HeistOutcome::Failed { penalty: None }
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
        .await
    }

    // ---- aggregates (read-committed projections) ----

    /// Sum of all account balances.
    pub async fn total_supply(&self) -> EngineResult<i64> {
        self.with_conn(|conn| {
            let total = conn.query_row(
                "SELECT COALESCE(SUM(balance), 0) FROM accounts",
                [],
                |row| row.get(0),
            )?;
            Ok(total)
        })
        .await
    }

    /// Top-N accounts by balance.
    pub async fn richest(&self, limit: usize) -> EngineResult<Vec<Account>> {
        let limit = limit.clamp(1, 100) as i64;
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT user_id, balance, created_at, last_heist_at
                 FROM accounts ORDER BY balance DESC, user_id ASC LIMIT ?1",
            )?;
            let accounts = stmt
                .query_map([limit], row_to_account)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(accounts)
        })
        .await
    }

    /// Trade counts by status plus the average amount.
    pub async fn trade_counts(&self) -> EngineResult<(i64, i64, i64, Option<f64>)> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0),
                        AVG(amount)
                 FROM trades",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;
            Ok(counts)
        })
        .await
    }

    /// Game count, average bet, and highest bet.
    pub async fn game_counts(&self) -> EngineResult<(i64, Option<f64>, Option<i64>)> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT COUNT(*), AVG(bet_amount), MAX(bet_amount) FROM active_games",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;
            Ok(counts)
        })
        .await
    }

    /// Per-day absolute transaction volume and count over the trailing
    /// `days` days, oldest day first. Returns `(day, volume, tx_count)`.
    pub async fn daily_volume(&self, days: u32) -> EngineResult<Vec<(String, i64, i64)>> {
        let cutoff = (Utc::now() - chrono::Duration::days(days as i64)).to_rfc3339();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT substr(timestamp, 1, 10) AS day,
                        COALESCE(SUM(ABS(amount)), 0),
                        COUNT(*)
                 FROM transactions WHERE timestamp >= ?1
                 GROUP BY day ORDER BY day ASC",
            )?;
            let rows = stmt
                .query_map([cutoff.as_str()], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// A user's most recent log entries, newest first.
    pub async fn transaction_history(
        &self,
        user_id: i64,
        limit: usize,
    ) -> EngineResult<Vec<TxRecord>> {
        let limit = limit.clamp(1, 1000) as i64;
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, user_id, amount, type, timestamp
                 FROM transactions WHERE user_id = ?1
                 ORDER BY id DESC LIMIT ?2",
            )?;
            let records = stmt
                .query_map(params![user_id, limit], row_to_tx_record)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
    }
}

// ---- row-level helpers ----

/// Apply a signed delta only if the resulting balance stays non-negative.
/// Returns false when no row qualified (missing account or would-be
/// overdraft); the caller disambiguates.
fn guarded_delta(tx: &Transaction, user_id: i64, delta: i64) -> EngineResult<bool> {
    let rows = tx.execute(
        "UPDATE accounts SET balance = balance + ?1
         WHERE user_id = ?2 AND balance + ?1 >= 0",
        params![delta, user_id],
    )?;
    Ok(rows == 1)
}

fn account_exists(tx: &Transaction, user_id: i64) -> EngineResult<bool> {
    let count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM accounts WHERE user_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn log_entry(tx: &Transaction, user_id: i64, amount: i64, kind: TxKind) -> EngineResult<()> {
    tx.execute(
        "INSERT INTO transactions (user_id, amount, type, timestamp) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, amount, kind.as_str(), Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn row_to_account(row: &rusqlite::Row) -> rusqlite::Result<Account> {
    Ok(Account {
        user_id: row.get(0)?,
        balance: row.get(1)?,
        created_at: parse_ts(2, row.get::<_, String>(2)?)?,
        last_heist_at: row.get(3)?,
    })
}

fn row_to_trade(row: &rusqlite::Row) -> rusqlite::Result<Trade> {
    let status: String = row.get(4)?;
    Ok(Trade {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        amount: row.get(3)?,
        status: TradeStatus::parse(&status).ok_or_else(|| bad_column(4, &status))?,
        created_at: parse_ts(5, row.get::<_, String>(5)?)?,
    })
}

fn row_to_game(row: &rusqlite::Row) -> rusqlite::Result<Game> {
    let status: String = row.get(4)?;
    Ok(Game {
        id: row.get(0)?,
        game_type: row.get(1)?,
        creator_id: row.get(2)?,
        bet_amount: row.get(3)?,
        status: GameStatus::parse(&status).ok_or_else(|| bad_column(4, &status))?,
        created_at: parse_ts(5, row.get::<_, String>(5)?)?,
    })
}

fn row_to_tx_record(row: &rusqlite::Row) -> rusqlite::Result<TxRecord> {
    let kind: String = row.get(3)?;
    Ok(TxRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        kind: TxKind::parse(&kind).ok_or_else(|| bad_column(3, &kind))?,
        timestamp: parse_ts(4, row.get::<_, String>(4)?)?,
    })
}

fn parse_ts(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn bad_column(idx: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        format!("unrecognized value: {value}").into(),
    )
}
