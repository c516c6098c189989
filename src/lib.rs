//! coinledger — a virtual-currency ledger and transaction engine
//!
//! Accounts hold balances of a fictional currency in indivisible cents.
//! Funds move through two-phase trades (offer, then accept or decline),
//! wager settlement when a second player joins a game, and a unilateral
//! heist attempt on a cooldown. Every mutation is an atomic, guarded
//! operation against a SQLite store with an append-only transaction log,
//! so money is never created or destroyed outside the defined mint and
//! burn points, and concurrent callers cannot race a balance negative or
//! settle the same trade or game twice.
//!
//! The crate is a library invoked in-process by a command-handling caller;
//! `ledger_cli` is a small operator binary over the same API.

pub mod analytics;
pub mod config;
pub mod currency;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;

pub use analytics::Analytics;
pub use config::EngineConfig;
pub use currency::CurrencyFormatter;
pub use engine::{BalanceEngine, GameEngine, TradeEngine};
pub use error::{EngineError, EngineResult};
pub use store::LedgerDb;
