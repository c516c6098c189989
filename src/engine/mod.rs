//! Transaction engine components
//!
//! Each component owns the logic for one slice of the ledger's state
//! machine but holds no state of its own; every read and write goes through
//! [`crate::store::LedgerDb`], the single source of truth shared by all
//! concurrent callers.

pub mod balance;
pub mod games;
pub mod trades;

pub use balance::BalanceEngine;
pub use games::GameEngine;
pub use trades::TradeEngine;
