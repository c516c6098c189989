//! Durable ledger persistence

pub mod ledger_db;

pub use ledger_db::{HeistRoll, LedgerDb};
