//! Balance engine: account creation, reads, and atomic deltas
//!
//! The only component allowed to mint or burn currency. Account creation
//! mints the configured initial balance; admin grant/deduct/clear wrap the
//! guarded delta primitive.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Account, TxKind};
use crate::store::LedgerDb;
use std::sync::Arc;
use tracing::info;

pub struct BalanceEngine {
    db: LedgerDb,
    config: Arc<EngineConfig>,
}

impl BalanceEngine {
    pub fn new(db: LedgerDb, config: Arc<EngineConfig>) -> Self {
        Self { db, config }
    }

    /// Create an account holding the configured initial balance. Fails
    /// `AlreadyExists` on a duplicate; the initial balance is policy, never
    /// caller input.
    pub async fn create_account(&self, user_id: i64) -> EngineResult<Account> {
        let account = self
            .db
            .create_account(user_id, self.config.initial_balance)
            .await?;
        info!(
            user_id,
            balance = account.balance,
            "account created"
        );
        Ok(account)
    }

    /// Current balance in cents; `NotFound` if the account was never created.
    pub async fn balance(&self, user_id: i64) -> EngineResult<i64> {
        self.db
            .get_balance(user_id)
            .await?
            .ok_or(EngineError::NotFound("account"))
    }

    /// Apply a signed delta with a paired `update` log entry. Guarded: the
    /// resulting balance must stay non-negative. Returns the new balance.
    pub async fn apply_delta(&self, user_id: i64, delta: i64) -> EngineResult<i64> {
        self.db.apply_delta(user_id, delta, TxKind::Update).await
    }

    /// Admin mint: add `amount` cents to a user.
    pub async fn grant(&self, user_id: i64, amount: i64) -> EngineResult<i64> {
        if amount <= 0 {
            return Err(EngineError::InvalidArgument(
                "grant amount must be positive".into(),
            ));
        }
        let balance = self.apply_delta(user_id, amount).await?;
        info!(user_id, amount, balance, "admin grant");
        Ok(balance)
    }

    /// Admin burn: remove `amount` cents from a user. Fails
    /// `InsufficientFunds` rather than going negative.
    pub async fn deduct(&self, user_id: i64, amount: i64) -> EngineResult<i64> {
        if amount <= 0 {
            return Err(EngineError::InvalidArgument(
                "deduct amount must be positive".into(),
            ));
        }
        let balance = self.apply_delta(user_id, -amount).await?;
        info!(user_id, amount, balance, "admin deduct");
        Ok(balance)
    }

    /// Admin burn of the whole balance. Returns the amount removed.
    pub async fn clear(&self, user_id: i64) -> EngineResult<i64> {
        let cleared = self.db.clear_balance(user_id).await?;
        info!(user_id, cleared, "balance cleared");
        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;

    fn test_engine(initial_balance: i64) -> BalanceEngine {
        let config = Arc::new(EngineConfig {
            initial_balance,
            ..EngineConfig::default()
        });
        let db = LedgerDb::in_memory(RetryConfig::default()).unwrap();
        BalanceEngine::new(db, config)
    }

    #[tokio::test]
    async fn test_create_account_mints_configured_balance() {
        let engine = test_engine(2500);
        let account = engine.create_account(7).await.unwrap();
        assert_eq!(account.balance, 2500);
        assert_eq!(engine.balance(7).await.unwrap(), 2500);
    }

    #[tokio::test]
    async fn test_duplicate_account_rejected() {
        let engine = test_engine(100);
        engine.create_account(7).await.unwrap();
        let err = engine.create_account(7).await.unwrap_err();
        assert!(matches!(err, EngineError::AlreadyExists));
    }

    #[tokio::test]
    async fn test_balance_for_unknown_account() {
        let engine = test_engine(100);
        let err = engine.balance(404).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound("account")));
    }

    #[tokio::test]
    async fn test_grant_and_deduct_validate_amounts() {
        let engine = test_engine(100);
        engine.create_account(1).await.unwrap();

        assert!(matches!(
            engine.grant(1, 0).await.unwrap_err(),
            EngineError::InvalidArgument(_)
        ));
        assert!(matches!(
            engine.deduct(1, -5).await.unwrap_err(),
            EngineError::InvalidArgument(_)
        ));

        assert_eq!(engine.grant(1, 50).await.unwrap(), 150);
        assert_eq!(engine.deduct(1, 150).await.unwrap(), 0);
        assert!(matches!(
            engine.deduct(1, 1).await.unwrap_err(),
            EngineError::InsufficientFunds
        ));
    }

    #[tokio::test]
    async fn test_clear_removes_everything_once() {
        let engine = test_engine(900);
        engine.create_account(1).await.unwrap();

        assert_eq!(engine.clear(1).await.unwrap(), 900);
        assert_eq!(engine.balance(1).await.unwrap(), 0);
        // Clearing an empty account is a no-op
        assert_eq!(engine.clear(1).await.unwrap(), 0);
    }
}
