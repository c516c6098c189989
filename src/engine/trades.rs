//! Trade protocol: two-phase transfers (offer, then accept or decline)
//!
//! All state lives in the store; there is no in-memory session. The offer
//! checks funds as fast-fail UX only — settlement re-verifies the sender
//! with a guarded debit inside the store transaction, which is what
//! actually closes the check-then-act race.

use crate::error::{EngineError, EngineResult};
use crate::models::Trade;
use crate::store::LedgerDb;
use tracing::info;

pub struct TradeEngine {
    db: LedgerDb,
}

impl TradeEngine {
    pub fn new(db: LedgerDb) -> Self {
        Self { db }
    }

    /// Open a pending trade offer from `sender_id` to `receiver_id`.
    /// Returns the trade id the receiver accepts or declines with.
    pub async fn offer(
        &self,
        sender_id: i64,
        receiver_id: i64,
        amount: i64,
    ) -> EngineResult<i64> {
        if sender_id == receiver_id {
            return Err(EngineError::InvalidArgument(
                "cannot trade with yourself".into(),
            ));
        }
        if amount <= 0 {
            return Err(EngineError::InvalidArgument(
                "trade amount must be positive".into(),
            ));
        }

        let sender_balance = self
            .db
            .get_balance(sender_id)
            .await?
            .ok_or(EngineError::NotFound("account"))?;
        if sender_balance < amount {
            return Err(EngineError::InsufficientFunds);
        }
        if self.db.get_balance(receiver_id).await?.is_none() {
            return Err(EngineError::NotFound("account"));
        }

        let trade_id = self.db.create_trade(sender_id, receiver_id, amount).await?;
        info!(trade_id, sender_id, receiver_id, amount, "trade offered");
        Ok(trade_id)
    }

    /// Accept a pending trade, settling it atomically. Of concurrent
    /// accept/decline calls on the same trade, exactly one succeeds; the
    /// rest see `NotFound`. An insufficient sender leaves the trade pending
    /// and returns `InsufficientFunds`.
    pub async fn accept(&self, trade_id: i64) -> EngineResult<Trade> {
        let trade = self.db.settle_trade(trade_id).await?;
        info!(
            trade_id,
            sender_id = trade.sender_id,
            receiver_id = trade.receiver_id,
            amount = trade.amount,
            "trade accepted"
        );
        Ok(trade)
    }

    /// Decline a pending trade. No funds move; the trade becomes terminal.
    pub async fn decline(&self, trade_id: i64) -> EngineResult<()> {
        self.db.cancel_trade(trade_id).await?;
        info!(trade_id, "trade declined");
        Ok(())
    }

    /// Pending trades addressed to this user, newest first. Read-only.
    pub async fn pending_for(&self, receiver_id: i64) -> EngineResult<Vec<Trade>> {
        self.db.pending_trades_for(receiver_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::models::TradeStatus;

    async fn setup() -> (LedgerDb, TradeEngine) {
        let db = LedgerDb::in_memory(RetryConfig::default()).unwrap();
        db.create_account(1, 1000).await.unwrap();
        db.create_account(2, 1000).await.unwrap();
        (db.clone(), TradeEngine::new(db))
    }

    #[tokio::test]
    async fn test_offer_validations() {
        let (_db, trades) = setup().await;

        assert!(matches!(
            trades.offer(1, 1, 100).await.unwrap_err(),
            EngineError::InvalidArgument(_)
        ));
        assert!(matches!(
            trades.offer(1, 2, 0).await.unwrap_err(),
            EngineError::InvalidArgument(_)
        ));
        assert!(matches!(
            trades.offer(1, 2, 5000).await.unwrap_err(),
            EngineError::InsufficientFunds
        ));
        assert!(matches!(
            trades.offer(1, 99, 100).await.unwrap_err(),
            EngineError::NotFound("account")
        ));
        assert!(matches!(
            trades.offer(99, 2, 100).await.unwrap_err(),
            EngineError::NotFound("account")
        ));
    }

    #[tokio::test]
    async fn test_offer_accept_flow() {
        let (db, trades) = setup().await;

        let trade_id = trades.offer(1, 2, 300).await.unwrap();
        let settled = trades.accept(trade_id).await.unwrap();

        assert_eq!(settled.status, TradeStatus::Completed);
        assert_eq!(db.get_balance(1).await.unwrap(), Some(700));
        assert_eq!(db.get_balance(2).await.unwrap(), Some(1300));
    }

    #[tokio::test]
    async fn test_declined_trade_is_terminal() {
        let (db, trades) = setup().await;

        let trade_id = trades.offer(1, 2, 300).await.unwrap();
        trades.decline(trade_id).await.unwrap();

        assert!(matches!(
            trades.accept(trade_id).await.unwrap_err(),
            EngineError::NotFound("trade")
        ));
        assert_eq!(db.get_balance(1).await.unwrap(), Some(1000));
        assert_eq!(db.get_balance(2).await.unwrap(), Some(1000));
    }

    #[tokio::test]
    async fn test_pending_list_newest_first() {
        let (_db, trades) = setup().await;

        let first = trades.offer(1, 2, 100).await.unwrap();
        let second = trades.offer(1, 2, 200).await.unwrap();

        let pending = trades.pending_for(2).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, second);
        assert_eq!(pending[1].id, first);

        // Not addressed to the sender
        assert!(trades.pending_for(1).await.unwrap().is_empty());

        trades.accept(second).await.unwrap();
        let pending = trades.pending_for(2).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, first);
    }

    #[tokio::test]
    async fn test_accept_after_sender_spent_down() {
        let (db, trades) = setup().await;

        let trade_id = trades.offer(1, 2, 800).await.unwrap();
        // Sender's balance drops below the offered amount before acceptance
        db.apply_delta(1, -500, crate::models::TxKind::Update)
            .await
            .unwrap();

        assert!(matches!(
            trades.accept(trade_id).await.unwrap_err(),
            EngineError::InsufficientFunds
        ));

        // Still pending: can be retried once funds return, or declined
        let pending = trades.pending_for(2).await.unwrap();
        assert_eq!(pending.len(), 1);

        db.apply_delta(1, 500, crate::models::TxKind::Update)
            .await
            .unwrap();
        trades.accept(trade_id).await.unwrap();
        assert_eq!(db.get_balance(2).await.unwrap(), Some(1800));
    }
}
