//! Game settlement: open wagers that settle when a second player joins,
//! plus the unilateral heist attempt
//!
//! Randomness is rolled up front; the store applies the pre-rolled outcome
//! inside its transaction, so settlement stays deterministic and testable
//! under the policy knobs in [`crate::config::HeistConfig`].

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Game, GameOutcome, GameStatus, HeistOutcome};
use crate::store::{HeistRoll, LedgerDb};
use rand::Rng;
use std::sync::Arc;
use tracing::info;

pub struct GameEngine {
    db: LedgerDb,
    config: Arc<EngineConfig>,
}

impl GameEngine {
    pub fn new(db: LedgerDb, config: Arc<EngineConfig>) -> Self {
        Self { db, config }
    }

    /// Open a wager. The bet is locked in at creation and never changes;
    /// no funds move until someone joins.
    pub async fn create(
        &self,
        game_type: &str,
        creator_id: i64,
        bet_amount: i64,
    ) -> EngineResult<i64> {
        if bet_amount < self.config.min_bet {
            return Err(EngineError::InvalidArgument(format!(
                "minimum bet is {} cents",
                self.config.min_bet
            )));
        }
        if bet_amount > self.config.max_bet {
            return Err(EngineError::InvalidArgument(format!(
                "maximum bet is {} cents",
                self.config.max_bet
            )));
        }

        let balance = self
            .db
            .get_balance(creator_id)
            .await?
            .ok_or(EngineError::NotFound("account"))?;
        if balance < bet_amount {
            return Err(EngineError::InsufficientFunds);
        }

        let game_id = self.db.create_game(game_type, creator_id, bet_amount).await?;
        info!(game_id, game_type, creator_id, bet_amount, "game created");
        Ok(game_id)
    }

    /// Open games of the given type, newest first. Read-only.
    pub async fn open_games(&self, game_type: &str) -> EngineResult<Vec<Game>> {
        self.db.open_games(game_type).await
    }

    /// Join an open game and settle it: a uniformly random winner takes the
    /// bet from the loser. Only the first join on a game succeeds; later
    /// callers see `NotFound`.
    pub async fn join(&self, game_id: i64, joiner_id: i64) -> EngineResult<GameOutcome> {
        let game = self
            .db
            .get_game(game_id)
            .await?
            .ok_or(EngineError::NotFound("game"))?;
        if game.status != GameStatus::Open {
            return Err(EngineError::NotFound("game"));
        }
        if joiner_id == game.creator_id {
            return Err(EngineError::InvalidArgument(
                "cannot join your own game".into(),
            ));
        }

        let joiner_balance = self
            .db
            .get_balance(joiner_id)
            .await?
            .ok_or(EngineError::NotFound("account"))?;
        if joiner_balance < game.bet_amount {
            return Err(EngineError::InsufficientFunds);
        }

        let creator_wins = rand::thread_rng().gen_bool(0.5);
        let (winner_id, loser_id) = if creator_wins {
            (game.creator_id, joiner_id)
        } else {
            (joiner_id, game.creator_id)
        };

        let outcome = self.db.settle_game(game_id, winner_id, loser_id).await?;
        info!(
            game_id,
            winner_id = outcome.winner_id,
            pot = outcome.pot,
            "game joined and settled"
        );
        Ok(outcome)
    }

    /// Unilateral attempt to lift funds from another account. Resolves
    /// immediately: on a successful roll the actor takes a random cut of
    /// the target's balance; on failure the actor pays a randomized penalty
    /// if affordable. One attempt per cooldown window per actor.
    pub async fn heist(&self, actor_id: i64, target_id: i64) -> EngineResult<HeistOutcome> {
        if actor_id == target_id {
            return Err(EngineError::InvalidArgument(
                "cannot heist yourself".into(),
            ));
        }

        let policy = &self.config.heist;
        let roll = {
            let mut rng = rand::thread_rng();
            HeistRoll {
                success: rng.gen_bool(policy.success_chance),
                loot_fraction: rng.gen::<f64>(),
                penalty: rng.gen_range(policy.penalty_min..=policy.penalty_max),
            }
        };

        let outcome = self.db.execute_heist(actor_id, target_id, policy, roll).await?;
        match &outcome {
            HeistOutcome::Success { loot } => {
                info!(actor_id, target_id, loot, "heist succeeded");
            }
            HeistOutcome::Failed { penalty } => {
                info!(actor_id, target_id, ?penalty, "heist failed");
            }
        }
        Ok(outcome)
    }
}
