//! Operator CLI for poking a ledger database
//!
//! One engine operation per invocation; results print as JSON so the
//! output can be piped. The chat-facing caller uses the library directly.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coinledger::{
    Analytics, BalanceEngine, CurrencyFormatter, EngineConfig, GameEngine, LedgerDb, TradeEngine,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ledger_cli", about = "Operate on a coinledger database")]
struct Cli {
    /// Path to the ledger database file
    #[arg(long, env = "LEDGER_DB_PATH", default_value = "./coinledger.db")]
    db: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account for a user (mints the configured initial balance)
    New { user_id: i64 },
    /// Show a user's balance
    Balance { user_id: i64 },
    /// Admin: add cents to a user
    Grant { user_id: i64, amount: i64 },
    /// Admin: remove cents from a user
    Deduct { user_id: i64, amount: i64 },
    /// Admin: zero a user's balance
    Clear { user_id: i64 },
    /// Offer a trade to another user
    Offer {
        sender_id: i64,
        receiver_id: i64,
        amount: i64,
    },
    /// Accept a pending trade
    Accept { trade_id: i64 },
    /// Decline a pending trade
    Decline { trade_id: i64 },
    /// List pending trades addressed to a user
    Pending { user_id: i64 },
    /// Open a coinflip game
    Coinflip { creator_id: i64, bet: i64 },
    /// List open coinflip games
    Games,
    /// Join an open game (settles it)
    Join { game_id: i64, joiner_id: i64 },
    /// Attempt a heist on another user
    Heist { actor_id: i64, target_id: i64 },
    /// Overall ledger statistics
    Stats,
    /// Top balances
    Richest {
        #[arg(default_value_t = 10)]
        limit: usize,
    },
    /// Per-day transaction volume
    Volume {
        #[arg(default_value_t = 7)]
        days: u32,
    },
    /// A user's recent transactions
    History {
        user_id: i64,
        #[arg(default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Arc::new(EngineConfig::from_env());
    config
        .validate()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid engine configuration")?;

    let db = LedgerDb::new(&cli.db, config.retry.clone()).context("open ledger database")?;
    let balances = BalanceEngine::new(db.clone(), config.clone());
    let trades = TradeEngine::new(db.clone());
    let games = GameEngine::new(db.clone(), config.clone());
    let analytics = Analytics::new(db);
    let fmt = CurrencyFormatter::new(&config);

    match cli.command {
        Command::New { user_id } => {
            let account = balances.create_account(user_id).await?;
            println!("{}", serde_json::to_string_pretty(&account)?);
        }
        Command::Balance { user_id } => {
            let cents = balances.balance(user_id).await?;
            println!("{}", fmt.format(cents));
        }
        Command::Grant { user_id, amount } => {
            let balance = balances.grant(user_id, amount).await?;
            println!("new balance: {}", fmt.format(balance));
        }
        Command::Deduct { user_id, amount } => {
            let balance = balances.deduct(user_id, amount).await?;
            println!("new balance: {}", fmt.format(balance));
        }
        Command::Clear { user_id } => {
            let cleared = balances.clear(user_id).await?;
            println!("removed {}", fmt.format(cleared));
        }
        Command::Offer {
            sender_id,
            receiver_id,
            amount,
        } => {
            let trade_id = trades.offer(sender_id, receiver_id, amount).await?;
            println!("trade {trade_id} offered");
        }
        Command::Accept { trade_id } => {
            let trade = trades.accept(trade_id).await?;
            println!("{}", serde_json::to_string_pretty(&trade)?);
        }
        Command::Decline { trade_id } => {
            trades.decline(trade_id).await?;
            println!("trade {trade_id} declined");
        }
        Command::Pending { user_id } => {
            let pending = trades.pending_for(user_id).await?;
            println!("{}", serde_json::to_string_pretty(&pending)?);
        }
        Command::Coinflip { creator_id, bet } => {
            let game_id = games.create("coinflip", creator_id, bet).await?;
            println!("game {game_id} open");
        }
        Command::Games => {
            let open = games.open_games("coinflip").await?;
            println!("{}", serde_json::to_string_pretty(&open)?);
        }
        Command::Join { game_id, joiner_id } => {
            let outcome = games.join(game_id, joiner_id).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Heist {
            actor_id,
            target_id,
        } => {
            let outcome = games.heist(actor_id, target_id).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Stats => {
            let supply = analytics.total_supply().await?;
            let trade_stats = analytics.trade_stats().await?;
            let game_stats = analytics.game_stats().await?;
            println!("total supply: {}", fmt.format(supply));
            println!("{}", serde_json::to_string_pretty(&trade_stats)?);
            println!("{}", serde_json::to_string_pretty(&game_stats)?);
        }
        Command::Richest { limit } => {
            for (rank, account) in analytics.richest(limit).await?.iter().enumerate() {
                println!(
                    "{}. user {}: {}",
                    rank + 1,
                    account.user_id,
                    fmt.format(account.balance)
                );
            }
        }
        Command::Volume { days } => {
            for row in analytics.daily_volume(days).await? {
                println!("{} | {} cents across {} txs", row.day, row.volume, row.tx_count);
            }
        }
        Command::History { user_id, limit } => {
            let records = analytics.history(user_id, limit).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}
