//! Protection Check
//!
//! Evaluates the configured protections for one pair against a JSON file of
//! closed trades and prints each protection's decision.
//!
//! Usage:
//!   protection-check --trades trades.json --pair BTC/USDT
//!   protection-check --config protections.json --trades trades.json --pair BTC/USDT --at 2024-05-01T12:00:00Z

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use protection_core::config::ProtectionsConfig;
use protection_core::types::{ClosedTrade, LockDecision, TradeSide};
use protections::{build_protections, LogOnce, MemoryTradeHistory, Protection};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "protection-check")]
#[command(about = "Dry-run pair protections against closed trades")]
struct Args {
    /// Protections config file (JSON, TOML or YAML). Falls back to environment variables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file containing an array of closed trades
    #[arg(long)]
    trades: PathBuf,

    /// Pair to evaluate, e.g. BTC/USDT
    #[arg(long)]
    pair: String,

    /// Evaluation time (RFC 3339). Defaults to now.
    #[arg(long)]
    at: Option<DateTime<Utc>>,

    /// Side to evaluate for
    #[arg(long, default_value = "long")]
    side: TradeSide,
}

#[derive(Debug, Serialize)]
struct Evaluation {
    protection: String,
    pair_lock: Option<LockDecision>,
    global_lock: Option<LockDecision>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "protection_check=info,protections=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;

    let raw = std::fs::read_to_string(&args.trades)
        .with_context(|| format!("reading trades from {}", args.trades.display()))?;
    let trades = parse_trades(&raw)?;
    info!(trades = trades.len(), "Loaded closed trades");

    let history = Arc::new(MemoryTradeHistory::from_trades(trades));
    let protections = build_protections(&config, history, Arc::new(LogOnce::new()))?;

    let now = args.at.unwrap_or_else(Utc::now);
    let evaluations = evaluate(&protections, &args.pair, now, args.side).await?;

    println!("{}", serde_json::to_string_pretty(&evaluations)?);

    Ok(())
}

/// Protections config from `path`, or from the environment when no file is given.
fn load_config(path: Option<&Path>) -> Result<ProtectionsConfig> {
    match path {
        Some(path) => ProtectionsConfig::from_file(path)
            .with_context(|| format!("loading protections config from {}", path.display())),
        None => Ok(ProtectionsConfig::from_env()?),
    }
}

fn parse_trades(raw: &str) -> Result<Vec<ClosedTrade>> {
    serde_json::from_str(raw).context("parsing closed trades")
}

/// Run every protection's pair and global checks that it supports.
async fn evaluate(
    protections: &[Box<dyn Protection>],
    pair: &str,
    now: DateTime<Utc>,
    side: TradeSide,
) -> Result<Vec<Evaluation>> {
    let mut evaluations = Vec::with_capacity(protections.len());
    for protection in protections {
        let pair_lock = if protection.has_local_stop() {
            protection.stop_per_pair(pair, now, side).await?
        } else {
            None
        };
        let global_lock = if protection.has_global_stop() {
            protection.global_stop(now, side).await?
        } else {
            None
        };

        evaluations.push(Evaluation {
            protection: protection.name().to_string(),
            pair_lock,
            global_lock,
        });
    }

    Ok(evaluations)
}
