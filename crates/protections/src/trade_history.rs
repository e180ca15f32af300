//! Access to the host's closed trade history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use protection_core::types::ClosedTrade;
use protection_core::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Read-only view of closed trades, supplied by the host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradeHistory: Send + Sync {
    /// Closed trades on `pair` with `closed_since <= close_date <= closed_until`.
    async fn closed_trades(
        &self,
        pair: &str,
        closed_since: DateTime<Utc>,
        closed_until: DateTime<Utc>,
    ) -> Result<Vec<ClosedTrade>>;
}

/// In-memory trade history for tests, backtests and dry runs.
#[derive(Clone, Default)]
pub struct MemoryTradeHistory {
    trades: Arc<RwLock<Vec<ClosedTrade>>>,
}

impl MemoryTradeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_trades(trades: Vec<ClosedTrade>) -> Self {
        Self {
            trades: Arc::new(RwLock::new(trades)),
        }
    }

    /// Record a closed trade.
    pub async fn add(&self, trade: ClosedTrade) {
        self.trades.write().await.push(trade);
    }

    pub async fn len(&self) -> usize {
        self.trades.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.trades.read().await.is_empty()
    }
}

#[async_trait]
impl TradeHistory for MemoryTradeHistory {
    async fn closed_trades(
        &self,
        pair: &str,
        closed_since: DateTime<Utc>,
        closed_until: DateTime<Utc>,
    ) -> Result<Vec<ClosedTrade>> {
        let trades = self.trades.read().await;

        Ok(trades
            .iter()
            .filter(|t| {
                t.pair == pair && t.close_date >= closed_since && t.close_date <= closed_until
            })
            .cloned()
            .collect())
    }
}
