//! Cooldown after a stop-loss exit.
//!
//! Locks a pair when its most recently closed trade within the lookback
//! window was closed by its stop-loss.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use protection_core::config::CooldownPeriodConfig;
use protection_core::types::{LockDecision, Timeframe, TradeSide};
use protection_core::{Error, Result};
use std::sync::Arc;
use tracing::{debug, Level};

use crate::lock_end::{LockEndCalculator, StopDuration};
use crate::log_once::LogOnce;
use crate::protection::Protection;
use crate::trade_history::TradeHistory;

/// Per-pair cooldown following a stop-loss exit.
pub struct CooldownPeriod {
    lookback_minutes: i64,
    lock_end: Arc<dyn LockEndCalculator>,
    trades: Arc<dyn TradeHistory>,
    log_once: Arc<LogOnce>,
}

impl CooldownPeriod {
    pub const NAME: &'static str = "CooldownPeriod";

    /// Create a cooldown with an explicit lookback and lock end calculator.
    pub fn new(
        lookback_minutes: i64,
        lock_end: Arc<dyn LockEndCalculator>,
        trades: Arc<dyn TradeHistory>,
        log_once: Arc<LogOnce>,
    ) -> Self {
        Self {
            lookback_minutes,
            lock_end,
            trades,
            log_once,
        }
    }

    /// Create a cooldown from its configuration, using [`StopDuration`] for the lock end.
    pub fn from_config(
        config: &CooldownPeriodConfig,
        timeframe: Option<Timeframe>,
        trades: Arc<dyn TradeHistory>,
        log_once: Arc<LogOnce>,
    ) -> Result<Self> {
        config.validate(timeframe)?;
        let lookback_minutes = config.lookback_minutes(timeframe)?;
        let stop_duration = StopDuration::from_config(config, timeframe)?;

        Ok(Self::new(
            lookback_minutes,
            Arc::new(stop_duration),
            trades,
            log_once,
        ))
    }

    /// Length in minutes of the trade history window inspected on each evaluation.
    pub fn lookback_minutes(&self) -> i64 {
        self.lookback_minutes
    }

    fn reason(&self) -> String {
        format!("Cooldown period {}.", self.lock_end.time_element())
    }

    async fn cooldown_period(
        &self,
        pair: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LockDecision>> {
        let look_back_until = Duration::try_minutes(self.lookback_minutes)
            .and_then(|lookback| now.checked_sub_signed(lookback))
            .ok_or_else(|| {
                Error::config(format!(
                    "lookback of {} minutes is out of range",
                    self.lookback_minutes
                ))
            })?;
        let trades = self.trades.closed_trades(pair, look_back_until, now).await?;

        // max_by_key keeps the last of equal keys
        let Some(trade) = trades.into_iter().max_by_key(|t| t.close_date) else {
            debug!(pair = %pair, since = %look_back_until, "No closed trades in lookback window");
            return Ok(None);
        };

        if !trade.exited_on_stop_loss() {
            debug!(
                pair = %pair,
                trade_id = %trade.id,
                exit_reason = ?trade.exit_reason,
                "Latest closed trade did not exit on stop-loss"
            );
            return Ok(None);
        }

        let until = self.lock_end.calculate_lock_end(std::slice::from_ref(&trade))?;
        self.log_once.log_at(
            &format!("Cooldown for {} {}.", pair, self.lock_end.time_element()),
            Level::INFO,
            now,
        );

        Ok(Some(LockDecision::lock(until, self.reason())))
    }
}

#[async_trait]
impl Protection for CooldownPeriod {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn short_desc(&self) -> String {
        format!(
            "{} - Cooldown period {}.",
            Self::NAME,
            self.lock_end.time_element()
        )
    }

    fn has_global_stop(&self) -> bool {
        false
    }

    fn has_local_stop(&self) -> bool {
        true
    }

    /// Never locks all pairs.
    async fn global_stop(
        &self,
        _now: DateTime<Utc>,
        _side: TradeSide,
    ) -> Result<Option<LockDecision>> {
        Ok(None)
    }

    async fn stop_per_pair(
        &self,
        pair: &str,
        now: DateTime<Utc>,
        _side: TradeSide,
    ) -> Result<Option<LockDecision>> {
        self.cooldown_period(pair, now).await
    }
}
