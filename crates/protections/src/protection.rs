//! The protection interface evaluated by the host protection manager.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use protection_core::config::{ProtectionConfig, ProtectionsConfig};
use protection_core::types::{LockDecision, TradeSide};
use protection_core::Result;
use std::sync::Arc;
use tracing::info;

use crate::cooldown_period::CooldownPeriod;
use crate::log_once::LogOnce;
use crate::trade_history::TradeHistory;

/// A protection rule that may veto new entries for one pair or for all pairs.
///
/// Implementations must be stateless between calls so the host can evaluate
/// distinct pairs concurrently.
#[async_trait]
pub trait Protection: Send + Sync {
    /// Method name as used in configuration.
    fn name(&self) -> &'static str;

    /// Short description, used for startup messages.
    fn short_desc(&self) -> String;

    /// Whether [`Protection::global_stop`] can ever return a lock.
    fn has_global_stop(&self) -> bool;

    /// Whether [`Protection::stop_per_pair`] can ever return a lock.
    fn has_local_stop(&self) -> bool;

    /// Stop entering positions on all pairs.
    async fn global_stop(&self, now: DateTime<Utc>, side: TradeSide)
        -> Result<Option<LockDecision>>;

    /// Stop entering positions on `pair`.
    async fn stop_per_pair(
        &self,
        pair: &str,
        now: DateTime<Utc>,
        side: TradeSide,
    ) -> Result<Option<LockDecision>>;
}

/// Instantiate every configured protection against a shared trade history.
pub fn build_protections(
    config: &ProtectionsConfig,
    trades: Arc<dyn TradeHistory>,
    log_once: Arc<LogOnce>,
) -> Result<Vec<Box<dyn Protection>>> {
    config.validate()?;

    let mut protections: Vec<Box<dyn Protection>> =
        Vec::with_capacity(config.protections.len());
    for protection in &config.protections {
        let built: Box<dyn Protection> = match protection {
            ProtectionConfig::CooldownPeriod(cfg) => Box::new(CooldownPeriod::from_config(
                cfg,
                config.timeframe,
                trades.clone(),
                log_once.clone(),
            )?),
        };
        info!(protection = built.name(), "{}", built.short_desc());
        protections.push(built);
    }

    Ok(protections)
}
