//! Protections
//!
//! Pluggable pair protection rules. Each rule inspects the host's trade
//! history and may ask the protection manager to lock a pair for a while.

pub mod cooldown_period;
pub mod lock_end;
pub mod log_once;
pub mod protection;
pub mod trade_history;

pub use cooldown_period::CooldownPeriod;
pub use lock_end::{LockEndCalculator, StopDuration};
pub use log_once::LogOnce;
pub use protection::{build_protections, Protection};
pub use trade_history::{MemoryTradeHistory, TradeHistory};
