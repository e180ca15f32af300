//! Lock end calculation for protections.

use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};
use protection_core::config::{
    parse_unlock_at, CooldownPeriodConfig, DEFAULT_STOP_DURATION_MINUTES,
};
use protection_core::types::{ClosedTrade, Timeframe};
use protection_core::{Error, Result};

/// Computes when a lock triggered by a set of trades should end.
pub trait LockEndCalculator: Send + Sync {
    /// Lock end for the given trades. Errors when `trades` is empty.
    fn calculate_lock_end(&self, trades: &[ClosedTrade]) -> Result<DateTime<Utc>>;

    /// Human readable lock length, e.g. `for 60 minutes` or `until 08:00`.
    fn time_element(&self) -> String;
}

/// Stock lock duration: a fixed length after the last close, or a wall-clock unlock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDuration {
    Minutes(i64),
    Candles { count: i64, timeframe: Timeframe },
    /// Unlock at this UTC time of day, on the close day or the day after.
    UnlockAt(NaiveTime),
}

impl Default for StopDuration {
    fn default() -> Self {
        Self::Minutes(DEFAULT_STOP_DURATION_MINUTES)
    }
}

impl StopDuration {
    /// Resolve the stop duration settings of a cooldown config.
    pub fn from_config(
        config: &CooldownPeriodConfig,
        timeframe: Option<Timeframe>,
    ) -> Result<Self> {
        if let Some(unlock_at) = &config.unlock_at {
            return Ok(Self::UnlockAt(parse_unlock_at(unlock_at)?));
        }

        match (config.stop_duration, config.stop_duration_candles) {
            (Some(minutes), _) => Ok(Self::Minutes(minutes)),
            (None, Some(count)) => {
                let timeframe = timeframe
                    .ok_or_else(|| Error::config("stop_duration_candles requires a timeframe"))?;
                Ok(Self::Candles { count, timeframe })
            }
            (None, None) => Ok(Self::default()),
        }
    }
}

/// `start + minutes`, or a config error when the result is out of range.
fn add_minutes(start: DateTime<Utc>, minutes: i64) -> Result<DateTime<Utc>> {
    Duration::try_minutes(minutes)
        .and_then(|length| start.checked_add_signed(length))
        .ok_or_else(|| Error::config(format!("lock of {minutes} minutes is out of range")))
}

impl LockEndCalculator for StopDuration {
    fn calculate_lock_end(&self, trades: &[ClosedTrade]) -> Result<DateTime<Utc>> {
        let max_date = trades
            .iter()
            .map(|t| t.close_date)
            .max()
            .ok_or(Error::NoTrades)?;

        match self {
            Self::UnlockAt(at) => {
                let unlock = max_date
                    .with_hour(at.hour())
                    .and_then(|d| d.with_minute(at.minute()))
                    .ok_or_else(|| Error::InvalidUnlockAt(at.format("%H:%M").to_string()))?;
                if unlock < max_date {
                    add_minutes(unlock, 24 * 60)
                } else {
                    Ok(unlock)
                }
            }
            Self::Minutes(minutes) => add_minutes(max_date, *minutes),
            Self::Candles { count, timeframe } => {
                let minutes = count.checked_mul(timeframe.to_minutes()).ok_or_else(|| {
                    Error::config(format!("{count} {timeframe} candles overflow"))
                })?;
                add_minutes(max_date, minutes)
            }
        }
    }

    fn time_element(&self) -> String {
        match self {
            Self::Minutes(minutes) => format!("for {}", plural(*minutes, "minute", "minutes")),
            Self::Candles { count, .. } => format!("for {}", plural(*count, "candle", "candles")),
            Self::UnlockAt(at) => format!("until {}", at.format("%H:%M")),
        }
    }
}

fn plural(count: i64, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}
