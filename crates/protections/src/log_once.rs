//! Deduplicated logging for messages that would otherwise repeat every cycle.

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, error, info, trace, warn, Level};

/// Entries kept before expired keys are pruned.
const MAX_ENTRIES: usize = 1000;

/// Emits each distinct message at most once per refresh period.
pub struct LogOnce {
    /// Last emission time keyed by message.
    seen: DashMap<String, DateTime<Utc>>,
    refresh_period: Duration,
}

impl Default for LogOnce {
    fn default() -> Self {
        Self::new()
    }
}

impl LogOnce {
    /// Refresh period of one hour.
    pub fn new() -> Self {
        Self::with_refresh_period(Duration::hours(1))
    }

    pub fn with_refresh_period(refresh_period: Duration) -> Self {
        Self {
            seen: DashMap::new(),
            refresh_period,
        }
    }

    /// Log `message` at `level` unless it was logged within the refresh period
    /// before `now`. Returns whether the message was emitted.
    pub fn log_at(&self, message: &str, level: Level, now: DateTime<Utc>) -> bool {
        match self.seen.entry(message.to_string()) {
            Entry::Occupied(mut entry) => {
                if now - *entry.get() < self.refresh_period {
                    return false;
                }
                entry.insert(now);
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
            }
        }

        if self.seen.len() > MAX_ENTRIES {
            self.prune(now);
        }

        emit(level, message);
        true
    }

    /// Number of messages currently remembered.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn prune(&self, now: DateTime<Utc>) {
        let refresh_period = self.refresh_period;
        self.seen.retain(|_, logged_at| now - *logged_at < refresh_period);
    }
}

fn emit(level: Level, message: &str) {
    match level {
        Level::ERROR => error!("{}", message),
        Level::WARN => warn!("{}", message),
        Level::INFO => info!("{}", message),
        Level::DEBUG => debug!("{}", message),
        Level::TRACE => trace!("{}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logs_once_within_period() {
        let log_once = LogOnce::new();
        let now = Utc::now();

        assert!(log_once.log_at("Cooldown for BTC/USDT", Level::INFO, now));
        assert!(!log_once.log_at(
            "Cooldown for BTC/USDT",
            Level::INFO,
            now + Duration::minutes(30)
        ));
        assert!(log_once.log_at("Cooldown for ETH/USDT", Level::INFO, now));
        assert_eq!(log_once.len(), 2);
    }

    #[test]
    fn test_logs_again_after_refresh_period() {
        let log_once = LogOnce::with_refresh_period(Duration::minutes(10));
        let now = Utc::now();

        assert!(log_once.log_at("msg", Level::WARN, now));
        assert!(!log_once.log_at("msg", Level::WARN, now + Duration::minutes(9)));
        assert!(log_once.log_at("msg", Level::WARN, now + Duration::minutes(10)));
    }

    #[test]
    fn test_prunes_expired_entries() {
        let log_once = LogOnce::with_refresh_period(Duration::minutes(1));
        let start = Utc::now();
        for i in 0..MAX_ENTRIES {
            log_once.log_at(&format!("msg {i}"), Level::DEBUG, start);
        }
        assert_eq!(log_once.len(), MAX_ENTRIES);

        log_once.log_at("late", Level::DEBUG, start + Duration::minutes(5));
        assert_eq!(log_once.len(), 1);
    }
}
