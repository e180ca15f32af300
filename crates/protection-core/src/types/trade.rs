//! Closed trade records as seen by protection rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exit reason recorded when a trade was closed by its stop-loss.
pub const EXIT_REASON_STOP_LOSS: &str = "stop_loss";

/// Direction a protection is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Long,
    Short,
}

impl std::str::FromStr for TradeSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            other => Err(format!("unknown trade side: {other}")),
        }
    }
}

/// A trade that has been closed, supplied by the host trade history.
///
/// Protection rules only ever read these; creating and persisting them is
/// the host's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub id: Uuid,
    /// Pair identifier, e.g. `BTC/USDT`.
    pub pair: String,
    /// Whether the trade was a short.
    #[serde(default)]
    pub is_short: bool,
    pub open_date: DateTime<Utc>,
    pub close_date: DateTime<Utc>,
    /// Enum-like exit reason string such as `stop_loss` or `roi`.
    #[serde(default)]
    pub exit_reason: Option<String>,
}

impl ClosedTrade {
    /// Create a closed trade record.
    pub fn new(
        pair: impl Into<String>,
        open_date: DateTime<Utc>,
        close_date: DateTime<Utc>,
        exit_reason: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pair: pair.into(),
            is_short: false,
            open_date,
            close_date,
            exit_reason,
        }
    }

    /// True only when the exit reason is exactly `stop_loss`.
    pub fn exited_on_stop_loss(&self) -> bool {
        self.exit_reason.as_deref() == Some(EXIT_REASON_STOP_LOSS)
    }
}
