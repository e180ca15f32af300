//! Configuration management for pair protections.

use crate::types::Timeframe;
use crate::{Error, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::debug;

/// Lookback window used when neither minutes nor candles are configured.
pub const DEFAULT_LOOKBACK_MINUTES: i64 = 60;
/// Lock duration used when neither minutes nor candles are configured.
pub const DEFAULT_STOP_DURATION_MINUTES: i64 = 60;
/// Upper bound for any resolved lookback or stop duration (ten years).
pub const MAX_DURATION_MINUTES: i64 = 10 * 365 * 24 * 60;

/// Top-level protections configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtectionsConfig {
    /// Strategy timeframe, required for candle based durations.
    #[serde(default)]
    pub timeframe: Option<Timeframe>,
    #[serde(default)]
    pub protections: Vec<ProtectionConfig>,
}

/// A single configured protection, tagged by its method name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum ProtectionConfig {
    CooldownPeriod(CooldownPeriodConfig),
}

/// Parameters of the `CooldownPeriod` protection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownPeriodConfig {
    /// Lookback window in minutes.
    #[serde(default)]
    pub lookback_period: Option<i64>,
    /// Lookback window in candles of the strategy timeframe.
    #[serde(default)]
    pub lookback_period_candles: Option<i64>,
    /// Lock duration in minutes.
    #[serde(default)]
    pub stop_duration: Option<i64>,
    /// Lock duration in candles of the strategy timeframe.
    #[serde(default)]
    pub stop_duration_candles: Option<i64>,
    /// Wall-clock `HH:MM` (UTC) at which the lock ends. Overrides the stop duration.
    #[serde(default)]
    pub unlock_at: Option<String>,
}

impl CooldownPeriodConfig {
    /// Validate mutually exclusive and malformed settings.
    pub fn validate(&self, timeframe: Option<Timeframe>) -> Result<()> {
        if self.lookback_period.is_some() && self.lookback_period_candles.is_some() {
            return Err(Error::config(
                "lookback_period and lookback_period_candles are mutually exclusive",
            ));
        }
        if self.stop_duration.is_some() && self.stop_duration_candles.is_some() {
            return Err(Error::config(
                "stop_duration and stop_duration_candles are mutually exclusive",
            ));
        }

        for (name, value) in [
            ("lookback_period", self.lookback_period),
            ("lookback_period_candles", self.lookback_period_candles),
            ("stop_duration", self.stop_duration),
            ("stop_duration_candles", self.stop_duration_candles),
        ] {
            if let Some(v) = value {
                if v <= 0 {
                    return Err(Error::config(format!("{name} must be > 0, got {v}")));
                }
            }
        }

        let uses_candles =
            self.lookback_period_candles.is_some() || self.stop_duration_candles.is_some();
        if uses_candles && timeframe.is_none() {
            return Err(Error::config(
                "candle based durations require a timeframe",
            ));
        }

        for (name, minutes) in [
            ("lookback", self.lookback_minutes(timeframe)?),
            ("stop duration", self.stop_duration_minutes(timeframe)?),
        ] {
            if minutes > MAX_DURATION_MINUTES {
                return Err(Error::config(format!(
                    "{name} of {minutes} minutes exceeds the maximum of {MAX_DURATION_MINUTES}"
                )));
            }
        }

        if let Some(unlock_at) = &self.unlock_at {
            parse_unlock_at(unlock_at)?;
        }

        Ok(())
    }

    /// Resolved lookback window in minutes.
    pub fn lookback_minutes(&self, timeframe: Option<Timeframe>) -> Result<i64> {
        resolve_minutes(
            "lookback_period_candles",
            self.lookback_period,
            self.lookback_period_candles,
            timeframe,
            DEFAULT_LOOKBACK_MINUTES,
        )
    }

    /// Resolved lock duration in minutes, ignoring `unlock_at`.
    pub fn stop_duration_minutes(&self, timeframe: Option<Timeframe>) -> Result<i64> {
        resolve_minutes(
            "stop_duration_candles",
            self.stop_duration,
            self.stop_duration_candles,
            timeframe,
            DEFAULT_STOP_DURATION_MINUTES,
        )
    }
}

fn resolve_minutes(
    candles_name: &str,
    minutes: Option<i64>,
    candles: Option<i64>,
    timeframe: Option<Timeframe>,
    default: i64,
) -> Result<i64> {
    match (minutes, candles) {
        (Some(minutes), _) => Ok(minutes),
        (None, Some(candles)) => {
            let tf = timeframe
                .ok_or_else(|| Error::config(format!("{candles_name} requires a timeframe")))?;
            candles.checked_mul(tf.to_minutes()).ok_or_else(|| {
                Error::config(format!("{candles_name} of {candles} {tf} candles overflows"))
            })
        }
        (None, None) => Ok(default),
    }
}

/// Parse an `HH:MM` unlock time.
pub fn parse_unlock_at(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| Error::InvalidUnlockAt(value.to_string()))
}

impl ProtectionsConfig {
    /// Load configuration from a file (format picked by extension), with
    /// `PROTECTIONS__*` environment variables layered on top.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()))
            .add_source(
                ::config::Environment::with_prefix("PROTECTIONS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let loaded: Self = settings.try_deserialize()?;
        loaded.validate()?;

        debug!(
            path = %path.as_ref().display(),
            protections = loaded.protections.len(),
            "Loaded protections config"
        );
        Ok(loaded)
    }

    /// Load a single cooldown protection from environment variables.
    ///
    /// Optional variables:
    /// - PROTECTION_TIMEFRAME: strategy timeframe, e.g. `5m`
    /// - COOLDOWN_LOOKBACK_MINUTES: lookback window (default: 60)
    /// - COOLDOWN_STOP_DURATION_MINUTES: lock duration (default: 60)
    /// - COOLDOWN_UNLOCK_AT: `HH:MM` unlock time
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env_only()
    }

    /// Same as [`ProtectionsConfig::from_env`] without reading a `.env` file.
    pub fn from_env_only() -> Result<Self> {
        let timeframe = env::var("PROTECTION_TIMEFRAME")
            .ok()
            .map(|s| s.parse::<Timeframe>())
            .transpose()?;

        let cooldown = CooldownPeriodConfig {
            lookback_period: env_minutes("COOLDOWN_LOOKBACK_MINUTES")?,
            stop_duration: env_minutes("COOLDOWN_STOP_DURATION_MINUTES")?,
            unlock_at: env::var("COOLDOWN_UNLOCK_AT").ok(),
            ..Default::default()
        };

        let loaded = Self {
            timeframe,
            protections: vec![ProtectionConfig::CooldownPeriod(cooldown)],
        };
        loaded.validate()?;
        Ok(loaded)
    }

    /// Validate every configured protection.
    pub fn validate(&self) -> Result<()> {
        for protection in &self.protections {
            match protection {
                ProtectionConfig::CooldownPeriod(cfg) => cfg.validate(self.timeframe)?,
            }
        }
        Ok(())
    }
}

fn env_minutes(name: &str) -> Result<Option<i64>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| Error::config(format!("{name} must be an integer, got {raw:?}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = CooldownPeriodConfig::default();
        assert!(cfg.validate(None).is_ok());
        assert_eq!(cfg.lookback_minutes(None).unwrap(), DEFAULT_LOOKBACK_MINUTES);
    }

    #[test]
    fn test_lookback_candles_use_timeframe() {
        let cfg = CooldownPeriodConfig {
            lookback_period_candles: Some(12),
            ..Default::default()
        };
        assert_eq!(cfg.lookback_minutes(Some(Timeframe::M5)).unwrap(), 60);
        assert!(cfg.validate(None).is_err());
        assert!(cfg.lookback_minutes(None).is_err());
    }

    #[test]
    fn test_mutually_exclusive_settings() {
        let cfg = CooldownPeriodConfig {
            stop_duration: Some(30),
            stop_duration_candles: Some(2),
            ..Default::default()
        };
        let err = cfg.validate(Some(Timeframe::H1)).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn test_non_positive_durations_rejected() {
        let cfg = CooldownPeriodConfig {
            lookback_period: Some(0),
            ..Default::default()
        };
        assert!(cfg.validate(None).is_err());
    }

    #[test]
    fn test_oversized_durations_rejected() {
        let cfg = CooldownPeriodConfig {
            lookback_period: Some(1_000_000_000_000),
            ..Default::default()
        };
        let err = cfg.validate(None).unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"));

        let cfg = CooldownPeriodConfig {
            stop_duration: Some(MAX_DURATION_MINUTES + 1),
            ..Default::default()
        };
        assert!(cfg.validate(None).is_err());

        let cfg = CooldownPeriodConfig {
            stop_duration: Some(MAX_DURATION_MINUTES),
            ..Default::default()
        };
        assert!(cfg.validate(None).is_ok());
    }

    #[test]
    fn test_candle_overflow_rejected() {
        let cfg = CooldownPeriodConfig {
            stop_duration_candles: Some(i64::MAX / 2),
            ..Default::default()
        };
        assert!(cfg.stop_duration_minutes(Some(Timeframe::W1)).is_err());
        assert!(cfg.validate(Some(Timeframe::W1)).is_err());
    }

    #[test]
    fn test_unlock_at_format() {
        assert_eq!(
            parse_unlock_at("08:30").unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap()
        );
        assert!(matches!(
            parse_unlock_at("8h30"),
            Err(Error::InvalidUnlockAt(_))
        ));
        assert!(parse_unlock_at("24:00").is_err());
    }

    #[test]
    fn test_deserialize_tagged_protections() {
        let json = r#"{
            "timeframe": "5m",
            "protections": [
                { "method": "CooldownPeriod", "stop_duration_candles": 4 }
            ]
        }"#;
        let cfg: ProtectionsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.timeframe, Some(Timeframe::M5));
        let ProtectionConfig::CooldownPeriod(cooldown) = &cfg.protections[0];
        assert_eq!(cooldown.stop_duration_candles, Some(4));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_unknown_method_rejected() {
        let json = r#"{ "protections": [ { "method": "MaxDrawdown" } ] }"#;
        assert!(serde_json::from_str::<ProtectionsConfig>(json).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("protections.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "timeframe": "1h",
                "protections": [
                    {{ "method": "CooldownPeriod", "lookback_period": 120, "unlock_at": "09:00" }}
                ]
            }}"#
        )
        .unwrap();

        let cfg = ProtectionsConfig::from_file(&path).unwrap();
        assert_eq!(cfg.timeframe, Some(Timeframe::H1));
        let ProtectionConfig::CooldownPeriod(cooldown) = &cfg.protections[0];
        assert_eq!(cooldown.lookback_period, Some(120));
        assert_eq!(cooldown.unlock_at.as_deref(), Some("09:00"));
    }

    #[test]
    fn test_from_file_rejects_invalid_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("protections.json");
        std::fs::write(
            &path,
            r#"{ "protections": [ { "method": "CooldownPeriod", "unlock_at": "noon" } ] }"#,
        )
        .unwrap();

        assert!(matches!(
            ProtectionsConfig::from_file(&path),
            Err(Error::InvalidUnlockAt(_))
        ));
    }
}
