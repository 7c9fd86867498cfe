//! Reminder runtime configuration.
//!
//! # Invariants
//! - Missing fields fall back to defaults, so partial JSON is accepted.
//! - `repeat_interval_ms` must be non-zero.
//! - Neither interval may exceed one day; accessors clamp unvalidated values.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_REPEAT_INTERVAL_MS: u64 = 3_000;
pub const DEFAULT_ALERT_CEILING_MS: u64 = 60_000;
pub const DEFAULT_NOTIFICATION_ICON: &str = "/favicon.ico";
pub const MAX_INTERVAL_MS: u64 = 86_400_000;

/// Tunables for alert cadence and notification presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Delay between alarm playback attempts.
    pub repeat_interval_ms: u64,
    /// Unconditional auto-stop after alert start. `0` disables it.
    pub alert_ceiling_ms: u64,
    pub notification_icon: String,
    /// Send a confirmation notification once permission is granted.
    pub setup_notification: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            repeat_interval_ms: DEFAULT_REPEAT_INTERVAL_MS,
            alert_ceiling_ms: DEFAULT_ALERT_CEILING_MS,
            notification_icon: DEFAULT_NOTIFICATION_ICON.to_string(),
            setup_notification: true,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    ZeroRepeatInterval,
    IntervalTooLarge { field: &'static str, value: u64 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid reminder config: {err}"),
            Self::ZeroRepeatInterval => write!(f, "repeat_interval_ms must be greater than 0"),
            Self::IntervalTooLarge { field, value } => {
                write!(f, "{field} must be at most {MAX_INTERVAL_MS}, got {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::ZeroRepeatInterval | Self::IntervalTooLarge { .. } => None,
        }
    }
}

impl ReminderConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repeat_interval_ms == 0 {
            return Err(ConfigError::ZeroRepeatInterval);
        }
        for (field, value) in [
            ("repeat_interval_ms", self.repeat_interval_ms),
            ("alert_ceiling_ms", self.alert_ceiling_ms),
        ] {
            if value > MAX_INTERVAL_MS {
                return Err(ConfigError::IntervalTooLarge { field, value });
            }
        }
        Ok(())
    }

    pub fn repeat_interval(&self) -> Duration {
        clamped_ms(self.repeat_interval_ms)
    }

    pub fn alert_ceiling(&self) -> Option<Duration> {
        (self.alert_ceiling_ms > 0).then(|| clamped_ms(self.alert_ceiling_ms))
    }
}

fn clamped_ms(value: u64) -> Duration {
    // MAX_INTERVAL_MS always fits in i64.
    Duration::milliseconds(value.min(MAX_INTERVAL_MS) as i64)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ReminderConfig};
    use chrono::Duration;

    #[test]
    fn defaults_match_alarm_cadence() {
        let config = ReminderConfig::default();
        assert_eq!(config.repeat_interval(), Duration::seconds(3));
        assert_eq!(config.alert_ceiling(), Some(Duration::seconds(60)));
        assert_eq!(config.notification_icon, "/favicon.ico");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ReminderConfig::from_json(r#"{"alert_ceiling_ms": 0}"#).expect("parse");
        assert_eq!(config.alert_ceiling(), None);
        assert_eq!(config.repeat_interval_ms, 3_000);
    }

    #[test]
    fn rejects_zero_repeat_interval() {
        let err = ReminderConfig::from_json(r#"{"repeat_interval_ms": 0}"#)
            .expect_err("zero interval must fail");
        assert!(matches!(err, ConfigError::ZeroRepeatInterval));
    }

    #[test]
    fn rejects_intervals_longer_than_a_day() {
        let err = ReminderConfig::from_json(r#"{"repeat_interval_ms": 9000000000000000000}"#)
            .expect_err("huge interval must fail");
        assert!(matches!(
            err,
            ConfigError::IntervalTooLarge {
                field: "repeat_interval_ms",
                ..
            }
        ));

        let err = ReminderConfig::from_json(r#"{"alert_ceiling_ms": 86400001}"#)
            .expect_err("ceiling past a day must fail");
        assert!(matches!(
            err,
            ConfigError::IntervalTooLarge {
                field: "alert_ceiling_ms",
                value: 86_400_001
            }
        ));

        let config =
            ReminderConfig::from_json(r#"{"alert_ceiling_ms": 86400000}"#).expect("a day is fine");
        assert_eq!(config.alert_ceiling(), Some(Duration::days(1)));
    }
}
