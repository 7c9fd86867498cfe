//! Daily schedule time parsing.
//!
//! # Responsibility
//! - Parse stored `HH:MM` schedule strings into a validated time of day.
//! - Project a time of day onto the current calendar day.
//!
//! # Invariants
//! - Hour is in `[0, 23]`, minute is in `[0, 59]`.
//! - Projection never rolls over to the next day; an occurrence at or
//!   before `now` yields `None`.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static TIME_OF_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid time-of-day regex"));

/// Validated wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

/// Parse failures for schedule strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeOfDayError {
    /// Input is not shaped like `HH:MM`.
    Malformed(String),
    HourOutOfRange(u32),
    MinuteOutOfRange(u32),
}

impl Display for TimeOfDayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => write!(f, "time must be formatted as HH:MM, got `{value}`"),
            Self::HourOutOfRange(hour) => write!(f, "hour must be in 0..=23, got {hour}"),
            Self::MinuteOutOfRange(minute) => write!(f, "minute must be in 0..=59, got {minute}"),
        }
    }
}

impl Error for TimeOfDayError {}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeOfDayError> {
        if hour > 23 {
            return Err(TimeOfDayError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(TimeOfDayError::MinuteOutOfRange(minute));
        }
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or(TimeOfDayError::HourOutOfRange(hour))
    }

    /// Parses `HH:MM` (a single-digit hour is tolerated, minutes are not).
    pub fn parse(value: &str) -> Result<Self, TimeOfDayError> {
        let trimmed = value.trim();
        let captures = TIME_OF_DAY_RE
            .captures(trimmed)
            .ok_or_else(|| TimeOfDayError::Malformed(trimmed.to_string()))?;

        let hour = captures[1]
            .parse::<u32>()
            .map_err(|_| TimeOfDayError::Malformed(trimmed.to_string()))?;
        let minute = captures[2]
            .parse::<u32>()
            .map_err(|_| TimeOfDayError::Malformed(trimmed.to_string()))?;

        Self::new(hour, minute)
    }

    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    pub fn minute(self) -> u32 {
        self.0.minute()
    }

    /// Returns this time on the calendar day of `now`, seconds zeroed.
    pub fn on_same_day(self, now: NaiveDateTime) -> NaiveDateTime {
        now.date().and_time(self.0)
    }

    /// Returns today's occurrence only when it is strictly after `now`.
    ///
    /// There is no next-day rollover: a time that already passed today
    /// yields `None` until the caller re-evaluates on a later day.
    pub fn trigger_today(self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let candidate = self.on_same_day(now);
        (candidate > now).then_some(candidate)
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeOfDayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parses `value` and projects it onto today.
///
/// `Ok(None)` means the time is valid but already passed today.
pub fn next_trigger_today(
    value: &str,
    now: NaiveDateTime,
) -> Result<Option<NaiveDateTime>, TimeOfDayError> {
    Ok(TimeOfDay::parse(value)?.trigger_today(now))
}
