//! Reminder interval such as `"3 months"`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::DomainError;

pub const INVALID_INTERVAL_FORMAT: &str = "invalid interval format";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    /// 30 days
    Months,
    /// 365 days
    Years,
}

impl IntervalUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalUnit::Seconds => "seconds",
            IntervalUnit::Minutes => "minutes",
            IntervalUnit::Hours => "hours",
            IntervalUnit::Days => "days",
            IntervalUnit::Months => "months",
            IntervalUnit::Years => "years",
        }
    }

    fn seconds(&self) -> u64 {
        match self {
            IntervalUnit::Seconds => 1,
            IntervalUnit::Minutes => 60,
            IntervalUnit::Hours => 60 * 60,
            IntervalUnit::Days => 24 * 60 * 60,
            IntervalUnit::Months => 30 * 24 * 60 * 60,
            IntervalUnit::Years => 365 * 24 * 60 * 60,
        }
    }
}

impl FromStr for IntervalUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seconds" => Ok(IntervalUnit::Seconds),
            "minutes" => Ok(IntervalUnit::Minutes),
            "hours" => Ok(IntervalUnit::Hours),
            "days" => Ok(IntervalUnit::Days),
            "months" => Ok(IntervalUnit::Months),
            "years" => Ok(IntervalUnit::Years),
            _ => Err(DomainError::validation(INVALID_INTERVAL_FORMAT)),
        }
    }
}

/// How often a reminder fires, kept in its human form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReminderInterval {
    pub amount: u32,
    pub unit: IntervalUnit,
}

impl ReminderInterval {
    pub fn new(amount: u32, unit: IntervalUnit) -> Self {
        Self { amount, unit }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.amount) * self.unit.seconds())
    }

    /// Length in seconds; used to order reminders by interval
    pub fn total_seconds(&self) -> i64 {
        i64::try_from(self.as_duration().as_secs()).unwrap_or(i64::MAX)
    }
}

impl FromStr for ReminderInterval {
    type Err = DomainError;

    /// Accepts exactly `"<n> <unit>"` separated by a single space
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (amount, unit) = s
            .split_once(' ')
            .ok_or_else(|| DomainError::validation(INVALID_INTERVAL_FORMAT))?;
        let amount = amount
            .parse::<u32>()
            .map_err(|_| DomainError::validation(INVALID_INTERVAL_FORMAT))?;
        Ok(Self::new(amount, unit.parse()?))
    }
}

impl fmt::Display for ReminderInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit.as_str())
    }
}

impl Serialize for ReminderInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReminderInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|_| serde::de::Error::custom(INVALID_INTERVAL_FORMAT))
    }
}
