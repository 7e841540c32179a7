use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Time of day at minute resolution, stored as minutes since midnight.
///
/// Serialized as `"HH:MM"`. Valid values are `0..1440`; there is no
/// representation for `24:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight (`00:00`).
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Create from hour and minute. Returns `None` when out of range.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self((hour * 60 + minute) as u16))
    }

    /// Create from minutes since midnight. Returns `None` for `>= 1440`.
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u32 {
        u32::from(self.0 / 60)
    }

    pub fn minute(&self) -> u32 {
        u32::from(self.0 % 60)
    }

    /// Convert to chrono `NaiveTime`.
    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

/// Truncates seconds and sub-second precision.
impl From<NaiveTime> for TimeOfDay {
    fn from(t: NaiveTime) -> Self {
        Self((t.hour() * 60 + t.minute()) as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    /// Parse `"HH:MM"`. Seconds are rejected to keep minute resolution explicit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map_err(|e| format!("Invalid time of day '{}': {}", s, e))?;
        Ok(Self::from(t))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
