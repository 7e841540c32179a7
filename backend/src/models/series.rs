//! Recurring series: the entity a weekly-repeat batch of assignments links to.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shift::ShiftId;
use super::UserId;

/// Opaque identifier shared by every assignment of one recurring series.
///
/// On the wire this is the `recurring_group_id` string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(pub String);

impl SeriesId {
    /// Mint a fresh random series id.
    pub fn generate() -> Self {
        SeriesId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeriesId {
    fn from(s: &str) -> Self {
        SeriesId(s.to_string())
    }
}

impl From<String> for SeriesId {
    fn from(s: String) -> Self {
        SeriesId(s)
    }
}

/// A weekly-repeating assignment pattern.
///
/// `weekdays` is the base block's weekday sequence in date order, so a
/// Fri–Mon block is `[Fri, Sat, Sun, Mon]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringSeries {
    pub id: SeriesId,
    pub shift_id: ShiftId,
    pub user_ids: Vec<UserId>,
    pub weekdays: Vec<Weekday>,
    pub base_start: NaiveDate,
    pub base_end: NaiveDate,
    pub until: NaiveDate,
}

impl RecurringSeries {
    /// Whether `date` falls on one of the series weekdays inside its span.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.base_start && date <= self.until && self.weekdays.contains(&date.weekday())
    }
}
