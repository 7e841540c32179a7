//! Operator-tunable scheduling behavior, read from the `[scheduling]` section
//! of `repository.toml`.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// What a date-changing drag does to an assignment that belongs to a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesDetachPolicy {
    /// Move the occurrence out of its series and report the severed link.
    #[default]
    Detach,
    /// Refuse; the operator must edit the series with an explicit scope.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingSettings {
    /// First day of a week view.
    #[serde(default = "default_week_start")]
    pub week_starts_on: Weekday,
    #[serde(default)]
    pub series_detach_policy: SeriesDetachPolicy,
}

fn default_week_start() -> Weekday {
    Weekday::Mon
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            week_starts_on: default_week_start(),
            series_detach_policy: SeriesDetachPolicy::default(),
        }
    }
}
