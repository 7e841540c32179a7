//! Expansion of a date range, optionally repeated weekly, into concrete
//! assignment requests.
//!
//! Pure calendar arithmetic; nothing here touches storage.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{AssignmentRequest, RecurringSeries, SeriesId, ShiftId, UserId};

use super::error::{ScheduleError, ScheduleResult};

/// Upper bound on weekly repetitions of one base block (about a year).
pub const MAX_WEEK_OFFSETS: u64 = 52;

/// Operator input for creating assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionRequest {
    pub user_ids: Vec<UserId>,
    pub shift_id: Option<ShiftId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub recurring_until: Option<NaiveDate>,
}

/// What an [`ExpansionRequest`] turns into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionPlan {
    /// User-major: every date of the first user, then the next user.
    pub requests: Vec<AssignmentRequest>,
    /// Present iff the request was recurring. Every request carries its id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<RecurringSeries>,
}

impl ExpansionPlan {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Distinct dates in ascending order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.requests
            .iter()
            .map(|r| r.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Every date in `[start, end]`, ascending.
fn date_span(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Validate and expand `request` into per-(user, date) requests.
///
/// Recurring requests repeat the base block at 7-day offsets, keep only dates
/// up to `recurring_until`, and stop at the first repetition starting after
/// it or after [`MAX_WEEK_OFFSETS`] repetitions.
pub fn expand(request: &ExpansionRequest) -> ScheduleResult<ExpansionPlan> {
    let shift_id = validate(request)?;

    let mut users = Vec::with_capacity(request.user_ids.len());
    for user in &request.user_ids {
        if !users.contains(user) {
            users.push(*user);
        }
    }

    let base: Vec<NaiveDate> = date_span(request.start_date, request.end_date).collect();

    let (dates, series) = match (request.recurring, request.recurring_until) {
        (true, Some(until)) => {
            let mut dates = BTreeSet::new();
            for week in 0..MAX_WEEK_OFFSETS {
                let Some(first) = request.start_date.checked_add_days(Days::new(week * 7)) else {
                    break;
                };
                if first > until {
                    break;
                }
                dates.extend(
                    base.iter()
                        .filter_map(|d| d.checked_add_days(Days::new(week * 7)))
                        .filter(|d| *d <= until),
                );
            }
            let series = RecurringSeries {
                id: SeriesId::generate(),
                shift_id,
                user_ids: users.clone(),
                weekdays: base.iter().map(|d| d.weekday()).collect(),
                base_start: request.start_date,
                base_end: request.end_date,
                until,
            };
            (dates, Some(series))
        }
        _ => (base.into_iter().collect::<BTreeSet<_>>(), None),
    };

    let group = series.as_ref().map(|s| s.id.clone());
    let requests: Vec<AssignmentRequest> = users
        .iter()
        .flat_map(|user| {
            let group = group.clone();
            dates.iter().map(move |date| AssignmentRequest {
                user_id: *user,
                shift_id,
                date: *date,
                recurring_group_id: group.clone(),
            })
        })
        .collect();

    log::debug!(
        "Expanded {} user(s) x {} date(s) into {} request(s){}",
        users.len(),
        dates.len(),
        requests.len(),
        group
            .as_ref()
            .map(|g| format!(" for series {}", g))
            .unwrap_or_default()
    );

    Ok(ExpansionPlan { requests, series })
}

fn validate(request: &ExpansionRequest) -> ScheduleResult<ShiftId> {
    if request.user_ids.is_empty() {
        return Err(ScheduleError::validation("At least one user is required"));
    }
    let shift_id = request
        .shift_id
        .ok_or_else(|| ScheduleError::validation("A shift is required"))?;
    if request.start_date > request.end_date {
        return Err(ScheduleError::validation(format!(
            "start_date {} is after end_date {}",
            request.start_date, request.end_date
        )));
    }
    if request.recurring {
        match request.recurring_until {
            None => {
                return Err(ScheduleError::validation(
                    "recurring_until is required for a recurring request",
                ))
            }
            Some(until) if until < request.start_date => {
                return Err(ScheduleError::validation(format!(
                    "recurring_until {} is before start_date {}",
                    until, request.start_date
                )))
            }
            Some(_) => {}
        }
    }
    Ok(shift_id)
}
