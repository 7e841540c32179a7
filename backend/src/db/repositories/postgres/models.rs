use chrono::{NaiveDate, Weekday};
use diesel::prelude::*;

use super::schema::{assignments, recurring_series, shifts};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{
    AssignmentId, AssignmentPatch, AssignmentRequest, RecurringSeries, ScheduleAssignment,
    SeriesId, ShiftDefinition, ShiftDraft, ShiftId, TimeOfDay, UserId,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = shifts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShiftRow {
    pub shift_id: i64,
    pub label: String,
    pub start_minute: i16,
    pub end_minute: i16,
    pub color: String,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = shifts)]
pub struct NewShiftRow {
    pub label: String,
    pub start_minute: i16,
    pub end_minute: i16,
    pub color: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssignmentRow {
    pub assignment_id: i64,
    pub user_id: i64,
    pub shift_id: i64,
    pub work_date: NaiveDate,
    pub recurring_group_id: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = assignments)]
pub struct NewAssignmentRow {
    pub user_id: i64,
    pub shift_id: i64,
    pub work_date: NaiveDate,
    pub recurring_group_id: Option<String>,
}

/// `None` fields are left untouched by Diesel.
#[derive(Debug, Clone, Copy, AsChangeset)]
#[diesel(table_name = assignments)]
pub struct AssignmentChangeset {
    pub user_id: Option<i64>,
    pub shift_id: Option<i64>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = recurring_series)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SeriesRow {
    pub series_id: String,
    pub shift_id: i64,
    pub user_ids: Vec<i64>,
    pub weekdays: Vec<i16>,
    pub base_start: NaiveDate,
    pub base_end: NaiveDate,
    pub until_date: NaiveDate,
}

fn stored_time(minutes: i16, column: &str) -> RepositoryResult<TimeOfDay> {
    u16::try_from(minutes)
        .ok()
        .and_then(TimeOfDay::from_minutes)
        .ok_or_else(|| {
            RepositoryError::internal_with_context(
                format!("{} holds {} minutes, outside one day", column, minutes),
                ErrorContext::new("decode_shift").with_entity("shift"),
            )
        })
}

impl TryFrom<ShiftRow> for ShiftDefinition {
    type Error = RepositoryError;

    fn try_from(row: ShiftRow) -> RepositoryResult<Self> {
        Ok(ShiftDefinition {
            id: ShiftId(row.shift_id),
            label: row.label,
            start_time: stored_time(row.start_minute, "start_minute")?,
            end_time: stored_time(row.end_minute, "end_minute")?,
            color: row.color,
        })
    }
}

impl From<&ShiftDraft> for NewShiftRow {
    fn from(draft: &ShiftDraft) -> Self {
        // Minutes of one day always fit in i16.
        NewShiftRow {
            label: draft.label.clone(),
            start_minute: draft.start_time.minutes() as i16,
            end_minute: draft.end_time.minutes() as i16,
            color: draft.color.clone(),
        }
    }
}

impl From<AssignmentRow> for ScheduleAssignment {
    fn from(row: AssignmentRow) -> Self {
        ScheduleAssignment {
            id: AssignmentId(row.assignment_id),
            user_id: UserId(row.user_id),
            shift_id: ShiftId(row.shift_id),
            date: row.work_date,
            recurring_group_id: row.recurring_group_id.map(SeriesId::from),
        }
    }
}

impl From<&AssignmentRequest> for NewAssignmentRow {
    fn from(request: &AssignmentRequest) -> Self {
        NewAssignmentRow {
            user_id: request.user_id.value(),
            shift_id: request.shift_id.value(),
            work_date: request.date,
            recurring_group_id: request
                .recurring_group_id
                .as_ref()
                .map(|g| g.as_str().to_string()),
        }
    }
}

impl From<AssignmentPatch> for AssignmentChangeset {
    fn from(patch: AssignmentPatch) -> Self {
        AssignmentChangeset {
            user_id: patch.user_id.map(|u| u.value()),
            shift_id: patch.shift_id.map(|s| s.value()),
        }
    }
}

impl From<&RecurringSeries> for SeriesRow {
    fn from(series: &RecurringSeries) -> Self {
        SeriesRow {
            series_id: series.id.as_str().to_string(),
            shift_id: series.shift_id.value(),
            user_ids: series.user_ids.iter().map(|u| u.value()).collect(),
            weekdays: series
                .weekdays
                .iter()
                .map(|w| w.number_from_monday() as i16)
                .collect(),
            base_start: series.base_start,
            base_end: series.base_end,
            until_date: series.until,
        }
    }
}

impl TryFrom<SeriesRow> for RecurringSeries {
    type Error = RepositoryError;

    fn try_from(row: SeriesRow) -> RepositoryResult<Self> {
        let weekdays = row
            .weekdays
            .iter()
            .map(|n| weekday_from_monday(*n))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                RepositoryError::internal_with_context(
                    "weekdays column holds a value outside 1..=7",
                    ErrorContext::new("decode_series")
                        .with_entity("series")
                        .with_entity_id(&row.series_id),
                )
            })?;

        Ok(RecurringSeries {
            id: SeriesId::from(row.series_id),
            shift_id: ShiftId(row.shift_id),
            user_ids: row.user_ids.into_iter().map(UserId).collect(),
            weekdays,
            base_start: row.base_start,
            base_end: row.base_end,
            until: row.until_date,
        })
    }
}

fn weekday_from_monday(n: i16) -> Option<Weekday> {
    match n {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}
