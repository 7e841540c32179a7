//! Timeline layout for day, week and month views.
//!
//! Every view goes through one conversion, [`time_to_percent`], so a bar's
//! geometry is identical whichever view shows it. Overnight shifts render as
//! a home-day bar running to midnight plus a spillover fragment at the start
//! of the next day.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::db::repository::{AssignmentRepository, FullRepository};
use crate::models::{
    AssignmentId, ScheduleAssignment, ShiftDefinition, ShiftId, TimeOfDay, UserId,
    MINUTES_PER_DAY,
};

use super::catalog::ShiftCatalog;
use super::error::ScheduleResult;
use super::settings::SchedulingSettings;

/// Calendar granularity of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Day,
    Week,
    Month,
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(format!("Unknown view: {}", other)),
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        })
    }
}

/// A view kind anchored on a date inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewWindow {
    pub kind: ViewKind,
    pub anchor: NaiveDate,
}

/// Inclusive run of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ViewWindow {
    pub fn new(kind: ViewKind, anchor: NaiveDate) -> Self {
        Self { kind, anchor }
    }

    /// Days covered: the anchor itself, the week holding it (starting on
    /// `week_starts_on`), or its whole month.
    pub fn range(&self, week_starts_on: Weekday) -> DateRange {
        let anchor = self.anchor;
        match self.kind {
            ViewKind::Day => DateRange {
                start: anchor,
                end: anchor,
            },
            ViewKind::Week => {
                let back = (7 + anchor.weekday().num_days_from_monday()
                    - week_starts_on.num_days_from_monday())
                    % 7;
                // Clamp at the ends of the representable calendar.
                let start = anchor
                    .checked_sub_days(Days::new(u64::from(back)))
                    .unwrap_or(anchor);
                let end = start
                    .checked_add_days(Days::new(6))
                    .unwrap_or(NaiveDate::MAX);
                DateRange { start, end }
            }
            ViewKind::Month => {
                // Day 1 and "next month minus a day" exist for every
                // representable anchor short of the calendar's edge.
                let start = anchor.with_day(1).unwrap_or(anchor);
                let end = start
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(anchor);
                DateRange { start, end }
            }
        }
    }
}

impl DateRange {
    /// Number of days, at least 1.
    pub fn days(&self) -> u32 {
        (self.end - self.start).num_days().max(0) as u32 + 1
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Zero-based column of `date`, or `None` outside the range.
    pub fn column_of(&self, date: NaiveDate) -> Option<u32> {
        self.contains(date)
            .then(|| (date - self.start).num_days() as u32)
    }
}

/// What a percentage is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrigin {
    /// Percent of the one day holding the point.
    Day,
    /// Percent of a whole window of `days` days.
    Window { days: u32 },
}

/// Position of `minutes` past midnight on day `day_index` as a percentage of
/// the axis given by `origin`. `minutes` may be 1440 to mean the end of the day.
pub fn time_to_percent(day_index: u32, minutes: u16, origin: AxisOrigin) -> f64 {
    let minutes = f64::from(minutes.min(MINUTES_PER_DAY));
    let per_day = f64::from(MINUTES_PER_DAY);
    match origin {
        AxisOrigin::Day => minutes / per_day * 100.0,
        AxisOrigin::Window { days } => {
            let span = f64::from(days.max(1)) * per_day;
            (f64::from(day_index) * per_day + minutes) / span * 100.0
        }
    }
}

/// One horizontal bar in a day column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedBar {
    pub assignment_id: AssignmentId,
    pub user_id: UserId,
    pub shift_id: ShiftId,
    /// Calendar day the bar is drawn on.
    pub date: NaiveDate,
    pub day_column: u32,
    pub left_offset_percent: f64,
    pub width_percent: f64,
    /// Start of the bar as a percentage of the whole window.
    pub window_offset_percent: f64,
    pub window_width_percent: f64,
    /// The next-day remainder of an overnight shift.
    pub is_spillover_fragment: bool,
}

/// One assignment in a month cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaEntry {
    pub assignment_id: AssignmentId,
    pub user_id: UserId,
    pub shift_id: ShiftId,
    pub label: String,
    pub color: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub is_overnight: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaDay {
    pub date: NaiveDate,
    pub entries: Vec<AgendaEntry>,
}

/// Everything a client needs to draw one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineView {
    pub view: ViewKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub bars: Vec<RenderedBar>,
    /// Month view only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agenda: Option<Vec<AgendaDay>>,
}

/// Lays assignments out against a shift catalog.
#[derive(Debug, Clone)]
pub struct TimelineRenderer<'a> {
    catalog: &'a ShiftCatalog,
    week_starts_on: Weekday,
}

impl<'a> TimelineRenderer<'a> {
    pub fn new(catalog: &'a ShiftCatalog) -> Self {
        Self {
            catalog,
            week_starts_on: Weekday::Mon,
        }
    }

    pub fn week_starts_on(mut self, weekday: Weekday) -> Self {
        self.week_starts_on = weekday;
        self
    }

    fn shift_for(&self, assignment: &ScheduleAssignment) -> Option<&'a ShiftDefinition> {
        let shift = self.catalog.get(assignment.shift_id);
        if shift.is_none() {
            log::warn!(
                "Assignment {} references unknown shift {}; not rendered",
                assignment.id,
                assignment.shift_id
            );
        }
        shift
    }

    /// Bars for every assignment fragment that lands inside `window`.
    ///
    /// Ordered by day column, then start offset, then assignment id.
    pub fn layout(
        &self,
        assignments: &[ScheduleAssignment],
        window: &ViewWindow,
    ) -> Vec<RenderedBar> {
        let range = window.range(self.week_starts_on);
        let days = range.days();
        let mut bars = Vec::new();

        for assignment in assignments {
            let Some(shift) = self.shift_for(assignment) else {
                continue;
            };
            let start = shift.start_time.minutes();
            let end = shift.end_time.minutes();

            let home_end = if shift.is_overnight() {
                MINUTES_PER_DAY
            } else {
                end
            };
            let mut fragments = vec![(assignment.date, start, home_end, false)];
            if shift.is_overnight() {
                if let Some(next) = assignment.date.succ_opt() {
                    fragments.push((next, 0, end, true));
                }
            }

            for (date, from, to, spillover) in fragments {
                let Some(column) = range.column_of(date) else {
                    continue;
                };
                let left = time_to_percent(column, from, AxisOrigin::Day);
                let right = time_to_percent(column, to, AxisOrigin::Day);
                let window_left = time_to_percent(column, from, AxisOrigin::Window { days });
                let window_right = time_to_percent(column, to, AxisOrigin::Window { days });
                bars.push(RenderedBar {
                    assignment_id: assignment.id,
                    user_id: assignment.user_id,
                    shift_id: assignment.shift_id,
                    date,
                    day_column: column,
                    left_offset_percent: left,
                    width_percent: right - left,
                    window_offset_percent: window_left,
                    window_width_percent: window_right - window_left,
                    is_spillover_fragment: spillover,
                });
            }
        }

        bars.sort_by(|a, b| {
            a.day_column
                .cmp(&b.day_column)
                .then_with(|| {
                    a.left_offset_percent
                        .partial_cmp(&b.left_offset_percent)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.assignment_id.cmp(&b.assignment_id))
        });
        bars
    }

    /// Compact per-day lists for a month grid: one entry per assignment on
    /// its own date, sorted by start time. Every day of the range is present.
    pub fn month_agenda(
        &self,
        assignments: &[ScheduleAssignment],
        window: &ViewWindow,
    ) -> Vec<AgendaDay> {
        let range = window.range(self.week_starts_on);
        let mut agenda: Vec<AgendaDay> = range
            .dates()
            .map(|date| AgendaDay {
                date,
                entries: Vec::new(),
            })
            .collect();

        for assignment in assignments {
            let Some(column) = range.column_of(assignment.date) else {
                continue;
            };
            let Some(shift) = self.shift_for(assignment) else {
                continue;
            };
            if let Some(day) = agenda.get_mut(column as usize) {
                day.entries.push(AgendaEntry {
                    assignment_id: assignment.id,
                    user_id: assignment.user_id,
                    shift_id: shift.id,
                    label: shift.label.clone(),
                    color: shift.color.clone(),
                    start_time: shift.start_time,
                    end_time: shift.end_time,
                    is_overnight: shift.is_overnight(),
                });
            }
        }

        for day in &mut agenda {
            day.entries
                .sort_by_key(|e| (e.start_time, e.assignment_id));
        }
        agenda
    }

    /// Bars plus, for month views, the agenda.
    pub fn render(&self, assignments: &[ScheduleAssignment], window: &ViewWindow) -> TimelineView {
        let range = window.range(self.week_starts_on);
        TimelineView {
            view: window.kind,
            start_date: range.start,
            end_date: range.end,
            days: range.days(),
            bars: self.layout(assignments, window),
            agenda: (window.kind == ViewKind::Month)
                .then(|| self.month_agenda(assignments, window)),
        }
    }
}

/// Fetch what `window` shows and lay it out.
///
/// Reads from the day before the window so the previous evening's overnight
/// shifts contribute their spillover to the first column.
pub async fn load_timeline<R>(
    repo: &R,
    window: &ViewWindow,
    settings: &SchedulingSettings,
) -> ScheduleResult<TimelineView>
where
    R: FullRepository + ?Sized,
{
    let range = window.range(settings.week_starts_on);
    let fetch_from = range.start.pred_opt().unwrap_or(range.start);

    let catalog = ShiftCatalog::load(repo).await?;
    let assignments = repo.list_assignments(fetch_from, range.end).await?;

    let view = TimelineRenderer::new(&catalog)
        .week_starts_on(settings.week_starts_on)
        .render(&assignments, window);
    log::debug!(
        "Rendered {} view {}..{}: {} bar(s) from {} assignment(s)",
        view.view,
        view.start_date,
        view.end_date,
        view.bars.len(),
        assignments.len()
    );
    Ok(view)
}
