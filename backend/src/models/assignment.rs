//! Schedule assignments and the request/patch shapes that create and edit them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::series::SeriesId;
use super::shift::ShiftId;
use crate::define_id_type;

define_id_type!(i64, AssignmentId);
define_id_type!(i64, UserId);

/// One user working one shift on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleAssignment {
    pub id: AssignmentId,
    pub user_id: UserId,
    pub shift_id: ShiftId,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_group_id: Option<SeriesId>,
}

impl ScheduleAssignment {
    pub fn is_recurring(&self) -> bool {
        self.recurring_group_id.is_some()
    }
}

/// An assignment to be created. Entries of `createAssignments`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub user_id: UserId,
    pub shift_id: ShiftId,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_group_id: Option<SeriesId>,
}

impl AssignmentRequest {
    pub fn into_assignment(self, id: AssignmentId) -> ScheduleAssignment {
        ScheduleAssignment {
            id,
            user_id: self.user_id,
            shift_id: self.shift_id,
            date: self.date,
            recurring_group_id: self.recurring_group_id,
        }
    }
}

/// Fields an update may change. The date is never patchable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPatch {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub shift_id: Option<ShiftId>,
}

impl AssignmentPatch {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.shift_id.is_none()
    }

    /// Apply to a row in place.
    pub fn apply(&self, row: &mut ScheduleAssignment) {
        if let Some(user_id) = self.user_id {
            row.user_id = user_id;
        }
        if let Some(shift_id) = self.shift_id {
            row.shift_id = shift_id;
        }
    }
}

/// A request the repository could not persist, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRequest {
    pub request: AssignmentRequest,
    pub reason: String,
}

/// Result of a batch create. Batches are not atomic: some rows may land while
/// others fail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub created: Vec<ScheduleAssignment>,
    pub failed: Vec<FailedRequest>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// `(user_id, date)` pairs that were not written.
    pub fn failed_pairs(&self) -> Vec<(UserId, NaiveDate)> {
        self.failed
            .iter()
            .map(|f| (f.request.user_id, f.request.date))
            .collect()
    }
}

/// Which bulk clear to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkClearKind {
    ClearWeek,
    ClearAfterToday,
}

/// Dates a bulk clear removes, resolved from a kind and its optional bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearWindow {
    /// Inclusive on both ends.
    Between { start: NaiveDate, end: NaiveDate },
    /// Strictly after the given day.
    After(NaiveDate),
}

impl ClearWindow {
    /// Resolve the wire form `(kind, start_date?, end_date?)`.
    ///
    /// For `clear_after_today`, `start_date` carries the caller's notion of
    /// today; when absent the local calendar date is used.
    pub fn resolve(
        kind: BulkClearKind,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Self, String> {
        match kind {
            BulkClearKind::ClearWeek => match (start_date, end_date) {
                (Some(start), Some(end)) if start <= end => Ok(ClearWindow::Between { start, end }),
                (Some(start), Some(end)) => Err(format!(
                    "clear_week start_date {} is after end_date {}",
                    start, end
                )),
                _ => Err("clear_week requires start_date and end_date".to_string()),
            },
            BulkClearKind::ClearAfterToday => Ok(ClearWindow::After(
                start_date.unwrap_or_else(|| chrono::Local::now().date_naive()),
            )),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            ClearWindow::Between { start, end } => date >= start && date <= end,
            ClearWindow::After(today) => date > today,
        }
    }
}
