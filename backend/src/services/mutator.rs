//! Schedule mutations: batch create, scoped update and delete, bulk clear.
//!
//! Thin orchestration over the repository. Inputs are validated here, scope
//! filtering happens in the repository ([`ModifyScope::selects`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::repository::{AssignmentRepository, FullRepository, SeriesRepository};
use crate::models::{
    AssignmentId, AssignmentPatch, AssignmentRequest, BatchOutcome, BulkClearKind, ClearWindow,
    ModifyScope, RecurringSeries, ScheduleAssignment, SeriesId, ShiftId, UserId,
};

use super::error::{ScheduleError, ScheduleResult};
use super::recurrence::{expand, ExpansionRequest};

/// Result of turning an [`ExpansionRequest`] into rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAssignments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<RecurringSeries>,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

/// A scoped edit. Only `user_id` and `shift_id` can change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentUpdate {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub shift_id: Option<ShiftId>,
    #[serde(default)]
    pub scope: ModifyScope,
    /// Caller's view of the target's series, checked against storage.
    #[serde(default)]
    pub recurring_group_id: Option<SeriesId>,
    /// Caller's view of the target's date, checked against storage.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl AssignmentUpdate {
    pub fn patch(&self) -> AssignmentPatch {
        AssignmentPatch {
            user_id: self.user_id,
            shift_id: self.shift_id,
        }
    }
}

/// Assignments dated within `[start_date, end_date]`.
pub async fn list_assignments<R>(
    repo: &R,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> ScheduleResult<Vec<ScheduleAssignment>>
where
    R: AssignmentRepository + ?Sized,
{
    if start_date > end_date {
        return Err(ScheduleError::validation(format!(
            "start_date {} is after end_date {}",
            start_date, end_date
        )));
    }
    Ok(repo.list_assignments(start_date, end_date).await?)
}

/// Persist each request verbatim. Rows that fail are reported, not retried.
pub async fn create_assignments<R>(
    repo: &R,
    requests: &[AssignmentRequest],
) -> ScheduleResult<BatchOutcome>
where
    R: AssignmentRepository + ?Sized,
{
    if requests.is_empty() {
        return Ok(BatchOutcome::default());
    }

    let outcome = repo.create_assignments(requests).await?;
    log::info!(
        "Created {} of {} assignment(s)",
        outcome.created.len(),
        requests.len()
    );
    for failure in &outcome.failed {
        log::warn!(
            "Assignment for user {} on {} not created: {}",
            failure.request.user_id,
            failure.request.date,
            failure.reason
        );
    }
    Ok(outcome)
}

/// Expand an operator request and persist the result. A weekly series is
/// recorded once at least one of its rows exists.
pub async fn create_from_request<R>(
    repo: &R,
    request: &ExpansionRequest,
) -> ScheduleResult<CreatedAssignments>
where
    R: FullRepository + ?Sized,
{
    let plan = expand(request)?;
    let outcome = create_assignments(repo, &plan.requests).await?;

    let series = match plan.series {
        Some(series) if outcome.created.is_empty() => {
            log::warn!("Series {} not stored: none of its rows were created", series.id);
            None
        }
        Some(series) => {
            repo.store_series(&series).await?;
            log::info!(
                "Stored series {} ({} user(s), until {})",
                series.id,
                series.user_ids.len(),
                series.until
            );
            Some(series)
        }
        None => None,
    };

    Ok(CreatedAssignments { series, outcome })
}

/// Change user and/or shift of the target and, per `scope`, of its series.
///
/// Returns the number of rows changed.
pub async fn update_assignment<R>(
    repo: &R,
    id: AssignmentId,
    update: &AssignmentUpdate,
) -> ScheduleResult<usize>
where
    R: AssignmentRepository + ?Sized,
{
    let patch = update.patch();
    if patch.is_empty() {
        return Err(ScheduleError::validation(
            "An update needs a new user_id or a new shift_id",
        ));
    }

    let changed = repo
        .update_assignment(
            id,
            patch,
            update.scope,
            update.recurring_group_id.as_ref(),
            update.date,
        )
        .await?;
    log::info!(
        "Updated {} assignment(s) from {} (scope {})",
        changed,
        id,
        update.scope
    );
    Ok(changed)
}

/// Delete the target and, per `scope`, rows of its series.
///
/// Returns the number of rows removed.
pub async fn delete_assignment<R>(
    repo: &R,
    id: AssignmentId,
    scope: ModifyScope,
    recurring_group_id: Option<&SeriesId>,
    date: Option<NaiveDate>,
) -> ScheduleResult<usize>
where
    R: AssignmentRepository + ?Sized,
{
    let removed = repo
        .delete_assignment(id, scope, recurring_group_id, date)
        .await?;
    log::info!(
        "Deleted {} assignment(s) from {} (scope {})",
        removed,
        id,
        scope
    );
    Ok(removed)
}

/// Remove a week's rows or every row after today.
pub async fn bulk_clear<R>(
    repo: &R,
    kind: BulkClearKind,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> ScheduleResult<usize>
where
    R: AssignmentRepository + ?Sized,
{
    let window =
        ClearWindow::resolve(kind, start_date, end_date).map_err(ScheduleError::Validation)?;
    let removed = repo.bulk_clear(kind, start_date, end_date).await?;
    log::info!("Bulk clear {:?} removed {} assignment(s)", window, removed);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::ShiftRepository;
    use crate::models::ShiftDraft;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    async fn seeded() -> (LocalRepository, ShiftId, ShiftId) {
        let repo = LocalRepository::new();
        let mut ids = Vec::new();
        for (label, start, end) in [("Day", "08:00", "16:00"), ("Night", "22:00", "06:00")] {
            let shift = repo
                .create_shift(&ShiftDraft {
                    label: label.to_string(),
                    start_time: start.parse().unwrap(),
                    end_time: end.parse().unwrap(),
                    color: "#445566".to_string(),
                })
                .await
                .unwrap();
            ids.push(shift.id);
        }
        (repo, ids[0], ids[1])
    }

    fn weekly(user: i64, shift: ShiftId) -> ExpansionRequest {
        ExpansionRequest {
            user_ids: vec![UserId(user)],
            shift_id: Some(shift),
            start_date: d(4),
            end_date: d(4),
            recurring: true,
            recurring_until: Some(d(25)),
        }
    }

    #[tokio::test]
    async fn test_create_from_request_stores_series() {
        let (repo, day, _) = seeded().await;
        let created = create_from_request(&repo, &weekly(1, day)).await.unwrap();

        let series = created.series.unwrap();
        assert_eq!(created.outcome.created.len(), 4);
        assert_eq!(repo.get_series(&series.id).await.unwrap(), series);
    }

    #[tokio::test]
    async fn test_series_without_rows_is_not_stored() {
        let (repo, _, _) = seeded().await;
        let created = create_from_request(&repo, &weekly(1, ShiftId(99)))
            .await
            .unwrap();

        assert!(created.outcome.created.is_empty());
        assert_eq!(created.outcome.failed.len(), 4);
        assert!(created.series.is_none());
        assert_eq!(repo.series_count(), 0);
    }

    #[tokio::test]
    async fn test_update_following_leaves_earlier_rows() {
        let (repo, day, night) = seeded().await;
        let created = create_from_request(&repo, &weekly(1, day)).await.unwrap();
        let third = created.outcome.created[2].clone();

        let update = AssignmentUpdate {
            shift_id: Some(night),
            scope: ModifyScope::Following,
            ..Default::default()
        };
        let changed = update_assignment(&repo, third.id, &update).await.unwrap();
        assert_eq!(changed, 2);

        let shifts: Vec<ShiftId> = repo
            .list_assignments(d(1), d(31))
            .await
            .unwrap()
            .iter()
            .map(|a| a.shift_id)
            .collect();
        assert_eq!(shifts, vec![day, day, night, night]);
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected_before_repository() {
        let (repo, day, _) = seeded().await;
        let created = create_from_request(&repo, &weekly(1, day)).await.unwrap();
        let writes = repo.write_count();

        let err = update_assignment(
            &repo,
            created.outcome.created[0].id,
            &AssignmentUpdate::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)));
        assert_eq!(repo.write_count(), writes);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (repo, _, _) = seeded().await;
        let err = delete_assignment(&repo, AssignmentId(404), ModifyScope::All, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ScheduleError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_rejects_inverted_range() {
        let (repo, _, _) = seeded().await;
        assert!(matches!(
            list_assignments(&repo, d(5), d(4)).await,
            Err(ScheduleError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_bulk_clear_after_today() {
        let (repo, day, _) = seeded().await;
        create_from_request(&repo, &weekly(1, day)).await.unwrap();

        let removed = bulk_clear(&repo, BulkClearKind::ClearAfterToday, Some(d(11)), None)
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(repo.assignment_count(), 2);
    }

    #[tokio::test]
    async fn test_bulk_clear_week_needs_bounds() {
        let (repo, _, _) = seeded().await;
        let err = bulk_clear(&repo, BulkClearKind::ClearWeek, Some(d(4)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)));
    }
}
