//! Scoped update/delete and bulk clear against the in-memory repository.

mod support;

use shift_roster::db::repository::{AssignmentRepository, RepositoryError};
use shift_roster::models::{AssignmentId, BulkClearKind, ModifyScope, ScheduleAssignment, UserId};
use shift_roster::services::mutator::{self, AssignmentUpdate};
use shift_roster::services::{ExpansionRequest, ScheduleError};
use support::{date, roster, Roster};

/// Users 1 and 2 on the day shift, Mondays from 2024-03-04 through 2024-03-25.
async fn weekly_series(roster: &Roster) -> Vec<ScheduleAssignment> {
    let request = ExpansionRequest {
        user_ids: vec![UserId(1), UserId(2)],
        shift_id: Some(roster.day.id),
        start_date: date(2024, 3, 4),
        end_date: date(2024, 3, 4),
        recurring: true,
        recurring_until: Some(date(2024, 3, 25)),
    };
    let created = mutator::create_from_request(&roster.repo, &request)
        .await
        .unwrap();
    assert!(created.outcome.is_complete());
    assert_eq!(created.outcome.created.len(), 8);
    created.outcome.created
}

fn user_rows(rows: &[ScheduleAssignment], user: i64) -> Vec<ScheduleAssignment> {
    let mut mine: Vec<_> = rows
        .iter()
        .filter(|r| r.user_id == UserId(user))
        .cloned()
        .collect();
    mine.sort_by_key(|r| r.date);
    mine
}

#[tokio::test]
async fn test_following_update_leaves_earlier_rows() {
    let roster = roster().await;
    let rows = weekly_series(&roster).await;
    let mine = user_rows(&rows, 1);
    let target = &mine[2];

    let update = AssignmentUpdate {
        shift_id: Some(roster.night.id),
        scope: ModifyScope::Following,
        recurring_group_id: target.recurring_group_id.clone(),
        date: Some(target.date),
        ..Default::default()
    };
    let changed = mutator::update_assignment(&roster.repo, target.id, &update)
        .await
        .unwrap();

    // Mar 18 and Mar 25 for both users share the series.
    assert_eq!(changed, 4);
    for row in roster.repo.all_assignments() {
        let expected = if row.date >= target.date {
            roster.night.id
        } else {
            roster.day.id
        };
        assert_eq!(row.shift_id, expected, "row on {}", row.date);
    }
}

#[tokio::test]
async fn test_instance_delete_removes_exactly_one_row() {
    let roster = roster().await;
    let rows = weekly_series(&roster).await;
    let target = &user_rows(&rows, 2)[1];

    let removed = mutator::delete_assignment(
        &roster.repo,
        target.id,
        ModifyScope::Instance,
        target.recurring_group_id.as_ref(),
        Some(target.date),
    )
    .await
    .unwrap();

    assert_eq!(removed, 1);
    assert_eq!(roster.repo.assignment_count(), 7);
    assert!(matches!(
        roster.repo.get_assignment(target.id).await,
        Err(RepositoryError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_all_delete_removes_whole_series() {
    let roster = roster().await;
    let rows = weekly_series(&roster).await;
    let target = &user_rows(&rows, 1)[3];

    let removed = mutator::delete_assignment(
        &roster.repo,
        target.id,
        ModifyScope::All,
        target.recurring_group_id.as_ref(),
        Some(target.date),
    )
    .await
    .unwrap();

    assert_eq!(removed, 8);
    assert_eq!(roster.repo.assignment_count(), 0);
}

#[tokio::test]
async fn test_stale_hints_are_rejected() {
    let roster = roster().await;
    let rows = weekly_series(&roster).await;
    let target = &rows[0];

    let result = mutator::delete_assignment(
        &roster.repo,
        target.id,
        ModifyScope::All,
        target.recurring_group_id.as_ref(),
        Some(date(2030, 1, 1)),
    )
    .await;

    assert!(matches!(result, Err(ScheduleError::Validation(_))));
    assert_eq!(roster.repo.assignment_count(), 8);
}

#[tokio::test]
async fn test_missing_target_is_not_found() {
    let roster = roster().await;
    let update = AssignmentUpdate {
        user_id: Some(UserId(3)),
        ..Default::default()
    };

    let result = mutator::update_assignment(&roster.repo, AssignmentId(999), &update).await;
    assert!(matches!(result, Err(ScheduleError::NotFound(_))));
}

#[tokio::test]
async fn test_reassigning_whole_series_to_one_user_is_rejected() {
    let roster = roster().await;
    let rows = weekly_series(&roster).await;
    let target = &rows[0];

    // Users 1 and 2 would both become user 3 on every Monday.
    let update = AssignmentUpdate {
        user_id: Some(UserId(3)),
        scope: ModifyScope::All,
        recurring_group_id: target.recurring_group_id.clone(),
        date: Some(target.date),
        ..Default::default()
    };
    let result = mutator::update_assignment(&roster.repo, target.id, &update).await;

    assert!(matches!(result, Err(ScheduleError::Validation(_))));
    let after = roster.repo.all_assignments();
    assert_eq!(after.len(), 8);
    assert_eq!(user_rows(&after, 1).len(), 4);
    assert_eq!(user_rows(&after, 2).len(), 4);
}

#[tokio::test]
async fn test_update_onto_taken_cell_is_rejected() {
    let roster = roster().await;
    let rows = weekly_series(&roster).await;
    let target = &user_rows(&rows, 1)[0];

    let update = AssignmentUpdate {
        user_id: Some(UserId(2)),
        scope: ModifyScope::Instance,
        recurring_group_id: target.recurring_group_id.clone(),
        date: Some(target.date),
        ..Default::default()
    };
    let result = mutator::update_assignment(&roster.repo, target.id, &update).await;

    assert!(matches!(result, Err(ScheduleError::Validation(_))));
    assert_eq!(user_rows(&roster.repo.all_assignments(), 1).len(), 4);
}

#[tokio::test]
async fn test_duplicate_pairs_fail_individually() {
    let roster = roster().await;
    weekly_series(&roster).await;

    // User 1 already works Mar 4; user 3 does not.
    let request = ExpansionRequest {
        user_ids: vec![UserId(1), UserId(3)],
        shift_id: Some(roster.day.id),
        start_date: date(2024, 3, 4),
        end_date: date(2024, 3, 4),
        recurring: false,
        recurring_until: None,
    };
    let created = mutator::create_from_request(&roster.repo, &request)
        .await
        .unwrap();

    assert_eq!(created.outcome.created.len(), 1);
    assert_eq!(created.outcome.created[0].user_id, UserId(3));
    assert_eq!(
        created.outcome.failed_pairs(),
        vec![(UserId(1), date(2024, 3, 4))]
    );
}

#[tokio::test]
async fn test_clear_week_keeps_other_weeks() {
    let roster = roster().await;
    weekly_series(&roster).await;

    let removed = mutator::bulk_clear(
        &roster.repo,
        BulkClearKind::ClearWeek,
        Some(date(2024, 3, 11)),
        Some(date(2024, 3, 17)),
    )
    .await
    .unwrap();

    assert_eq!(removed, 2);
    let left = roster
        .repo
        .list_assignments(date(2024, 3, 11), date(2024, 3, 17))
        .await
        .unwrap();
    assert!(left.is_empty());
    assert_eq!(roster.repo.assignment_count(), 6);
}

#[tokio::test]
async fn test_clear_after_today_keeps_today() {
    let roster = roster().await;
    weekly_series(&roster).await;

    let removed = mutator::bulk_clear(
        &roster.repo,
        BulkClearKind::ClearAfterToday,
        Some(date(2024, 3, 11)),
        None,
    )
    .await
    .unwrap();

    assert_eq!(removed, 4);
    assert!(roster
        .repo
        .all_assignments()
        .iter()
        .all(|r| r.date <= date(2024, 3, 11)));
}

#[tokio::test]
async fn test_clear_week_needs_both_bounds() {
    let roster = roster().await;
    let result = mutator::bulk_clear(
        &roster.repo,
        BulkClearKind::ClearWeek,
        Some(date(2024, 3, 11)),
        None,
    )
    .await;
    assert!(matches!(result, Err(ScheduleError::Validation(_))));
}
