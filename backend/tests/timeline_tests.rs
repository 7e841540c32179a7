//! Timeline layout, overnight spillover and month agenda.

mod support;

use chrono::{NaiveDate, Weekday};
use proptest::prelude::*;
use shift_roster::db::repository::AssignmentRepository;
use shift_roster::models::{
    AssignmentId, AssignmentRequest, ScheduleAssignment, ShiftDefinition, ShiftId, TimeOfDay,
    UserId,
};
use shift_roster::services::timeline::load_timeline;
use shift_roster::services::{
    SchedulingSettings, ShiftCatalog, TimelineRenderer, ViewKind, ViewWindow,
};
use support::{date, roster, Roster};

const EPS: f64 = 1e-6;

async fn assign(roster: &Roster, user: i64, shift: ShiftId, day: NaiveDate) {
    let outcome = roster
        .repo
        .create_assignments(&[AssignmentRequest {
            user_id: UserId(user),
            shift_id: shift,
            date: day,
            recurring_group_id: None,
        }])
        .await
        .unwrap();
    assert!(outcome.is_complete());
}

#[tokio::test]
async fn test_night_shift_splits_across_midnight() {
    let roster = roster().await;
    assign(&roster, 1, roster.night.id, date(2024, 3, 1)).await;

    let window = ViewWindow::new(ViewKind::Week, date(2024, 2, 28));
    let view = load_timeline(&roster.repo, &window, &SchedulingSettings::default())
        .await
        .unwrap();

    assert_eq!(view.start_date, date(2024, 2, 26));
    assert_eq!(view.days, 7);
    assert_eq!(view.bars.len(), 2);

    let home = &view.bars[0];
    assert!(!home.is_spillover_fragment);
    assert_eq!(home.date, date(2024, 3, 1));
    assert!((home.left_offset_percent - 91.666_666).abs() < EPS);
    assert!((home.left_offset_percent + home.width_percent - 100.0).abs() < EPS);

    let spill = &view.bars[1];
    assert!(spill.is_spillover_fragment);
    assert_eq!(spill.date, date(2024, 3, 2));
    assert_eq!(spill.left_offset_percent, 0.0);
    assert!((spill.width_percent - 25.0).abs() < EPS);
    assert_eq!(spill.day_column, home.day_column + 1);
}

#[tokio::test]
async fn test_previous_evening_spills_into_first_column() {
    let roster = roster().await;
    assign(&roster, 4, roster.night.id, date(2024, 3, 3)).await;

    let window = ViewWindow::new(ViewKind::Day, date(2024, 3, 4));
    let view = load_timeline(&roster.repo, &window, &SchedulingSettings::default())
        .await
        .unwrap();

    assert_eq!(view.bars.len(), 1);
    let bar = &view.bars[0];
    assert!(bar.is_spillover_fragment);
    assert_eq!(bar.day_column, 0);
    assert!((bar.window_width_percent - 25.0).abs() < EPS);
}

#[tokio::test]
async fn test_week_start_follows_settings() {
    let roster = roster().await;
    assign(&roster, 1, roster.day.id, date(2024, 3, 3)).await;

    let settings = SchedulingSettings {
        week_starts_on: Weekday::Sun,
        ..Default::default()
    };
    let window = ViewWindow::new(ViewKind::Week, date(2024, 3, 6));
    let view = load_timeline(&roster.repo, &window, &settings).await.unwrap();

    assert_eq!(view.start_date, date(2024, 3, 3));
    assert_eq!(view.end_date, date(2024, 3, 9));
    assert_eq!(view.bars[0].day_column, 0);
    // 08:00-16:00 on the first of seven days.
    assert!((view.bars[0].window_offset_percent - 100.0 / 21.0).abs() < EPS);
}

#[tokio::test]
async fn test_month_view_lists_agenda_per_day() {
    let roster = roster().await;
    assign(&roster, 1, roster.night.id, date(2024, 2, 10)).await;
    assign(&roster, 2, roster.day.id, date(2024, 2, 10)).await;

    let catalog = ShiftCatalog::load(&roster.repo).await.unwrap();
    let assignments = roster
        .repo
        .list_assignments(date(2024, 1, 31), date(2024, 2, 29))
        .await
        .unwrap();
    let view = TimelineRenderer::new(&catalog)
        .render(&assignments, &ViewWindow::new(ViewKind::Month, date(2024, 2, 20)));

    assert_eq!(view.days, 29);
    let agenda = view.agenda.expect("month view has an agenda");
    assert_eq!(agenda.len(), 29);
    let tenth = &agenda[9];
    assert_eq!(tenth.date, date(2024, 2, 10));
    let labels: Vec<_> = tenth.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Day", "Night"]);
    assert!(tenth.entries[1].is_overnight);
}

/// A one-shift catalog running from `start` to `end` minutes past midnight.
fn catalog_of(start: u16, end: u16) -> ShiftCatalog {
    ShiftCatalog::new(vec![ShiftDefinition {
        id: ShiftId(1),
        label: "Any".to_string(),
        start_time: TimeOfDay::from_minutes(start).unwrap(),
        end_time: TimeOfDay::from_minutes(end).unwrap(),
        color: "#4f46e5".to_string(),
    }])
}

fn wednesday_row() -> ScheduleAssignment {
    ScheduleAssignment {
        id: AssignmentId(1),
        user_id: UserId(1),
        shift_id: ShiftId(1),
        date: date(2024, 3, 6),
        recurring_group_id: None,
    }
}

#[test]
fn test_midnight_end_has_zero_width_spillover() {
    let catalog = catalog_of(16 * 60, 0);
    let window = ViewWindow::new(ViewKind::Week, date(2024, 3, 6));
    let bars = TimelineRenderer::new(&catalog).layout(&[wednesday_row()], &window);

    assert_eq!(bars.len(), 2);
    let home = &bars[0];
    assert!(!home.is_spillover_fragment);
    assert!((home.left_offset_percent + home.width_percent - 100.0).abs() < EPS);

    let spill = &bars[1];
    assert!(spill.is_spillover_fragment);
    assert_eq!(spill.date, date(2024, 3, 7));
    assert_eq!(spill.left_offset_percent, 0.0);
    assert_eq!(spill.width_percent, 0.0);
    assert_eq!(spill.window_width_percent, 0.0);
}

proptest! {
    #[test]
    fn prop_bars_stay_inside_their_column(
        (start, end) in (0u16..1440, 0u16..1440).prop_filter("distinct", |(s, e)| s != e),
    ) {
        let catalog = catalog_of(start, end);
        // Mon 2024-03-04 .. Sun 2024-03-10, so Wednesday and Thursday are both visible.
        let window = ViewWindow::new(ViewKind::Week, date(2024, 3, 6));
        let bars = TimelineRenderer::new(&catalog).layout(&[wednesday_row()], &window);

        let expected = if start > end { 2 } else { 1 };
        prop_assert_eq!(bars.len(), expected);
        for bar in &bars {
            prop_assert!(bar.left_offset_percent >= 0.0);
            prop_assert!(bar.width_percent >= 0.0);
            prop_assert!(bar.left_offset_percent + bar.width_percent <= 100.0 + 1e-9);
            prop_assert!(bar.window_offset_percent >= 0.0);
            prop_assert!(bar.window_width_percent >= 0.0);
            prop_assert!(bar.window_offset_percent + bar.window_width_percent <= 100.0 + 1e-9);
        }
        if start > end {
            prop_assert_eq!(bars[1].date, date(2024, 3, 7));
            prop_assert!(bars[1].is_spillover_fragment);
            prop_assert_eq!(bars[1].left_offset_percent, 0.0);
        }
    }
}
