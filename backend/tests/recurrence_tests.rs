//! Expansion of operator requests into assignment requests.

mod support;

use chrono::{Datelike, Weekday};
use proptest::prelude::*;
use shift_roster::models::{ShiftId, UserId};
use shift_roster::services::{expand, ExpansionRequest, ScheduleError};
use support::date;

fn request(users: &[i64], start: chrono::NaiveDate, end: chrono::NaiveDate) -> ExpansionRequest {
    ExpansionRequest {
        user_ids: users.iter().copied().map(UserId).collect(),
        shift_id: Some(ShiftId(2)),
        start_date: start,
        end_date: end,
        recurring: false,
        recurring_until: None,
    }
}

#[test]
fn test_three_weeks_of_mon_to_wed() {
    let mut req = request(&[5], date(2024, 3, 4), date(2024, 3, 6));
    req.recurring = true;
    req.recurring_until = Some(date(2024, 3, 20));

    let plan = expand(&req).unwrap();
    let expected: Vec<_> = [4, 5, 6, 11, 12, 13, 18, 19, 20]
        .iter()
        .map(|d| date(2024, 3, *d))
        .collect();
    assert_eq!(plan.dates(), expected);

    let series = plan.series.expect("recurring request records a series");
    assert_eq!(series.weekdays, vec![Weekday::Mon, Weekday::Tue, Weekday::Wed]);
    assert!(plan
        .requests
        .iter()
        .all(|r| r.recurring_group_id.as_ref() == Some(&series.id)));
}

#[test]
fn test_until_inside_a_week_truncates_that_week() {
    let mut req = request(&[1], date(2024, 3, 4), date(2024, 3, 6));
    req.recurring = true;
    req.recurring_until = Some(date(2024, 3, 12));

    let plan = expand(&req).unwrap();
    assert_eq!(
        plan.dates(),
        vec![
            date(2024, 3, 4),
            date(2024, 3, 5),
            date(2024, 3, 6),
            date(2024, 3, 11),
            date(2024, 3, 12),
        ]
    );
}

#[test]
fn test_requests_are_user_major() {
    let plan = expand(&request(&[7, 3], date(2024, 3, 1), date(2024, 3, 2))).unwrap();
    let pairs: Vec<_> = plan
        .requests
        .iter()
        .map(|r| (r.user_id.value(), r.date.day()))
        .collect();
    assert_eq!(pairs, vec![(7, 1), (7, 2), (3, 1), (3, 2)]);
}

#[test]
fn test_invalid_requests_are_rejected() {
    let mut no_users = request(&[], date(2024, 3, 1), date(2024, 3, 2));
    assert!(matches!(expand(&no_users), Err(ScheduleError::Validation(_))));
    no_users.user_ids.push(UserId(1));
    no_users.shift_id = None;
    assert!(matches!(expand(&no_users), Err(ScheduleError::Validation(_))));

    let backwards = request(&[1], date(2024, 3, 5), date(2024, 3, 1));
    assert!(matches!(expand(&backwards), Err(ScheduleError::Validation(_))));

    let mut missing_until = request(&[1], date(2024, 3, 1), date(2024, 3, 2));
    missing_until.recurring = true;
    assert!(matches!(
        expand(&missing_until),
        Err(ScheduleError::Validation(_))
    ));
}

fn arb_start() -> impl Strategy<Value = chrono::NaiveDate> {
    (0u64..730).prop_map(|offset| date(2024, 1, 1) + chrono::Days::new(offset))
}

proptest! {
    #[test]
    fn prop_plain_range_covers_every_user_and_day(
        start in arb_start(),
        len in 0u64..21,
        users in prop::collection::btree_set(1i64..50, 1..5),
    ) {
        let end = start + chrono::Days::new(len);
        let users: Vec<i64> = users.into_iter().collect();
        let plan = expand(&request(&users, start, end)).unwrap();

        prop_assert_eq!(plan.len(), (len as usize + 1) * users.len());
        prop_assert!(plan.requests.iter().all(|r| r.date >= start && r.date <= end));
        prop_assert!(plan.series.is_none());
    }

    #[test]
    fn prop_recurring_dates_repeat_the_base_block(
        start in arb_start(),
        len in 0u64..7,
        extra in 0u64..120,
    ) {
        let end = start + chrono::Days::new(len);
        let until = end + chrono::Days::new(extra);
        let mut req = request(&[9], start, end);
        req.recurring = true;
        req.recurring_until = Some(until);

        let plan = expand(&req).unwrap();
        let base: Vec<_> = (0..=len).map(|i| start + chrono::Days::new(i)).collect();
        for d in plan.dates() {
            prop_assert!(d <= until);
            let offset = (d - start).num_days();
            prop_assert!(offset >= 0);
            let week = (offset / 7) as u64;
            prop_assert!(base.iter().any(|b| *b + chrono::Days::new(week * 7) == d));
        }
        // Every base date is kept because until >= end.
        for b in &base {
            prop_assert!(plan.dates().contains(b));
        }
    }
}
