#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::NaiveDate;
use shift_roster::db::repositories::LocalRepository;
use shift_roster::db::repository::ShiftRepository;
use shift_roster::models::{ShiftDefinition, ShiftDraft};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on unwind and serializes access to the
/// process environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn draft(label: &str, start: &str, end: &str) -> ShiftDraft {
    ShiftDraft {
        label: label.to_string(),
        start_time: start.parse().unwrap(),
        end_time: end.parse().unwrap(),
        color: "#4f46e5".to_string(),
    }
}

/// Day shift 08:00-16:00 and night shift 22:00-06:00.
pub struct Roster {
    pub repo: LocalRepository,
    pub day: ShiftDefinition,
    pub night: ShiftDefinition,
}

pub async fn roster() -> Roster {
    let repo = LocalRepository::new();
    let day = repo.create_shift(&draft("Day", "08:00", "16:00")).await.unwrap();
    let night = repo
        .create_shift(&draft("Night", "22:00", "06:00"))
        .await
        .unwrap();
    Roster { repo, day, night }
}
