//! Builds a small roster in memory and prints one week of it.
//!
//! ```bash
//! cargo run --example weekly_roster
//! ```

use chrono::NaiveDate;
use shift_roster::db::repositories::LocalRepository;
use shift_roster::models::{ShiftDraft, UserId};
use shift_roster::services::timeline::load_timeline;
use shift_roster::services::{
    catalog, mutator, ExpansionRequest, SchedulingSettings, ViewKind, ViewWindow,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let repo = LocalRepository::new();

    let early = catalog::create_shift(
        &repo,
        &ShiftDraft {
            label: "Early".to_string(),
            start_time: "06:00".parse()?,
            end_time: "14:00".parse()?,
            color: "#f59e0b".to_string(),
        },
    )
    .await?;
    let night = catalog::create_shift(
        &repo,
        &ShiftDraft {
            label: "Night".to_string(),
            start_time: "22:00".parse()?,
            end_time: "06:00".parse()?,
            color: "#1e293b".to_string(),
        },
    )
    .await?;

    let start = NaiveDate::from_ymd_opt(2024, 3, 4).ok_or("bad date")?;
    let until = NaiveDate::from_ymd_opt(2024, 3, 31).ok_or("bad date")?;

    for (users, shift, from, to) in [
        (vec![UserId(1), UserId(2)], early.id, 0, 4),
        (vec![UserId(3)], night.id, 4, 6),
    ] {
        let created = mutator::create_from_request(
            &repo,
            &ExpansionRequest {
                user_ids: users,
                shift_id: Some(shift),
                start_date: start + chrono::Days::new(from),
                end_date: start + chrono::Days::new(to),
                recurring: true,
                recurring_until: Some(until),
            },
        )
        .await?;
        println!(
            "{}: {} created, {} failed",
            shift,
            created.outcome.created.len(),
            created.outcome.failed.len()
        );
    }

    let anchor = NaiveDate::from_ymd_opt(2024, 3, 13).ok_or("bad date")?;
    let window = ViewWindow::new(ViewKind::Week, anchor);
    let view = load_timeline(&repo, &window, &SchedulingSettings::default()).await?;

    println!("Week {} .. {}", view.start_date, view.end_date);
    for bar in &view.bars {
        println!(
            "  {} user {:>2} shift {} {:>6.2}% +{:>6.2}%{}",
            bar.date,
            bar.user_id,
            bar.shift_id,
            bar.left_offset_percent,
            bar.width_percent,
            if bar.is_spillover_fragment {
                " (spillover)"
            } else {
                ""
            }
        );
    }
    Ok(())
}
