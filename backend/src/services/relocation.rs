//! Drag-and-drop relocation of a single assignment.
//!
//! A drop resolves to one of three outcomes: nothing changes, the row is
//! handed to another user in place, or the row moves to another date. A move
//! is a delete followed by a create, which takes the row out of its series.
//! A move onto a cell the user already holds for that shift is refused
//! before anything is deleted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::repository::{AssignmentRepository, ErrorContext, RepositoryError};
use crate::models::{AssignmentRequest, ModifyScope, ScheduleAssignment, SeriesId, UserId};

use super::error::{ScheduleError, ScheduleResult};
use super::mutator::{self, AssignmentUpdate};
use super::settings::SeriesDetachPolicy;

/// The mutation a drop calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Relocation {
    NoOp,
    Reassign { user_id: UserId },
    Move { date: NaiveDate, user_id: UserId },
}

/// Decide what dropping `assignment` on (`target_date`, `target_user`) means.
///
/// A missing target user means the row stays with its current user.
pub fn plan_relocation(
    assignment: &ScheduleAssignment,
    target_date: NaiveDate,
    target_user: Option<UserId>,
) -> Relocation {
    let user_id = target_user.unwrap_or(assignment.user_id);
    if target_date != assignment.date {
        Relocation::Move {
            date: target_date,
            user_id,
        }
    } else if user_id != assignment.user_id {
        Relocation::Reassign { user_id }
    } else {
        Relocation::NoOp
    }
}

/// What [`relocate`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationOutcome {
    pub relocation: Relocation,
    /// The recreated row of a move.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<ScheduleAssignment>,
    /// Series the moved row no longer belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detached_from: Option<SeriesId>,
}

impl RelocationOutcome {
    fn unchanged(relocation: Relocation) -> Self {
        Self {
            relocation,
            created: None,
            detached_from: None,
        }
    }
}

/// Apply a drop.
///
/// The stored row must still match `assignment` (series and date); a stale
/// copy fails validation in the repository. A no-op never reaches the
/// repository.
pub async fn relocate<R>(
    repo: &R,
    assignment: &ScheduleAssignment,
    target_date: NaiveDate,
    target_user: Option<UserId>,
    policy: SeriesDetachPolicy,
) -> ScheduleResult<RelocationOutcome>
where
    R: AssignmentRepository + ?Sized,
{
    let relocation = plan_relocation(assignment, target_date, target_user);
    let group = assignment.recurring_group_id.as_ref();

    match relocation {
        Relocation::NoOp => Ok(RelocationOutcome::unchanged(relocation)),
        Relocation::Reassign { user_id } => {
            let update = AssignmentUpdate {
                user_id: Some(user_id),
                scope: ModifyScope::Instance,
                recurring_group_id: group.cloned(),
                date: Some(assignment.date),
                ..Default::default()
            };
            mutator::update_assignment(repo, assignment.id, &update).await?;
            log::info!(
                "Reassigned {} on {} from user {} to {}",
                assignment.id,
                assignment.date,
                assignment.user_id,
                user_id
            );
            Ok(RelocationOutcome::unchanged(relocation))
        }
        Relocation::Move { date, user_id } => {
            if let (Some(series), SeriesDetachPolicy::Reject) = (group, policy) {
                return Err(ScheduleError::validation(format!(
                    "Assignment {} belongs to series {}; edit the series to change its dates",
                    assignment.id, series
                )));
            }

            // The original is only removed once the target cell is known to be free.
            let occupied = mutator::list_assignments(repo, date, date)
                .await?
                .into_iter()
                .any(|row| {
                    row.id != assignment.id
                        && row.user_id == user_id
                        && row.shift_id == assignment.shift_id
                });
            if occupied {
                return Err(ScheduleError::validation(format!(
                    "User {} already works shift {} on {}",
                    user_id, assignment.shift_id, date
                )));
            }

            mutator::delete_assignment(
                repo,
                assignment.id,
                ModifyScope::Instance,
                group,
                Some(assignment.date),
            )
            .await?;

            let request = AssignmentRequest {
                user_id,
                shift_id: assignment.shift_id,
                date,
                recurring_group_id: None,
            };
            let mut outcome =
                mutator::create_assignments(repo, std::slice::from_ref(&request)).await?;

            let Some(created) = outcome.created.pop() else {
                let reason = outcome
                    .failed
                    .pop()
                    .map(|f| f.reason)
                    .unwrap_or_else(|| "no row returned".to_string());
                log::warn!(
                    "Move of {} deleted the original but could not recreate it: {}",
                    assignment.id,
                    reason
                );
                return Err(ScheduleError::Repository(
                    RepositoryError::internal_with_context(
                        format!(
                            "Assignment {} was removed but its replacement for user {} on {} \
                             could not be created: {}",
                            assignment.id, user_id, date, reason
                        ),
                        ErrorContext::new("relocate")
                            .with_entity("assignment")
                            .with_entity_id(assignment.id),
                    ),
                ));
            };

            if let Some(series) = group {
                log::info!("Assignment {} detached from series {}", assignment.id, series);
            }
            log::info!(
                "Moved {} ({} on {}) to {} on {} as {}",
                assignment.id,
                assignment.user_id,
                assignment.date,
                user_id,
                date,
                created.id
            );
            Ok(RelocationOutcome {
                relocation,
                created: Some(created),
                detached_from: group.cloned(),
            })
        }
    }
}
