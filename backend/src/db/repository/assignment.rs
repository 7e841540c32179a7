//! Assignment repository trait: the schedule storage contract.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{
    AssignmentId, AssignmentPatch, AssignmentRequest, BatchOutcome, BulkClearKind, ModifyScope,
    ScheduleAssignment, SeriesId,
};

/// Repository trait for schedule assignment storage.
///
/// Scope arguments follow [`ModifyScope::selects`]: the row identified by
/// `id` is always affected; `following` and `all` extend to rows sharing its
/// `recurring_group_id`.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the storage backend is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Reads ====================

    /// List assignments whose date falls in `[start_date, end_date]`.
    ///
    /// Ordered by date, then user, then id.
    async fn list_assignments(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduleAssignment>>;

    /// Fetch one assignment.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the assignment doesn't exist
    async fn get_assignment(&self, id: AssignmentId) -> RepositoryResult<ScheduleAssignment>;

    // ==================== Writes ====================

    /// Persist each request as a new row.
    ///
    /// Rows are attempted independently. A row that cannot be stored is
    /// reported in [`BatchOutcome::failed`]; an `Err` means the batch could
    /// not be attempted at all.
    async fn create_assignments(
        &self,
        requests: &[AssignmentRequest],
    ) -> RepositoryResult<BatchOutcome>;

    /// Apply `patch` to the row identified by `id` and, depending on `scope`,
    /// to other rows of its series.
    ///
    /// `recurring_group_id` and `date` are the caller's view of the target
    /// row; when supplied they must match the stored row.
    ///
    /// # Returns
    /// * `Ok(n)` - Number of rows changed
    /// * `Err(RepositoryError::NotFound)` - If the target doesn't exist
    async fn update_assignment(
        &self,
        id: AssignmentId,
        patch: AssignmentPatch,
        scope: ModifyScope,
        recurring_group_id: Option<&SeriesId>,
        date: Option<NaiveDate>,
    ) -> RepositoryResult<usize>;

    /// Delete the row identified by `id` and, depending on `scope`, other rows
    /// of its series.
    ///
    /// # Returns
    /// * `Ok(n)` - Number of rows removed
    /// * `Err(RepositoryError::NotFound)` - If the target doesn't exist
    async fn delete_assignment(
        &self,
        id: AssignmentId,
        scope: ModifyScope,
        recurring_group_id: Option<&SeriesId>,
        date: Option<NaiveDate>,
    ) -> RepositoryResult<usize>;

    /// Remove many rows at once.
    ///
    /// `clear_week` removes rows dated within `[start_date, end_date]`;
    /// `clear_after_today` removes rows dated after `start_date` (today).
    ///
    /// # Returns
    /// * `Ok(n)` - Number of rows removed
    async fn bulk_clear(
        &self,
        kind: BulkClearKind,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> RepositoryResult<usize>;
}

/// Check the caller's view of a scoped-operation target against the stored row.
///
/// Hints that are absent are not checked. A mismatch means the caller acted
/// on stale data and is reported as a validation error.
pub fn check_target_hints(
    operation: &str,
    target: &ScheduleAssignment,
    recurring_group_id: Option<&SeriesId>,
    date: Option<NaiveDate>,
) -> RepositoryResult<()> {
    let context = || {
        ErrorContext::new(operation)
            .with_entity("assignment")
            .with_entity_id(target.id)
    };
    if let Some(group) = recurring_group_id {
        if target.recurring_group_id.as_ref() != Some(group) {
            return Err(RepositoryError::validation_with_context(
                format!("Assignment {} is not part of series {}", target.id, group),
                context(),
            ));
        }
    }
    if let Some(date) = date {
        if target.date != date {
            return Err(RepositoryError::validation_with_context(
                format!(
                    "Assignment {} is dated {}, not {}",
                    target.id, target.date, date
                ),
                context(),
            ));
        }
    }
    Ok(())
}
