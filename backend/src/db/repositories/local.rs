//! In-memory local repository implementation.
//!
//! Stores shifts, assignments and series in `BTreeMap`s behind one lock,
//! giving fast, deterministic and isolated execution for unit tests and
//! local development.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{
    AssignmentId, AssignmentPatch, AssignmentRequest, BatchOutcome, BulkClearKind, ClearWindow,
    FailedRequest, ModifyScope, RecurringSeries, ScheduleAssignment, SeriesId, ShiftDefinition,
    ShiftDraft, ShiftId,
};

/// In-memory local repository.
///
/// # Example
/// ```no_run
/// use shift_roster::db::repositories::LocalRepository;
/// use shift_roster::db::repository::ShiftRepository;
///
/// # async fn demo() -> shift_roster::db::RepositoryResult<()> {
/// let repo = LocalRepository::new();
/// let shifts = repo.list_shift_definitions().await?;
/// assert!(shifts.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    writes: Arc<AtomicU64>,
}

struct LocalData {
    shifts: BTreeMap<ShiftId, ShiftDefinition>,
    assignments: BTreeMap<AssignmentId, ScheduleAssignment>,
    series: BTreeMap<SeriesId, RecurringSeries>,

    // ID counters
    next_shift_id: i64,
    next_assignment_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            shifts: BTreeMap::new(),
            assignments: BTreeMap::new(),
            series: BTreeMap::new(),
            next_shift_id: 1,
            next_assignment_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            writes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data, keeping the health flag.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let is_healthy = data.is_healthy;
        *data = LocalData {
            is_healthy,
            ..Default::default()
        };
    }

    /// Number of stored assignments.
    pub fn assignment_count(&self) -> usize {
        self.data.read().assignments.len()
    }

    /// Number of stored recurring series.
    pub fn series_count(&self) -> usize {
        self.data.read().series.len()
    }

    /// Number of write calls (create/update/delete/clear) received so far,
    /// successful or not.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Snapshot of every stored assignment, ordered by id.
    pub fn all_assignments(&self) -> Vec<ScheduleAssignment> {
        self.data.read().assignments.values().cloned().collect()
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }

    /// Locate the target of a scoped operation and check the caller's hints.
    fn resolve_target(
        data: &LocalData,
        operation: &str,
        id: AssignmentId,
        recurring_group_id: Option<&SeriesId>,
        date: Option<NaiveDate>,
    ) -> RepositoryResult<ScheduleAssignment> {
        let target = data
            .assignments
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::entity_not_found(operation, "assignment", id))?;

        check_target_hints(operation, &target, recurring_group_id, date)?;
        Ok(target)
    }

    fn selected_ids(
        data: &LocalData,
        target: &ScheduleAssignment,
        scope: ModifyScope,
    ) -> Vec<AssignmentId> {
        let scope = scope.effective_for(target);
        data.assignments
            .values()
            .filter(|candidate| scope.selects(target, candidate))
            .map(|candidate| candidate.id)
            .collect()
    }

    /// Reject a patch that would leave two rows with the same user, shift and date.
    fn check_patch_conflicts(
        data: &LocalData,
        ids: &[AssignmentId],
        patch: AssignmentPatch,
    ) -> RepositoryResult<()> {
        let selected: HashSet<AssignmentId> = ids.iter().copied().collect();
        let mut seen = HashSet::new();
        for row in ids.iter().filter_map(|id| data.assignments.get(id)) {
            let mut patched = row.clone();
            patch.apply(&mut patched);
            let key = (patched.user_id, patched.shift_id, patched.date);
            let taken = !seen.insert(key)
                || data.assignments.values().any(|other| {
                    !selected.contains(&other.id)
                        && (other.user_id, other.shift_id, other.date) == key
                });
            if taken {
                return Err(RepositoryError::validation_with_context(
                    format!(
                        "user {} already works shift {} on {}",
                        patched.user_id, patched.shift_id, patched.date
                    ),
                    ErrorContext::new("update_assignment")
                        .with_entity("assignment")
                        .with_entity_id(row.id),
                ));
            }
        }
        Ok(())
    }

    fn is_duplicate(data: &LocalData, request: &AssignmentRequest) -> bool {
        data.assignments.values().any(|a| {
            a.user_id == request.user_id && a.shift_id == request.shift_id && a.date == request.date
        })
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Assignment Repository ====================

#[async_trait]
impl AssignmentRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn list_assignments(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduleAssignment>> {
        self.check_health()?;
        let data = self.data.read();

        let mut rows: Vec<ScheduleAssignment> = data
            .assignments
            .values()
            .filter(|a| a.date >= start_date && a.date <= end_date)
            .cloned()
            .collect();

        rows.sort_by_key(|a| (a.date, a.user_id, a.id));
        Ok(rows)
    }

    async fn get_assignment(&self, id: AssignmentId) -> RepositoryResult<ScheduleAssignment> {
        self.check_health()?;
        self.data
            .read()
            .assignments
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::entity_not_found("get_assignment", "assignment", id))
    }

    async fn create_assignments(
        &self,
        requests: &[AssignmentRequest],
    ) -> RepositoryResult<BatchOutcome> {
        self.record_write();
        self.check_health()?;
        let mut data = self.data.write();
        let mut outcome = BatchOutcome::default();

        for request in requests {
            let reason = if !data.shifts.contains_key(&request.shift_id) {
                Some(format!("shift {} does not exist", request.shift_id))
            } else if Self::is_duplicate(&data, request) {
                Some(format!(
                    "user {} already works shift {} on {}",
                    request.user_id, request.shift_id, request.date
                ))
            } else {
                None
            };

            match reason {
                Some(reason) => outcome.failed.push(FailedRequest {
                    request: request.clone(),
                    reason,
                }),
                None => {
                    let id = AssignmentId(data.next_assignment_id);
                    data.next_assignment_id += 1;
                    let row = request.clone().into_assignment(id);
                    data.assignments.insert(id, row.clone());
                    outcome.created.push(row);
                }
            }
        }

        Ok(outcome)
    }

    async fn update_assignment(
        &self,
        id: AssignmentId,
        patch: AssignmentPatch,
        scope: ModifyScope,
        recurring_group_id: Option<&SeriesId>,
        date: Option<NaiveDate>,
    ) -> RepositoryResult<usize> {
        self.record_write();
        self.check_health()?;
        if patch.is_empty() {
            return Err(RepositoryError::validation_with_context(
                "update needs a new user or a new shift",
                ErrorContext::new("update_assignment").with_entity_id(id),
            ));
        }
        let mut data = self.data.write();

        let target =
            Self::resolve_target(&data, "update_assignment", id, recurring_group_id, date)?;
        if let Some(shift_id) = patch.shift_id {
            if !data.shifts.contains_key(&shift_id) {
                return Err(RepositoryError::validation_with_context(
                    format!("shift {} does not exist", shift_id),
                    ErrorContext::new("update_assignment").with_entity("shift"),
                ));
            }
        }

        let ids = Self::selected_ids(&data, &target, scope);
        Self::check_patch_conflicts(&data, &ids, patch)?;
        for row_id in &ids {
            if let Some(row) = data.assignments.get_mut(row_id) {
                patch.apply(row);
            }
        }
        Ok(ids.len())
    }

    async fn delete_assignment(
        &self,
        id: AssignmentId,
        scope: ModifyScope,
        recurring_group_id: Option<&SeriesId>,
        date: Option<NaiveDate>,
    ) -> RepositoryResult<usize> {
        self.record_write();
        self.check_health()?;
        let mut data = self.data.write();

        let target =
            Self::resolve_target(&data, "delete_assignment", id, recurring_group_id, date)?;
        let ids = Self::selected_ids(&data, &target, scope);
        for row_id in &ids {
            data.assignments.remove(row_id);
        }
        Ok(ids.len())
    }

    async fn bulk_clear(
        &self,
        kind: BulkClearKind,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> RepositoryResult<usize> {
        self.record_write();
        self.check_health()?;
        let window = ClearWindow::resolve(kind, start_date, end_date).map_err(|msg| {
            RepositoryError::validation_with_context(msg, ErrorContext::new("bulk_clear"))
        })?;

        let mut data = self.data.write();
        let before = data.assignments.len();
        data.assignments.retain(|_, a| !window.contains(a.date));
        Ok(before - data.assignments.len())
    }
}

// ==================== Shift Repository ====================

#[async_trait]
impl ShiftRepository for LocalRepository {
    async fn list_shift_definitions(&self) -> RepositoryResult<Vec<ShiftDefinition>> {
        self.check_health()?;
        let mut shifts: Vec<ShiftDefinition> = self.data.read().shifts.values().cloned().collect();
        shifts.sort_by_key(|s| (s.start_time, s.id));
        Ok(shifts)
    }

    async fn get_shift(&self, id: ShiftId) -> RepositoryResult<ShiftDefinition> {
        self.check_health()?;
        self.data
            .read()
            .shifts
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::entity_not_found("get_shift", "shift", id))
    }

    async fn create_shift(&self, draft: &ShiftDraft) -> RepositoryResult<ShiftDefinition> {
        self.record_write();
        self.check_health()?;
        let mut data = self.data.write();
        let id = ShiftId(data.next_shift_id);
        data.next_shift_id += 1;

        let shift = ShiftDefinition::from_draft(id, draft.clone());
        data.shifts.insert(id, shift.clone());
        Ok(shift)
    }

    async fn update_shift(
        &self,
        id: ShiftId,
        draft: &ShiftDraft,
    ) -> RepositoryResult<ShiftDefinition> {
        self.record_write();
        self.check_health()?;
        let mut data = self.data.write();
        let slot = data
            .shifts
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::entity_not_found("update_shift", "shift", id))?;
        *slot = ShiftDefinition::from_draft(id, draft.clone());
        Ok(slot.clone())
    }

    async fn delete_shift(&self, id: ShiftId) -> RepositoryResult<()> {
        self.record_write();
        self.check_health()?;
        self.data
            .write()
            .shifts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::entity_not_found("delete_shift", "shift", id))
    }
}

// ==================== Series Repository ====================

#[async_trait]
impl SeriesRepository for LocalRepository {
    async fn store_series(&self, series: &RecurringSeries) -> RepositoryResult<()> {
        self.record_write();
        self.check_health()?;
        let mut data = self.data.write();
        if data.series.contains_key(&series.id) {
            return Err(RepositoryError::validation_with_context(
                format!("series {} already exists", series.id),
                ErrorContext::new("store_series")
                    .with_entity("series")
                    .with_entity_id(&series.id),
            ));
        }
        data.series.insert(series.id.clone(), series.clone());
        Ok(())
    }

    async fn get_series(&self, id: &SeriesId) -> RepositoryResult<RecurringSeries> {
        self.check_health()?;
        self.data
            .read()
            .series
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::entity_not_found("get_series", "series", id))
    }
}
