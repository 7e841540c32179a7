//! Shift catalog: the set of shift definitions other services look times up in.

use std::collections::HashMap;

use crate::db::repository::ShiftRepository;
use crate::models::{ShiftDefinition, ShiftDraft, ShiftId};

use super::error::{ScheduleError, ScheduleResult};

/// Shift definitions indexed by id.
#[derive(Debug, Clone, Default)]
pub struct ShiftCatalog {
    shifts: HashMap<ShiftId, ShiftDefinition>,
}

impl ShiftCatalog {
    pub fn new(shifts: impl IntoIterator<Item = ShiftDefinition>) -> Self {
        Self {
            shifts: shifts.into_iter().map(|s| (s.id, s)).collect(),
        }
    }

    /// Snapshot the repository's current definitions.
    pub async fn load<R>(repo: &R) -> ScheduleResult<Self>
    where
        R: ShiftRepository + ?Sized,
    {
        Ok(Self::new(repo.list_shift_definitions().await?))
    }

    pub fn get(&self, id: ShiftId) -> Option<&ShiftDefinition> {
        self.shifts.get(&id)
    }

    pub fn contains(&self, id: ShiftId) -> bool {
        self.shifts.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Definitions ordered by start time, then id.
    pub fn sorted(&self) -> Vec<&ShiftDefinition> {
        let mut all: Vec<&ShiftDefinition> = self.shifts.values().collect();
        all.sort_by_key(|s| (s.start_time, s.id));
        all
    }
}

pub async fn list_shifts<R>(repo: &R) -> ScheduleResult<Vec<ShiftDefinition>>
where
    R: ShiftRepository + ?Sized,
{
    Ok(repo.list_shift_definitions().await?)
}

pub async fn create_shift<R>(repo: &R, draft: &ShiftDraft) -> ScheduleResult<ShiftDefinition>
where
    R: ShiftRepository + ?Sized,
{
    draft.validate().map_err(ScheduleError::Validation)?;
    let shift = repo.create_shift(draft).await?;
    log::info!(
        "Created shift {} '{}' ({}-{})",
        shift.id,
        shift.label,
        shift.start_time,
        shift.end_time
    );
    Ok(shift)
}

pub async fn update_shift<R>(
    repo: &R,
    id: ShiftId,
    draft: &ShiftDraft,
) -> ScheduleResult<ShiftDefinition>
where
    R: ShiftRepository + ?Sized,
{
    draft.validate().map_err(ScheduleError::Validation)?;
    let shift = repo.update_shift(id, draft).await?;
    log::info!("Updated shift {} '{}'", shift.id, shift.label);
    Ok(shift)
}

/// Delete a shift. Assignments still pointing at it are left in place and
/// are skipped by the timeline until a shift with that id exists again.
pub async fn delete_shift<R>(repo: &R, id: ShiftId) -> ScheduleResult<()>
where
    R: ShiftRepository + ?Sized,
{
    repo.delete_shift(id).await?;
    log::info!("Deleted shift {}", id);
    Ok(())
}
