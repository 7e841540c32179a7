//! Shift definition repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{ShiftDefinition, ShiftDraft, ShiftId};

/// Storage for shift definitions.
///
/// Deleting a shift that assignments still reference is not blocked here.
#[async_trait]
pub trait ShiftRepository: Send + Sync {
    /// All shift definitions ordered by start time, then id.
    async fn list_shift_definitions(&self) -> RepositoryResult<Vec<ShiftDefinition>>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the shift doesn't exist
    async fn get_shift(&self, id: ShiftId) -> RepositoryResult<ShiftDefinition>;

    /// Store a new shift and return it with its assigned id.
    async fn create_shift(&self, draft: &ShiftDraft) -> RepositoryResult<ShiftDefinition>;

    /// Replace every field of an existing shift.
    async fn update_shift(&self, id: ShiftId, draft: &ShiftDraft)
        -> RepositoryResult<ShiftDefinition>;

    async fn delete_shift(&self, id: ShiftId) -> RepositoryResult<()>;
}
