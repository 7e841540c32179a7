//! Recurring series repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{RecurringSeries, SeriesId};

/// Storage for [`RecurringSeries`] records.
///
/// Assignments reference a series through `recurring_group_id`; the series
/// record is kept even when every row referencing it is gone.
#[async_trait]
pub trait SeriesRepository: Send + Sync {
    /// Insert a series. Storing an id twice is a validation error.
    async fn store_series(&self, series: &RecurringSeries) -> RepositoryResult<()>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no series has this id
    async fn get_series(&self, id: &SeriesId) -> RepositoryResult<RecurringSeries>;
}
