//! Repository trait definitions for schedule storage.
//!
//! Storage is split across focused traits so each backend can be tested one
//! concern at a time:
//!
//! - [`error`]: Error types for repository operations
//! - [`assignment`]: Schedule assignments (list, batch create, scoped update/delete, bulk clear)
//! - [`shift`]: Shift definitions
//! - [`series`]: Recurring series records
//!
//! # Convenience Trait Bound
//!
//! For code that needs every capability, use the [`FullRepository`] bound:
//!
//! ```ignore
//! async fn reassign<R: FullRepository + ?Sized>(repo: &R, id: AssignmentId) -> RepositoryResult<()> {
//!     let row = repo.get_assignment(id).await?;
//!     let _shift = repo.get_shift(row.shift_id).await?;
//!     Ok(())
//! }
//! ```

pub mod assignment;
pub mod error;
pub mod series;
pub mod shift;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use assignment::{check_target_hints, AssignmentRepository};
pub use series::SeriesRepository;
pub use shift::ShiftRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type implementing all three traits.
pub trait FullRepository: AssignmentRepository + ShiftRepository + SeriesRepository {}

impl<T> FullRepository for T where T: AssignmentRepository + ShiftRepository + SeriesRepository {}
