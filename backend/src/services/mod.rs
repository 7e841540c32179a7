//! Service layer: scheduling rules on top of the repository traits.
//!
//! - [`catalog`]: shift definitions and their CRUD
//! - [`recurrence`]: date range plus weekly repetition into assignment requests
//! - [`mutator`]: create, scoped update/delete, bulk clear
//! - [`timeline`]: day/week/month layout
//! - [`relocation`]: drag-and-drop moves
//!
//! Services take any repository implementing the traits they need, so the
//! same code runs against `LocalRepository` in tests and Postgres in
//! production.

pub mod catalog;
pub mod error;
pub mod mutator;
pub mod recurrence;
pub mod relocation;
pub mod settings;
pub mod timeline;

pub use catalog::ShiftCatalog;
pub use error::{ScheduleError, ScheduleResult};
pub use mutator::{AssignmentUpdate, CreatedAssignments};
pub use recurrence::{expand, ExpansionPlan, ExpansionRequest, MAX_WEEK_OFFSETS};
pub use relocation::{plan_relocation, relocate, Relocation, RelocationOutcome};
pub use settings::{SchedulingSettings, SeriesDetachPolicy};
pub use timeline::{
    time_to_percent, AgendaDay, AgendaEntry, AxisOrigin, DateRange, RenderedBar, TimelineRenderer,
    TimelineView, ViewKind, ViewWindow,
};
