//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies that already exist as service types (`ExpansionRequest`,
//! `AssignmentUpdate`, `ShiftDraft`) are used directly; this module holds the
//! query strings and envelopes around them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{
    BulkClearKind, ModifyScope, ScheduleAssignment, SeriesId, ShiftDefinition, UserId,
};
use crate::services::ViewKind;

pub use crate::services::{
    AssignmentUpdate, CreatedAssignments, ExpansionPlan, ExpansionRequest, RelocationOutcome,
    TimelineView,
};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftListResponse {
    pub shifts: Vec<ShiftDefinition>,
    pub total: usize,
}

/// Query string of `GET /v1/assignments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentListResponse {
    pub assignments: Vec<ScheduleAssignment>,
    pub total: usize,
}

/// Query string of `DELETE /v1/assignments/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteAssignmentQuery {
    #[serde(default)]
    pub scope: ModifyScope,
    #[serde(default)]
    pub recurring_group_id: Option<SeriesId>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Rows touched by an update, delete or clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub affected: usize,
}

/// Body of `POST /v1/assignments/{id}/relocate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelocateRequest {
    pub target_date: NaiveDate,
    #[serde(default)]
    pub target_user_id: Option<UserId>,
}

/// Body of `POST /v1/assignments/clear`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkClearRequest {
    pub kind: BulkClearKind,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Query string of `GET /v1/timeline`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineQuery {
    #[serde(default = "default_view")]
    pub view: ViewKind,
    pub date: NaiveDate,
}

fn default_view() -> ViewKind {
    ViewKind::Week
}
