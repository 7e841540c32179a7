//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer for scheduling rules.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    AssignmentListResponse, AssignmentRangeQuery, AssignmentUpdate, BulkClearRequest,
    CreatedAssignments, DeleteAssignmentQuery, ExpansionPlan, ExpansionRequest, HealthResponse,
    MutationResponse, RelocateRequest, RelocationOutcome, ShiftListResponse, TimelineQuery,
    TimelineView,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::{AssignmentId, ShiftDefinition, ShiftDraft, ShiftId};
use crate::services::{self, catalog, mutator, timeline, ViewWindow};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Reports whether the service is up and the repository reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Shift catalog
// =============================================================================

/// GET /v1/shifts
pub async fn list_shifts(State(state): State<AppState>) -> HandlerResult<ShiftListResponse> {
    let shifts = catalog::list_shifts(state.repository.as_ref()).await?;
    let total = shifts.len();
    Ok(Json(ShiftListResponse { shifts, total }))
}

/// POST /v1/shifts
pub async fn create_shift(
    State(state): State<AppState>,
    Json(draft): Json<ShiftDraft>,
) -> Result<(StatusCode, Json<ShiftDefinition>), AppError> {
    let shift = catalog::create_shift(state.repository.as_ref(), &draft).await?;
    Ok((StatusCode::CREATED, Json(shift)))
}

/// PUT /v1/shifts/{shift_id}
pub async fn update_shift(
    State(state): State<AppState>,
    Path(shift_id): Path<i64>,
    Json(draft): Json<ShiftDraft>,
) -> HandlerResult<ShiftDefinition> {
    let shift = catalog::update_shift(state.repository.as_ref(), ShiftId(shift_id), &draft).await?;
    Ok(Json(shift))
}

/// DELETE /v1/shifts/{shift_id}
pub async fn delete_shift(
    State(state): State<AppState>,
    Path(shift_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    catalog::delete_shift(state.repository.as_ref(), ShiftId(shift_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Assignments
// =============================================================================

/// GET /v1/assignments?start_date=..&end_date=..
pub async fn list_assignments(
    State(state): State<AppState>,
    Query(query): Query<AssignmentRangeQuery>,
) -> HandlerResult<AssignmentListResponse> {
    let assignments =
        mutator::list_assignments(state.repository.as_ref(), query.start_date, query.end_date)
            .await?;
    let total = assignments.len();
    Ok(Json(AssignmentListResponse { assignments, total }))
}

/// POST /v1/assignments
///
/// Expands the request and stores every resulting row. Rows the repository
/// refuses come back under `failed`; the others are still created.
pub async fn create_assignments(
    State(state): State<AppState>,
    Json(request): Json<ExpansionRequest>,
) -> Result<(StatusCode, Json<CreatedAssignments>), AppError> {
    let created = mutator::create_from_request(state.repository.as_ref(), &request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /v1/assignments/preview
///
/// Same expansion as a create, nothing stored.
pub async fn preview_assignments(
    Json(request): Json<ExpansionRequest>,
) -> HandlerResult<ExpansionPlan> {
    Ok(Json(services::expand(&request)?))
}

/// PUT /v1/assignments/{assignment_id}
pub async fn update_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<i64>,
    Json(update): Json<AssignmentUpdate>,
) -> HandlerResult<MutationResponse> {
    let affected = mutator::update_assignment(
        state.repository.as_ref(),
        AssignmentId(assignment_id),
        &update,
    )
    .await?;
    Ok(Json(MutationResponse { affected }))
}

/// DELETE /v1/assignments/{assignment_id}?scope=..&recurring_group_id=..&date=..
pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<i64>,
    Query(query): Query<DeleteAssignmentQuery>,
) -> HandlerResult<MutationResponse> {
    let affected = mutator::delete_assignment(
        state.repository.as_ref(),
        AssignmentId(assignment_id),
        query.scope,
        query.recurring_group_id.as_ref(),
        query.date,
    )
    .await?;
    Ok(Json(MutationResponse { affected }))
}

/// POST /v1/assignments/{assignment_id}/relocate
///
/// Drop target of the timeline. The series policy comes from the
/// `[scheduling]` configuration.
pub async fn relocate_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<i64>,
    Json(request): Json<RelocateRequest>,
) -> HandlerResult<RelocationOutcome> {
    let repo = state.repository.as_ref();
    let assignment = repo.get_assignment(AssignmentId(assignment_id)).await?;
    let outcome = services::relocate(
        repo,
        &assignment,
        request.target_date,
        request.target_user_id,
        state.settings.series_detach_policy,
    )
    .await?;
    Ok(Json(outcome))
}

/// POST /v1/assignments/clear
pub async fn clear_assignments(
    State(state): State<AppState>,
    Json(request): Json<BulkClearRequest>,
) -> HandlerResult<MutationResponse> {
    let affected = mutator::bulk_clear(
        state.repository.as_ref(),
        request.kind,
        request.start_date,
        request.end_date,
    )
    .await?;
    Ok(Json(MutationResponse { affected }))
}

// =============================================================================
// Timeline
// =============================================================================

/// GET /v1/timeline?view=week&date=2024-03-04
pub async fn get_timeline(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> HandlerResult<TimelineView> {
    let window = ViewWindow::new(query.view, query.date);
    let view = timeline::load_timeline(state.repository.as_ref(), &window, &state.settings).await?;
    Ok(Json(view))
}
