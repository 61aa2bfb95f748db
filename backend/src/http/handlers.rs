//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! repository, the ingestion pipeline or the service layer.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    BuildingListResponse, CommitRequest, CourseListResponse, FacultyListResponse,
    HealthResponse, RevisionListResponse, ScheduleListResponse, UploadQuery, VerifyRequest,
    VerifyResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    Building, Campus, CommitReceipt, Department, Faculty, GuidelineId, NewBuilding, NewCampus,
    NewDepartment, NewFaculty, NewGuideline, RevisionId, ScheduleRevision,
};
use crate::db::repository::{GuidelineRepository, ReferenceRepository, ScheduleRepository};
use crate::ingest::IngestError;
use crate::services::{search_guidelines, GuidelinePage, GuidelineQuery, GuidelineView};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for handlers that create a resource.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

fn created<T>(value: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(value)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
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
// Revisions and ingestion
// =============================================================================

/// POST /v1/revisions?name=...
///
/// Store an uploaded spreadsheet as a new onboarding revision.
pub async fn upload_revision(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> CreatedResult<ScheduleRevision> {
    if query.name.trim().is_empty() {
        return Err(AppError::BadRequest("Revision name must not be empty".into()));
    }
    if body.is_empty() {
        return Err(AppError::BadRequest("Spreadsheet body must not be empty".into()));
    }

    let revision = state.repository.upload_revision(query.name.trim(), &body).await?;
    tracing::info!(revision_id = %revision.id, bytes = body.len(), "Revision uploaded");
    created(revision)
}

/// GET /v1/revisions
pub async fn list_revisions(State(state): State<AppState>) -> HandlerResult<RevisionListResponse> {
    let revisions = state.repository.list_revisions().await?;
    let total = revisions.len();
    Ok(Json(RevisionListResponse { revisions, total }))
}

/// GET /v1/revisions/{revision_id}
pub async fn get_revision(
    State(state): State<AppState>,
    Path(revision_id): Path<i64>,
) -> HandlerResult<ScheduleRevision> {
    state
        .repository
        .get_revision(RevisionId::new(revision_id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Revision {} not found", revision_id)))
}

/// POST /v1/revisions/{revision_id}/verify
///
/// Run the pipeline through validation. Input and validation failures are
/// reported in the body with `success: false`.
pub async fn verify_revision(
    State(state): State<AppState>,
    Path(revision_id): Path<i64>,
    Json(request): Json<VerifyRequest>,
) -> HandlerResult<VerifyResponse> {
    let result = state
        .pipeline
        .verify_organized_columns(RevisionId::new(revision_id), &request.columns)
        .await;

    let response = match result {
        Ok(rows) => VerifyResponse {
            success: true,
            row_count: rows.len(),
            ..Default::default()
        },
        Err(IngestError::RowValidation(err)) => VerifyResponse {
            row: Some(err.row),
            message: Some(err.to_string()),
            errors: err.errors,
            ..Default::default()
        },
        Err(
            err @ (IngestError::InputAbsent { .. }
            | IngestError::SheetEmpty
            | IngestError::SheetUnreadable(_)),
        ) => VerifyResponse {
            message: Some(err.to_string()),
            ..Default::default()
        },
        Err(err) => return Err(err.into()),
    };

    Ok(Json(response))
}

/// POST /v1/revisions/{revision_id}/commit
///
/// Run the full pipeline and commit the revision as a new schedule.
pub async fn commit_revision(
    State(state): State<AppState>,
    Path(revision_id): Path<i64>,
    Json(request): Json<CommitRequest>,
) -> CreatedResult<CommitReceipt> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Schedule name must not be empty".into()));
    }

    let receipt = state
        .pipeline
        .create_schedule_revision(RevisionId::new(revision_id), &request.columns, name)
        .await?;
    created(receipt)
}

/// GET /v1/revisions/{revision_id}/courses
///
/// Courses of a committed revision with their guideline conformance.
pub async fn list_revision_courses(
    State(state): State<AppState>,
    Path(revision_id): Path<i64>,
) -> HandlerResult<CourseListResponse> {
    let revision_id = RevisionId::new(revision_id);
    if state.repository.get_revision(revision_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Revision {} not found", revision_id)));
    }

    let courses = state
        .matcher
        .courses_with_conformance(state.repository.as_ref(), revision_id)
        .await?;
    Ok(Json(courses.into()))
}

/// GET /v1/schedules
///
/// List all committed schedules.
pub async fn list_schedules(State(state): State<AppState>) -> HandlerResult<ScheduleListResponse> {
    let schedules = state.repository.list_schedules().await?;
    let total = schedules.len();
    Ok(Json(ScheduleListResponse { schedules, total }))
}

// =============================================================================
// Guidelines
// =============================================================================

/// POST /v1/guidelines
pub async fn create_guideline(
    State(state): State<AppState>,
    Json(guideline): Json<NewGuideline>,
) -> CreatedResult<GuidelineView> {
    if let Some(index) = guideline.days.iter().position(|d| d.is_empty()) {
        return Err(AppError::BadRequest(format!(
            "Day record {} has no day set",
            index
        )));
    }

    let stored = state.repository.create_guideline(&guideline).await?;
    created(GuidelineView::from(&stored))
}

/// GET /v1/guidelines
pub async fn search_guidelines_handler(
    State(state): State<AppState>,
    Query(query): Query<GuidelineQuery>,
) -> HandlerResult<GuidelinePage> {
    let page = search_guidelines(state.repository.as_ref(), &query, state.page_size).await?;
    Ok(Json(page))
}

/// GET /v1/guidelines/{guideline_id}
pub async fn get_guideline(
    State(state): State<AppState>,
    Path(guideline_id): Path<i64>,
) -> HandlerResult<GuidelineView> {
    let guideline = state
        .repository
        .get_guideline(GuidelineId::new(guideline_id))
        .await?;
    Ok(Json(GuidelineView::from(&guideline)))
}

/// DELETE /v1/guidelines/{guideline_id}
pub async fn delete_guideline(
    State(state): State<AppState>,
    Path(guideline_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state
        .repository
        .delete_guideline(GuidelineId::new(guideline_id))
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "Guideline {} not found",
            guideline_id
        )))
    }
}

// =============================================================================
// Reference data (passthrough persistence)
// =============================================================================

/// POST /v1/campuses
pub async fn create_campus(
    State(state): State<AppState>,
    Json(campus): Json<NewCampus>,
) -> CreatedResult<Campus> {
    created(state.repository.create_campus(&campus).await?)
}

/// POST /v1/departments
pub async fn create_department(
    State(state): State<AppState>,
    Json(department): Json<NewDepartment>,
) -> CreatedResult<Department> {
    created(state.repository.create_department(&department).await?)
}

/// POST /v1/buildings
pub async fn create_building(
    State(state): State<AppState>,
    Json(building): Json<NewBuilding>,
) -> CreatedResult<Building> {
    created(state.repository.create_building(&building).await?)
}

/// GET /v1/buildings
pub async fn list_buildings(State(state): State<AppState>) -> HandlerResult<BuildingListResponse> {
    let buildings = state.repository.list_buildings().await?;
    let total = buildings.len();
    Ok(Json(BuildingListResponse { buildings, total }))
}

/// POST /v1/faculty
pub async fn create_faculty(
    State(state): State<AppState>,
    Json(faculty): Json<NewFaculty>,
) -> CreatedResult<Faculty> {
    created(state.repository.create_faculty(&faculty).await?)
}

/// GET /v1/faculty
pub async fn list_faculty(State(state): State<AppState>) -> HandlerResult<FacultyListResponse> {
    let faculty = state.repository.list_faculty().await?;
    let total = faculty.len();
    Ok(Json(FacultyListResponse { faculty, total }))
}
