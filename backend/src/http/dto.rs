//! Data Transfer Objects for the HTTP API.
//!
//! Domain records already derive Serialize/Deserialize and are returned as-is;
//! this module holds the request bodies and list envelopes around them.

use serde::{Deserialize, Serialize};

use crate::api::{Building, Faculty, Schedule, ScheduleRevision};
use crate::ingest::{ColumnMapping, FieldError};
use crate::services::CourseConformance;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Query parameters for a spreadsheet upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadQuery {
    /// Revision name, usually the uploaded file name
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionListResponse {
    pub revisions: Vec<ScheduleRevision>,
    pub total: usize,
}

/// Request body for `POST /v1/revisions/{id}/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub columns: ColumnMapping,
}

/// Outcome of a verification run. Failures are reported here rather than
/// as error statuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    /// Number of rows that validated
    pub row_count: usize,
    /// Sheet row of the first rejected row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

/// Request body for `POST /v1/revisions/{id}/commit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRequest {
    pub columns: ColumnMapping,
    /// Name of the schedule created by the commit
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseListResponse {
    pub courses: Vec<CourseConformance>,
    pub total: usize,
    /// Number of courses matching at least one guideline
    pub conforming: usize,
}

impl From<Vec<CourseConformance>> for CourseListResponse {
    fn from(courses: Vec<CourseConformance>) -> Self {
        let conforming = courses.iter().filter(|c| c.conformance.conforms).count();
        Self {
            total: courses.len(),
            conforming,
            courses,
        }
    }
}

/// Schedule list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleListResponse {
    /// List of schedules
    pub schedules: Vec<Schedule>,
    /// Total count
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingListResponse {
    pub buildings: Vec<Building>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacultyListResponse {
    pub faculty: Vec<Faculty>,
    pub total: usize,
}
