//! Core schedule repository trait.
//!
//! Covers the revision lifecycle (upload, lookup, commit) and read access to
//! the schedules and courses a commit produces.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{
    CommitReceipt, Course, CourseId, IngestionBatch, RevisionId, Schedule, ScheduleRevision,
};

/// Repository trait for schedule revisions and their courses.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the database connection is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Revisions ====================

    /// Store an uploaded spreadsheet as a new onboarding revision.
    ///
    /// # Arguments
    /// * `name` - Display name of the upload
    /// * `spreadsheet` - Raw workbook bytes, stored verbatim
    ///
    /// # Returns
    /// * `Ok(ScheduleRevision)` - The revision with its assigned id and checksum
    async fn upload_revision(
        &self,
        name: &str,
        spreadsheet: &[u8],
    ) -> RepositoryResult<ScheduleRevision>;

    /// # Returns
    /// * `Ok(None)` - If no revision has this id
    async fn get_revision(&self, revision_id: RevisionId)
        -> RepositoryResult<Option<ScheduleRevision>>;

    async fn list_revisions(&self) -> RepositoryResult<Vec<ScheduleRevision>>;

    /// Load the spreadsheet bytes stored with a revision.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the revision doesn't exist
    async fn load_revision_sheet(&self, revision_id: RevisionId) -> RepositoryResult<Vec<u8>>;

    // ==================== Commit ====================

    /// Atomically commit an ingestion batch.
    ///
    /// In one transaction: create a schedule named `batch.schedule_name`,
    /// link the revision to it, rename the revision, clear its onboarding
    /// flag, and insert every course with its faculty links, locations,
    /// rooms and notes. Either all of it becomes visible or none of it does.
    ///
    /// # Returns
    /// * `Ok(CommitReceipt)` - Ids of everything created
    /// * `Err(RepositoryError::ConflictError)` - The revision is missing or
    ///   no longer onboarding when the transaction tries to claim it
    /// * `Err(RepositoryError)` - Any other failure; nothing was written
    async fn commit_batch(&self, batch: &IngestionBatch) -> RepositoryResult<CommitReceipt>;

    // ==================== Schedules & Courses ====================

    async fn list_schedules(&self) -> RepositoryResult<Vec<Schedule>>;

    /// All courses committed under a revision, in row order.
    async fn list_courses(&self, revision_id: RevisionId) -> RepositoryResult<Vec<Course>>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the course doesn't exist
    async fn get_course(&self, course_id: CourseId) -> RepositoryResult<Course>;
}
