//! Guideline repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{Guideline, GuidelineId, NewGuideline, SemesterFlags};

#[async_trait]
pub trait GuidelineRepository: Send + Sync {
    async fn create_guideline(&self, guideline: &NewGuideline) -> RepositoryResult<Guideline>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the guideline doesn't exist
    async fn get_guideline(&self, guideline_id: GuidelineId) -> RepositoryResult<Guideline>;

    /// Delete a guideline and its day and time records.
    ///
    /// # Returns
    /// * `Ok(false)` - If nothing was deleted
    async fn delete_guideline(&self, guideline_id: GuidelineId) -> RepositoryResult<bool>;

    /// All guidelines ordered by id.
    async fn list_guidelines(&self) -> RepositoryResult<Vec<Guideline>>;

    /// Guidelines that apply to every semester flagged in `semesters`,
    /// ordered by id. A course flagged for no semester matches nothing.
    async fn guidelines_for_semesters(
        &self,
        semesters: SemesterFlags,
    ) -> RepositoryResult<Vec<Guideline>>;
}
