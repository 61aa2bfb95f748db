//! Reference data the ingestion resolver reads from.
//!
//! Creation is plain passthrough persistence; the two `find_*` lookups are
//! the only operations with matching semantics.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{
    Building, Campus, Department, Faculty, NewBuilding, NewCampus, NewDepartment, NewFaculty,
};

#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    async fn create_campus(&self, campus: &NewCampus) -> RepositoryResult<Campus>;

    async fn create_department(&self, department: &NewDepartment) -> RepositoryResult<Department>;

    async fn create_building(&self, building: &NewBuilding) -> RepositoryResult<Building>;

    async fn create_faculty(&self, faculty: &NewFaculty) -> RepositoryResult<Faculty>;

    async fn list_buildings(&self) -> RepositoryResult<Vec<Building>>;

    async fn list_faculty(&self) -> RepositoryResult<Vec<Faculty>>;

    /// Look up a building by its exact prefix (case-sensitive).
    ///
    /// # Returns
    /// * `Ok(None)` - No building has this prefix; this is not an error
    async fn find_building_by_prefix(&self, prefix: &str) -> RepositoryResult<Option<Building>>;

    /// Look up a faculty member by name, ignoring ASCII case.
    ///
    /// # Returns
    /// * `Ok(None)` - No faculty member has this name; this is not an error
    async fn find_faculty_by_name(&self, name: &str) -> RepositoryResult<Option<Faculty>>;
}
