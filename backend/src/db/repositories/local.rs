//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! ordered maps behind a single `RwLock`, giving fast, deterministic and
//! isolated execution.
//!
//! Commits stage every course in a scratch buffer before touching shared
//! state, so a failure part-way through a batch leaves nothing behind.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::*;
use crate::db::checksum::calculate_checksum;
use crate::db::repository::*;

/// In-memory local repository.
///
/// # Example
/// ```
/// use course_sched::db::repositories::LocalRepository;
/// use course_sched::db::repository::ScheduleRepository;
///
/// # tokio_test_block_on(async {
/// let repo = LocalRepository::new();
/// let revision = repo.upload_revision("Fall upload", b"bytes").await.unwrap();
/// assert!(revision.onboarding);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct StoredRevision {
    revision: ScheduleRevision,
    spreadsheet: Arc<Vec<u8>>,
}

struct LocalData {
    campuses: BTreeMap<CampusId, Campus>,
    departments: BTreeMap<DepartmentId, Department>,
    buildings: BTreeMap<BuildingId, Building>,
    faculty: BTreeMap<FacultyId, Faculty>,
    schedules: BTreeMap<ScheduleId, Schedule>,
    revisions: BTreeMap<RevisionId, StoredRevision>,
    courses: BTreeMap<CourseId, Course>,
    guidelines: BTreeMap<GuidelineId, Guideline>,

    // ID counters
    next_id: i64,

    // Connection health
    is_healthy: bool,

    /// Index within the next committed batch whose insert should fail.
    fail_course_insert_at: Option<usize>,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            campuses: BTreeMap::new(),
            departments: BTreeMap::new(),
            buildings: BTreeMap::new(),
            faculty: BTreeMap::new(),
            schedules: BTreeMap::new(),
            revisions: BTreeMap::new(),
            courses: BTreeMap::new(),
            guidelines: BTreeMap::new(),
            next_id: 1,
            is_healthy: true,
            fail_course_insert_at: None,
        }
    }
}

impl LocalData {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Make the course at `index` of the next committed batch fail to insert.
    ///
    /// The injected failure fires once; the commit is rolled back as a whole.
    pub fn inject_course_insert_failure(&self, index: usize) {
        self.data.write().fail_course_insert_at = Some(index);
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let is_healthy = data.is_healthy;
        *data = LocalData {
            is_healthy,
            ..Default::default()
        };
    }

    pub fn schedule_count(&self) -> usize {
        self.data.read().schedules.len()
    }

    pub fn course_count(&self) -> usize {
        self.data.read().courses.len()
    }

    /// Number of revisions that have left the onboarding state.
    pub fn committed_revision_count(&self) -> usize {
        self.data
            .read()
            .revisions
            .values()
            .filter(|stored| !stored.revision.onboarding)
            .count()
    }

    fn ensure_healthy(data: &LocalData, operation: &str) -> RepositoryResult<()> {
        if data.is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "local repository marked unhealthy",
                ErrorContext::new(operation),
            ))
        }
    }
}

#[async_trait]
impl ReferenceRepository for LocalRepository {
    async fn create_campus(&self, campus: &NewCampus) -> RepositoryResult<Campus> {
        let mut data = self.data.write();
        Self::ensure_healthy(&data, "create_campus")?;
        let created = Campus {
            id: CampusId(data.allocate_id()),
            name: campus.name.clone(),
        };
        data.campuses.insert(created.id, created.clone());
        Ok(created)
    }

    async fn create_department(&self, department: &NewDepartment) -> RepositoryResult<Department> {
        let mut data = self.data.write();
        Self::ensure_healthy(&data, "create_department")?;
        let created = Department {
            id: DepartmentId(data.allocate_id()),
            name: department.name.clone(),
        };
        data.departments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn create_building(&self, building: &NewBuilding) -> RepositoryResult<Building> {
        let mut data = self.data.write();
        Self::ensure_healthy(&data, "create_building")?;
        if let Some(campus_id) = building.campus_id {
            if !data.campuses.contains_key(&campus_id) {
                return Err(RepositoryError::not_found_with_context(
                    "campus does not exist",
                    ErrorContext::new("create_building")
                        .with_entity("campus")
                        .with_entity_id(campus_id),
                ));
            }
        }
        let created = Building {
            id: BuildingId(data.allocate_id()),
            campus_id: building.campus_id,
            prefix: building.prefix.clone(),
            name: building.name.clone(),
        };
        data.buildings.insert(created.id, created.clone());
        Ok(created)
    }

    async fn create_faculty(&self, faculty: &NewFaculty) -> RepositoryResult<Faculty> {
        let mut data = self.data.write();
        Self::ensure_healthy(&data, "create_faculty")?;
        if let Some(department_id) = faculty.department_id {
            if !data.departments.contains_key(&department_id) {
                return Err(RepositoryError::not_found_with_context(
                    "department does not exist",
                    ErrorContext::new("create_faculty")
                        .with_entity("department")
                        .with_entity_id(department_id),
                ));
            }
        }
        let created = Faculty {
            id: FacultyId(data.allocate_id()),
            name: faculty.name.clone(),
            department_id: faculty.department_id,
        };
        data.faculty.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_buildings(&self) -> RepositoryResult<Vec<Building>> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "list_buildings")?;
        Ok(data.buildings.values().cloned().collect())
    }

    async fn list_faculty(&self) -> RepositoryResult<Vec<Faculty>> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "list_faculty")?;
        Ok(data.faculty.values().cloned().collect())
    }

    async fn find_building_by_prefix(&self, prefix: &str) -> RepositoryResult<Option<Building>> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "find_building_by_prefix")?;
        Ok(data
            .buildings
            .values()
            .find(|building| building.prefix == prefix)
            .cloned())
    }

    async fn find_faculty_by_name(&self, name: &str) -> RepositoryResult<Option<Faculty>> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "find_faculty_by_name")?;
        let folded = Faculty::fold_name(name);
        Ok(data
            .faculty
            .values()
            .find(|faculty| Faculty::fold_name(&faculty.name) == folded)
            .cloned())
    }
}

#[async_trait]
impl ScheduleRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn upload_revision(
        &self,
        name: &str,
        spreadsheet: &[u8],
    ) -> RepositoryResult<ScheduleRevision> {
        let mut data = self.data.write();
        Self::ensure_healthy(&data, "upload_revision")?;
        let revision = ScheduleRevision {
            id: RevisionId(data.allocate_id()),
            name: name.to_string(),
            schedule_id: None,
            onboarding: true,
            checksum: calculate_checksum(spreadsheet),
            uploaded_at: Utc::now(),
        };
        data.revisions.insert(
            revision.id,
            StoredRevision {
                revision: revision.clone(),
                spreadsheet: Arc::new(spreadsheet.to_vec()),
            },
        );
        Ok(revision)
    }

    async fn get_revision(
        &self,
        revision_id: RevisionId,
    ) -> RepositoryResult<Option<ScheduleRevision>> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "get_revision")?;
        Ok(data
            .revisions
            .get(&revision_id)
            .map(|stored| stored.revision.clone()))
    }

    async fn list_revisions(&self) -> RepositoryResult<Vec<ScheduleRevision>> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "list_revisions")?;
        Ok(data
            .revisions
            .values()
            .map(|stored| stored.revision.clone())
            .collect())
    }

    async fn load_revision_sheet(&self, revision_id: RevisionId) -> RepositoryResult<Vec<u8>> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "load_revision_sheet")?;
        data.revisions
            .get(&revision_id)
            .map(|stored| stored.spreadsheet.as_ref().clone())
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "revision not found",
                    ErrorContext::new("load_revision_sheet")
                        .with_entity("revision")
                        .with_entity_id(revision_id),
                )
            })
    }

    async fn commit_batch(&self, batch: &IngestionBatch) -> RepositoryResult<CommitReceipt> {
        let mut data = self.data.write();
        Self::ensure_healthy(&data, "commit_batch")?;

        let context = || {
            ErrorContext::new("commit_batch")
                .with_entity("revision")
                .with_entity_id(batch.revision_id)
        };

        // Claim the revision: it must still be onboarding under this lock.
        match data.revisions.get(&batch.revision_id) {
            Some(stored) if stored.revision.onboarding => {}
            Some(_) => {
                return Err(RepositoryError::conflict_with_context(
                    "revision is no longer onboarding",
                    context(),
                ))
            }
            None => {
                return Err(RepositoryError::conflict_with_context(
                    "revision does not exist",
                    context(),
                ))
            }
        }

        // Stage everything against a private id counter.
        let fail_at = data.fail_course_insert_at.take();
        let mut next_id = data.next_id;
        let mut allocate = || {
            let id = next_id;
            next_id += 1;
            id
        };

        let schedule = Schedule {
            id: ScheduleId(allocate()),
            name: batch.schedule_name.clone(),
            created_at: Utc::now(),
        };

        let mut staged = Vec::with_capacity(batch.courses.len());
        for (index, row) in batch.courses.iter().enumerate() {
            if fail_at == Some(index) {
                return Err(RepositoryError::transaction_with_context(
                    "course insert failed",
                    context().with_details(format!("row_index={}", index)),
                ));
            }
            staged.push(Course {
                id: CourseId(allocate()),
                revision_id: batch.revision_id,
                row: row.clone(),
            });
        }

        // Commit gate: nothing above touched shared state.
        data.next_id = next_id;
        if let Some(stored) = data.revisions.get_mut(&batch.revision_id) {
            stored.revision.onboarding = false;
            stored.revision.schedule_id = Some(schedule.id);
            stored.revision.name = batch.schedule_name.clone();
        }
        let course_ids: Vec<CourseId> = staged.iter().map(|course| course.id).collect();
        for course in staged {
            data.courses.insert(course.id, course);
        }
        let schedule_id = schedule.id;
        data.schedules.insert(schedule_id, schedule);

        Ok(CommitReceipt {
            schedule_id,
            revision_id: batch.revision_id,
            course_ids,
        })
    }

    async fn list_schedules(&self) -> RepositoryResult<Vec<Schedule>> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "list_schedules")?;
        Ok(data.schedules.values().cloned().collect())
    }

    async fn list_courses(&self, revision_id: RevisionId) -> RepositoryResult<Vec<Course>> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "list_courses")?;
        Ok(data
            .courses
            .values()
            .filter(|course| course.revision_id == revision_id)
            .cloned()
            .collect())
    }

    async fn get_course(&self, course_id: CourseId) -> RepositoryResult<Course> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "get_course")?;
        data.courses.get(&course_id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "course not found",
                ErrorContext::new("get_course")
                    .with_entity("course")
                    .with_entity_id(course_id),
            )
        })
    }
}

#[async_trait]
impl GuidelineRepository for LocalRepository {
    async fn create_guideline(&self, guideline: &NewGuideline) -> RepositoryResult<Guideline> {
        let mut data = self.data.write();
        Self::ensure_healthy(&data, "create_guideline")?;
        let created = Guideline::from_new(GuidelineId(data.allocate_id()), guideline.clone());
        data.guidelines.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_guideline(&self, guideline_id: GuidelineId) -> RepositoryResult<Guideline> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "get_guideline")?;
        data.guidelines.get(&guideline_id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "guideline not found",
                ErrorContext::new("get_guideline")
                    .with_entity("guideline")
                    .with_entity_id(guideline_id),
            )
        })
    }

    async fn delete_guideline(&self, guideline_id: GuidelineId) -> RepositoryResult<bool> {
        let mut data = self.data.write();
        Self::ensure_healthy(&data, "delete_guideline")?;
        Ok(data.guidelines.remove(&guideline_id).is_some())
    }

    async fn list_guidelines(&self) -> RepositoryResult<Vec<Guideline>> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "list_guidelines")?;
        Ok(data.guidelines.values().cloned().collect())
    }

    async fn guidelines_for_semesters(
        &self,
        semesters: SemesterFlags,
    ) -> RepositoryResult<Vec<Guideline>> {
        let data = self.data.read();
        Self::ensure_healthy(&data, "guidelines_for_semesters")?;
        if !semesters.any() {
            return Ok(Vec::new());
        }
        Ok(data
            .guidelines
            .values()
            .filter(|guideline| guideline.semesters.covers(&semesters))
            .cloned()
            .collect())
    }
}
