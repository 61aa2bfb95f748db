//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures on reads and simple inserts
//! - A single-attempt transactional commit for ingestion batches
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::collections::HashMap;
use std::time::Duration;
use tokio::task;

use crate::api::*;
use crate::db::checksum::calculate_checksum;
use crate::db::repository::{
    ErrorContext, GuidelineRepository, ReferenceRepository, RepositoryError, RepositoryResult,
    ScheduleRepository,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

diesel::define_sql_function!(fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text);

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
    /// - `PG_POOL_MAX`, `PG_POOL_MIN`, `PG_CONN_TIMEOUT_SEC`,
    ///   `PG_IDLE_TIMEOUT_SEC`, `PG_MAX_RETRIES`, `PG_RETRY_DELAY_MS`
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Open the pool and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        let mut conn = pool.get().map_err(|e| {
            RepositoryError::connection_with_context(
                e.to_string(),
                ErrorContext::new("get_connection_for_migrations"),
            )
        })?;
        Self::run_migrations(&mut conn)?;
        drop(conn);

        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Run a read or single-statement write, retrying retryable failures
    /// with a doubling delay.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        task::spawn_blocking(move || {
            let mut attempt = 0;
            loop {
                let result = pool
                    .get()
                    .map_err(|e| {
                        RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        )
                    })
                    .and_then(|mut conn| f.clone()(&mut conn));

                match result {
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::warn!("Retrying after attempt {} failed: {}", attempt + 1, e);
                        attempt += 1;
                        std::thread::sleep(delay);
                        delay *= 2;
                    }
                    other => return other,
                }
            }
        })
        .await
        .map_err(join_error)?
    }

    /// Run an operation exactly once. The ingestion commit uses this so its
    /// failures reach the caller unchanged.
    async fn with_conn_once<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection"),
                )
            })?;
            f(&mut conn)
        })
        .await
        .map_err(join_error)?
    }
}

fn join_error(err: task::JoinError) -> RepositoryError {
    RepositoryError::internal_with_context(
        format!("Task join error: {}", err),
        ErrorContext::new("spawn_blocking"),
    )
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

// ==================== Row conversions ====================

fn building_from_row(row: BuildingRow) -> Building {
    Building {
        id: BuildingId(row.building_id),
        campus_id: row.campus_id.map(CampusId),
        prefix: row.prefix,
        name: row.building_name,
    }
}

fn faculty_from_row(row: FacultyRow) -> Faculty {
    Faculty {
        id: FacultyId(row.faculty_id),
        name: row.faculty_name,
        department_id: row.department_id.map(DepartmentId),
    }
}

fn revision_from_row(row: RevisionRow) -> ScheduleRevision {
    ScheduleRevision {
        id: RevisionId(row.revision_id),
        name: row.revision_name,
        schedule_id: row.schedule_id.map(ScheduleId),
        onboarding: row.onboarding,
        checksum: row.checksum,
        uploaded_at: row.uploaded_at,
    }
}

fn new_course_row(revision_id: RevisionId, index: usize, row: &CanonicalCourseRow) -> NewCourseRow {
    NewCourseRow {
        revision_id: revision_id.0,
        row_index: index as i32,
        section_id: row.section_id.clone(),
        term_year: row.term.year,
        semester_summer: row.term.semesters.summer,
        semester_fall: row.term.semesters.fall,
        semester_winter: row.term.semesters.winter,
        semester_spring: row.term.semesters.spring,
        division: row.division.clone(),
        department: row.department.clone(),
        subject: row.subject.clone(),
        course_number: row.course_number.clone(),
        section: row.section,
        title: row.title.clone(),
        instruction_method: row.instruction_method.clone(),
        campus: row.campus.clone(),
        credits: row.credits,
        capacity: row.capacity,
        start_date: row.start_date,
        end_date: row.end_date,
    }
}

fn new_location_row(
    course_id: i64,
    position: usize,
    location: &Location,
) -> RepositoryResult<NewCourseLocationRow> {
    let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] = location.days.flags();
    let rooms_json = serde_json::to_value(&location.rooms).map_err(|e| {
        RepositoryError::internal_with_context(
            format!("Failed to serialize rooms: {}", e),
            ErrorContext::new("commit_batch").with_entity("course_location"),
        )
    })?;
    Ok(NewCourseLocationRow {
        course_id,
        position: position as i32,
        monday,
        tuesday,
        wednesday,
        thursday,
        friday,
        saturday,
        sunday,
        start_time: location.start_time.value(),
        end_time: location.end_time.value(),
        online: location.online,
        rooms_json,
    })
}

fn location_from_row(row: &CourseLocationRow) -> RepositoryResult<Location> {
    let rooms: Vec<Room> = serde_json::from_value(row.rooms_json.clone()).map_err(|e| {
        RepositoryError::internal_with_context(
            format!("Failed to parse rooms JSON: {}", e),
            ErrorContext::new("load_courses")
                .with_entity("course_location")
                .with_entity_id(row.location_id),
        )
    })?;
    Ok(Location {
        days: row.days(),
        start_time: MilitaryTime::new(row.start_time),
        end_time: MilitaryTime::new(row.end_time),
        online: row.online,
        rooms,
    })
}

fn group_by_parent<R>(rows: Vec<R>, key: impl Fn(&R) -> i64) -> HashMap<i64, Vec<R>> {
    let mut grouped: HashMap<i64, Vec<R>> = HashMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}

/// Load course rows plus their child collections and assemble `Course`s in
/// the order given.
fn assemble_courses(conn: &mut PgConnection, rows: Vec<CourseRow>) -> RepositoryResult<Vec<Course>> {
    let ids: Vec<i64> = rows.iter().map(|row| row.course_id).collect();

    let mut faculty_rows = group_by_parent(
        course_faculty::table
            .filter(course_faculty::course_id.eq_any(&ids))
            .order(course_faculty::position.asc())
            .select(CourseFacultyRow::as_select())
            .load(conn)
            .map_err(map_diesel_error)?,
        |row| row.course_id,
    );
    let mut location_rows = group_by_parent(
        course_locations::table
            .filter(course_locations::course_id.eq_any(&ids))
            .order(course_locations::position.asc())
            .select(CourseLocationRow::as_select())
            .load(conn)
            .map_err(map_diesel_error)?,
        |row| row.course_id,
    );
    let mut note_rows = group_by_parent(
        course_notes::table
            .filter(course_notes::course_id.eq_any(&ids))
            .order(course_notes::position.asc())
            .select(CourseNoteRow::as_select())
            .load(conn)
            .map_err(map_diesel_error)?,
        |row| row.course_id,
    );

    let mut courses = Vec::with_capacity(rows.len());
    for row in rows {
        let faculty = faculty_rows
            .remove(&row.course_id)
            .unwrap_or_default()
            .into_iter()
            .map(|link| FacultyLink {
                faculty: Reference::from_parts(link.faculty_id.map(FacultyId), link.faculty_text),
            })
            .collect();
        let locations = location_rows
            .remove(&row.course_id)
            .unwrap_or_default()
            .iter()
            .map(location_from_row)
            .collect::<RepositoryResult<Vec<_>>>()?;
        let notes = note_rows
            .remove(&row.course_id)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|note| {
                NoteKind::parse(&note.note_kind).map(|kind| Note {
                    kind,
                    text: note.note_text,
                })
            })
            .collect();

        courses.push(Course {
            id: CourseId(row.course_id),
            revision_id: RevisionId(row.revision_id),
            row: CanonicalCourseRow {
                term: Term {
                    year: row.term_year,
                    semesters: row.semesters(),
                },
                section_id: row.section_id,
                division: row.division,
                department: row.department,
                subject: row.subject,
                course_number: row.course_number,
                section: row.section,
                title: row.title,
                instruction_method: row.instruction_method,
                campus: row.campus,
                credits: row.credits,
                capacity: row.capacity,
                start_date: row.start_date,
                end_date: row.end_date,
                locations,
                faculty,
                notes,
            },
        });
    }
    Ok(courses)
}

/// Load guideline rows plus their day and time records.
fn assemble_guidelines(
    conn: &mut PgConnection,
    rows: Vec<GuidelineRow>,
) -> RepositoryResult<Vec<Guideline>> {
    let ids: Vec<i64> = rows.iter().map(|row| row.guideline_id).collect();

    let mut day_rows = group_by_parent(
        guideline_days::table
            .filter(guideline_days::guideline_id.eq_any(&ids))
            .order(guideline_days::position.asc())
            .select(GuidelineDayRow::as_select())
            .load(conn)
            .map_err(map_diesel_error)?,
        |row| row.guideline_id,
    );
    let mut time_rows = group_by_parent(
        guideline_times::table
            .filter(guideline_times::guideline_id.eq_any(&ids))
            .order(guideline_times::position.asc())
            .select(GuidelineTimeRow::as_select())
            .load(conn)
            .map_err(map_diesel_error)?,
        |row| row.guideline_id,
    );

    Ok(rows
        .into_iter()
        .map(|row| Guideline {
            id: GuidelineId(row.guideline_id),
            semesters: row.semesters(),
            credits: row.credits,
            meeting_amount: row.meeting_amount,
            days: day_rows
                .remove(&row.guideline_id)
                .unwrap_or_default()
                .iter()
                .map(GuidelineDayRow::days)
                .collect(),
            times: time_rows
                .remove(&row.guideline_id)
                .unwrap_or_default()
                .iter()
                .map(|t| {
                    TimeWindow::new(MilitaryTime::new(t.start_time), MilitaryTime::new(t.end_time))
                })
                .collect(),
        })
        .collect())
}

// ==================== ReferenceRepository ====================

#[async_trait]
impl ReferenceRepository for PostgresRepository {
    async fn create_campus(&self, campus: &NewCampus) -> RepositoryResult<Campus> {
        let row = NewCampusRow {
            campus_name: campus.name.clone(),
        };
        self.with_conn(move |conn| {
            let inserted: CampusRow = diesel::insert_into(campuses::table)
                .values(&row)
                .returning(CampusRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?;
            Ok(Campus {
                id: CampusId(inserted.campus_id),
                name: inserted.campus_name,
            })
        })
        .await
    }

    async fn create_department(&self, department: &NewDepartment) -> RepositoryResult<Department> {
        let row = NewDepartmentRow {
            department_name: department.name.clone(),
        };
        self.with_conn(move |conn| {
            let inserted: DepartmentRow = diesel::insert_into(departments::table)
                .values(&row)
                .returning(DepartmentRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?;
            Ok(Department {
                id: DepartmentId(inserted.department_id),
                name: inserted.department_name,
            })
        })
        .await
    }

    async fn create_building(&self, building: &NewBuilding) -> RepositoryResult<Building> {
        let row = NewBuildingRow {
            campus_id: building.campus_id.map(i64::from),
            prefix: building.prefix.clone(),
            building_name: building.name.clone(),
        };
        self.with_conn(move |conn| {
            diesel::insert_into(buildings::table)
                .values(&row)
                .returning(BuildingRow::as_returning())
                .get_result(conn)
                .map(building_from_row)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_faculty(&self, faculty_member: &NewFaculty) -> RepositoryResult<Faculty> {
        let row = NewFacultyRow {
            faculty_name: faculty_member.name.clone(),
            department_id: faculty_member.department_id.map(i64::from),
        };
        self.with_conn(move |conn| {
            diesel::insert_into(faculty::table)
                .values(&row)
                .returning(FacultyRow::as_returning())
                .get_result(conn)
                .map(faculty_from_row)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_buildings(&self) -> RepositoryResult<Vec<Building>> {
        self.with_conn(|conn| {
            let rows: Vec<BuildingRow> = buildings::table
                .order(buildings::building_id.asc())
                .select(BuildingRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(building_from_row).collect())
        })
        .await
    }

    async fn list_faculty(&self) -> RepositoryResult<Vec<Faculty>> {
        self.with_conn(|conn| {
            let rows: Vec<FacultyRow> = faculty::table
                .order(faculty::faculty_id.asc())
                .select(FacultyRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(faculty_from_row).collect())
        })
        .await
    }

    async fn find_building_by_prefix(&self, prefix: &str) -> RepositoryResult<Option<Building>> {
        let prefix = prefix.to_string();
        self.with_conn(move |conn| {
            buildings::table
                .filter(buildings::prefix.eq(&prefix))
                .order(buildings::building_id.asc())
                .select(BuildingRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(building_from_row))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_faculty_by_name(&self, name: &str) -> RepositoryResult<Option<Faculty>> {
        let name = Faculty::fold_name(name);
        self.with_conn(move |conn| {
            faculty::table
                .filter(lower(faculty::faculty_name).eq(&name))
                .order(faculty::faculty_id.asc())
                .select(FacultyRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(faculty_from_row))
                .map_err(map_diesel_error)
        })
        .await
    }
}

// ==================== ScheduleRepository ====================

#[async_trait]
impl ScheduleRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn upload_revision(
        &self,
        name: &str,
        spreadsheet: &[u8],
    ) -> RepositoryResult<ScheduleRevision> {
        let row = NewRevisionRow {
            revision_name: name.to_string(),
            onboarding: true,
            checksum: calculate_checksum(spreadsheet),
            spreadsheet: spreadsheet.to_vec(),
        };
        self.with_conn(move |conn| {
            diesel::insert_into(schedule_revisions::table)
                .values(&row)
                .returning(RevisionRow::as_returning())
                .get_result(conn)
                .map(revision_from_row)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_revision(
        &self,
        revision_id: RevisionId,
    ) -> RepositoryResult<Option<ScheduleRevision>> {
        self.with_conn(move |conn| {
            schedule_revisions::table
                .filter(schedule_revisions::revision_id.eq(revision_id.0))
                .select(RevisionRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(revision_from_row))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_revisions(&self) -> RepositoryResult<Vec<ScheduleRevision>> {
        self.with_conn(|conn| {
            let rows: Vec<RevisionRow> = schedule_revisions::table
                .order(schedule_revisions::revision_id.asc())
                .select(RevisionRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(revision_from_row).collect())
        })
        .await
    }

    async fn load_revision_sheet(&self, revision_id: RevisionId) -> RepositoryResult<Vec<u8>> {
        self.with_conn(move |conn| {
            schedule_revisions::table
                .filter(schedule_revisions::revision_id.eq(revision_id.0))
                .select(schedule_revisions::spreadsheet)
                .first::<Vec<u8>>(conn)
                .map_err(|e| {
                    map_diesel_error(e).with_operation("load_revision_sheet")
                })
        })
        .await
    }

    async fn commit_batch(&self, batch: &IngestionBatch) -> RepositoryResult<CommitReceipt> {
        let batch = batch.clone();
        self.with_conn_once(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let schedule: ScheduleRow = diesel::insert_into(schedules::table)
                    .values(&NewScheduleRow {
                        schedule_name: batch.schedule_name.clone(),
                    })
                    .returning(ScheduleRow::as_returning())
                    .get_result(tx)
                    .map_err(map_diesel_error)?;

                // Compare-and-swap on the onboarding flag. A concurrent commit
                // that got here first leaves zero matching rows.
                let claimed = diesel::update(
                    schedule_revisions::table
                        .filter(schedule_revisions::revision_id.eq(batch.revision_id.0))
                        .filter(schedule_revisions::onboarding.eq(true)),
                )
                .set((
                    schedule_revisions::schedule_id.eq(Some(schedule.schedule_id)),
                    schedule_revisions::revision_name.eq(&batch.schedule_name),
                    schedule_revisions::onboarding.eq(false),
                ))
                .execute(tx)
                .map_err(map_diesel_error)?;

                if claimed != 1 {
                    return Err(RepositoryError::conflict_with_context(
                        "revision is missing or no longer onboarding",
                        ErrorContext::new("commit_batch")
                            .with_entity("revision")
                            .with_entity_id(batch.revision_id),
                    ));
                }

                let mut course_ids = Vec::with_capacity(batch.courses.len());
                for (index, row) in batch.courses.iter().enumerate() {
                    let course_id: i64 = diesel::insert_into(courses::table)
                        .values(&new_course_row(batch.revision_id, index, row))
                        .returning(courses::course_id)
                        .get_result(tx)
                        .map_err(|e| {
                            map_diesel_error(e).with_operation("commit_batch.insert_course")
                        })?;

                    let faculty_rows: Vec<NewCourseFacultyRow> = row
                        .faculty
                        .iter()
                        .enumerate()
                        .map(|(position, link)| NewCourseFacultyRow {
                            course_id,
                            position: position as i32,
                            faculty_id: link.faculty.resolved_id().map(i64::from),
                            faculty_text: link.faculty.raw_text().map(str::to_string),
                        })
                        .collect();
                    if !faculty_rows.is_empty() {
                        diesel::insert_into(course_faculty::table)
                            .values(&faculty_rows)
                            .execute(tx)
                            .map_err(map_diesel_error)?;
                    }

                    let location_rows = row
                        .locations
                        .iter()
                        .enumerate()
                        .map(|(position, location)| {
                            new_location_row(course_id, position, location)
                        })
                        .collect::<RepositoryResult<Vec<_>>>()?;
                    if !location_rows.is_empty() {
                        diesel::insert_into(course_locations::table)
                            .values(&location_rows)
                            .execute(tx)
                            .map_err(map_diesel_error)?;
                    }

                    let note_rows: Vec<NewCourseNoteRow> = row
                        .notes
                        .iter()
                        .enumerate()
                        .map(|(position, note)| NewCourseNoteRow {
                            course_id,
                            position: position as i32,
                            note_kind: note.kind.as_str().to_string(),
                            note_text: note.text.clone(),
                        })
                        .collect();
                    if !note_rows.is_empty() {
                        diesel::insert_into(course_notes::table)
                            .values(&note_rows)
                            .execute(tx)
                            .map_err(map_diesel_error)?;
                    }

                    course_ids.push(CourseId(course_id));
                }

                Ok(CommitReceipt {
                    schedule_id: ScheduleId(schedule.schedule_id),
                    revision_id: batch.revision_id,
                    course_ids,
                })
            })
        })
        .await
    }

    async fn list_schedules(&self) -> RepositoryResult<Vec<Schedule>> {
        self.with_conn(|conn| {
            let rows: Vec<ScheduleRow> = schedules::table
                .order(schedules::created_at.desc())
                .select(ScheduleRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            Ok(rows
                .into_iter()
                .map(|row| Schedule {
                    id: ScheduleId(row.schedule_id),
                    name: row.schedule_name,
                    created_at: row.created_at,
                })
                .collect())
        })
        .await
    }

    async fn list_courses(&self, revision_id: RevisionId) -> RepositoryResult<Vec<Course>> {
        self.with_conn(move |conn| {
            let rows: Vec<CourseRow> = courses::table
                .filter(courses::revision_id.eq(revision_id.0))
                .order(courses::row_index.asc())
                .select(CourseRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            assemble_courses(conn, rows)
        })
        .await
    }

    async fn get_course(&self, course_id: CourseId) -> RepositoryResult<Course> {
        self.with_conn(move |conn| {
            let row: CourseRow = courses::table
                .filter(courses::course_id.eq(course_id.0))
                .select(CourseRow::as_select())
                .first(conn)
                .map_err(|e| {
                    map_diesel_error(e).with_operation("get_course")
                })?;
            let mut assembled = assemble_courses(conn, vec![row])?;
            assembled.pop().ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "course not found",
                    ErrorContext::new("get_course")
                        .with_entity("course")
                        .with_entity_id(course_id),
                )
            })
        })
        .await
    }
}

// ==================== GuidelineRepository ====================

#[async_trait]
impl GuidelineRepository for PostgresRepository {
    async fn create_guideline(&self, guideline: &NewGuideline) -> RepositoryResult<Guideline> {
        let guideline = guideline.clone();
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let guideline_id: i64 = diesel::insert_into(guidelines::table)
                    .values(&NewGuidelineRow {
                        semester_summer: guideline.semesters.summer,
                        semester_fall: guideline.semesters.fall,
                        semester_winter: guideline.semesters.winter,
                        semester_spring: guideline.semesters.spring,
                        credits: guideline.credits,
                        meeting_amount: guideline.meeting_amount,
                    })
                    .returning(guidelines::guideline_id)
                    .get_result(tx)
                    .map_err(map_diesel_error)?;

                let day_rows: Vec<NewGuidelineDayRow> = guideline
                    .days
                    .iter()
                    .enumerate()
                    .map(|(position, days)| {
                        let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] =
                            days.flags();
                        NewGuidelineDayRow {
                            guideline_id,
                            position: position as i32,
                            monday,
                            tuesday,
                            wednesday,
                            thursday,
                            friday,
                            saturday,
                            sunday,
                        }
                    })
                    .collect();
                if !day_rows.is_empty() {
                    diesel::insert_into(guideline_days::table)
                        .values(&day_rows)
                        .execute(tx)
                        .map_err(map_diesel_error)?;
                }

                let time_rows: Vec<NewGuidelineTimeRow> = guideline
                    .times
                    .iter()
                    .enumerate()
                    .map(|(position, window)| NewGuidelineTimeRow {
                        guideline_id,
                        position: position as i32,
                        start_time: window.start.value(),
                        end_time: window.end.value(),
                    })
                    .collect();
                if !time_rows.is_empty() {
                    diesel::insert_into(guideline_times::table)
                        .values(&time_rows)
                        .execute(tx)
                        .map_err(map_diesel_error)?;
                }

                Ok(Guideline::from_new(GuidelineId(guideline_id), guideline.clone()))
            })
        })
        .await
    }

    async fn get_guideline(&self, guideline_id: GuidelineId) -> RepositoryResult<Guideline> {
        self.with_conn(move |conn| {
            let row: GuidelineRow = guidelines::table
                .filter(guidelines::guideline_id.eq(guideline_id.0))
                .select(GuidelineRow::as_select())
                .first(conn)
                .map_err(|e| map_diesel_error(e).with_operation("get_guideline"))?;
            let mut assembled = assemble_guidelines(conn, vec![row])?;
            assembled.pop().ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "guideline not found",
                    ErrorContext::new("get_guideline")
                        .with_entity("guideline")
                        .with_entity_id(guideline_id),
                )
            })
        })
        .await
    }

    async fn delete_guideline(&self, guideline_id: GuidelineId) -> RepositoryResult<bool> {
        // Day and time records cascade.
        self.with_conn(move |conn| {
            diesel::delete(guidelines::table.filter(guidelines::guideline_id.eq(guideline_id.0)))
                .execute(conn)
                .map(|deleted| deleted > 0)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_guidelines(&self) -> RepositoryResult<Vec<Guideline>> {
        self.with_conn(|conn| {
            let rows: Vec<GuidelineRow> = guidelines::table
                .order(guidelines::guideline_id.asc())
                .select(GuidelineRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            assemble_guidelines(conn, rows)
        })
        .await
    }

    async fn guidelines_for_semesters(
        &self,
        semesters: SemesterFlags,
    ) -> RepositoryResult<Vec<Guideline>> {
        if !semesters.any() {
            return Ok(Vec::new());
        }
        self.with_conn(move |conn| {
            let mut query = guidelines::table.into_boxed();
            if semesters.summer {
                query = query.filter(guidelines::semester_summer.eq(true));
            }
            if semesters.fall {
                query = query.filter(guidelines::semester_fall.eq(true));
            }
            if semesters.winter {
                query = query.filter(guidelines::semester_winter.eq(true));
            }
            if semesters.spring {
                query = query.filter(guidelines::semester_spring.eq(true));
            }
            let rows: Vec<GuidelineRow> = query
                .order(guidelines::guideline_id.asc())
                .select(GuidelineRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            assemble_guidelines(conn, rows)
        })
        .await
    }
}
