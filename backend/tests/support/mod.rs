#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use course_sched::api::{
    DayPattern, Guideline, MilitaryTime, NewBuilding, NewFaculty, NewGuideline, RevisionId,
    Semester, SemesterFlags, TimeWindow,
};
use course_sched::db::repositories::LocalRepository;
use course_sched::db::{GuidelineRepository, ReferenceRepository, ScheduleRepository};
use course_sched::ingest::{
    ColumnMapping, CourseField, IngestionPipeline, RawSheet, SheetError, WorkbookDecoder,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Spreadsheet fixtures
// =============================================================================

/// Decodes uploads written by [`sheet_bytes`]: a JSON array of rows.
///
/// An empty array stands in for a workbook without sheets.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSheetDecoder;

impl WorkbookDecoder for JsonSheetDecoder {
    fn first_sheet(&self, bytes: &[u8]) -> Result<Option<RawSheet>, SheetError> {
        let rows: Vec<Vec<Option<String>>> =
            serde_json::from_slice(bytes).map_err(|e| SheetError::Open(e.to_string()))?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(RawSheet::new(rows)))
    }
}

pub fn sheet_bytes(rows: &[Vec<Option<String>>]) -> Vec<u8> {
    serde_json::to_vec(rows).unwrap()
}

/// Header row naming every field in [`CourseField::ALL`] order.
pub fn header_row() -> Vec<Option<String>> {
    CourseField::ALL
        .iter()
        .map(|field| Some(field.name().to_string()))
        .collect()
}

/// Maps every field to its position in [`CourseField::ALL`].
pub fn full_mapping() -> ColumnMapping {
    CourseField::ALL
        .iter()
        .enumerate()
        .map(|(column, field)| (*field, column))
        .collect()
}

/// A data row that passes validation with default rules.
pub struct CourseRow {
    pub section_id: String,
    pub term: String,
    pub department: String,
    pub credits: String,
    pub capacity: String,
    pub faculty: String,
    pub building: String,
    pub room: String,
    pub start_time: String,
    pub end_time: String,
    pub days: String,
}

impl CourseRow {
    pub fn new(section_id: &str) -> Self {
        Self {
            section_id: section_id.to_string(),
            term: "2024/FA".to_string(),
            department: "CS".to_string(),
            credits: "3".to_string(),
            capacity: "30".to_string(),
            faculty: "Ada Lovelace".to_string(),
            building: "SCI".to_string(),
            room: "101".to_string(),
            start_time: "9:00".to_string(),
            end_time: "9:50".to_string(),
            days: "MWF".to_string(),
        }
    }

    pub fn credits(mut self, credits: &str) -> Self {
        self.credits = credits.to_string();
        self
    }

    pub fn building(mut self, building: &str) -> Self {
        self.building = building.to_string();
        self
    }

    pub fn days(mut self, days: &str) -> Self {
        self.days = days.to_string();
        self
    }

    pub fn into_cells(self) -> Vec<Option<String>> {
        CourseField::ALL
            .iter()
            .map(|field| {
                let value = match field {
                    CourseField::SectionId => self.section_id.clone(),
                    CourseField::Term => self.term.clone(),
                    CourseField::Division => "UG".to_string(),
                    CourseField::Department => self.department.clone(),
                    CourseField::Subject => "CS".to_string(),
                    CourseField::CourseNumber => "101".to_string(),
                    CourseField::Section => "1".to_string(),
                    CourseField::Title => "Intro to Computing".to_string(),
                    CourseField::InstructionMethod => "LEC".to_string(),
                    CourseField::Faculty => self.faculty.clone(),
                    CourseField::Campus => "Main".to_string(),
                    CourseField::Credits => self.credits.clone(),
                    CourseField::Capacity => self.capacity.clone(),
                    CourseField::StartDate => "2024-08-26".to_string(),
                    CourseField::EndDate => "2024-12-13".to_string(),
                    CourseField::Building => self.building.clone(),
                    CourseField::Room => self.room.clone(),
                    CourseField::StartTime => self.start_time.clone(),
                    CourseField::EndTime => self.end_time.clone(),
                    CourseField::Days => self.days.clone(),
                    CourseField::NoteAcademicAffairs => "approved".to_string(),
                    CourseField::NotePrintedComments => "bring laptop".to_string(),
                    CourseField::NoteWhatHasChanged => "new room".to_string(),
                };
                Some(value)
            })
            .collect()
    }
}

/// Header plus one row per entry.
pub fn course_sheet(rows: Vec<CourseRow>) -> Vec<Vec<Option<String>>> {
    std::iter::once(header_row())
        .chain(rows.into_iter().map(CourseRow::into_cells))
        .collect()
}

// =============================================================================
// Repository fixtures
// =============================================================================

/// Local repository seeded with building `SCI` and faculty `Ada Lovelace`.
pub async fn seeded_repository() -> Arc<LocalRepository> {
    let repo = Arc::new(LocalRepository::new());
    repo.create_building(&NewBuilding {
        campus_id: None,
        prefix: "SCI".to_string(),
        name: "Science Hall".to_string(),
    })
    .await
    .unwrap();
    repo.create_faculty(&NewFaculty {
        name: "Ada Lovelace".to_string(),
        department_id: None,
    })
    .await
    .unwrap();
    repo
}

pub async fn upload(repo: &LocalRepository, rows: &[Vec<Option<String>>]) -> RevisionId {
    repo.upload_revision("fall upload", &sheet_bytes(rows))
        .await
        .unwrap()
        .id
}

pub fn pipeline(repo: &Arc<LocalRepository>) -> IngestionPipeline {
    IngestionPipeline::new(repo.clone()).with_decoder(Arc::new(JsonSheetDecoder))
}

/// Fall, 3 credits, MWF 9:00-9:50.
pub fn mwf_guideline() -> NewGuideline {
    NewGuideline {
        semesters: SemesterFlags::only(Semester::Fall),
        credits: 3,
        meeting_amount: 3,
        days: vec![DayPattern::parse("MWF")],
        times: vec![TimeWindow::new(MilitaryTime::new(900), MilitaryTime::new(950))],
    }
}

pub async fn store_guideline(repo: &LocalRepository, guideline: NewGuideline) -> Guideline {
    repo.create_guideline(&guideline).await.unwrap()
}
