use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::{
    buildings, campuses, course_faculty, course_locations, course_notes, courses, departments,
    faculty, guideline_days, guideline_times, guidelines, schedule_revisions, schedules,
};
use crate::api::{DayPattern, SemesterFlags};

// ==================== Reference data ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = campuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CampusRow {
    pub campus_id: i64,
    pub campus_name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = campuses)]
pub struct NewCampusRow {
    pub campus_name: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = departments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DepartmentRow {
    pub department_id: i64,
    pub department_name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = departments)]
pub struct NewDepartmentRow {
    pub department_name: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = buildings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BuildingRow {
    pub building_id: i64,
    pub campus_id: Option<i64>,
    pub prefix: String,
    pub building_name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = buildings)]
pub struct NewBuildingRow {
    pub campus_id: Option<i64>,
    pub prefix: String,
    pub building_name: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = faculty)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FacultyRow {
    pub faculty_id: i64,
    pub faculty_name: String,
    pub department_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = faculty)]
pub struct NewFacultyRow {
    pub faculty_name: String,
    pub department_id: Option<i64>,
}

// ==================== Schedules & revisions ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ScheduleRow {
    pub schedule_id: i64,
    pub schedule_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schedules)]
pub struct NewScheduleRow {
    pub schedule_name: String,
}

/// Revision metadata without the stored spreadsheet.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schedule_revisions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RevisionRow {
    pub revision_id: i64,
    pub revision_name: String,
    pub schedule_id: Option<i64>,
    pub onboarding: bool,
    pub checksum: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schedule_revisions)]
pub struct NewRevisionRow {
    pub revision_name: String,
    pub onboarding: bool,
    pub checksum: String,
    pub spreadsheet: Vec<u8>,
}

// ==================== Courses ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // Some fields used only for database operations
pub struct CourseRow {
    pub course_id: i64,
    pub revision_id: i64,
    pub row_index: i32,
    pub section_id: String,
    pub term_year: i32,
    pub semester_summer: bool,
    pub semester_fall: bool,
    pub semester_winter: bool,
    pub semester_spring: bool,
    pub division: String,
    pub department: String,
    pub subject: String,
    pub course_number: String,
    pub section: i32,
    pub title: String,
    pub instruction_method: String,
    pub campus: String,
    pub credits: i32,
    pub capacity: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl CourseRow {
    pub fn semesters(&self) -> SemesterFlags {
        SemesterFlags {
            summer: self.semester_summer,
            fall: self.semester_fall,
            winter: self.semester_winter,
            spring: self.semester_spring,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub struct NewCourseRow {
    pub revision_id: i64,
    pub row_index: i32,
    pub section_id: String,
    pub term_year: i32,
    pub semester_summer: bool,
    pub semester_fall: bool,
    pub semester_winter: bool,
    pub semester_spring: bool,
    pub division: String,
    pub department: String,
    pub subject: String,
    pub course_number: String,
    pub section: i32,
    pub title: String,
    pub instruction_method: String,
    pub campus: String,
    pub credits: i32,
    pub capacity: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = course_faculty)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // Some fields used only for database operations
pub struct CourseFacultyRow {
    pub course_faculty_id: i64,
    pub course_id: i64,
    pub position: i32,
    pub faculty_id: Option<i64>,
    pub faculty_text: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = course_faculty)]
pub struct NewCourseFacultyRow {
    pub course_id: i64,
    pub position: i32,
    pub faculty_id: Option<i64>,
    pub faculty_text: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = course_locations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // Some fields used only for database operations
pub struct CourseLocationRow {
    pub location_id: i64,
    pub course_id: i64,
    pub position: i32,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub start_time: i32,
    pub end_time: i32,
    pub online: bool,
    pub rooms_json: Value,
}

impl CourseLocationRow {
    pub fn days(&self) -> DayPattern {
        DayPattern::from_flags([
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ])
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = course_locations)]
pub struct NewCourseLocationRow {
    pub course_id: i64,
    pub position: i32,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub start_time: i32,
    pub end_time: i32,
    pub online: bool,
    pub rooms_json: Value,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = course_notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // Some fields used only for database operations
pub struct CourseNoteRow {
    pub note_id: i64,
    pub course_id: i64,
    pub position: i32,
    pub note_kind: String,
    pub note_text: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = course_notes)]
pub struct NewCourseNoteRow {
    pub course_id: i64,
    pub position: i32,
    pub note_kind: String,
    pub note_text: String,
}

// ==================== Guidelines ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = guidelines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GuidelineRow {
    pub guideline_id: i64,
    pub semester_summer: bool,
    pub semester_fall: bool,
    pub semester_winter: bool,
    pub semester_spring: bool,
    pub credits: i32,
    pub meeting_amount: i32,
}

impl GuidelineRow {
    pub fn semesters(&self) -> SemesterFlags {
        SemesterFlags {
            summer: self.semester_summer,
            fall: self.semester_fall,
            winter: self.semester_winter,
            spring: self.semester_spring,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = guidelines)]
pub struct NewGuidelineRow {
    pub semester_summer: bool,
    pub semester_fall: bool,
    pub semester_winter: bool,
    pub semester_spring: bool,
    pub credits: i32,
    pub meeting_amount: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = guideline_days)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // Some fields used only for database operations
pub struct GuidelineDayRow {
    pub guideline_day_id: i64,
    pub guideline_id: i64,
    pub position: i32,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl GuidelineDayRow {
    pub fn days(&self) -> DayPattern {
        DayPattern::from_flags([
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ])
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = guideline_days)]
pub struct NewGuidelineDayRow {
    pub guideline_id: i64,
    pub position: i32,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = guideline_times)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // Some fields used only for database operations
pub struct GuidelineTimeRow {
    pub guideline_time_id: i64,
    pub guideline_id: i64,
    pub position: i32,
    pub start_time: i32,
    pub end_time: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = guideline_times)]
pub struct NewGuidelineTimeRow {
    pub guideline_id: i64,
    pub position: i32,
    pub start_time: i32,
    pub end_time: i32,
}
