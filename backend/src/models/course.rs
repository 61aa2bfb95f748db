//! Course records.
//!
//! A spreadsheet row becomes a [`CourseDraft`] once its columns are mapped and
//! its references resolved. The draft keeps numeric cells as raw text so the
//! validator can report them; a validated draft becomes an immutable
//! [`CanonicalCourseRow`], and a committed row becomes a [`Course`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::days::DayPattern;
use super::term::Term;
use super::time::MilitaryTime;
use crate::api::{BuildingId, CourseId, FacultyId, RevisionId};

/// A reference that either resolved to a stored entity or fell back to the
/// raw spreadsheet text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reference<Id> {
    Resolved(Id),
    Unresolved(String),
}

impl<Id: Copy> Reference<Id> {
    pub fn resolved_id(&self) -> Option<Id> {
        match self {
            Reference::Resolved(id) => Some(*id),
            Reference::Unresolved(_) => None,
        }
    }

    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Reference::Resolved(_) => None,
            Reference::Unresolved(text) => Some(text.as_str()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Reference::Resolved(_))
    }

    /// Rebuild from the nullable column pair used by the SQL schema.
    pub fn from_parts(id: Option<Id>, text: Option<String>) -> Self {
        match id {
            Some(id) => Reference::Resolved(id),
            None => Reference::Unresolved(text.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub building: Reference<BuildingId>,
    pub label: String,
}

/// One meeting pattern of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub days: DayPattern,
    pub start_time: MilitaryTime,
    pub end_time: MilitaryTime,
    pub online: bool,
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyLink {
    pub faculty: Reference<FacultyId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    AcademicAffairs,
    PrintedComments,
    WhatHasChanged,
}

impl NoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::AcademicAffairs => "academic_affairs",
            NoteKind::PrintedComments => "printed_comments",
            NoteKind::WhatHasChanged => "what_has_changed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "academic_affairs" => Some(NoteKind::AcademicAffairs),
            "printed_comments" => Some(NoteKind::PrintedComments),
            "what_has_changed" => Some(NoteKind::WhatHasChanged),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub kind: NoteKind,
    pub text: String,
}

/// A mapped and resolved row awaiting validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDraft {
    /// Zero-based sheet row (the header is row 0).
    pub row: usize,
    pub section_id: String,
    pub term: Term,
    pub division: String,
    pub department: String,
    pub subject: String,
    pub course_number: String,
    pub section: String,
    pub title: String,
    pub instruction_method: String,
    pub campus: String,
    pub credits: String,
    pub capacity: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub locations: Vec<Location>,
    pub faculty: Vec<FacultyLink>,
    pub notes: Vec<Note>,
}

/// A validated course section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCourseRow {
    pub section_id: String,
    pub term: Term,
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
    pub locations: Vec<Location>,
    pub faculty: Vec<FacultyLink>,
    pub notes: Vec<Note>,
}

impl CanonicalCourseRow {
    /// Total weekly meetings: flagged days summed across every location.
    pub fn meeting_amount(&self) -> usize {
        self.locations.iter().map(|l| l.days.count()).sum()
    }
}

/// A persisted course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub revision_id: RevisionId,
    #[serde(flatten)]
    pub row: CanonicalCourseRow,
}
