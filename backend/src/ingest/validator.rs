//! Structural validation of course drafts.
//!
//! Every check on a row runs and its failures are collected, so a rejected
//! row reports all of its problems at once. Across a batch the scan stops at
//! the first rejected row.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{CanonicalCourseRow, CourseDraft};

/// Inclusive numeric or length range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
}

impl Bounds {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Tunable limits, overridable from the `[validation]` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub department_length: Bounds,
    pub subject_length: Bounds,
    pub title_length: Bounds,
    pub section: Bounds,
    pub credits: Bounds,
    pub capacity: Bounds,
    pub min_semesters: usize,
    pub min_faculty: usize,
    pub min_notes: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            department_length: Bounds::new(2, 4),
            subject_length: Bounds::new(2, 4),
            title_length: Bounds::new(1, 100),
            section: Bounds::new(0, 999),
            credits: Bounds::new(0, 12),
            capacity: Bounds::new(0, 999),
            min_semesters: 1,
            min_faculty: 1,
            min_notes: 3,
        }
    }
}

/// A single failed check, keyed by field path (e.g. `locations[1].days`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A rejected row with every field error found on it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("row {row} failed validation: {}", summarize(.errors))]
pub struct RowValidationError {
    pub row: usize,
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.path, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Integer cells may arrive as `"3"`, `" 3 "` or `"3.0"`.
fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    let value = text.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

#[derive(Default)]
struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(path, message));
    }

    fn length(&mut self, path: &str, value: &str, bounds: Bounds) {
        let len = value.chars().count() as i64;
        if !bounds.contains(len) {
            self.push(
                path,
                format!(
                    "length {} is outside {}..={}",
                    len, bounds.min, bounds.max
                ),
            );
        }
    }

    fn integer(&mut self, path: &str, value: &str, bounds: Bounds) -> i32 {
        let Some(parsed) = parse_integer(value) else {
            self.push(path, format!("'{}' is not an integer", value));
            return 0;
        };
        if !bounds.contains(parsed) {
            self.push(
                path,
                format!("{} is outside {}..={}", parsed, bounds.min, bounds.max),
            );
            return 0;
        }
        match i32::try_from(parsed) {
            Ok(value) => value,
            Err(_) => {
                self.push(path, format!("{} does not fit a 32-bit integer", parsed));
                0
            }
        }
    }

    fn minimum(&mut self, path: &str, found: usize, required: usize, what: &str) {
        if found < required {
            self.push(
                path,
                format!("expected at least {} {}, found {}", required, what, found),
            );
        }
    }
}

/// Validate one draft, producing the canonical row or every field error.
pub fn validate_row(
    draft: &CourseDraft,
    rules: &ValidationRules,
) -> Result<CanonicalCourseRow, RowValidationError> {
    let mut c = Collector::default();

    c.length("department", &draft.department, rules.department_length);
    c.length("subject", &draft.subject, rules.subject_length);
    c.length("title", &draft.title, rules.title_length);
    let section = c.integer("section", &draft.section, rules.section);
    let credits = c.integer("credits", &draft.credits, rules.credits);
    let capacity = c.integer("capacity", &draft.capacity, rules.capacity);

    let semesters = draft.term.semesters.iter().count();
    c.minimum("term", semesters, rules.min_semesters, "semester");
    c.minimum("faculty", draft.faculty.len(), rules.min_faculty, "faculty");
    c.minimum("notes", draft.notes.len(), rules.min_notes, "notes");

    for (i, location) in draft.locations.iter().enumerate() {
        if location.days.is_empty() {
            c.push(format!("locations[{}].days", i), "no meeting day set");
        }
    }

    if !c.errors.is_empty() {
        return Err(RowValidationError {
            row: draft.row,
            errors: c.errors,
        });
    }

    Ok(CanonicalCourseRow {
        section_id: draft.section_id.clone(),
        term: draft.term,
        division: draft.division.clone(),
        department: draft.department.clone(),
        subject: draft.subject.clone(),
        course_number: draft.course_number.clone(),
        section,
        title: draft.title.clone(),
        instruction_method: draft.instruction_method.clone(),
        campus: draft.campus.clone(),
        credits,
        capacity,
        start_date: draft.start_date,
        end_date: draft.end_date,
        locations: draft.locations.clone(),
        faculty: draft.faculty.clone(),
        notes: draft.notes.clone(),
    })
}

/// Validate drafts top to bottom, stopping at the first rejected row.
pub fn validate_batch(
    drafts: &[CourseDraft],
    rules: &ValidationRules,
) -> Result<Vec<CanonicalCourseRow>, RowValidationError> {
    drafts
        .iter()
        .map(|draft| {
            validate_row(draft, rules).inspect_err(|e| {
                log::warn!("Rejected sheet row {}: {}", e.row, summarize(&e.errors));
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
