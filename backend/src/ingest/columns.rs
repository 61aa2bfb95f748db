//! Column mapping: which spreadsheet column feeds which course field.
//!
//! Clients send a flat `{ field name: column index }` object. It is inverted
//! once per batch into a per-column lookup, then every data row is projected
//! into a [`MappedRow`] keyed by field.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::sheet::RawSheet;
use crate::api::NoteKind;

/// Semantic course fields a spreadsheet column can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseField {
    SectionId,
    Term,
    #[serde(rename = "div")]
    Division,
    Department,
    Subject,
    CourseNumber,
    Section,
    Title,
    InstructionMethod,
    Faculty,
    Campus,
    Credits,
    Capacity,
    StartDate,
    EndDate,
    Building,
    Room,
    StartTime,
    EndTime,
    Days,
    #[serde(rename = "noteAcademicAffairs")]
    NoteAcademicAffairs,
    #[serde(rename = "notePrintedComments")]
    NotePrintedComments,
    #[serde(rename = "noteWhatHasChanged")]
    NoteWhatHasChanged,
}

impl CourseField {
    pub const ALL: [CourseField; 23] = [
        CourseField::SectionId,
        CourseField::Term,
        CourseField::Division,
        CourseField::Department,
        CourseField::Subject,
        CourseField::CourseNumber,
        CourseField::Section,
        CourseField::Title,
        CourseField::InstructionMethod,
        CourseField::Faculty,
        CourseField::Campus,
        CourseField::Credits,
        CourseField::Capacity,
        CourseField::StartDate,
        CourseField::EndDate,
        CourseField::Building,
        CourseField::Room,
        CourseField::StartTime,
        CourseField::EndTime,
        CourseField::Days,
        CourseField::NoteAcademicAffairs,
        CourseField::NotePrintedComments,
        CourseField::NoteWhatHasChanged,
    ];

    /// Wire name used in column-mapping objects.
    pub fn name(&self) -> &'static str {
        match self {
            CourseField::SectionId => "section_id",
            CourseField::Term => "term",
            CourseField::Division => "div",
            CourseField::Department => "department",
            CourseField::Subject => "subject",
            CourseField::CourseNumber => "course_number",
            CourseField::Section => "section",
            CourseField::Title => "title",
            CourseField::InstructionMethod => "instruction_method",
            CourseField::Faculty => "faculty",
            CourseField::Campus => "campus",
            CourseField::Credits => "credits",
            CourseField::Capacity => "capacity",
            CourseField::StartDate => "start_date",
            CourseField::EndDate => "end_date",
            CourseField::Building => "building",
            CourseField::Room => "room",
            CourseField::StartTime => "start_time",
            CourseField::EndTime => "end_time",
            CourseField::Days => "days",
            CourseField::NoteAcademicAffairs => "noteAcademicAffairs",
            CourseField::NotePrintedComments => "notePrintedComments",
            CourseField::NoteWhatHasChanged => "noteWhatHasChanged",
        }
    }

    pub fn note_kind(&self) -> Option<NoteKind> {
        match self {
            CourseField::NoteAcademicAffairs => Some(NoteKind::AcademicAffairs),
            CourseField::NotePrintedComments => Some(NoteKind::PrintedComments),
            CourseField::NoteWhatHasChanged => Some(NoteKind::WhatHasChanged),
            _ => None,
        }
    }
}

impl fmt::Display for CourseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Client-supplied `{ field → zero-based column index }` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping(BTreeMap<CourseField, usize>);

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: CourseField, column: usize) -> Self {
        self.0.insert(field, column);
        self
    }

    pub fn insert(&mut self, field: CourseField, column: usize) -> Option<usize> {
        self.0.insert(field, column)
    }

    pub fn column(&self, field: CourseField) -> Option<usize> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, field: CourseField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = CourseField> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build the per-column lookup. When two fields name the same column the
    /// later field (in field order) wins.
    pub fn invert(&self) -> InvertedMapping {
        let mut targets = BTreeMap::new();
        for (field, column) in &self.0 {
            if let Some(previous) = targets.insert(*column, *field) {
                log::warn!(
                    "Column {} mapped to both '{}' and '{}'; using '{}'",
                    column,
                    previous,
                    field,
                    field
                );
            }
        }
        InvertedMapping { targets }
    }
}

impl FromIterator<(CourseField, usize)> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = (CourseField, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What a spreadsheet column feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnTarget {
    Field(CourseField),
    /// The column is not mapped; its cells are ignored.
    Discard,
}

/// `column index → target`, built once per batch. Columns absent from the
/// map are [`ColumnTarget::Discard`], so indices need not be dense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvertedMapping {
    targets: BTreeMap<usize, CourseField>,
}

impl InvertedMapping {
    pub fn target(&self, column: usize) -> ColumnTarget {
        self.targets
            .get(&column)
            .copied()
            .map(ColumnTarget::Field)
            .unwrap_or(ColumnTarget::Discard)
    }

    fn mapped_fields(&self) -> impl Iterator<Item = (usize, CourseField)> + '_ {
        self.targets.iter().map(|(column, field)| (*column, *field))
    }
}

/// One data row projected onto course fields. Every mapped field is present;
/// missing cells are empty text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRow {
    /// Index of the row in the sheet (the header is row 0).
    pub row: usize,
    values: BTreeMap<CourseField, String>,
}

impl MappedRow {
    pub fn new(row: usize, values: BTreeMap<CourseField, String>) -> Self {
        Self { row, values }
    }

    /// The field's text, or `""` when the field is not mapped.
    pub fn get(&self, field: CourseField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn is_mapped(&self, field: CourseField) -> bool {
        self.values.contains_key(&field)
    }

    /// True when no mapped field holds any non-whitespace text.
    pub fn is_blank(&self) -> bool {
        self.values.values().all(|value| value.trim().is_empty())
    }
}

/// Project every non-header row of `sheet` through `mapping`, dropping rows
/// whose mapped cells are all blank.
pub fn project_rows(sheet: &RawSheet, mapping: &ColumnMapping) -> Vec<MappedRow> {
    let inverted = mapping.invert();
    let mut projected = Vec::new();

    for (index, cells) in sheet.data_rows() {
        let values: BTreeMap<CourseField, String> = inverted
            .mapped_fields()
            .map(|(column, field)| {
                let text = cells
                    .get(column)
                    .and_then(|cell| cell.clone())
                    .unwrap_or_default();
                (field, text)
            })
            .collect();

        let row = MappedRow::new(index, values);
        if row.is_blank() {
            log::debug!("Dropping blank sheet row {}", index);
            continue;
        }
        projected.push(row);
    }

    projected
}
