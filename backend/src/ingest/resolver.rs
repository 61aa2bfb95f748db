//! Entity resolution: mapped rows to course drafts.
//!
//! Multi-line cells are split into positionally aligned lists (index `i` of
//! the building list pairs with index `i` of the room, time and day lists).
//! Building prefixes and faculty names are looked up concurrently against the
//! reference store. A miss is not an error: the raw token is kept as an
//! [`Reference::Unresolved`] placeholder.

use futures::future::try_join_all;

use super::columns::{CourseField, MappedRow};
use crate::api::{
    BuildingId, CourseDraft, DayPattern, FacultyLink, Location, MilitaryTime, Note,
    Reference, Room, Term,
};
use crate::db::repository::{ReferenceRepository, RepositoryResult};
use crate::models::dates::parse_date;

/// Building token that marks an online meeting.
pub const ONLINE_TOKEN: &str = "ONL";

const NOTE_FIELDS: [CourseField; 3] = [
    CourseField::NoteAcademicAffairs,
    CourseField::NotePrintedComments,
    CourseField::NoteWhatHasChanged,
];

/// Split a multi-line cell into trimmed entries. CR, LF and CRLF all
/// separate entries; an empty cell yields no entries.
pub fn split_cell(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    trimmed
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(|entry| entry.trim().to_string())
        .collect()
}

fn is_online(token: &str) -> bool {
    token.eq_ignore_ascii_case(ONLINE_TOKEN)
}

fn entry(list: &[String], index: usize) -> &str {
    list.get(index).map(String::as_str).unwrap_or("")
}

/// Positionally aligned meeting lists of one row.
#[derive(Debug, Default)]
struct MeetingLists {
    buildings: Vec<String>,
    rooms: Vec<String>,
    start_times: Vec<String>,
    end_times: Vec<String>,
    days: Vec<String>,
}

impl MeetingLists {
    fn from_row(row: &MappedRow) -> Self {
        Self {
            buildings: split_cell(row.get(CourseField::Building)),
            rooms: split_cell(row.get(CourseField::Room)),
            start_times: split_cell(row.get(CourseField::StartTime)),
            end_times: split_cell(row.get(CourseField::EndTime)),
            days: split_cell(row.get(CourseField::Days)),
        }
    }

    /// Number of meetings: the longest of the aligned lists.
    fn len(&self) -> usize {
        [
            self.buildings.len(),
            self.rooms.len(),
            self.start_times.len(),
            self.end_times.len(),
            self.days.len(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

async fn resolve_building<R: ReferenceRepository + ?Sized>(
    repo: &R,
    token: &str,
) -> RepositoryResult<Option<Reference<BuildingId>>> {
    if token.is_empty() || is_online(token) {
        return Ok(None);
    }

    let reference = match repo.find_building_by_prefix(token).await? {
        Some(building) => Reference::Resolved(building.id),
        None => {
            log::warn!("No building with prefix '{}'; keeping raw text", token);
            Reference::Unresolved(token.to_string())
        }
    };
    Ok(Some(reference))
}

async fn resolve_faculty<R: ReferenceRepository + ?Sized>(
    repo: &R,
    name: &str,
) -> RepositoryResult<FacultyLink> {
    let faculty = match repo.find_faculty_by_name(name).await? {
        Some(faculty) => Reference::Resolved(faculty.id),
        None => {
            log::warn!("No faculty named '{}'; keeping raw text", name);
            Reference::Unresolved(name.to_string())
        }
    };
    Ok(FacultyLink { faculty })
}

fn build_locations(
    lists: &MeetingLists,
    buildings: Vec<Option<Reference<BuildingId>>>,
) -> Vec<Location> {
    buildings
        .into_iter()
        .enumerate()
        .map(|(i, building)| {
            let building_token = entry(&lists.buildings, i);
            let room_label = entry(&lists.rooms, i);
            let online = is_online(building_token);

            let rooms = if online || (building_token.is_empty() && room_label.is_empty()) {
                Vec::new()
            } else {
                vec![Room {
                    building: building
                        .unwrap_or_else(|| Reference::Unresolved(building_token.to_string())),
                    label: room_label.to_string(),
                }]
            };

            Location {
                days: DayPattern::parse(entry(&lists.days, i)),
                start_time: MilitaryTime::parse(entry(&lists.start_times, i)),
                end_time: MilitaryTime::parse(entry(&lists.end_times, i)),
                online,
                rooms,
            }
        })
        .collect()
}

fn collect_notes(row: &MappedRow) -> Vec<Note> {
    NOTE_FIELDS
        .iter()
        .filter(|field| row.is_mapped(**field))
        .filter_map(|field| {
            field.note_kind().map(|kind| Note {
                kind,
                text: row.get(*field).trim().to_string(),
            })
        })
        .collect()
}

fn text(row: &MappedRow, field: CourseField) -> String {
    row.get(field).trim().to_string()
}

/// Resolve one mapped row into a [`CourseDraft`].
///
/// Building and faculty lookups for every position run concurrently; results
/// are reassembled in position order. Only repository failures are errors.
pub async fn resolve_row<R: ReferenceRepository + ?Sized>(
    repo: &R,
    row: &MappedRow,
) -> RepositoryResult<CourseDraft> {
    let lists = MeetingLists::from_row(row);
    let faculty_names: Vec<String> = split_cell(row.get(CourseField::Faculty))
        .into_iter()
        .filter(|name| !name.is_empty())
        .collect();

    let building_lookups =
        try_join_all((0..lists.len()).map(|i| resolve_building(repo, entry(&lists.buildings, i))));
    let faculty_lookups = try_join_all(faculty_names.iter().map(|name| resolve_faculty(repo, name)));
    let (buildings, faculty) = futures::try_join!(building_lookups, faculty_lookups)?;

    Ok(CourseDraft {
        row: row.row,
        section_id: text(row, CourseField::SectionId),
        term: Term::parse(row.get(CourseField::Term)),
        division: text(row, CourseField::Division),
        department: text(row, CourseField::Department),
        subject: text(row, CourseField::Subject),
        course_number: text(row, CourseField::CourseNumber),
        section: text(row, CourseField::Section),
        title: text(row, CourseField::Title),
        instruction_method: text(row, CourseField::InstructionMethod),
        campus: text(row, CourseField::Campus),
        credits: text(row, CourseField::Credits),
        capacity: text(row, CourseField::Capacity),
        start_date: parse_date(row.get(CourseField::StartDate)),
        end_date: parse_date(row.get(CourseField::EndDate)),
        locations: build_locations(&lists, buildings),
        faculty,
        notes: collect_notes(row),
    })
}

/// Resolve every row concurrently, preserving input order.
pub async fn resolve_rows<R: ReferenceRepository + ?Sized>(
    repo: &R,
    rows: &[MappedRow],
) -> RepositoryResult<Vec<CourseDraft>> {
    try_join_all(rows.iter().map(|row| resolve_row(repo, row))).await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::api::{FacultyId, NewBuilding, NewFaculty, NoteKind};
    use crate::db::LocalRepository;

    fn mapped(values: &[(CourseField, &str)]) -> MappedRow {
        let values: BTreeMap<CourseField, String> = values
            .iter()
            .map(|(field, text)| (*field, text.to_string()))
            .collect();
        MappedRow::new(1, values)
    }

    async fn seeded_repo() -> (LocalRepository, BuildingId, FacultyId) {
        let repo = LocalRepository::new();
        let building = repo
            .create_building(&NewBuilding {
                campus_id: None,
                prefix: "SCI".into(),
                name: "Science Hall".into(),
            })
            .await
            .unwrap();
        let faculty = repo
            .create_faculty(&NewFaculty {
                name: "Ada Lovelace".into(),
                department_id: None,
            })
            .await
            .unwrap();
        (repo, building.id, faculty.id)
    }

    #[test]
    fn test_split_cell_handles_every_line_ending() {
        assert_eq!(split_cell("a\r\nb\rc\nd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_cell("  one  "), vec!["one"]);
        assert!(split_cell("   ").is_empty());
        assert_eq!(split_cell("a\n\nb"), vec!["a", "", "b"]);
    }

    #[tokio::test]
    async fn test_aligned_lists_build_one_location_per_position() {
        let (repo, sci, _) = seeded_repo().await;
        let row = mapped(&[
            (CourseField::Building, "SCI\nXYZ"),
            (CourseField::Room, "101\n202"),
            (CourseField::StartTime, "9:00\n1:30 PM"),
            (CourseField::EndTime, "10:15\n2:45 PM"),
            (CourseField::Days, "MW\nF"),
        ]);

        let draft = resolve_row(&repo, &row).await.unwrap();
        assert_eq!(draft.locations.len(), 2);

        let first = &draft.locations[0];
        assert_eq!(first.start_time.value(), 900);
        assert_eq!(first.end_time.value(), 1015);
        assert!(first.days.monday && first.days.wednesday && !first.days.friday);
        assert_eq!(first.rooms[0].building, Reference::Resolved(sci));
        assert_eq!(first.rooms[0].label, "101");

        let second = &draft.locations[1];
        assert_eq!(second.start_time.value(), 1330);
        assert_eq!(
            second.rooms[0].building,
            Reference::Unresolved("XYZ".to_string())
        );
        assert_eq!(second.rooms[0].label, "202");
    }

    #[tokio::test]
    async fn test_online_token_produces_roomless_location() {
        let (repo, _, _) = seeded_repo().await;
        let row = mapped(&[
            (CourseField::Building, "ONL"),
            (CourseField::Room, "WEB"),
            (CourseField::Days, "TR"),
        ]);

        let draft = resolve_row(&repo, &row).await.unwrap();
        assert_eq!(draft.locations.len(), 1);
        assert!(draft.locations[0].online);
        assert!(draft.locations[0].rooms.is_empty());
    }

    #[tokio::test]
    async fn test_faculty_resolution_is_case_insensitive_with_fallback() {
        let (repo, _, ada) = seeded_repo().await;
        let row = mapped(&[(CourseField::Faculty, "ada lovelace\r\n\r\nGrace Hopper")]);

        let draft = resolve_row(&repo, &row).await.unwrap();
        assert_eq!(draft.faculty.len(), 2);
        assert_eq!(draft.faculty[0].faculty, Reference::Resolved(ada));
        assert_eq!(
            draft.faculty[1].faculty,
            Reference::Unresolved("Grace Hopper".to_string())
        );
    }

    #[tokio::test]
    async fn test_scalar_fields_and_notes() {
        let (repo, _, _) = seeded_repo().await;
        let row = mapped(&[
            (CourseField::Term, "23/FA"),
            (CourseField::Title, "  Intro to Biology "),
            (CourseField::Credits, "3"),
            (CourseField::StartDate, "2023-08-28"),
            (CourseField::NoteAcademicAffairs, " approved "),
            (CourseField::NoteWhatHasChanged, ""),
        ]);

        let draft = resolve_row(&repo, &row).await.unwrap();
        assert_eq!(draft.term.year, 23);
        assert!(draft.term.semesters.fall);
        assert_eq!(draft.title, "Intro to Biology");
        assert_eq!(draft.credits, "3");
        assert!(draft.start_date.is_some());
        assert_eq!(draft.end_date, None);
        assert!(draft.locations.is_empty());

        let kinds: Vec<NoteKind> = draft.notes.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![NoteKind::AcademicAffairs, NoteKind::WhatHasChanged]
        );
        assert_eq!(draft.notes[0].text, "approved");
    }

    #[tokio::test]
    async fn test_resolve_rows_preserves_order() {
        let (repo, _, _) = seeded_repo().await;
        let rows: Vec<MappedRow> = (1..=4)
            .map(|i| {
                let mut values = BTreeMap::new();
                values.insert(CourseField::Title, format!("Course {}", i));
                MappedRow::new(i, values)
            })
            .collect();

        let drafts = resolve_rows(&repo, &rows).await.unwrap();
        let order: Vec<usize> = drafts.iter().map(|d| d.row).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_unhealthy_repository_is_an_error() {
        let (repo, _, _) = seeded_repo().await;
        repo.set_healthy(false);
        let row = mapped(&[(CourseField::Building, "SCI"), (CourseField::Room, "1")]);
        assert!(resolve_row(&repo, &row).await.is_err());
    }
}
