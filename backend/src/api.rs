//! Public API surface for the course scheduling backend.
//!
//! This file consolidates the identifier newtypes and re-exports the domain
//! records that travel through the repository layer and the HTTP API.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::models::course::{
    CanonicalCourseRow, Course, CourseDraft, FacultyLink, Location, Note, NoteKind, Reference,
    Room,
};
pub use crate::models::days::DayPattern;
pub use crate::models::guideline::{Guideline, NewGuideline, TimeWindow};
pub use crate::models::reference::{
    Building, Campus, Department, Faculty, NewBuilding, NewCampus, NewDepartment, NewFaculty,
};
pub use crate::models::schedule::{CommitReceipt, IngestionBatch, Schedule, ScheduleRevision};
pub use crate::models::term::{Semester, SemesterFlags, Term};
pub use crate::models::time::{DisplayTime, Meridiem, MilitaryTime};

crate::define_id_type!(i64, ScheduleId);
crate::define_id_type!(i64, RevisionId);
crate::define_id_type!(i64, CourseId);
crate::define_id_type!(i64, GuidelineId);
crate::define_id_type!(i64, CampusId);
crate::define_id_type!(i64, BuildingId);
crate::define_id_type!(i64, DepartmentId);
crate::define_id_type!(i64, FacultyId);
