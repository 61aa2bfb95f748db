//! Schedules, revisions and the commit unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::course::CanonicalCourseRow;
use crate::api::{CourseId, RevisionId, ScheduleId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One uploaded spreadsheet. While `onboarding` is true the revision has no
/// courses and no schedule link; committing clears the flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRevision {
    pub id: RevisionId,
    pub name: String,
    pub schedule_id: Option<ScheduleId>,
    pub onboarding: bool,
    /// SHA-256 of the uploaded bytes.
    pub checksum: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Everything a single commit writes, all or nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionBatch {
    pub revision_id: RevisionId,
    pub schedule_name: String,
    pub courses: Vec<CanonicalCourseRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub schedule_id: ScheduleId,
    pub revision_id: RevisionId,
    pub course_ids: Vec<CourseId>,
}

impl CommitReceipt {
    pub fn course_count(&self) -> usize {
        self.course_ids.len()
    }
}
