//! Scheduling guideline records.

use serde::{Deserialize, Serialize};

use super::days::DayPattern;
use super::term::SemesterFlags;
use super::time::{elapsed_display, MilitaryTime};
use crate::api::GuidelineId;

/// An allowed start/end pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: MilitaryTime,
    pub end: MilitaryTime,
}

impl TimeWindow {
    pub fn new(start: MilitaryTime, end: MilitaryTime) -> Self {
        Self { start, end }
    }

    pub fn elapsed(&self) -> String {
        elapsed_display(self.start, self.end)
    }
}

/// Guideline payload before it has been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGuideline {
    pub semesters: SemesterFlags,
    pub credits: i32,
    pub meeting_amount: i32,
    #[serde(default)]
    pub days: Vec<DayPattern>,
    #[serde(default)]
    pub times: Vec<TimeWindow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guideline {
    pub id: GuidelineId,
    pub semesters: SemesterFlags,
    pub credits: i32,
    pub meeting_amount: i32,
    pub days: Vec<DayPattern>,
    pub times: Vec<TimeWindow>,
}

impl Guideline {
    pub fn from_new(id: GuidelineId, new: NewGuideline) -> Self {
        Self {
            id,
            semesters: new.semesters,
            credits: new.credits,
            meeting_amount: new.meeting_amount,
            days: new.days,
            times: new.times,
        }
    }
}
