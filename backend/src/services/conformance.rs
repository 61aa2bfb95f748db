//! Guideline conformance for persisted courses.
//!
//! A course conforms when at least one guideline for its semester agrees on
//! credits, weekly meeting count, day pattern and time window. Credits and
//! meeting count are always exact. How day and time records are compared
//! against the course's locations is a [`ConformancePolicy`].

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::{CanonicalCourseRow, Course, Guideline, GuidelineId, Location, RevisionId};
use crate::db::repository::{FullRepository, GuidelineRepository, RepositoryResult};

/// Day and time comparison between a guideline and a course's locations.
pub trait ConformancePolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn days_match(&self, guideline: &Guideline, locations: &[Location]) -> bool;

    fn times_match(&self, guideline: &Guideline, locations: &[Location]) -> bool;
}

/// Every guideline day record covers every location's days, and every
/// guideline time record equals every location's start/end pair.
///
/// A guideline without day records or without time records never matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveTimeMatch;

impl ConformancePolicy for ExhaustiveTimeMatch {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn days_match(&self, guideline: &Guideline, locations: &[Location]) -> bool {
        !guideline.days.is_empty()
            && guideline
                .days
                .iter()
                .all(|days| locations.iter().all(|l| days.covers(&l.days)))
    }

    fn times_match(&self, guideline: &Guideline, locations: &[Location]) -> bool {
        !guideline.times.is_empty()
            && guideline.times.iter().all(|window| {
                locations
                    .iter()
                    .all(|l| window.start == l.start_time && window.end == l.end_time)
            })
    }
}

/// Each location is covered by some day record and equals some time record.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyLocationTimeMatch;

impl ConformancePolicy for AnyLocationTimeMatch {
    fn name(&self) -> &'static str {
        "any-location"
    }

    fn days_match(&self, guideline: &Guideline, locations: &[Location]) -> bool {
        !guideline.days.is_empty()
            && locations
                .iter()
                .all(|l| guideline.days.iter().any(|days| days.covers(&l.days)))
    }

    fn times_match(&self, guideline: &Guideline, locations: &[Location]) -> bool {
        !guideline.times.is_empty()
            && locations.iter().all(|l| {
                guideline
                    .times
                    .iter()
                    .any(|window| window.start == l.start_time && window.end == l.end_time)
            })
    }
}

/// Derived at query time; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConformanceResult {
    pub conforms: bool,
    pub matched_guidelines: Vec<GuidelineId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseConformance {
    #[serde(flatten)]
    pub course: Course,
    #[serde(flatten)]
    pub conformance: ConformanceResult,
}

#[derive(Clone)]
pub struct ConformanceMatcher {
    policy: Arc<dyn ConformancePolicy>,
}

impl Default for ConformanceMatcher {
    fn default() -> Self {
        Self::new(Arc::new(ExhaustiveTimeMatch))
    }
}

impl std::fmt::Debug for ConformanceMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConformanceMatcher")
            .field("policy", &self.policy.name())
            .finish()
    }
}

impl ConformanceMatcher {
    pub fn new(policy: Arc<dyn ConformancePolicy>) -> Self {
        Self { policy }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Full five-way comparison of one course against one guideline.
    pub fn matches(&self, course: &CanonicalCourseRow, guideline: &Guideline) -> bool {
        guideline.semesters.covers(&course.term.semesters)
            && guideline.credits == course.credits
            && usize::try_from(guideline.meeting_amount).ok() == Some(course.meeting_amount())
            && self.policy.days_match(guideline, &course.locations)
            && self.policy.times_match(guideline, &course.locations)
    }

    /// Evaluate `course` against already-loaded candidate guidelines.
    pub fn evaluate(
        &self,
        course: &CanonicalCourseRow,
        guidelines: &[Guideline],
    ) -> ConformanceResult {
        let matched_guidelines: Vec<GuidelineId> = guidelines
            .iter()
            .filter(|g| self.matches(course, g))
            .map(|g| g.id)
            .collect();
        ConformanceResult {
            conforms: !matched_guidelines.is_empty(),
            matched_guidelines,
        }
    }

    /// Load the guidelines for the course's semester and evaluate it.
    pub async fn check<R: GuidelineRepository + ?Sized>(
        &self,
        repo: &R,
        course: &CanonicalCourseRow,
    ) -> RepositoryResult<ConformanceResult> {
        if !course.term.semesters.any() {
            return Ok(ConformanceResult::default());
        }
        let guidelines = repo.guidelines_for_semesters(course.term.semesters).await?;
        Ok(self.evaluate(course, &guidelines))
    }

    /// Every course of a revision with its conformance attached.
    ///
    /// Guidelines are loaded once per distinct semester combination.
    pub async fn courses_with_conformance<R: FullRepository + ?Sized>(
        &self,
        repo: &R,
        revision_id: RevisionId,
    ) -> RepositoryResult<Vec<CourseConformance>> {
        let courses = repo.list_courses(revision_id).await?;
        let mut by_semesters = HashMap::new();
        let mut results = Vec::with_capacity(courses.len());

        for course in courses {
            let semesters = course.row.term.semesters;
            if !by_semesters.contains_key(&semesters) {
                let guidelines = if semesters.any() {
                    repo.guidelines_for_semesters(semesters).await?
                } else {
                    Vec::new()
                };
                by_semesters.insert(semesters, guidelines);
            }
            let guidelines = by_semesters
                .get(&semesters)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let conformance = self.evaluate(&course.row, guidelines);
            results.push(CourseConformance {
                course,
                conformance,
            });
        }

        log::debug!(
            "Evaluated {} courses of revision {} with {} policy",
            results.len(),
            revision_id,
            self.policy.name()
        );
        Ok(results)
    }
}

#[cfg(test)]
#[path = "conformance_tests.rs"]
mod tests;
