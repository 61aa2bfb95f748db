//! Guideline search.
//!
//! Filters are optional and combine with AND. Results are ordered by id and
//! split into 1-based pages.

use serde::{Deserialize, Serialize};

use crate::api::{DayPattern, Guideline, GuidelineId, MilitaryTime, SemesterFlags, TimeWindow};
use crate::db::repository::{GuidelineRepository, RepositoryResult};

/// Query contract for guideline search. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidelineQuery {
    pub summer: Option<bool>,
    pub fall: Option<bool>,
    pub winter: Option<bool>,
    pub spring: Option<bool>,
    pub credits_min: Option<i32>,
    pub credits_max: Option<i32>,
    pub meeting_min: Option<i32>,
    pub meeting_max: Option<i32>,
    /// Canonical military-time integers.
    pub start_time: Option<i32>,
    pub end_time: Option<i32>,
    pub monday: Option<bool>,
    pub tuesday: Option<bool>,
    pub wednesday: Option<bool>,
    pub thursday: Option<bool>,
    pub friday: Option<bool>,
    pub saturday: Option<bool>,
    pub sunday: Option<bool>,
    /// 1-based; missing or zero means the first page.
    pub page: Option<usize>,
}

impl GuidelineQuery {
    pub fn semesters(&self) -> SemesterFlags {
        SemesterFlags {
            summer: self.summer.unwrap_or(false),
            fall: self.fall.unwrap_or(false),
            winter: self.winter.unwrap_or(false),
            spring: self.spring.unwrap_or(false),
        }
    }

    pub fn days(&self) -> DayPattern {
        DayPattern {
            monday: self.monday.unwrap_or(false),
            tuesday: self.tuesday.unwrap_or(false),
            wednesday: self.wednesday.unwrap_or(false),
            thursday: self.thursday.unwrap_or(false),
            friday: self.friday.unwrap_or(false),
            saturday: self.saturday.unwrap_or(false),
            sunday: self.sunday.unwrap_or(false),
        }
    }

    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    /// True when `guideline` passes every filter set on this query.
    pub fn accepts(&self, guideline: &Guideline) -> bool {
        let semesters = self.semesters();
        if semesters.any() && !guideline.semesters.intersects(&semesters) {
            return false;
        }

        let in_range = |value: i32, min: Option<i32>, max: Option<i32>| {
            min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
        };
        if !in_range(guideline.credits, self.credits_min, self.credits_max) {
            return false;
        }
        if !in_range(guideline.meeting_amount, self.meeting_min, self.meeting_max) {
            return false;
        }

        if self.start_time.is_some() || self.end_time.is_some() {
            let inside = guideline.times.iter().any(|window| {
                in_range(window.start.value(), self.start_time, None)
                    && in_range(window.end.value(), None, self.end_time)
            });
            if !inside {
                return false;
            }
        }

        let days = self.days();
        days.is_empty() || guideline.days.iter().any(|pattern| pattern.covers(&days))
    }
}

/// A time record with its display forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindowView {
    pub start: MilitaryTime,
    pub end: MilitaryTime,
    pub start_display: String,
    pub end_display: String,
    pub elapsed: String,
}

impl From<&TimeWindow> for TimeWindowView {
    fn from(window: &TimeWindow) -> Self {
        Self {
            start: window.start,
            end: window.end,
            start_display: window.start.display().to_string(),
            end_display: window.end.display().to_string(),
            elapsed: window.elapsed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidelineView {
    pub id: GuidelineId,
    pub semesters: SemesterFlags,
    pub credits: i32,
    pub meeting_amount: i32,
    pub days: Vec<DayPattern>,
    pub times: Vec<TimeWindowView>,
}

impl From<&Guideline> for GuidelineView {
    fn from(guideline: &Guideline) -> Self {
        Self {
            id: guideline.id,
            semesters: guideline.semesters,
            credits: guideline.credits,
            meeting_amount: guideline.meeting_amount,
            days: guideline.days.clone(),
            times: guideline.times.iter().map(TimeWindowView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidelinePage {
    pub guidelines: Vec<GuidelineView>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Filter, order and paginate already-loaded guidelines.
pub fn paginate_guidelines(
    mut guidelines: Vec<Guideline>,
    query: &GuidelineQuery,
    page_size: usize,
) -> GuidelinePage {
    let page_size = page_size.max(1);
    guidelines.retain(|g| query.accepts(g));
    guidelines.sort_by_key(|g| g.id);

    let total = guidelines.len();
    let page = query.page();
    let views = guidelines
        .iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .map(GuidelineView::from)
        .collect();

    GuidelinePage {
        guidelines: views,
        page,
        page_size,
        total,
        total_pages: total.div_ceil(page_size),
    }
}

pub async fn search_guidelines<R: GuidelineRepository + ?Sized>(
    repo: &R,
    query: &GuidelineQuery,
    page_size: usize,
) -> RepositoryResult<GuidelinePage> {
    let guidelines = repo.list_guidelines().await?;
    Ok(paginate_guidelines(guidelines, query, page_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{NewGuideline, Semester};
    use crate::db::LocalRepository;

    fn guideline(
        id: i64,
        semester: Semester,
        credits: i32,
        days: &str,
        times: &[(i32, i32)],
    ) -> Guideline {
        Guideline {
            id: GuidelineId(id),
            semesters: SemesterFlags::only(semester),
            credits,
            meeting_amount: DayPattern::parse(days).count() as i32,
            days: vec![DayPattern::parse(days)],
            times: times
                .iter()
                .map(|(s, e)| TimeWindow::new(MilitaryTime::new(*s), MilitaryTime::new(*e)))
                .collect(),
        }
    }

    fn sample() -> Vec<Guideline> {
        vec![
            guideline(3, Semester::Spring, 4, "MWF", &[(800, 850)]),
            guideline(1, Semester::Fall, 3, "MW", &[(900, 1015)]),
            guideline(2, Semester::Fall, 3, "TR", &[(1330, 1445)]),
            guideline(4, Semester::Summer, 1, "F", &[(1800, 2100)]),
        ]
    }

    fn ids(page: &GuidelinePage) -> Vec<i64> {
        page.guidelines.iter().map(|g| g.id.value()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything_ordered() {
        let page = paginate_guidelines(sample(), &GuidelineQuery::default(), 20);
        assert_eq!(ids(&page), vec![1, 2, 3, 4]);
        assert_eq!(page.total, 4);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_semester_filter_matches_any_requested_flag() {
        let query = GuidelineQuery {
            fall: Some(true),
            summer: Some(true),
            ..Default::default()
        };
        assert_eq!(ids(&paginate_guidelines(sample(), &query, 20)), vec![1, 2, 4]);
    }

    #[test]
    fn test_credit_and_meeting_ranges_are_inclusive() {
        let query = GuidelineQuery {
            credits_min: Some(3),
            credits_max: Some(4),
            meeting_min: Some(3),
            ..Default::default()
        };
        assert_eq!(ids(&paginate_guidelines(sample(), &query, 20)), vec![3]);
    }

    #[test]
    fn test_time_window_keeps_records_inside_range() {
        let query = GuidelineQuery {
            start_time: Some(900),
            end_time: Some(1500),
            ..Default::default()
        };
        assert_eq!(ids(&paginate_guidelines(sample(), &query, 20)), vec![1, 2]);

        let evening = GuidelineQuery {
            start_time: Some(1700),
            ..Default::default()
        };
        assert_eq!(ids(&paginate_guidelines(sample(), &evening, 20)), vec![4]);
    }

    #[test]
    fn test_day_filter_requires_covering_record() {
        let query = GuidelineQuery {
            monday: Some(true),
            friday: Some(true),
            ..Default::default()
        };
        assert_eq!(ids(&paginate_guidelines(sample(), &query, 20)), vec![3]);
    }

    #[test]
    fn test_pagination() {
        let second = GuidelineQuery {
            page: Some(2),
            ..Default::default()
        };
        let page = paginate_guidelines(sample(), &second, 3);
        assert_eq!(ids(&page), vec![4]);
        assert_eq!(page.total_pages, 2);

        let zero = GuidelineQuery {
            page: Some(0),
            ..Default::default()
        };
        assert_eq!(paginate_guidelines(sample(), &zero, 3).page, 1);
    }

    #[test]
    fn test_time_views_carry_display_forms() {
        let view = GuidelineView::from(&guideline(1, Semester::Fall, 3, "TR", &[(1330, 1445)]));
        let time = &view.times[0];
        assert_eq!(time.start_display, "1:30 PM");
        assert_eq!(time.end_display, "2:45 PM");
        assert_eq!(time.elapsed, "1 hr 15 min");
    }

    #[test]
    fn test_query_deserializes_from_flat_map() {
        let query: GuidelineQuery =
            serde_json::from_str(r#"{"fall": true, "credits_min": 3, "page": 2}"#).unwrap();
        assert!(query.semesters().fall);
        assert_eq!(query.credits_min, Some(3));
        assert_eq!(query.page(), 2);
    }

    #[tokio::test]
    async fn test_search_reads_repository() {
        let repo = LocalRepository::new();
        for credits in [3, 4] {
            repo.create_guideline(&NewGuideline {
                semesters: SemesterFlags::only(Semester::Fall),
                credits,
                meeting_amount: 2,
                days: vec![DayPattern::parse("MW")],
                times: Vec::new(),
            })
            .await
            .unwrap();
        }

        let query = GuidelineQuery {
            credits_min: Some(4),
            ..Default::default()
        };
        let page = search_guidelines(&repo, &query, 20).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.guidelines[0].credits, 4);
    }
}
