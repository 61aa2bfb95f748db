use super::*;
use crate::api::{
    CourseId, DayPattern, FacultyLink, IngestionBatch, MilitaryTime, NewGuideline, Reference,
    Semester, SemesterFlags, Term, TimeWindow,
};
use crate::db::repository::ScheduleRepository;
use crate::db::LocalRepository;

fn location(days: &str, start: i32, end: i32) -> Location {
    Location {
        days: DayPattern::parse(days),
        start_time: MilitaryTime::new(start),
        end_time: MilitaryTime::new(end),
        online: false,
        rooms: Vec::new(),
    }
}

fn course(credits: i32, semester: Semester, locations: Vec<Location>) -> CanonicalCourseRow {
    CanonicalCourseRow {
        section_id: "20001".into(),
        term: Term {
            year: 2024,
            semesters: SemesterFlags::only(semester),
        },
        division: "ART".into(),
        department: "MATH".into(),
        subject: "MATH".into(),
        course_number: "210".into(),
        section: 1,
        title: "Calculus".into(),
        instruction_method: "LEC".into(),
        campus: "Main".into(),
        credits,
        capacity: 40,
        start_date: None,
        end_date: None,
        locations,
        faculty: vec![FacultyLink {
            faculty: Reference::Unresolved("Staff".into()),
        }],
        notes: Vec::new(),
    }
}

fn guideline(
    id: i64,
    credits: i32,
    meeting_amount: i32,
    days: &[&str],
    times: &[(i32, i32)],
) -> Guideline {
    Guideline {
        id: GuidelineId(id),
        semesters: SemesterFlags::only(Semester::Fall),
        credits,
        meeting_amount,
        days: days.iter().map(|d| DayPattern::parse(d)).collect(),
        times: times
            .iter()
            .map(|(s, e)| TimeWindow::new(MilitaryTime::new(*s), MilitaryTime::new(*e)))
            .collect(),
    }
}

#[test]
fn test_exact_match_conforms() {
    let matcher = ConformanceMatcher::default();
    let c = course(3, Semester::Fall, vec![location("MW", 900, 1015)]);
    let g = guideline(1, 3, 2, &["MW"], &[(900, 1015)]);

    let result = matcher.evaluate(&c, &[g]);
    assert!(result.conforms);
    assert_eq!(result.matched_guidelines, vec![GuidelineId(1)]);
}

#[test]
fn test_credit_mismatch_does_not_conform() {
    let matcher = ConformanceMatcher::default();
    let c = course(4, Semester::Fall, vec![location("MW", 900, 1015)]);
    let g = guideline(1, 3, 2, &["MW"], &[(900, 1015)]);
    assert!(!matcher.evaluate(&c, &[g]).conforms);
}

#[test]
fn test_meeting_amount_must_be_exact() {
    let matcher = ConformanceMatcher::default();
    let c = course(3, Semester::Fall, vec![location("MWF", 900, 950)]);
    let g = guideline(1, 3, 2, &["MWF"], &[(900, 950)]);
    assert!(!matcher.evaluate(&c, &[g]).conforms);
}

#[test]
fn test_semester_must_be_covered() {
    let matcher = ConformanceMatcher::default();
    let c = course(3, Semester::Spring, vec![location("MW", 900, 1015)]);
    let g = guideline(1, 3, 2, &["MW"], &[(900, 1015)]);
    assert!(!matcher.matches(&c, &g));
}

#[test]
fn test_guideline_days_must_cover_course_days() {
    let matcher = ConformanceMatcher::default();
    let c = course(3, Semester::Fall, vec![location("MW", 900, 1015)]);
    // A broader guideline pattern still covers the course.
    let broad = guideline(1, 3, 2, &["MWF"], &[(900, 1015)]);
    let narrow = guideline(2, 3, 2, &["M"], &[(900, 1015)]);
    let result = matcher.evaluate(&c, &[broad, narrow]);
    assert_eq!(result.matched_guidelines, vec![GuidelineId(1)]);
}

#[test]
fn test_guideline_without_day_or_time_records_never_matches() {
    let matcher = ConformanceMatcher::default();
    let c = course(3, Semester::Fall, vec![location("MW", 900, 1015)]);
    let no_days = guideline(1, 3, 2, &[], &[(900, 1015)]);
    let no_times = guideline(2, 3, 2, &["MW"], &[]);
    assert!(!matcher.evaluate(&c, &[no_days, no_times]).conforms);
}

#[test]
fn test_exhaustive_policy_requires_every_time_record_to_match() {
    let c = course(3, Semester::Fall, vec![location("MW", 900, 1015)]);
    let g = guideline(1, 3, 2, &["MW"], &[(900, 1015), (1030, 1145)]);

    assert!(!ConformanceMatcher::default().matches(&c, &g));
    assert!(ConformanceMatcher::new(Arc::new(AnyLocationTimeMatch)).matches(&c, &g));
}

#[test]
fn test_policies_differ_on_multi_location_courses() {
    let c = course(
        3,
        Semester::Fall,
        vec![location("M", 900, 1015), location("W", 1030, 1145)],
    );
    let g = guideline(1, 3, 2, &["M", "W"], &[(900, 1015), (1030, 1145)]);

    let exhaustive = ConformanceMatcher::default();
    let any_location = ConformanceMatcher::new(Arc::new(AnyLocationTimeMatch));
    assert_eq!(exhaustive.policy_name(), "exhaustive");
    assert!(!exhaustive.matches(&c, &g));
    assert!(any_location.matches(&c, &g));
}

#[tokio::test]
async fn test_check_loads_guidelines_for_semester() {
    let repo = LocalRepository::new();
    repo.create_guideline(&NewGuideline {
        semesters: SemesterFlags::only(Semester::Fall),
        credits: 3,
        meeting_amount: 2,
        days: vec![DayPattern::parse("MW")],
        times: vec![TimeWindow::new(MilitaryTime::new(900), MilitaryTime::new(1015))],
    })
    .await
    .unwrap();

    let matcher = ConformanceMatcher::default();
    let fall = course(3, Semester::Fall, vec![location("MW", 900, 1015)]);
    assert!(matcher.check(&repo, &fall).await.unwrap().conforms);

    let mut no_semester = fall.clone();
    no_semester.term.semesters = SemesterFlags::default();
    assert!(!matcher.check(&repo, &no_semester).await.unwrap().conforms);
}

#[tokio::test]
async fn test_courses_with_conformance_for_revision() {
    let repo = LocalRepository::new();
    repo.create_guideline(&NewGuideline {
        semesters: SemesterFlags::only(Semester::Fall),
        credits: 3,
        meeting_amount: 2,
        days: vec![DayPattern::parse("MW")],
        times: vec![TimeWindow::new(MilitaryTime::new(900), MilitaryTime::new(1015))],
    })
    .await
    .unwrap();

    let revision = repo.upload_revision("fall.xlsx", b"bytes").await.unwrap();
    let receipt = repo
        .commit_batch(&IngestionBatch {
            revision_id: revision.id,
            schedule_name: "Fall 2024".into(),
            courses: vec![
                course(3, Semester::Fall, vec![location("MW", 900, 1015)]),
                course(4, Semester::Fall, vec![location("MW", 900, 1015)]),
            ],
        })
        .await
        .unwrap();

    let results = ConformanceMatcher::default()
        .courses_with_conformance(&repo, revision.id)
        .await
        .unwrap();
    let flags: Vec<(CourseId, bool)> = results
        .iter()
        .map(|r| (r.course.id, r.conformance.conforms))
        .collect();
    assert_eq!(
        flags,
        vec![(receipt.course_ids[0], true), (receipt.course_ids[1], false)]
    );

    let json = serde_json::to_value(&results[0]).unwrap();
    assert_eq!(json["conforms"], serde_json::json!(true));
    assert_eq!(json["credits"], serde_json::json!(3));
}
