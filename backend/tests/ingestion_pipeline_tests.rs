//! End-to-end ingestion tests against the local repository.

mod support;

use std::sync::Arc;

use course_sched::api::{Reference, RevisionId};
use course_sched::db::ScheduleRepository;
use course_sched::ingest::{IngestError, IngestMode, IngestOutcome, ValidationRules};
use support::{course_sheet, full_mapping, pipeline, seeded_repository, upload, CourseRow};

#[tokio::test]
async fn test_commit_persists_schedule_revision_and_courses() {
    let repo = seeded_repository().await;
    let revision_id = upload(
        &repo,
        &course_sheet(vec![CourseRow::new("CS-101-01"), CourseRow::new("CS-101-02")]),
    )
    .await;

    let receipt = pipeline(&repo)
        .create_schedule_revision(revision_id, &full_mapping(), "Fall 2024")
        .await
        .unwrap();

    assert_eq!(receipt.revision_id, revision_id);
    assert_eq!(receipt.course_count(), 2);

    let revision = repo.get_revision(revision_id).await.unwrap().unwrap();
    assert!(!revision.onboarding);
    assert_eq!(revision.schedule_id, Some(receipt.schedule_id));

    let schedules = repo.list_schedules().await.unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0].name, "Fall 2024");

    let mut courses = repo.list_courses(revision_id).await.unwrap();
    courses.sort_by(|a, b| a.row.section_id.cmp(&b.row.section_id));
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0].row.section_id, "CS-101-01");
    assert_eq!(courses[0].row.credits, 3);
    assert_eq!(courses[0].row.meeting_amount(), 3);
    assert_eq!(courses[0].row.notes.len(), 3);
    assert!(courses[0].row.locations[0].rooms[0].building.is_resolved());
    assert!(courses[0].row.faculty[0].faculty.is_resolved());

    let fetched = repo.get_course(receipt.course_ids[0]).await.unwrap();
    assert_eq!(fetched.revision_id, revision_id);
}

#[tokio::test]
async fn test_unknown_building_is_kept_as_raw_text() {
    let repo = seeded_repository().await;
    let revision_id = upload(
        &repo,
        &course_sheet(vec![CourseRow::new("CS-101-01").building("ZZZ")]),
    )
    .await;

    let rows = pipeline(&repo)
        .verify_organized_columns(revision_id, &full_mapping())
        .await
        .unwrap();

    assert_eq!(
        rows[0].locations[0].rooms[0].building,
        Reference::Unresolved("ZZZ".to_string())
    );
}

#[tokio::test]
async fn test_verify_is_idempotent_and_writes_nothing() {
    let repo = seeded_repository().await;
    let revision_id = upload(
        &repo,
        &course_sheet(vec![CourseRow::new("A"), CourseRow::new("B")]),
    )
    .await;
    let pipeline = pipeline(&repo);

    let first = pipeline
        .verify_organized_columns(revision_id, &full_mapping())
        .await
        .unwrap();
    let second = pipeline
        .verify_organized_columns(revision_id, &full_mapping())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(repo.schedule_count(), 0);
    assert_eq!(repo.course_count(), 0);
    assert!(repo.get_revision(revision_id).await.unwrap().unwrap().onboarding);
}

#[tokio::test]
async fn test_validation_stops_at_first_bad_row_without_writes() {
    let repo = seeded_repository().await;
    let rows = vec![
        CourseRow::new("R1"),
        CourseRow::new("R2"),
        CourseRow::new("R3").credits("lots"),
        CourseRow::new("R4").credits("also bad"),
        CourseRow::new("R5"),
    ];
    let revision_id = upload(&repo, &course_sheet(rows)).await;

    let err = pipeline(&repo)
        .create_schedule_revision(revision_id, &full_mapping(), "Broken")
        .await
        .unwrap_err();

    match &err {
        IngestError::RowValidation(row_err) => {
            assert_eq!(row_err.row, 3);
            assert_eq!(row_err.errors[0].path, "credits");
        }
        other => panic!("expected row validation error, got {:?}", other),
    }
    assert_eq!(err.field_errors().len(), 1);
    assert_eq!(repo.schedule_count(), 0);
    assert_eq!(repo.course_count(), 0);
    assert_eq!(repo.committed_revision_count(), 0);
}

#[tokio::test]
async fn test_failed_course_insert_rolls_back_everything() {
    let repo = seeded_repository().await;
    let revision_id = upload(
        &repo,
        &course_sheet(vec![CourseRow::new("A"), CourseRow::new("B"), CourseRow::new("C")]),
    )
    .await;
    repo.inject_course_insert_failure(2);

    let err = pipeline(&repo)
        .create_schedule_revision(revision_id, &full_mapping(), "Doomed")
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Transaction(_)));
    assert_eq!(repo.schedule_count(), 0);
    assert_eq!(repo.course_count(), 0);
    assert_eq!(repo.committed_revision_count(), 0);
    assert!(repo.get_revision(revision_id).await.unwrap().unwrap().onboarding);

    // The revision is still committable once the fault is gone.
    let receipt = pipeline(&repo)
        .create_schedule_revision(revision_id, &full_mapping(), "Retry")
        .await
        .unwrap();
    assert_eq!(receipt.course_count(), 3);
}

#[tokio::test]
async fn test_committed_revision_is_input_absent() {
    let repo = seeded_repository().await;
    let revision_id = upload(&repo, &course_sheet(vec![CourseRow::new("A")])).await;
    let pipeline = pipeline(&repo);

    pipeline
        .create_schedule_revision(revision_id, &full_mapping(), "First")
        .await
        .unwrap();

    let verify = pipeline
        .verify_organized_columns(revision_id, &full_mapping())
        .await
        .unwrap_err();
    assert!(verify.is_input_absent());

    let commit = pipeline
        .create_schedule_revision(revision_id, &full_mapping(), "Second")
        .await
        .unwrap_err();
    assert!(commit.is_input_absent());
    assert_eq!(repo.schedule_count(), 1);
}

#[tokio::test]
async fn test_missing_revision_is_input_absent() {
    let repo = seeded_repository().await;
    let err = pipeline(&repo)
        .verify_organized_columns(RevisionId::new(404), &full_mapping())
        .await
        .unwrap_err();
    assert!(err.is_input_absent());
}

#[tokio::test]
async fn test_workbook_without_sheets_is_sheet_empty() {
    let repo = seeded_repository().await;
    let revision_id = upload(&repo, &[]).await;

    let err = pipeline(&repo)
        .verify_organized_columns(revision_id, &full_mapping())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::SheetEmpty));
}

#[tokio::test]
async fn test_corrupt_upload_is_sheet_unreadable() {
    let repo = seeded_repository().await;
    let revision_id = repo
        .upload_revision("garbage", b"not a workbook")
        .await
        .unwrap()
        .id;

    let err = pipeline(&repo)
        .verify_organized_columns(revision_id, &full_mapping())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::SheetUnreadable(_)));
}

#[tokio::test]
async fn test_header_only_sheet_commits_empty_schedule() {
    let repo = seeded_repository().await;
    let revision_id = upload(&repo, &course_sheet(vec![])).await;

    let receipt = pipeline(&repo)
        .create_schedule_revision(revision_id, &full_mapping(), "Empty")
        .await
        .unwrap();
    assert_eq!(receipt.course_count(), 0);
    assert_eq!(repo.schedule_count(), 1);
}

#[tokio::test]
async fn test_custom_rules_apply() {
    let repo = seeded_repository().await;
    let revision_id = upload(&repo, &course_sheet(vec![CourseRow::new("A")])).await;
    let rules = ValidationRules {
        min_notes: 4,
        ..ValidationRules::default()
    };

    let err = pipeline(&repo)
        .with_rules(rules)
        .verify_organized_columns(revision_id, &full_mapping())
        .await
        .unwrap_err();
    assert_eq!(err.field_errors()[0].path, "notes");
}

#[tokio::test]
async fn test_run_dispatches_on_mode() {
    let repo = seeded_repository().await;
    let revision_id = upload(&repo, &course_sheet(vec![CourseRow::new("A")])).await;
    let pipeline = pipeline(&repo);

    let verified = pipeline
        .run(revision_id, &full_mapping(), IngestMode::VerifyOnly)
        .await
        .unwrap();
    assert!(matches!(verified, IngestOutcome::Verified(ref rows) if rows.len() == 1));

    let committed = pipeline
        .run(
            revision_id,
            &full_mapping(),
            IngestMode::Commit {
                name: "Via run".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(matches!(committed, IngestOutcome::Committed(ref r) if r.course_count() == 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commits_have_exactly_one_winner() {
    let repo = seeded_repository().await;
    let revision_id = upload(
        &repo,
        &course_sheet(vec![CourseRow::new("A"), CourseRow::new("B")]),
    )
    .await;
    let pipeline = Arc::new(pipeline(&repo));

    let handles: Vec<_> = (0..2)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                pipeline
                    .create_schedule_revision(revision_id, &full_mapping(), &format!("Racer {}", i))
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    let mut losers = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(err) => {
                assert!(err.is_input_absent(), "unexpected error: {:?}", err);
                losers += 1;
            }
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(losers, 1);
    assert_eq!(repo.schedule_count(), 1);
    assert_eq!(repo.course_count(), 2);
}

#[tokio::test]
async fn test_online_row_without_days_is_rejected() {
    let repo = seeded_repository().await;
    let rows = vec![
        CourseRow::new("ONLINE-1").building("ONL").days("TR"),
        CourseRow::new("ONLINE-2").building("ONL").days(""),
    ];
    let revision_id = upload(&repo, &course_sheet(rows)).await;

    let err = pipeline(&repo)
        .create_schedule_revision(revision_id, &full_mapping(), "Online")
        .await
        .unwrap_err();

    match &err {
        IngestError::RowValidation(row_err) => {
            assert_eq!(row_err.row, 2);
            assert!(row_err
                .errors
                .iter()
                .any(|e| e.path == "locations[0].days"));
        }
        other => panic!("expected row validation error, got {:?}", other),
    }
    assert_eq!(repo.course_count(), 0);
}

#[tokio::test]
async fn test_out_of_range_times_degrade_to_zero() {
    let repo = seeded_repository().await;
    let mut row = CourseRow::new("LATE");
    row.start_time = "99999999:00".to_string();
    row.end_time = "4294967295:00 PM".to_string();
    let revision_id = upload(&repo, &course_sheet(vec![row])).await;

    let rows = pipeline(&repo)
        .verify_organized_columns(revision_id, &full_mapping())
        .await
        .unwrap();
    assert_eq!(rows[0].locations[0].start_time.value(), 0);
    assert_eq!(rows[0].locations[0].end_time.value(), 0);
}
