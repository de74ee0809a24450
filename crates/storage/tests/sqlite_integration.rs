use chrono::Duration;
use classroom_core::model::{
    Class, ClassId, ContainerId, LessonCatalogEntry, LessonId, LessonResult, LessonResultRecord,
    Level, PointsEntry, QuestionAttempt, QuestionId, Student, StudentId, StudySession, TeacherId,
};
use classroom_core::time::fixed_now;
use storage::StorageError;
use storage::repository::{
    AttemptRepository, CatalogRepository, ClassRepository, PointsRepository, ResultRepository,
    SessionRepository, StudentRepository,
};
use storage::sqlite::SqliteRepository;

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn class(id: &str, code: &str) -> Class {
    Class::new(ClassId::new(id), "Math", TeacherId::new("t1"), code).unwrap()
}

#[tokio::test]
async fn results_filter_by_lesson_and_keep_missing_counts() {
    let repo = repo("memdb_results").await;
    let student = StudentId::new("s1");
    let now = fixed_now();

    for (i, result) in [
        LessonResult::new("A", 8, 10),
        LessonResult::new("B", 0, 0),
        LessonResult {
            lesson_id: LessonId::new("C"),
            correct_count: None,
            total_count: None,
        },
    ]
    .into_iter()
    .enumerate()
    {
        let at = now + Duration::seconds(i64::try_from(i).unwrap());
        repo.append_result(&LessonResultRecord::new(student.clone(), result, at))
            .await
            .unwrap();
    }
    repo.append_result(&LessonResultRecord::new(
        StudentId::new("other"),
        LessonResult::new("A", 10, 10),
        now,
    ))
    .await
    .unwrap();

    let all = repo.results_for_student(&student, None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].total_count, None);
    assert_eq!(all[2].correct_count, None);

    let only_a = repo
        .results_for_student(&student, Some(&[LessonId::new("A")][..]))
        .await
        .unwrap();
    assert_eq!(only_a, vec![LessonResult::new("A", 8, 10)]);

    let none = repo.results_for_student(&student, Some(&[][..])).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn catalog_orders_by_display_order_and_joins_locks() {
    let repo = repo("memdb_catalog").await;
    let class_id = ClassId::new("c1");

    repo.upsert_lesson_link(&class_id, &LessonCatalogEntry::new("L3", "U2", 3))
        .await
        .unwrap();
    repo.upsert_lesson_link(&class_id, &LessonCatalogEntry::new("L1", "U1", 1))
        .await
        .unwrap();
    repo.upsert_lesson_link(
        &class_id,
        &LessonCatalogEntry {
            lesson_id: LessonId::new("L0"),
            container_id: ContainerId::new("U1"),
            display_order: None,
            container_locked: false,
        },
    )
    .await
    .unwrap();
    repo.set_container_locked(&class_id, &ContainerId::new("U2"), true)
        .await
        .unwrap();

    let catalog = repo.catalog_for_class(&class_id).await.unwrap();
    let order: Vec<&str> = catalog.iter().map(|e| e.lesson_id.as_str()).collect();
    assert_eq!(order, vec!["L1", "L3", "L0"]);
    assert!(!catalog[0].container_locked);
    assert!(catalog[1].container_locked);

    repo.set_container_locked(&class_id, &ContainerId::new("U2"), false)
        .await
        .unwrap();
    let catalog = repo.catalog_for_class(&class_id).await.unwrap();
    assert!(catalog.iter().all(|e| !e.container_locked));
}

#[tokio::test]
async fn points_levels_sessions_and_attempts_roundtrip() {
    let repo = repo("memdb_activity").await;
    let student = StudentId::new("s1");
    let now = fixed_now();

    repo.append_points(&PointsEntry::new(student.clone(), 40, "lesson", now))
        .await
        .unwrap();
    repo.append_points(&PointsEntry {
        student_id: student.clone(),
        points: None,
        source_type: "game".into(),
        created_at: now,
    })
    .await
    .unwrap();
    let points = repo.points_for_student(&student).await.unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].points, None);

    repo.upsert_level(&Level::new(2, 100, "Builder")).await.unwrap();
    repo.upsert_level(&Level::new(1, 0, "Explorer")).await.unwrap();
    repo.upsert_level(&Level::new(2, 150, "Builder")).await.unwrap();
    let levels = repo.list_levels().await.unwrap();
    assert_eq!(levels, vec![Level::new(1, 0, "Explorer"), Level::new(2, 150, "Builder")]);

    for days in 0..4 {
        for hours in [0, 2] {
            repo.record_session(&StudySession {
                student_id: student.clone(),
                created_at: now - Duration::days(days) - Duration::hours(hours),
            })
            .await
            .unwrap();
        }
    }
    let recent = repo
        .sessions_since(&student, now - Duration::days(1) - Duration::hours(2))
        .await
        .unwrap();
    assert_eq!(recent.len(), 4);
    assert_eq!(recent[0].created_at, now);
    assert_eq!(recent[3].created_at, now - Duration::days(1) - Duration::hours(2));

    repo.append_attempt(&QuestionAttempt {
        student_id: student.clone(),
        question_id: QuestionId::new("q1"),
        lesson_id: LessonId::new("L1"),
        skill_tag: None,
        is_correct: true,
        created_at: now,
    })
    .await
    .unwrap();
    let attempts = repo.attempts_for_student(&student).await.unwrap();
    assert_eq!(attempts.len(), 1);
    assert!(attempts[0].is_correct);
    assert_eq!(attempts[0].skill_tag, None);
}

#[tokio::test]
async fn roster_enforces_unique_codes_and_known_classes() {
    let repo = repo("memdb_roster").await;
    let student = Student::new(StudentId::new("s1"), "Grace Hopper", Some(6), None).unwrap();
    repo.upsert_student(&student).await.unwrap();
    assert_eq!(
        repo.get_student(&StudentId::new("s1")).await.unwrap(),
        Some(student)
    );
    assert_eq!(repo.get_student(&StudentId::new("nope")).await.unwrap(), None);

    repo.insert_class(&class("c1", "ABC234")).await.unwrap();
    let dup = repo.insert_class(&class("c2", "ABC234")).await;
    assert!(matches!(dup, Err(StorageError::Conflict)));

    let found = repo.class_by_code("ABC234").await.unwrap().unwrap();
    assert_eq!(found.id, ClassId::new("c1"));

    let sid = StudentId::new("s1");
    repo.enroll(&sid, &ClassId::new("c1")).await.unwrap();
    repo.enroll(&sid, &ClassId::new("c1")).await.unwrap();
    assert_eq!(
        repo.classes_for_student(&sid).await.unwrap(),
        vec![ClassId::new("c1")]
    );

    let missing = repo.enroll(&sid, &ClassId::new("ghost")).await;
    assert!(matches!(missing, Err(StorageError::NotFound)));
}
