use chrono::Duration;
use classroom_core::model::{
    ContainerId, ContainerStatus, LessonCatalogEntry, LessonResult, LessonResultRecord, Level,
    PointsEntry, QuestionAttempt, QuestionId, StatusFilter, Student, StudentId, StudySession,
    TeacherId,
};
use classroom_core::stats::SkillBand;
use classroom_core::time::{fixed_clock, fixed_now};
use services::AppServices;
use storage::repository::Storage;

#[tokio::test]
async fn teacher_creates_class_and_student_sees_progress() {
    let storage = Storage::sqlite("sqlite:file:memdb_classroom_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let app = AppServices::from_storage(storage.clone(), fixed_clock());
    let now = fixed_now();

    let class = app
        .classes()
        .create_class(&TeacherId::new("t1"), "Grade 5 Math")
        .await
        .expect("create class");

    let sid = StudentId::new("s1");
    storage
        .students
        .upsert_student(&Student::new(sid.clone(), "Nour Salem", Some(5), None).unwrap())
        .await
        .unwrap();
    app.classes()
        .join_class(&sid, &class.teacher_code.to_lowercase())
        .await
        .expect("join class");

    for entry in [
        LessonCatalogEntry::new("L1", "U1", 1),
        LessonCatalogEntry::new("L2", "U1", 2),
        LessonCatalogEntry::new("L3", "U2", 3),
        LessonCatalogEntry::new("L4", "U3", 4),
    ] {
        storage
            .catalog
            .upsert_lesson_link(&class.id, &entry)
            .await
            .unwrap();
    }
    storage
        .catalog
        .set_container_locked(&class.id, &ContainerId::new("U3"), true)
        .await
        .unwrap();

    for result in [
        LessonResult::new("L1", 5, 10),
        LessonResult::new("L1", 19, 20),
        LessonResult::new("L2", 3, 0),
        LessonResult::new("L3", 9, 10),
    ] {
        storage
            .results
            .append_result(&LessonResultRecord::new(sid.clone(), result, now))
            .await
            .unwrap();
    }

    let progress = app.progress();
    let active = progress.active_class(&sid).await.expect("active class");
    assert_eq!(active, class.id);

    let rows = progress
        .container_progress(&sid, &active)
        .await
        .expect("progress");
    let view: Vec<(&str, usize, usize, u8, ContainerStatus)> = rows
        .iter()
        .map(|p| {
            (
                p.container_id.as_str(),
                p.completed_count,
                p.total_count,
                p.percent_complete,
                p.status,
            )
        })
        .collect();
    assert_eq!(
        view,
        vec![
            ("U1", 1, 2, 50, ContainerStatus::InProgress),
            ("U2", 0, 1, 0, ContainerStatus::NotStarted),
            ("U3", 0, 1, 0, ContainerStatus::Locked),
        ]
    );

    let again = progress.container_progress(&sid, &active).await.unwrap();
    assert_eq!(again, rows);

    let in_progress = progress
        .progress_filtered(&sid, &active, StatusFilter::Only(ContainerStatus::InProgress))
        .await
        .unwrap();
    assert_eq!(in_progress.len(), 1);
}

#[tokio::test]
async fn dashboard_and_skills_read_from_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_dashboard_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let app = AppServices::from_storage(storage.clone(), fixed_clock());
    let now = fixed_now();
    let sid = StudentId::new("s1");

    storage
        .students
        .upsert_student(&Student::new(sid.clone(), "Layla Hassan", None, None).unwrap())
        .await
        .unwrap();
    storage
        .results
        .append_result(&LessonResultRecord::new(
            sid.clone(),
            LessonResult::new("L1", 1, 1),
            now,
        ))
        .await
        .unwrap();
    storage
        .points
        .append_points(&PointsEntry::new(sid.clone(), 250, "lesson", now))
        .await
        .unwrap();
    for level in [Level::new(1, 0, "Explorer"), Level::new(2, 200, "Builder")] {
        storage.points.upsert_level(&level).await.unwrap();
    }
    for days_ago in 0..3 {
        storage
            .sessions
            .record_session(&StudySession {
                student_id: sid.clone(),
                created_at: now - Duration::days(days_ago),
            })
            .await
            .unwrap();
    }
    for (q, correct) in [("q1", true), ("q2", true), ("q3", false)] {
        storage
            .attempts
            .append_attempt(&QuestionAttempt {
                student_id: sid.clone(),
                question_id: QuestionId::new(q),
                lesson_id: "L1".into(),
                skill_tag: Some("fractions".into()),
                is_correct: correct,
                created_at: now,
            })
            .await
            .unwrap();
    }

    let dashboard = app.dashboard().load(&sid).await.expect("dashboard");
    assert_eq!(dashboard.class_id, None);
    assert_eq!(dashboard.stats.total_points, 250);
    assert_eq!(dashboard.stats.streak_days, 3);
    assert_eq!(dashboard.stats.total_lessons, 1);
    assert_eq!(dashboard.stats.progress_percent, 100);
    assert_eq!(dashboard.level.map(|l| l.title), Some("Builder".to_owned()));

    let insights = app.skills().insights(&sid).await.expect("insights");
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].correct, 2);
    assert_eq!(insights[0].total, 3);
    assert_eq!(insights[0].band, SkillBand::Developing);
}
