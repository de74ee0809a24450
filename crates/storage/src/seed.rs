//! Demo data for local development.
//!
//! Roster, catalog and level rows are upserted on every run. Results, points,
//! sessions and attempts are append-only, so they are written only when the
//! demo class is created; reseeding an existing database leaves them alone.

use chrono::{DateTime, Duration, Utc};
use classroom_core::model::{
    Class, ClassId, ContainerId, LessonCatalogEntry, LessonId, LessonResult, LessonResultRecord,
    Level, PointsEntry, QuestionAttempt, QuestionId, Student, StudentId, StudySession, TeacherId,
};
use thiserror::Error;

use crate::repository::{Storage, StorageError};

pub const DEMO_CLASS_ID: &str = "class-demo";
pub const DEMO_CLASS_CODE: &str = "DEMK42";
pub const DEMO_STUDENT_ID: &str = "student-demo";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Model(#[from] classroom_core::Error),
}

/// Counts of rows written by [`seed_demo`]. Activity counts are zero when
/// the demo class already existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub lessons: usize,
    pub results: usize,
    pub sessions: usize,
    pub attempts: usize,
}

// (lesson, container, order)
const CATALOG: &[(&str, &str, i64)] = &[
    ("L1", "unit-fractions", 1),
    ("L2", "unit-fractions", 2),
    ("L3", "unit-fractions", 3),
    ("L4", "unit-decimals", 4),
    ("L5", "unit-decimals", 5),
    ("L6", "unit-geometry", 6),
];

const LOCKED_CONTAINER: &str = "unit-geometry";

// One session per day, ending today.
const STREAK_DAYS: u8 = 3;

// (lesson, correct, total)
const RESULTS: &[(&str, u32, u32)] = &[
    ("L1", 7, 10),
    ("L1", 19, 20),
    ("L2", 10, 10),
    ("L3", 5, 10),
    ("L4", 0, 0),
    ("L4", 3, 10),
];

// (question, lesson, skill, correct)
const ATTEMPTS: &[(&str, &str, &str, bool)] = &[
    ("q1", "L1", "fractions", true),
    ("q2", "L1", "fractions", true),
    ("q3", "L2", "fractions", true),
    ("q4", "L3", "ratios", false),
    ("q5", "L3", "ratios", true),
    ("q6", "L4", "decimals", false),
    ("q7", "L4", "decimals", false),
];

/// Write a demo class, catalog, student and activity history.
///
/// # Errors
///
/// Returns `SeedError` if any repository write fails.
pub async fn seed_demo(storage: &Storage, now: DateTime<Utc>) -> Result<SeedSummary, SeedError> {
    let class_id = ClassId::new(DEMO_CLASS_ID);
    let student_id = StudentId::new(DEMO_STUDENT_ID);

    let fresh = storage.classes.get_class(&class_id).await?.is_none();
    if fresh {
        let class = Class::new(
            class_id.clone(),
            "Grade 5 Math",
            TeacherId::new("teacher-demo"),
            DEMO_CLASS_CODE,
        )
        .map_err(classroom_core::Error::from)?;
        storage.classes.insert_class(&class).await?;
    }

    let student = Student::new(
        student_id.clone(),
        "Ada Lovelace",
        Some(5),
        Some("5B".to_owned()),
    )
    .map_err(classroom_core::Error::from)?;
    storage.students.upsert_student(&student).await?;
    storage.classes.enroll(&student_id, &class_id).await?;

    for &(lesson, container, order) in CATALOG {
        storage
            .catalog
            .upsert_lesson_link(&class_id, &LessonCatalogEntry::new(lesson, container, order))
            .await?;
    }
    storage
        .catalog
        .set_container_locked(&class_id, &ContainerId::new(LOCKED_CONTAINER), true)
        .await?;

    for (level, required, title) in [(1, 0, "Explorer"), (2, 100, "Builder"), (3, 300, "Expert")] {
        storage
            .points
            .upsert_level(&Level::new(level, required, title))
            .await?;
    }

    if !fresh {
        log::info!("class {DEMO_CLASS_ID} already seeded; skipping activity history");
        return Ok(SeedSummary {
            lessons: CATALOG.len(),
            ..SeedSummary::default()
        });
    }

    let first_result_at = now - Duration::hours(1);
    for (minute, &(lesson, correct, total)) in (0_i64..).zip(RESULTS) {
        let record = LessonResultRecord::new(
            student_id.clone(),
            LessonResult::new(lesson, correct, total),
            first_result_at + Duration::minutes(minute),
        );
        storage.results.append_result(&record).await?;
    }

    storage
        .points
        .append_points(&PointsEntry::new(student_id.clone(), 120, "lesson", now))
        .await?;
    storage
        .points
        .append_points(&PointsEntry::new(student_id.clone(), 35, "game", now))
        .await?;

    for days_ago in 0..STREAK_DAYS {
        let session = StudySession {
            student_id: student_id.clone(),
            created_at: now - Duration::days(i64::from(days_ago)),
        };
        storage.sessions.record_session(&session).await?;
    }

    for &(question, lesson, skill, is_correct) in ATTEMPTS {
        let attempt = QuestionAttempt {
            student_id: student_id.clone(),
            question_id: QuestionId::new(question),
            lesson_id: LessonId::new(lesson),
            skill_tag: Some(skill.to_owned()),
            is_correct,
            created_at: now,
        };
        storage.attempts.append_attempt(&attempt).await?;
    }

    let summary = SeedSummary {
        lessons: CATALOG.len(),
        results: RESULTS.len(),
        sessions: usize::from(STREAK_DAYS),
        attempts: ATTEMPTS.len(),
    };
    log::info!(
        "seeded class {DEMO_CLASS_ID} with {} lessons, {} results, {} attempts",
        summary.lessons,
        summary.results,
        summary.attempts
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::stats::total_points;
    use classroom_core::time::fixed_now;

    #[tokio::test]
    async fn seed_is_repeatable_for_roster_and_catalog() {
        let storage = Storage::in_memory();
        let now = fixed_now();

        let first = seed_demo(&storage, now).await.unwrap();
        let second = seed_demo(&storage, now).await.unwrap();
        assert_eq!(first.results, RESULTS.len());
        assert_eq!(
            second,
            SeedSummary {
                lessons: CATALOG.len(),
                ..SeedSummary::default()
            }
        );

        let class_id = ClassId::new(DEMO_CLASS_ID);
        let catalog = storage.catalog.catalog_for_class(&class_id).await.unwrap();
        assert_eq!(catalog.len(), CATALOG.len());
        assert!(
            catalog
                .iter()
                .filter(|e| e.container_id.as_str() == LOCKED_CONTAINER)
                .all(|e| e.container_locked)
        );

        let classes = storage
            .classes
            .classes_for_student(&StudentId::new(DEMO_STUDENT_ID))
            .await
            .unwrap();
        assert_eq!(classes, vec![class_id]);

        let by_code = storage.classes.class_by_code(DEMO_CLASS_CODE).await.unwrap();
        assert!(by_code.is_some());
    }

    #[tokio::test]
    async fn reseeding_does_not_duplicate_activity() {
        let storage = Storage::in_memory();
        let now = fixed_now();
        let student_id = StudentId::new(DEMO_STUDENT_ID);

        seed_demo(&storage, now).await.unwrap();
        seed_demo(&storage, now).await.unwrap();

        let points = storage.points.points_for_student(&student_id).await.unwrap();
        assert_eq!(total_points(&points), 155);
        let results = storage
            .results
            .results_for_student(&student_id, None)
            .await
            .unwrap();
        assert_eq!(results.len(), RESULTS.len());
        let sessions = storage
            .sessions
            .sessions_since(&student_id, now - Duration::days(30))
            .await
            .unwrap();
        assert_eq!(sessions.len(), usize::from(STREAK_DAYS));
        let attempts = storage.attempts.attempts_for_student(&student_id).await.unwrap();
        assert_eq!(attempts.len(), ATTEMPTS.len());
    }
}
