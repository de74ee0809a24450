use classroom_core::model::{
    Class, ClassId, ContainerId, LessonCatalogEntry, LessonId, LessonResult, Level, PointsEntry,
    QuestionAttempt, QuestionId, Student, StudentId, StudySession, TeacherId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Unique-constraint violations surface as `Conflict`; everything else is a
/// connection error.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => StorageError::NotFound,
        _ => conn(e),
    }
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn opt_u32(row: &SqliteRow, field: &'static str) -> Result<Option<u32>, StorageError> {
    row.try_get::<Option<i64>, _>(field)
        .map_err(ser)?
        .map(|v| u32_from_i64(field, v))
        .transpose()
}

fn text(row: &SqliteRow, field: &'static str) -> Result<String, StorageError> {
    row.try_get::<String, _>(field).map_err(ser)
}

pub(crate) fn map_result_row(row: &SqliteRow) -> Result<LessonResult, StorageError> {
    Ok(LessonResult {
        lesson_id: LessonId::new(text(row, "lesson_id")?),
        correct_count: opt_u32(row, "correct_count")?,
        total_count: opt_u32(row, "total_count")?,
    })
}

pub(crate) fn map_catalog_row(row: &SqliteRow) -> Result<LessonCatalogEntry, StorageError> {
    Ok(LessonCatalogEntry {
        lesson_id: LessonId::new(text(row, "lesson_id")?),
        container_id: ContainerId::new(text(row, "container_id")?),
        display_order: row.try_get("display_order").map_err(ser)?,
        container_locked: row.try_get("container_locked").map_err(ser)?,
    })
}

pub(crate) fn map_points_row(row: &SqliteRow) -> Result<PointsEntry, StorageError> {
    Ok(PointsEntry {
        student_id: StudentId::new(text(row, "student_id")?),
        points: row.try_get("points").map_err(ser)?,
        source_type: text(row, "source_type")?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_level_row(row: &SqliteRow) -> Result<Level, StorageError> {
    Ok(Level {
        level: u32_from_i64("level", row.try_get::<i64, _>("level").map_err(ser)?)?,
        required_points: row.try_get("required_points").map_err(ser)?,
        title: text(row, "title")?,
    })
}

pub(crate) fn map_session_row(row: &SqliteRow) -> Result<StudySession, StorageError> {
    Ok(StudySession {
        student_id: StudentId::new(text(row, "student_id")?),
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_attempt_row(row: &SqliteRow) -> Result<QuestionAttempt, StorageError> {
    Ok(QuestionAttempt {
        student_id: StudentId::new(text(row, "student_id")?),
        question_id: QuestionId::new(text(row, "question_id")?),
        lesson_id: LessonId::new(text(row, "lesson_id")?),
        skill_tag: row.try_get("skill_tag").map_err(ser)?,
        is_correct: row.try_get("is_correct").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_student_row(row: &SqliteRow) -> Result<Student, StorageError> {
    let grade = row
        .try_get::<Option<i64>, _>("grade")
        .map_err(ser)?
        .map(|g| {
            u8::try_from(g).map_err(|_| StorageError::Serialization(format!("invalid grade: {g}")))
        })
        .transpose()?;

    Student::new(
        StudentId::new(text(row, "student_id")?),
        text(row, "full_name")?,
        grade,
        row.try_get("class_section").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_class_row(row: &SqliteRow) -> Result<Class, StorageError> {
    Class::new(
        ClassId::new(text(row, "class_id")?),
        text(row, "class_name")?,
        TeacherId::new(text(row, "teacher_id")?),
        text(row, "teacher_code")?,
    )
    .map_err(ser)
}
