use chrono::{DateTime, Utc};
use classroom_core::model::{QuestionAttempt, StudentId, StudySession};

use super::{
    SqliteRepository,
    mapping::{conn, map_attempt_row, map_session_row},
};
use crate::repository::{AttemptRepository, SessionRepository, StorageError};

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn record_session(&self, session: &StudySession) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO sessions (student_id, created_at)
                VALUES (?1, ?2)
            ",
        )
        .bind(session.student_id.as_str())
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn sessions_since(
        &self,
        student_id: &StudentId,
        since: DateTime<Utc>,
    ) -> Result<Vec<StudySession>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT student_id, created_at
                FROM sessions
                WHERE student_id = ?1 AND created_at >= ?2
                ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(student_id.as_str())
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_session_row(&row)?);
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn append_attempt(&self, attempt: &QuestionAttempt) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO question_attempts (
                    student_id, question_id, lesson_id, skill_tag, is_correct, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(attempt.student_id.as_str())
        .bind(attempt.question_id.as_str())
        .bind(attempt.lesson_id.as_str())
        .bind(attempt.skill_tag.as_deref())
        .bind(attempt.is_correct)
        .bind(attempt.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn attempts_for_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<QuestionAttempt>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT student_id, question_id, lesson_id, skill_tag, is_correct, created_at
                FROM question_attempts
                WHERE student_id = ?1
                ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(student_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_attempt_row(&row)?);
        }
        Ok(out)
    }
}
