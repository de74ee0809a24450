use classroom_core::model::{LessonId, LessonResult, LessonResultRecord, StudentId};

use super::{
    SqliteRepository,
    mapping::{conn, map_result_row},
};
use crate::repository::{ResultRepository, StorageError};

#[async_trait::async_trait]
impl ResultRepository for SqliteRepository {
    async fn append_result(&self, record: &LessonResultRecord) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO lesson_results (
                    student_id, lesson_id, correct_count, total_count, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(record.student_id.as_str())
        .bind(record.result.lesson_id.as_str())
        .bind(record.result.correct_count.map(i64::from))
        .bind(record.result.total_count.map(i64::from))
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn results_for_student(
        &self,
        student_id: &StudentId,
        lessons: Option<&[LessonId]>,
    ) -> Result<Vec<LessonResult>, StorageError> {
        if lessons.is_some_and(<[LessonId]>::is_empty) {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            r"
                SELECT lesson_id, correct_count, total_count
                FROM lesson_results
                WHERE student_id = ?1
            ",
        );

        if let Some(ids) = lessons {
            sql.push_str(" AND lesson_id IN (");
            for i in 0..ids.len() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push('?');
                sql.push_str(&(i + 2).to_string());
            }
            sql.push(')');
        }
        sql.push_str(" ORDER BY created_at ASC, id ASC");

        let mut query = sqlx::query(&sql).bind(student_id.as_str());
        for id in lessons.unwrap_or_default() {
            query = query.bind(id.as_str());
        }

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_result_row(&row)?);
        }
        Ok(out)
    }
}
