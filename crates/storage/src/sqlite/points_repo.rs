use classroom_core::model::{Level, PointsEntry, StudentId};

use super::{
    SqliteRepository,
    mapping::{conn, map_level_row, map_points_row},
};
use crate::repository::{PointsRepository, StorageError};

#[async_trait::async_trait]
impl PointsRepository for SqliteRepository {
    async fn append_points(&self, entry: &PointsEntry) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO game_points_ledger (student_id, points, source_type, created_at)
                VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(entry.student_id.as_str())
        .bind(entry.points)
        .bind(entry.source_type.as_str())
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn points_for_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<PointsEntry>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT student_id, points, source_type, created_at
                FROM game_points_ledger
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
            out.push(map_points_row(&row)?);
        }
        Ok(out)
    }

    async fn upsert_level(&self, level: &Level) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO levels (level, required_points, title)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(level) DO UPDATE SET
                    required_points = excluded.required_points,
                    title = excluded.title
            ",
        )
        .bind(i64::from(level.level))
        .bind(level.required_points)
        .bind(level.title.as_str())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn list_levels(&self) -> Result<Vec<Level>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT level, required_points, title
                FROM levels
                ORDER BY required_points ASC, level ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_level_row(&row)?);
        }
        Ok(out)
    }
}
