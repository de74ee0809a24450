use classroom_core::model::{ClassId, ContainerId, LessonCatalogEntry};

use super::{
    SqliteRepository,
    mapping::{conn, map_catalog_row},
};
use crate::repository::{CatalogRepository, StorageError};

#[async_trait::async_trait]
impl CatalogRepository for SqliteRepository {
    async fn upsert_lesson_link(
        &self,
        class_id: &ClassId,
        entry: &LessonCatalogEntry,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO class_lessons (class_id, lesson_id, container_id, display_order)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(class_id, lesson_id) DO UPDATE SET
                    container_id = excluded.container_id,
                    display_order = excluded.display_order
            ",
        )
        .bind(class_id.as_str())
        .bind(entry.lesson_id.as_str())
        .bind(entry.container_id.as_str())
        .bind(entry.display_order)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn set_container_locked(
        &self,
        class_id: &ClassId,
        container_id: &ContainerId,
        locked: bool,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO class_containers (class_id, container_id, locked)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(class_id, container_id) DO UPDATE SET
                    locked = excluded.locked
            ",
        )
        .bind(class_id.as_str())
        .bind(container_id.as_str())
        .bind(locked)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn catalog_for_class(
        &self,
        class_id: &ClassId,
    ) -> Result<Vec<LessonCatalogEntry>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    cl.lesson_id, cl.container_id, cl.display_order,
                    COALESCE(cc.locked, 0) AS container_locked
                FROM class_lessons cl
                LEFT JOIN class_containers cc
                    ON cc.class_id = cl.class_id AND cc.container_id = cl.container_id
                WHERE cl.class_id = ?1
                ORDER BY cl.display_order IS NULL, cl.display_order ASC, cl.lesson_id ASC
            ",
        )
        .bind(class_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_catalog_row(&row)?);
        }
        Ok(out)
    }
}
